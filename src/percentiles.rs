// MIT License
//
// Copyright (c) 2026 Raja Lehtihet & Wael El Oraiby
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//
//! Validated list of requested percentages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::EstimatorError;

/// Ordered, immutable list of percentages in `[0, 100]`.
///
/// Each percentage keeps the index it was given at construction, and that
/// index is what every estimator query takes.
///
/// # Example
/// ```rust
/// use percentile_estimators::Percentiles;
///
/// let percentiles: Percentiles = "50, 90, 99.5".parse().unwrap();
/// assert_eq!(percentiles.len(), 3);
/// assert_eq!(percentiles.get(2), Some(99.5));
/// assert_eq!(percentiles.label(0).as_deref(), Some("p50"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<f64>")]
pub struct Percentiles {
    values: Box<[f64]>,
}

impl Percentiles {
    /// Creates a list from explicit percentages.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] for an empty list and
    /// [`EstimatorError::InvalidPercentile`] for a value outside `[0, 100]`.
    pub fn new(values: impl Into<Vec<f64>>) -> Result<Self, EstimatorError> {
        let values = values.into();
        if values.is_empty() {
            return Err(EstimatorError::InvalidParameter(
                "at least one percentile is required",
            ));
        }
        if let Some(bad) = values
            .iter()
            .find(|value| !value.is_finite() || !(0.0..=100.0).contains(*value))
        {
            return Err(EstimatorError::InvalidPercentile(format!(
                "{bad} is not in [0, 100]"
            )));
        }

        Ok(Self {
            values: values.into_boxed_slice(),
        })
    }

    /// Returns the number of configured percentiles.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the percentage at `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Returns the display label (`p50`, `p99.5`) of the percentage at `index`.
    pub fn label(&self, index: usize) -> Option<String> {
        self.get(index).map(|value| format!("p{value}"))
    }

    /// Returns the percentages in construction order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over the percentages in construction order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

impl Default for Percentiles {
    fn default() -> Self {
        Self {
            values: Box::new([50.0, 90.0, 95.0, 98.0]),
        }
    }
}

/// Parses a token list such as `"50,90,95,98,99,99.5"`.
///
/// Tokens are separated by commas and/or whitespace.
impl FromStr for Percentiles {
    type Err = EstimatorError;

    fn from_str(tokens: &str) -> Result<Self, Self::Err> {
        let values = tokens
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    EstimatorError::InvalidPercentile(format!("`{token}` is not a number"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(values)
    }
}

impl TryFrom<Vec<f64>> for Percentiles {
    type Error = EstimatorError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Percentiles> for Vec<f64> {
    fn from(percentiles: Percentiles) -> Self {
        percentiles.values.into_vec()
    }
}

impl fmt::Display for Percentiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Accepts either a token string or a numeric list.
impl<'de> Deserialize<'de> for Percentiles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Tokens(String),
            List(Vec<f64>),
        }

        let parsed = match Input::deserialize(deserializer)? {
            Input::Tokens(tokens) => tokens.parse(),
            Input::List(values) => Self::new(values),
        };
        parsed.map_err(de::Error::custom)
    }
}
