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
//! Estimator configuration as supplied by a configuration loader.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bounded::BoundedEstimator;
use crate::ranked::{RankInterpolation, RankedEstimator};
use crate::{EstimatorError, PercentileEstimator, Percentiles};

const DEFAULT_CAPACITY: usize = 100;

/// Which estimator variant to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimatorKind {
    /// [`BoundedEstimator`]: first `capacity` samples only.
    Bounded,
    /// [`RankedEstimator`]: whole stream, condensed.
    #[default]
    Ranked,
}

/// Settings for one tracked statistic's estimator.
///
/// `percentiles` accepts a token list (`"50,90,99.5"`) or a numeric list.
///
/// # Example
/// ```rust
/// use percentile_estimators::PercentileEstimator;
/// use percentile_estimators::config::{EstimatorConfig, EstimatorKind};
///
/// let config = EstimatorConfig {
///     kind: EstimatorKind::Bounded,
///     percentiles: "50, 99".parse().unwrap(),
///     capacity: 20,
///     ..EstimatorConfig::default()
/// };
/// let estimator = config.build().unwrap();
/// assert_eq!(estimator.percentile_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Estimator variant.
    pub kind: EstimatorKind,
    /// Requested percentages, in query-index order.
    pub percentiles: Percentiles,
    /// Size of the retained-sample buffer.
    pub capacity: usize,
    /// Rank arithmetic for [`EstimatorKind::Ranked`]; ignored otherwise.
    pub rank_interpolation: RankInterpolation,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            kind: EstimatorKind::default(),
            percentiles: Percentiles::default(),
            capacity: DEFAULT_CAPACITY,
            rank_interpolation: RankInterpolation::default(),
        }
    }
}

impl EstimatorConfig {
    /// Builds the configured estimator.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] when `capacity == 0`.
    pub fn build(&self) -> Result<Box<dyn PercentileEstimator>, EstimatorError> {
        if self.capacity > 0 && self.capacity < self.percentiles.len() {
            warn!(
                capacity = self.capacity,
                percentiles = self.percentiles.len(),
                "percentile buffer is smaller than the percentile list"
            );
        }

        Ok(match self.kind {
            EstimatorKind::Bounded => Box::new(BoundedEstimator::new(
                self.percentiles.clone(),
                self.capacity,
            )?),
            EstimatorKind::Ranked => Box::new(RankedEstimator::with_interpolation(
                self.percentiles.clone(),
                self.capacity,
                self.rank_interpolation,
            )?),
        })
    }
}
