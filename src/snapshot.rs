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
//! Serializable view of an estimator's state for reporting.

use serde::Serialize;

use crate::Sample;

/// Estimate for one configured percentile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileEstimate {
    /// Configured percentage in `[0, 100]`.
    pub percentage: f64,
    /// `p` followed by the percentage, e.g. `p99.5`.
    pub label: String,
    /// NaN for an empty stream; serialized as `null` by JSON encoders.
    pub value: f64,
}

/// Per-percentile estimates plus, optionally, the raw retained samples.
///
/// # Example
/// ```rust
/// use percentile_estimators::bounded::BoundedEstimator;
/// use percentile_estimators::{PercentileEstimator, Percentiles};
///
/// let mut estimator = BoundedEstimator::new("50,90".parse().unwrap(), 16).unwrap();
/// for count in 1_u64..=10 {
///     estimator.add_value(count * 10, count, 10, count * 10);
/// }
///
/// let snapshot = estimator.snapshot(10, 10, 100, false);
/// assert_eq!(snapshot.estimates[0].label, "p50");
/// assert_eq!(snapshot.get("p50"), Some(55.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSnapshot {
    /// Running sample count the snapshot was taken at.
    pub count: u64,
    /// Running minimum passed by the caller.
    pub min: u64,
    /// Running maximum passed by the caller.
    pub max: u64,
    /// One estimate per configured percentile, in index order.
    pub estimates: Vec<PercentileEstimate>,
    /// Exposed samples, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<Sample>>,
}

impl PercentileSnapshot {
    /// Looks up an estimate by its label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.estimates
            .iter()
            .find(|estimate| estimate.label == label)
            .map(|estimate| estimate.value)
    }
}
