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
//! Bounded-memory online percentile estimators.
//!
//! The crate estimates latency/duration percentiles (p50, p90, p99, ...) from
//! a stream of non-negative integer measurements without retaining the full
//! sample history. The caller owns the running count, minimum and maximum of
//! the stream and passes them on every call.
//!
//! The crate currently exposes:
//! - [`bounded::BoundedEstimator`], which keeps the first `capacity` samples
//!   and freezes once its buffer is full.
//! - [`ranked::RankedEstimator`], which tracks the whole stream by keeping an
//!   estimated global rank per retained sample and condensing its buffer.
//! - [`shared::SharedEstimator`] for lock-guarded access from several threads.
//! - [`config::EstimatorConfig`] for building an estimator from configuration.
//! - [`snapshot::PercentileSnapshot`] for diagnostic export.

use thiserror::Error;

pub mod bounded;
pub mod config;
pub mod estimator;
pub mod percentiles;
pub mod ranked;
pub mod shared;
pub mod snapshot;

pub use estimator::{PercentileEstimator, Sample};
pub use percentiles::Percentiles;

/// Errors returned by estimator constructors and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// Returned when a constructor or query receives an invalid argument.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// Returned when a percentile token cannot be parsed or is out of range.
    #[error("invalid percentile: {0}")]
    InvalidPercentile(String),
}

/// Maps `percentage` onto the doubled position axis of `count` entries.
///
/// Entry `i` (0-based) sits at virtual position `2i + 1`, so `0..=100` spans
/// `0..=2 * count`. The returned position is forced odd by stepping down one
/// when the truncated position is even. The second value is the exact scaled
/// coordinate `count * percentage / 50`.
pub(crate) fn virtual_position(count: u64, percentage: f64) -> (i64, f64) {
    let scaled = count as f64 * percentage / 50.0;
    let mut position = scaled.floor() as i64;
    if position % 2 == 0 {
        position -= 1;
    }
    (position, scaled)
}

/// Interpolates the percentile at `percentage` over an ascending slice.
///
/// Returns NaN for an empty slice.
pub(crate) fn interpolate_sorted(values: &[u64], percentage: f64) -> f64 {
    let len = values.len();
    if len == 0 {
        return f64::NAN;
    }

    let (position, scaled) = virtual_position(len as u64, percentage);
    if position <= 0 {
        return values[0] as f64;
    }
    if position >= 2 * len as i64 - 1 {
        return values[len - 1] as f64;
    }

    let fraction = (scaled - position as f64) / 2.0;
    let before = values[((position - 1) / 2) as usize] as f64;
    let after = values[((position + 1) / 2) as usize] as f64;
    lerp(before, after, fraction)
}

pub(crate) fn lerp(before: f64, after: f64, fraction: f64) -> f64 {
    before + (after - before) * fraction
}

#[cfg(test)]
mod tests {
    use super::{interpolate_sorted, virtual_position};

    #[test]
    fn virtual_position_is_always_odd() {
        for count in 1_u64..20 {
            for percentage in [0.0, 10.0, 25.0, 50.0, 62.5, 90.0, 99.5, 100.0] {
                let (position, _) = virtual_position(count, percentage);
                assert_eq!(position.rem_euclid(2), 1, "count={count} p={percentage}");
            }
        }
    }

    #[test]
    fn interpolation_hits_stored_samples() {
        let values = [1_u64, 2, 3, 4, 5];
        assert_eq!(interpolate_sorted(&values, 0.0), 1.0);
        assert_eq!(interpolate_sorted(&values, 50.0), 3.0);
        assert_eq!(interpolate_sorted(&values, 100.0), 5.0);
    }

    #[test]
    fn interpolation_between_neighbors() {
        // n=4, p=50: scaled=4, position forced to 3, fraction 0.5.
        let values = [10_u64, 20, 30, 40];
        assert_eq!(interpolate_sorted(&values, 50.0), 25.0);
    }

    #[test]
    fn empty_slice_is_nan() {
        assert!(interpolate_sorted(&[], 50.0).is_nan());
    }
}
