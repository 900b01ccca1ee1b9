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
//! Operations shared by every percentile estimator.

use core::fmt;

use serde::Serialize;

use crate::snapshot::{PercentileEstimate, PercentileSnapshot};
use crate::{EstimatorError, Percentiles};

/// One retained sample exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Retained raw value.
    pub value: u64,
    /// 1-based global rank of the value, exact or estimated.
    pub rank: u64,
    /// Empirical percentile the sample stands for.
    pub percentile: f64,
}

/// Online percentile estimator fed by an external statistics aggregator.
///
/// The aggregator owns the running `count`, `min` and `max` of the stream and
/// passes them to every call. `count` includes the sample being added.
///
/// Implementations are single-writer: mutation goes through `&mut self`. Wrap
/// an estimator in [`crate::shared::SharedEstimator`] to report from other
/// threads while ingestion is running.
pub trait PercentileEstimator: fmt::Debug + Send + Sync {
    /// Returns the configured percentile list.
    fn percentiles(&self) -> &Percentiles;

    /// Returns the number of configured percentiles.
    fn percentile_count(&self) -> usize {
        self.percentiles().len()
    }

    /// Returns the configured percentage at `index`.
    fn percentage_at(&self, index: usize) -> Option<f64> {
        self.percentiles().get(index)
    }

    /// Incorporates one sample.
    fn add_value(&mut self, value: u64, count: u64, min: u64, max: u64);

    /// Returns the estimate for the percentile at `index`.
    ///
    /// Returns `Ok(NaN)` when `count == 0`.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] when `index` is not a
    /// configured percentile index.
    fn estimate(
        &self,
        index: usize,
        count: u64,
        min: u64,
        max: u64,
    ) -> Result<f64, EstimatorError>;

    /// Returns how many samples [`PercentileEstimator::sample_at`] exposes.
    fn sample_count(&self, count: u64, min: u64, max: u64) -> usize;

    /// Returns the retained sample at `index`, or `None` past the end.
    fn sample_at(&self, index: usize, count: u64, min: u64, max: u64) -> Option<Sample>;

    /// Drops all retained samples and keeps the configuration.
    fn clear(&mut self);

    /// Collects every configured estimate, and optionally the retained
    /// samples, into a serializable snapshot.
    fn snapshot(
        &self,
        count: u64,
        min: u64,
        max: u64,
        include_samples: bool,
    ) -> PercentileSnapshot {
        let percentiles = self.percentiles();
        let estimates = percentiles
            .iter()
            .enumerate()
            .map(|(index, percentage)| PercentileEstimate {
                percentage,
                label: percentiles.label(index).unwrap_or_default(),
                value: self
                    .estimate(index, count, min, max)
                    .unwrap_or(f64::NAN),
            })
            .collect();

        let samples = include_samples.then(|| {
            (0..self.sample_count(count, min, max))
                .filter_map(|index| self.sample_at(index, count, min, max))
                .collect()
        });

        PercentileSnapshot {
            count,
            min,
            max,
            estimates,
            samples,
        }
    }
}

pub(crate) fn check_index(percentiles: &Percentiles, index: usize) -> Result<f64, EstimatorError> {
    percentiles
        .get(index)
        .ok_or(EstimatorError::InvalidParameter("percentile index out of range"))
}

impl<E: PercentileEstimator + ?Sized> PercentileEstimator for Box<E> {
    fn percentiles(&self) -> &Percentiles {
        (**self).percentiles()
    }

    fn add_value(&mut self, value: u64, count: u64, min: u64, max: u64) {
        (**self).add_value(value, count, min, max);
    }

    fn estimate(
        &self,
        index: usize,
        count: u64,
        min: u64,
        max: u64,
    ) -> Result<f64, EstimatorError> {
        (**self).estimate(index, count, min, max)
    }

    fn sample_count(&self, count: u64, min: u64, max: u64) -> usize {
        (**self).sample_count(count, min, max)
    }

    fn sample_at(&self, index: usize, count: u64, min: u64, max: u64) -> Option<Sample> {
        (**self).sample_at(index, count, min, max)
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}
