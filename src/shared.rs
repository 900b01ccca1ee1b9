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
//! Lock-guarded estimator handle for concurrent ingestion and reporting.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::snapshot::PercentileSnapshot;
use crate::{EstimatorError, PercentileEstimator, Sample};

/// Cloneable handle around one estimator.
///
/// Ingestion and [`SharedEstimator::clear`] hold the write lock for the whole
/// call, queries hold the read lock, so readers never see a partially shifted
/// or partially condensed buffer.
///
/// # Example
/// ```rust
/// use percentile_estimators::ranked::RankedEstimator;
/// use percentile_estimators::shared::SharedEstimator;
///
/// let shared = SharedEstimator::new(RankedEstimator::new("50".parse().unwrap(), 16).unwrap());
/// let writer = shared.clone();
/// std::thread::spawn(move || {
///     for count in 1_u64..=1_000 {
///         writer.add_value(count, count, 1, count);
///     }
/// })
/// .join()
/// .unwrap();
///
/// let p50 = shared.estimate(0, 1_000, 1, 1_000).unwrap();
/// assert!((p50 - 500.5).abs() < 1.0);
/// ```
#[derive(Debug)]
pub struct SharedEstimator<E> {
    inner: Arc<RwLock<E>>,
}

impl<E> Clone for SharedEstimator<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: PercentileEstimator> SharedEstimator<E> {
    /// Wraps `estimator` in a new shared handle.
    pub fn new(estimator: E) -> Self {
        Self {
            inner: Arc::new(RwLock::new(estimator)),
        }
    }

    /// Incorporates one sample under the write lock.
    pub fn add_value(&self, value: u64, count: u64, min: u64, max: u64) {
        self.inner.write().add_value(value, count, min, max);
    }

    /// Drops all retained samples under the write lock.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Returns the number of configured percentiles.
    pub fn percentile_count(&self) -> usize {
        self.inner.read().percentile_count()
    }

    /// Returns the configured percentage at `index`.
    pub fn percentage_at(&self, index: usize) -> Option<f64> {
        self.inner.read().percentage_at(index)
    }

    /// Returns the estimate for the percentile at `index` under the read lock.
    pub fn estimate(
        &self,
        index: usize,
        count: u64,
        min: u64,
        max: u64,
    ) -> Result<f64, EstimatorError> {
        self.inner.read().estimate(index, count, min, max)
    }

    /// Copies every exposed sample under a single read lock.
    pub fn samples(&self, count: u64, min: u64, max: u64) -> Vec<Sample> {
        let estimator = self.inner.read();
        (0..estimator.sample_count(count, min, max))
            .filter_map(|index| estimator.sample_at(index, count, min, max))
            .collect()
    }

    /// Builds a snapshot under a single read lock.
    pub fn snapshot(
        &self,
        count: u64,
        min: u64,
        max: u64,
        include_samples: bool,
    ) -> PercentileSnapshot {
        self.inner.read().snapshot(count, min, max, include_samples)
    }

    /// Locks the estimator for a sequence of reads.
    pub fn read(&self) -> RwLockReadGuard<'_, E> {
        self.inner.read()
    }
}
