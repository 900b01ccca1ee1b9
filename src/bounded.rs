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
//! Bounded-buffer percentile estimator.
//!
//! Keeps the first `capacity` samples of the stream in a sorted array and
//! interpolates over them. Once the buffer is full the estimates freeze.

use tracing::debug;

use crate::estimator::{PercentileEstimator, Sample, check_index};
use crate::{EstimatorError, Percentiles, interpolate_sorted};

/// Percentile estimator over the first `capacity` samples of a stream.
///
/// Cheap and exact while the stream is shorter than `capacity`; afterwards
/// every estimate reflects only the retained prefix of the stream.
///
/// # Example
/// ```rust
/// use percentile_estimators::bounded::BoundedEstimator;
/// use percentile_estimators::{PercentileEstimator, Percentiles};
///
/// let percentiles = Percentiles::new(vec![0.0, 50.0, 100.0]).unwrap();
/// let mut estimator = BoundedEstimator::new(percentiles, 5).unwrap();
/// for (count, value) in (1_u64..=5).enumerate() {
///     estimator.add_value(value, count as u64 + 1, 1, value);
/// }
///
/// assert_eq!(estimator.estimate(1, 5, 1, 5).unwrap(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedEstimator {
    percentiles: Percentiles,
    values: Box<[u64]>,
}

impl BoundedEstimator {
    /// Creates an estimator retaining at most `capacity` samples.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] when `capacity == 0`.
    pub fn new(percentiles: Percentiles, capacity: usize) -> Result<Self, EstimatorError> {
        if capacity == 0 {
            return Err(EstimatorError::InvalidParameter(
                "capacity must be greater than zero",
            ));
        }

        debug!(
            capacity,
            percentiles = percentiles.len(),
            "created bounded percentile estimator"
        );
        Ok(Self {
            percentiles,
            values: vec![0; capacity].into_boxed_slice(),
        })
    }

    /// Returns the configured buffer capacity.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Returns the retained, ascending samples for a stream of `count` samples.
    pub fn retained(&self, count: u64) -> &[u64] {
        &self.values[..self.occupied(count)]
    }

    fn occupied(&self, count: u64) -> usize {
        usize::try_from(count).map_or(self.capacity(), |count| count.min(self.capacity()))
    }
}

impl PercentileEstimator for BoundedEstimator {
    fn percentiles(&self) -> &Percentiles {
        &self.percentiles
    }

    fn add_value(&mut self, value: u64, count: u64, _min: u64, _max: u64) {
        if count == 0 || count > self.capacity() as u64 {
            return;
        }

        let mut slot = count as usize - 1;
        while slot > 0 && self.values[slot - 1] > value {
            self.values[slot] = self.values[slot - 1];
            slot -= 1;
        }
        self.values[slot] = value;

        if count == self.capacity() as u64 {
            debug!(
                capacity = self.capacity(),
                "bounded estimator buffer full, estimates frozen"
            );
        }
    }

    fn estimate(
        &self,
        index: usize,
        count: u64,
        _min: u64,
        _max: u64,
    ) -> Result<f64, EstimatorError> {
        let percentage = check_index(&self.percentiles, index)?;
        Ok(interpolate_sorted(self.retained(count), percentage))
    }

    fn sample_count(&self, count: u64, _min: u64, _max: u64) -> usize {
        self.occupied(count)
    }

    fn sample_at(&self, index: usize, count: u64, _min: u64, _max: u64) -> Option<Sample> {
        let value = *self.retained(count).get(index)?;
        Some(Sample {
            value,
            rank: index as u64 + 1,
            percentile: 100.0 * index as f64 / self.capacity() as f64,
        })
    }

    fn clear(&mut self) {
        self.values.fill(0);
    }
}
