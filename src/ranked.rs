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
//! Adaptive rank percentile estimator.
//!
//! Keeps a fixed-size sorted buffer of sample values together with an
//! estimated global rank for each of them. When the buffer is full, every
//! second entry is dropped ("condensation"), so memory stays bounded while the
//! retained entries keep spanning the whole stream. Estimates interpolate over
//! `(rank, value)` pairs, bracketed by the stream minimum (rank `1`) and
//! maximum (rank `count`).

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::estimator::{PercentileEstimator, Sample, check_index};
use crate::{EstimatorError, Percentiles, lerp, virtual_position};

/// Arithmetic used to place a new sample's rank between its neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankInterpolation {
    /// Integer division, truncating toward the lower neighbor.
    #[default]
    Truncating,
    /// Floating-point division rounded to the nearest rank.
    Fractional,
}

/// Percentile estimator that tracks an unbounded stream in fixed memory.
///
/// The caller still owns the running count, minimum and maximum. The
/// estimator additionally remembers the extremes seen on the previous call,
/// seeded by the first two samples, so that a sample which becomes the new
/// minimum or maximum can retain the displaced extreme. Ingestion therefore
/// behaves the same whether the caller folds the new sample into `min`/`max`
/// before or after calling [`PercentileEstimator::add_value`]. Estimates and
/// boundary samples use the `min`/`max` passed to each query.
///
/// # Example
/// ```rust
/// use percentile_estimators::ranked::RankedEstimator;
/// use percentile_estimators::{PercentileEstimator, Percentiles};
///
/// let percentiles = Percentiles::new(vec![50.0, 90.0]).unwrap();
/// let mut estimator = RankedEstimator::new(percentiles, 32).unwrap();
/// for count in 1_u64..=10_000 {
///     estimator.add_value(count, count, 1, count);
/// }
///
/// let p90 = estimator.estimate(1, 10_000, 1, 10_000).unwrap();
/// assert!(p90 > 8_500.0 && p90 < 9_500.0);
/// ```
#[derive(Debug, Clone)]
pub struct RankedEstimator {
    percentiles: Percentiles,
    values: Box<[u64]>,
    ranks: Box<[u64]>,
    occupied: usize,
    // Stream extremes as of the previous sample; a displaced extreme becomes
    // a retained entry.
    low: Option<u64>,
    high: Option<u64>,
    interpolation: RankInterpolation,
}

impl RankedEstimator {
    /// Creates an estimator retaining at most `capacity` ranked samples.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] when `capacity == 0`.
    pub fn new(percentiles: Percentiles, capacity: usize) -> Result<Self, EstimatorError> {
        Self::with_interpolation(percentiles, capacity, RankInterpolation::default())
    }

    /// Creates an estimator with an explicit rank interpolation mode.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] when `capacity == 0`.
    pub fn with_interpolation(
        percentiles: Percentiles,
        capacity: usize,
        interpolation: RankInterpolation,
    ) -> Result<Self, EstimatorError> {
        if capacity == 0 {
            return Err(EstimatorError::InvalidParameter(
                "capacity must be greater than zero",
            ));
        }

        debug!(
            capacity,
            percentiles = percentiles.len(),
            ?interpolation,
            "created ranked percentile estimator"
        );
        Ok(Self {
            percentiles,
            values: vec![0; capacity].into_boxed_slice(),
            ranks: vec![0; capacity].into_boxed_slice(),
            occupied: 0,
            low: None,
            high: None,
            interpolation,
        })
    }

    /// Returns the configured buffer capacity.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Returns the number of retained entries.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Returns the configured rank interpolation mode.
    pub fn interpolation(&self) -> RankInterpolation {
        self.interpolation
    }

    /// Iterates over the retained `(value, rank)` pairs in ascending order.
    pub fn retained(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.values[..self.occupied]
            .iter()
            .copied()
            .zip(self.ranks[..self.occupied].iter().copied())
    }

    /// Keeps every second entry, halving the buffer.
    fn condense(&mut self, count: u64) {
        let before = self.occupied;
        for index in 0..self.occupied / 2 {
            self.values[index] = self.values[2 * index + 1];
            self.ranks[index] = self.ranks[2 * index + 1];
        }
        self.occupied /= 2;
        trace!(before, after = self.occupied, count, "condensed ranked estimator");
    }

    /// Shifts retained entries above `value` (all of them for `None`) one slot
    /// right, raising each shifted rank by one. Returns the freed slot.
    fn open_slot(&mut self, value: Option<u64>) -> usize {
        let mut slot = self.occupied;
        while slot > 0 && value.is_none_or(|value| self.values[slot - 1] > value) {
            self.values[slot] = self.values[slot - 1];
            self.ranks[slot] = self.ranks[slot - 1] + 1;
            slot -= 1;
        }
        slot
    }

    fn interpolate_rank(&self, value: u64, before: (u64, u64), after: (u64, u64)) -> u64 {
        let (rank_before, value_before) = before;
        let (rank_after, value_after) = after;
        let lowest = rank_before + 1;
        // Only reachable with inconsistent caller input: a mid-range insert
        // always sits strictly below its right neighbor.
        if value_after <= value_before {
            return lowest;
        }

        let gap = rank_after.saturating_sub(lowest);
        let offset = value.saturating_sub(value_before);
        let span = value_after - value_before;
        match self.interpolation {
            RankInterpolation::Truncating => {
                lowest + (u128::from(gap) * u128::from(offset) / u128::from(span)) as u64
            }
            RankInterpolation::Fractional => {
                let step = (gap as f64 * offset as f64 / span as f64).round() as u64;
                (lowest + step).clamp(lowest, lowest.max(rank_after.saturating_sub(1)))
            }
        }
    }
}

impl PercentileEstimator for RankedEstimator {
    fn percentiles(&self) -> &Percentiles {
        &self.percentiles
    }

    fn add_value(&mut self, value: u64, count: u64, min: u64, max: u64) {
        match count {
            0 => return,
            1 => {
                self.low = Some(value);
                self.high = Some(value);
                return;
            }
            2 => {
                self.low = Some(self.low.map_or(value, |low| low.min(value)));
                self.high = Some(self.high.map_or(value, |high| high.max(value)));
                return;
            }
            _ => {}
        }

        let low = self.low.unwrap_or(min);
        let high = self.high.unwrap_or(max);
        if self.occupied == self.capacity() {
            self.condense(count);
        }

        if value <= low {
            let slot = self.open_slot(None);
            self.values[slot] = low;
            self.ranks[slot] = 2;
            self.low = Some(value);
        } else if value >= high {
            let slot = self.occupied;
            self.values[slot] = high;
            self.ranks[slot] = count - 1;
            self.high = Some(value);
        } else {
            let slot = self.open_slot(Some(value));
            let before = if slot > 0 {
                (self.ranks[slot - 1], self.values[slot - 1])
            } else {
                (1, low)
            };
            let after = if slot < self.occupied {
                (self.ranks[slot + 1], self.values[slot + 1])
            } else {
                (count, high)
            };
            self.values[slot] = value;
            self.ranks[slot] = self.interpolate_rank(value, before, after);
        }
        self.occupied += 1;
    }

    fn estimate(
        &self,
        index: usize,
        count: u64,
        min: u64,
        max: u64,
    ) -> Result<f64, EstimatorError> {
        let percentage = check_index(&self.percentiles, index)?;
        if count == 0 {
            return Ok(f64::NAN);
        }

        let (position, _) = virtual_position(count, percentage);
        if position <= 0 {
            return Ok(min as f64);
        }

        // Anchor 0 is the minimum, anchor `occupied + 1` the maximum.
        let last = self.occupied + 1;
        let anchor = |index: usize| -> (u64, u64) {
            match index {
                0 => (1, min),
                index if index == last => (count, max),
                index => (self.ranks[index - 1], self.values[index - 1]),
            }
        };

        let mut before = last;
        while before > 0 && 2 * anchor(before).0 as i64 - 1 > position {
            before -= 1;
        }
        let (rank_before, value_before) = anchor(before);
        let (rank_after, value_after) = anchor((before + 1).min(last));

        let fraction = if rank_after == rank_before {
            1.0
        } else {
            let numerator = count as f64 * percentage - (2 * rank_before - 1) as f64 * 50.0;
            let denominator = 100.0 * (rank_after as f64 - rank_before as f64);
            (numerator / denominator).clamp(0.0, 1.0)
        };
        Ok(lerp(value_before as f64, value_after as f64, fraction))
    }

    fn sample_count(&self, count: u64, _min: u64, _max: u64) -> usize {
        match count {
            0 => 0,
            1 => 1,
            _ => self.occupied + 2,
        }
    }

    fn sample_at(&self, index: usize, count: u64, min: u64, max: u64) -> Option<Sample> {
        let total = self.sample_count(count, min, max);
        if index >= total {
            return None;
        }

        let (value, rank) = if index == 0 {
            (min, 1)
        } else if index == total - 1 {
            (max, count)
        } else {
            (self.values[index - 1], self.ranks[index - 1])
        };
        Some(Sample {
            value,
            rank,
            percentile: (100.0 * rank as f64 - 50.0) / count as f64,
        })
    }

    fn clear(&mut self) {
        self.values.fill(0);
        self.ranks.fill(0);
        self.occupied = 0;
        self.low = None;
        self.high = None;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{RankInterpolation, RankedEstimator};
    use crate::bounded::BoundedEstimator;
    use crate::{PercentileEstimator, Percentiles};

    fn estimator(percentiles: &[f64], capacity: usize) -> RankedEstimator {
        RankedEstimator::new(Percentiles::new(percentiles.to_vec()).unwrap(), capacity).unwrap()
    }

    fn feed(estimator: &mut impl PercentileEstimator, values: &[u64]) -> (u64, u64, u64) {
        let mut stats = (0, u64::MAX, 0);
        for &value in values {
            stats.0 += 1;
            stats.1 = stats.1.min(value);
            stats.2 = stats.2.max(value);
            estimator.add_value(value, stats.0, stats.1, stats.2);
        }
        stats
    }

    fn estimates(estimator: &impl PercentileEstimator, stats: (u64, u64, u64)) -> Vec<f64> {
        (0..estimator.percentile_count())
            .map(|index| estimator.estimate(index, stats.0, stats.1, stats.2).unwrap())
            .collect()
    }

    #[test]
    fn constructor_validates_capacity() {
        let percentiles = Percentiles::new(vec![50.0]).unwrap();
        assert!(RankedEstimator::new(percentiles.clone(), 0).is_err());
        assert!(RankedEstimator::new(percentiles, 1).is_ok());
    }

    #[test]
    fn ignores_first_two_samples() {
        let mut est = estimator(&[50.0], 4);
        feed(&mut est, &[10, 20]);
        assert_eq!(est.occupied(), 0);
        assert_eq!(est.estimate(0, 2, 10, 20).unwrap(), 15.0);
    }

    #[test]
    fn median_survives_repeated_condensation() {
        let mut est = estimator(&[50.0], 4);
        let stream: Vec<u64> = (1..=1_000).collect();
        let stats = feed(&mut est, &stream);
        assert!(est.occupied() <= 4);

        let p50 = est.estimate(0, stats.0, stats.1, stats.2).unwrap();
        assert!((p50 - 500.5).abs() / 500.5 < 0.05, "p50={p50}");
    }

    #[test]
    fn tracks_a_shuffled_stream() {
        let mut est = estimator(&[10.0, 50.0, 90.0, 99.0], 64);
        let stream: Vec<u64> = (0..10_000_u64).map(|i| (i * 7_919) % 10_000 + 1).collect();
        let stats = feed(&mut est, &stream);

        let found = estimates(&est, stats);
        for (estimate, expected) in found.iter().zip([1_000.0, 5_000.0, 9_000.0, 9_900.0]) {
            assert!(
                (estimate - expected).abs() / expected < 0.05,
                "estimate={estimate} expected={expected}"
            );
        }
    }

    #[test]
    fn extremes_come_from_running_min_and_max() {
        let mut est = estimator(&[0.0, 100.0], 8);
        let stats = feed(&mut est, &[40, 7, 93, 12, 55, 61, 3, 70]);
        assert_eq!(estimates(&est, stats), vec![3.0, 93.0]);
    }

    #[test]
    fn constant_stream_estimates_the_constant() {
        let mut est = estimator(&[1.0, 50.0, 99.0], 4);
        let stats = feed(&mut est, &[7; 100]);
        assert_eq!(estimates(&est, stats), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn empty_stream_is_nan() {
        let est = estimator(&[50.0], 4);
        assert!(est.estimate(0, 0, 0, 0).unwrap().is_nan());
        assert!(est.estimate(3, 0, 0, 0).is_err());
    }

    #[test]
    fn keeps_adapting_where_bounded_freezes() {
        let percentiles = Percentiles::new(vec![50.0, 90.0]).unwrap();
        let mut ranked = RankedEstimator::new(percentiles.clone(), 10).unwrap();
        let mut bounded = BoundedEstimator::new(percentiles, 10).unwrap();

        let warmup: Vec<u64> = (1..=10).collect();
        let stats = feed(&mut ranked, &warmup);
        feed(&mut bounded, &warmup);
        let ranked_before = estimates(&ranked, stats);
        let bounded_before = estimates(&bounded, stats);

        let stream: Vec<u64> = (1..=10).chain(1_000..1_050).collect();
        let mut ranked = RankedEstimator::new(ranked.percentiles().clone(), 10).unwrap();
        let mut bounded = BoundedEstimator::new(bounded.percentiles().clone(), 10).unwrap();
        let stats = feed(&mut ranked, &stream);
        feed(&mut bounded, &stream);

        assert_eq!(estimates(&bounded, stats), bounded_before);
        assert_ne!(estimates(&ranked, stats), ranked_before);
    }

    #[test]
    fn clear_then_replay_matches_fresh_instance() {
        let stream: Vec<u64> = (0..500_u64).map(|i| (i * 37) % 211).collect();
        let mut fresh = estimator(&[25.0, 50.0, 95.0], 16);
        let stats = feed(&mut fresh, &stream);

        let mut reused = estimator(&[25.0, 50.0, 95.0], 16);
        feed(&mut reused, &[900, 5, 800, 1, 700, 3]);
        reused.clear();
        assert_eq!(reused.occupied(), 0);
        feed(&mut reused, &stream);

        assert_eq!(estimates(&fresh, stats), estimates(&reused, stats));
    }

    #[test]
    fn sample_access_never_goes_out_of_bounds() {
        let capacity = 6;
        let mut est = estimator(&[50.0], capacity);
        let stream: Vec<u64> = (0..40_u64).map(|i| (i * 13) % 29).collect();
        feed(&mut est, &stream);

        for count in [0, 1, 2, capacity as u64, capacity as u64 + 1, capacity as u64 * 3] {
            let samples = est.sample_count(count, 0, 28);
            assert!(samples <= capacity + 2);
            for index in 0..samples {
                assert!(est.sample_at(index, count, 0, 28).is_some());
            }
            assert!(est.sample_at(samples, count, 0, 28).is_none());
        }
    }

    #[test]
    fn samples_include_boundaries() {
        let mut est = estimator(&[50.0], 8);
        let stats = feed(&mut est, &[10, 20, 30, 40]);
        let (count, min, max) = stats;

        assert_eq!(est.sample_count(count, min, max), est.occupied() + 2);
        let first = est.sample_at(0, count, min, max).unwrap();
        assert_eq!((first.value, first.rank), (10, 1));
        assert_eq!(first.percentile, 12.5);

        let last = est.sample_at(est.occupied() + 1, count, min, max).unwrap();
        assert_eq!((last.value, last.rank), (40, 4));
        assert_eq!(last.percentile, 87.5);

        let retained: Vec<(u64, u64)> = est.retained().collect();
        assert_eq!(retained, vec![(20, 2), (30, 3)]);
    }

    #[test]
    fn rank_interpolation_modes_differ_on_wide_gaps() {
        let stream = [0, 1_000, 1_000, 1_000, 1_000, 1_000, 700];
        let percentiles = Percentiles::new(vec![50.0]).unwrap();

        let mut truncating = RankedEstimator::new(percentiles.clone(), 2).unwrap();
        let mut fractional =
            RankedEstimator::with_interpolation(percentiles, 2, RankInterpolation::Fractional)
                .unwrap();
        let (count, min, max) = feed(&mut truncating, &stream);
        feed(&mut fractional, &stream);

        // Neighbors (1, 0) and (6, 1000): 2 + 4 * 700 / 1000.
        assert_eq!(truncating.retained().collect::<Vec<_>>(), vec![(700, 4), (1_000, 6)]);
        assert_eq!(fractional.retained().collect::<Vec<_>>(), vec![(700, 5), (1_000, 6)]);
        assert_eq!(truncating.sample_at(1, count, min, max).unwrap().rank, 4);
        assert_eq!(fractional.interpolation(), RankInterpolation::Fractional);
    }

    #[test]
    fn ingestion_is_independent_of_extreme_update_order() {
        let stream: Vec<u64> = (0..2_000_u64).map(|i| (i * 7_919) % 1_009).collect();
        let mut folded_first = estimator(&[5.0, 50.0, 95.0], 16);
        let mut folded_after = estimator(&[5.0, 50.0, 95.0], 16);

        let stats = feed(&mut folded_first, &stream);
        let (mut min, mut max) = (stream[0], stream[0]);
        for (index, &value) in stream.iter().enumerate() {
            folded_after.add_value(value, index as u64 + 1, min, max);
            min = min.min(value);
            max = max.max(value);
        }

        assert_eq!(
            folded_first.retained().collect::<Vec<_>>(),
            folded_after.retained().collect::<Vec<_>>()
        );
        assert_eq!(estimates(&folded_first, stats), estimates(&folded_after, stats));
    }

    #[test]
    fn equal_or_inverted_neighbors_take_next_rank() {
        for mode in [RankInterpolation::Truncating, RankInterpolation::Fractional] {
            let est = RankedEstimator::with_interpolation(
                Percentiles::new(vec![50.0]).unwrap(),
                4,
                mode,
            )
            .unwrap();
            assert_eq!(est.interpolate_rank(50, (3, 50), (9, 50)), 4, "{mode:?}");
            assert_eq!(est.interpolate_rank(50, (3, 60), (9, 40)), 4, "{mode:?}");
            assert_eq!(est.interpolate_rank(70, (3, 60), (9, 40)), 4, "{mode:?}");
        }
    }

    proptest! {
        #[test]
        fn estimates_are_monotonic_and_bounded(
            stream in proptest::collection::vec(0_u64..10_000, 1..256),
            capacity in 1_usize..32,
            fractional in any::<bool>(),
        ) {
            let percentages = [0.0, 1.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0, 99.5, 100.0];
            let mode = if fractional {
                RankInterpolation::Fractional
            } else {
                RankInterpolation::Truncating
            };
            let mut est = RankedEstimator::with_interpolation(
                Percentiles::new(percentages.to_vec()).unwrap(),
                capacity,
                mode,
            )
            .unwrap();
            let stats = feed(&mut est, &stream);

            let found = estimates(&est, stats);
            prop_assert_eq!(found[0], stats.1 as f64);
            prop_assert_eq!(found[found.len() - 1], stats.2 as f64);
            for pair in found.windows(2) {
                prop_assert!(pair[0] <= pair[1], "{found:?}");
            }
            prop_assert_eq!(&found, &estimates(&est, stats));

            let ranks: Vec<u64> = est.retained().map(|(_, rank)| rank).collect();
            for pair in ranks.windows(2) {
                prop_assert!(pair[0] <= pair[1], "{ranks:?}");
            }
            prop_assert!(ranks.iter().all(|&rank| rank >= 2 && rank <= stats.0));
        }
    }
}
