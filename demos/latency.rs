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
use percentile_estimators::PercentileEstimator;
use percentile_estimators::config::{EstimatorConfig, EstimatorKind};
use tracing_subscriber::EnvFilter;

/// Running count/min/max, owned by the caller rather than the estimator.
struct DurationStats {
    count: u64,
    min: u64,
    max: u64,
    estimator: Box<dyn PercentileEstimator>,
}

impl DurationStats {
    fn new(estimator: Box<dyn PercentileEstimator>) -> Self {
        Self {
            count: 0,
            min: u64::MAX,
            max: 0,
            estimator,
        }
    }

    fn record(&mut self, value: u64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.estimator
            .add_value(value, self.count, self.min, self.max);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut bounded = DurationStats::new(
        EstimatorConfig {
            kind: EstimatorKind::Bounded,
            percentiles: "50,90,95,98,99,99.5".parse()?,
            capacity: 100,
            ..EstimatorConfig::default()
        }
        .build()?,
    );
    let mut ranked = DurationStats::new(
        EstimatorConfig {
            kind: EstimatorKind::Ranked,
            percentiles: "50,90,95,98,99,99.5".parse()?,
            capacity: 100,
            ..EstimatorConfig::default()
        }
        .build()?,
    );

    // Synthetic request latencies in milliseconds: a warm-up phase followed
    // by a long, slower tail the bounded estimator never sees.
    let mut state = 0x2545_F491_4F6C_DD1D_u64;
    for request in 0_u64..200_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let base = if request < 1_000 { 5 } else { 20 };
        let latency_ms = base + state % 100 + if state % 97 == 0 { 900 } else { 0 };
        bounded.record(latency_ms);
        ranked.record(latency_ms);
    }

    for (name, stats) in [("bounded", &bounded), ("ranked", &ranked)] {
        println!("{name}:");
        for index in 0..stats.estimator.percentile_count() {
            let percentage = stats.estimator.percentage_at(index).unwrap_or(f64::NAN);
            let estimate = stats
                .estimator
                .estimate(index, stats.count, stats.min, stats.max)?;
            println!("  p{percentage:<5} {estimate:>8.2} ms");
        }
    }

    let snapshot = ranked
        .estimator
        .snapshot(ranked.count, ranked.min, ranked.max, true);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
