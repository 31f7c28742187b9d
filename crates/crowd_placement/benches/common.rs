use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const SAMPLES: usize = 20;
pub const WARM_UP: Duration = Duration::from_millis(800);
pub const MEASURE: Duration = Duration::from_secs(3);

pub fn placement_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLES)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASURE)
}

/// Throughput in agents or points; never zero.
pub fn per_item(items: usize) -> Throughput {
    Throughput::Elements(items.max(1) as u64)
}

pub fn seeded(salt: u64, n: usize) -> StdRng {
    StdRng::seed_from_u64(salt ^ n as u64)
}
