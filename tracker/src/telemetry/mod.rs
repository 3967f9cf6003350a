//! Synthetic telemetry
//!
//! Monitoring samples are regenerated on every read and never stored.

pub mod source;

use std::ops::Range;

use chrono::{DateTime, Duration, Utc};
use openapi_server::MonitoringSample;
use rand::Rng;

/// Default number of hourly samples served by the monitoring endpoint
pub const DEFAULT_SAMPLE_COUNT: usize = 24;

/// Largest sample count a caller may request (one week of hours)
pub const MAX_SAMPLE_COUNT: usize = 168;

pub const CPU_RANGE: Range<u32> = 40..70;
pub const MEMORY_RANGE: Range<u32> = 45..80;
pub const REQUESTS_RANGE: Range<u32> = 100..400;
pub const ERRORS_RANGE: Range<u32> = 0..10;
pub const RESPONSE_TIME_RANGE: Range<u32> = 50..150;

/// Generate `count` samples spaced one hour apart, the last one at `now`
pub fn generate_samples<R: Rng + ?Sized>(
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<MonitoringSample> {
    (0..count)
        .rev()
        .map(|hours_ago| MonitoringSample {
            timestamp: now - Duration::hours(hours_ago as i64),
            cpu: rng.gen_range(CPU_RANGE),
            memory: rng.gen_range(MEMORY_RANGE),
            requests: rng.gen_range(REQUESTS_RANGE),
            errors: rng.gen_range(ERRORS_RANGE),
            response_time: rng.gen_range(RESPONSE_TIME_RANGE),
        })
        .collect()
}
