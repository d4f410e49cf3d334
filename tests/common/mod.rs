//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::time::{Duration, Instant};

/// How long integration tests wait for an expected runtime message
pub fn message_timeout() -> Duration {
    Duration::from_secs(2)
}

/// A fixed base instant plus a millisecond offset, for synthetic ticking
pub fn at(base: Instant, millis: u64) -> Instant {
    base + Duration::from_millis(millis)
}
