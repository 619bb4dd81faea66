//! Shared helpers for integration tests

pub mod fake_staging;
pub mod fixtures;
pub mod mock_platform;

pub use fake_staging::{FakeStaging, StagingCall};
pub use fixtures::*;
pub use mock_platform::{CreatePrCall, MockPlatformService};
