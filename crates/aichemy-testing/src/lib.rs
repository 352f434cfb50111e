//! Testing infrastructure for aichemy integration tests.
//!
//! - `TestWorld`: isolated data directory plus CLI execution
//! - `transport`: scripted agent transport that records requests
//! - `store`: in-memory project store that records every save
//! - `fixtures`: canned event scripts and projects
//! - `assertions`: checks over the CLI's JSON output

pub mod assertions;
pub mod fixtures;
pub mod store;
pub mod transport;
pub mod world;

pub use store::RecordingStore;
pub use transport::FakeTransport;
pub use world::TestWorld;
