//! Shared test fakes and fixtures for the Epoch turn engine.

mod clock;
mod generator;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use generator::{FailingEventGenerator, RecordingEventGenerator, two_option_event};
pub use repository::{FailingSessionRepository, PreemptingRepository};
pub use rng::SequenceRng;
