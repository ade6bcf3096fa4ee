//! # Colloquy Testing
//!
//! Test doubles for the Colloquy runtime, chiefly scripted model
//! backends so orchestration behavior can be exercised without a real
//! language model.

pub mod router;
pub mod scripted;

pub use router::InMemoryRouter;
pub use scripted::{GenerationCall, ScriptedBackend, StaticBackend};
