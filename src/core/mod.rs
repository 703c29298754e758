//! Core balance tables shared by the validator and the spawn runtime.

pub mod balance;

pub use balance::{SpawnTuning, ValidationTuning};
