//! # Possessão Assessment Engine
//!
//! Scores the entity catalog against a user's yes/no answers and declared
//! demographics, producing a ranked, confidence-scored candidate list and a
//! single chosen entity.
//!
//! `rank` is pure and deterministic. `choose` adds one uniform random draw
//! among candidates tied on the top score; `choose_with` takes the random
//! source explicitly.

pub mod input;
pub mod scoring;

pub use input::AssessmentInput;
pub use scoring::{confidence_for, ScoredCandidate, ScoringEngine, ScoringWeights};
