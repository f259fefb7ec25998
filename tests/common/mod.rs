//! Shared helpers for conceptmap integration tests
//!
//! Fixture decks, graph checks and scripted collaborators.

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod graph_checks;
pub mod mock_collaborators;

pub use fixtures::{algorithms_deck, ml_lecture, notes_document, pipeline, scored_deck};
pub use graph_checks::{has_cycle, reachable_without};
pub use mock_collaborators::{RecordingJudge, ScriptedModel};
