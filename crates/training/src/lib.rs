//! Training domain: programs, exercises and completed-workout tracking.
//!
//! Pure domain logic (validation of new/patch payloads, record shapes). No IO,
//! no HTTP, no storage.

pub mod exercise;
pub mod history;
pub mod program;

pub use exercise::{Difficulty, Exercise, ExercisePatch, ExerciseWithProgram, NewExercise};
pub use history::{ExerciseHistory, ExerciseSummary, HistoryWithExercise, NewHistoryEntry};
pub use program::{NewProgram, Program, ProgramPatch, ProgramSummary};

use fittrack_core::{DomainError, DomainResult};

/// Longest accepted name for programs and exercises.
pub const MAX_NAME_LEN: usize = 255;

pub(crate) fn validate_name(raw: &str, what: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{what} name cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{what} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
