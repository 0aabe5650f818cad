//! Record store abstraction.
//!
//! One trait per resource, plus the umbrella `FitnessStore` the HTTP layer
//! holds as `Arc<dyn FitnessStore>`. All reads exclude soft-deleted rows.

pub mod in_memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use thiserror::Error;

use fittrack_auth::{NewUser, UserAccount, UserPatch};
use fittrack_core::{ExerciseId, HistoryId, ProgramId, UserId};
use fittrack_training::{
    Exercise, ExerciseHistory, ExercisePatch, ExerciseWithProgram, HistoryWithExercise, NewExercise,
    NewHistoryEntry, NewProgram, Program, ProgramPatch,
};

use self::query::ExerciseFilter;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was hit (e.g. email already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced record does not exist or is deleted.
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Outcome of a cascading program delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramDeletion {
    pub exercises_deleted: u64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError>;

    /// `Ok(None)` if no live user has this id.
    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<Option<UserAccount>, StoreError>;
}

#[async_trait]
pub trait ProgramStore: Send + Sync {
    async fn create_program(&self, new_program: NewProgram) -> Result<Program, StoreError>;

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError>;

    async fn find_program(&self, id: ProgramId) -> Result<Option<Program>, StoreError>;

    async fn update_program(&self, id: ProgramId, patch: &ProgramPatch) -> Result<Option<Program>, StoreError>;

    /// Soft-delete the program and all of its live exercises atomically.
    ///
    /// `Ok(None)` if there was no live program to delete.
    async fn delete_program(&self, id: ProgramId) -> Result<Option<ProgramDeletion>, StoreError>;
}

#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// Fails with `MissingReference` unless the program exists and is live.
    async fn create_exercise(&self, new_exercise: NewExercise) -> Result<Exercise, StoreError>;

    /// Ordered by id.
    async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<ExerciseWithProgram>, StoreError>;

    async fn update_exercise(&self, id: ExerciseId, patch: &ExercisePatch) -> Result<Option<Exercise>, StoreError>;

    /// `false` if there was no live exercise to delete.
    async fn delete_exercise(&self, id: ExerciseId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fails with `MissingReference` unless the exercise is live and the user exists.
    async fn create_history(&self, entry: NewHistoryEntry) -> Result<ExerciseHistory, StoreError>;

    /// The user's live entries, newest completion first.
    async fn list_history_for_user(&self, user_id: UserId) -> Result<Vec<HistoryWithExercise>, StoreError>;

    /// Delete only if `id` belongs to `user_id`. `false` otherwise, row untouched.
    async fn delete_history_owned(&self, id: HistoryId, user_id: UserId) -> Result<bool, StoreError>;
}

/// Everything the HTTP layer needs from persistence.
pub trait FitnessStore: UserStore + ProgramStore + ExerciseStore + HistoryStore {}

impl<T> FitnessStore for T where T: UserStore + ProgramStore + ExerciseStore + HistoryStore {}
