//! Infrastructure layer: persistence for users, the training catalog and
//! workout history.

pub mod db;
pub mod store;

pub use store::in_memory::InMemoryStore;
pub use store::postgres::PostgresStore;
pub use store::query::ExerciseFilter;
pub use store::{
    ExerciseStore, FitnessStore, HistoryStore, ProgramDeletion, ProgramStore, StoreError, UserStore,
};
