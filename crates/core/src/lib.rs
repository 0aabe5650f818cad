//! `fittrack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod page;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ExerciseId, HistoryId, ProgramId, UserId};
pub use page::PageRequest;
