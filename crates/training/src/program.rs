use chrono::{DateTime, Utc};
use serde::Serialize;

use fittrack_core::{DomainResult, Entity, ProgramId};

use crate::validate_name;

/// A named collection of exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Program {
    type Id = ProgramId;

    fn id(&self) -> ProgramId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// The `{id, name}` pair embedded in exercise listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramSummary {
    pub id: ProgramId,
    pub name: String,
}

impl From<&Program> for ProgramSummary {
    fn from(program: &Program) -> Self {
        Self {
            id: program.id,
            name: program.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgram {
    pub name: String,
}

impl NewProgram {
    pub fn new(name: &str) -> DomainResult<Self> {
        Ok(Self {
            name: validate_name(name, "program")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramPatch {
    pub name: Option<String>,
}

impl ProgramPatch {
    pub fn new(name: Option<&str>) -> DomainResult<Self> {
        Ok(Self {
            name: name.map(|n| validate_name(n, "program")).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    pub fn apply_to(&self, program: &mut Program, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            program.name = name.clone();
        }
        program.updated_at = now;
    }
}
