use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fittrack_core::{DomainError, DomainResult, Entity, ExerciseId, ProgramId};

use crate::{validate_name, ProgramSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            _ => Err(DomainError::validation("difficulty must be one of: EASY, MEDIUM, HARD")),
        }
    }
}

impl core::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exercise belonging to exactly one program. `program_id` never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "programID")]
    pub program_id: ProgramId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Exercise {
    type Id = ExerciseId;

    fn id(&self) -> ExerciseId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Listing row: an exercise with its owning program embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseWithProgram {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub program: ProgramSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub difficulty: Option<Difficulty>,
    pub program_id: ProgramId,
}

impl NewExercise {
    pub fn new(name: &str, difficulty: Option<Difficulty>, program_id: ProgramId) -> DomainResult<Self> {
        Ok(Self {
            name: validate_name(name, "exercise")?,
            difficulty,
            program_id,
        })
    }
}

/// Mutable exercise attributes. The owning program is not among them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl ExercisePatch {
    pub fn new(name: Option<&str>, difficulty: Option<Difficulty>) -> DomainResult<Self> {
        Ok(Self {
            name: name.map(|n| validate_name(n, "exercise")).transpose()?,
            difficulty,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.difficulty.is_none()
    }

    pub fn apply_to(&self, exercise: &mut Exercise, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            exercise.name = name.clone();
        }
        if let Some(difficulty) = self.difficulty {
            exercise.difficulty = Some(difficulty);
        }
        exercise.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn exercise() -> Exercise {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        Exercise {
            id: ExerciseId::new(10),
            name: "Squat".into(),
            difficulty: None,
            program_id: ProgramId::new(2),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn new_exercise_requires_name() {
        assert!(NewExercise::new(" ", None, ProgramId::new(1)).is_err());
        let ok = NewExercise::new("Deadlift", Some(Difficulty::Hard), ProgramId::new(1)).unwrap();
        assert_eq!(ok.name, "Deadlift");
    }

    #[test]
    fn patch_keeps_program() {
        let mut ex = exercise();
        let patch = ExercisePatch::new(Some("Front squat"), Some(Difficulty::Medium)).unwrap();
        assert!(!patch.is_empty());
        patch.apply_to(&mut ex, Utc::now());
        assert_eq!(ex.name, "Front squat");
        assert_eq!(ex.difficulty, Some(Difficulty::Medium));
        assert_eq!(ex.program_id, ProgramId::new(2));
    }

    #[test]
    fn listing_embeds_program() {
        let row = ExerciseWithProgram {
            exercise: exercise(),
            program: ProgramSummary {
                id: ProgramId::new(2),
                name: "Legs".into(),
            },
        };
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["programID"], 2);
        assert_eq!(json["program"]["name"], "Legs");
        assert_eq!(json["difficulty"], serde_json::Value::Null);
    }

    proptest! {
        #[test]
        fn any_nonblank_name_is_accepted_trimmed(name in "[A-Za-z][A-Za-z ]{0,40}") {
            let ex = NewExercise::new(&format!("  {name}  "), None, ProgramId::new(1)).unwrap();
            prop_assert_eq!(ex.name, name.trim());
        }
    }
}
