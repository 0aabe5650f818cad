use chrono::{DateTime, Utc};
use serde::Serialize;

use fittrack_core::{DomainError, DomainResult, Entity, ExerciseId, HistoryId, ProgramId, UserId};

use crate::Difficulty;

/// A completed workout logged by a user. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseHistory {
    pub id: HistoryId,
    pub date_of_completion: DateTime<Utc>,
    /// Seconds.
    pub duration: i32,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(rename = "exerciseID")]
    pub exercise_id: ExerciseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for ExerciseHistory {
    type Id = HistoryId;

    fn id(&self) -> HistoryId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseSummary {
    pub name: String,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "programID")]
    pub program_id: ProgramId,
}

/// Tracking list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWithExercise {
    pub entry: ExerciseHistory,
    pub exercise: ExerciseSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub date_of_completion: DateTime<Utc>,
    pub duration: i32,
}

impl NewHistoryEntry {
    /// Missing date means "now"; missing duration means 0 seconds.
    pub fn new(
        user_id: UserId,
        exercise_id: ExerciseId,
        date_of_completion: Option<DateTime<Utc>>,
        duration: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let duration = match duration {
            None => 0,
            Some(d) if d < 0 => return Err(DomainError::validation("duration cannot be negative")),
            Some(d) => i32::try_from(d).map_err(|_| DomainError::validation("duration is too large"))?,
        };

        Ok(Self {
            user_id,
            exercise_id,
            date_of_completion: date_of_completion.unwrap_or(now),
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap()
    }

    #[test]
    fn defaults_apply() {
        let entry = NewHistoryEntry::new(UserId::new(1), ExerciseId::new(2), None, None, now()).unwrap();
        assert_eq!(entry.date_of_completion, now());
        assert_eq!(entry.duration, 0);
    }

    #[test]
    fn explicit_values_are_kept() {
        let date = Utc.with_ymd_and_hms(2024, 5, 30, 7, 0, 0).unwrap();
        let entry = NewHistoryEntry::new(UserId::new(1), ExerciseId::new(2), Some(date), Some(900), now()).unwrap();
        assert_eq!(entry.date_of_completion, date);
        assert_eq!(entry.duration, 900);
    }

    #[test]
    fn oversized_duration_is_rejected() {
        let too_big = i64::from(i32::MAX) + 1;
        assert!(NewHistoryEntry::new(UserId::new(1), ExerciseId::new(2), None, Some(too_big), now()).is_err());
    }

    proptest! {
        #[test]
        fn negative_durations_are_always_rejected(d in i64::MIN..0) {
            prop_assert!(NewHistoryEntry::new(UserId::new(1), ExerciseId::new(1), None, Some(d), now()).is_err());
        }

        #[test]
        fn non_negative_durations_round_trip(d in 0i64..=i64::from(i32::MAX)) {
            let entry = NewHistoryEntry::new(UserId::new(1), ExerciseId::new(1), None, Some(d), now()).unwrap();
            prop_assert_eq!(i64::from(entry.duration), d);
        }
    }
}
