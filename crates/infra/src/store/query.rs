use fittrack_core::{PageRequest, ProgramId};
use fittrack_training::Exercise;

/// Exercise listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub program_id: Option<ProgramId>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// `None` returns every match.
    pub page: Option<PageRequest>,
}

impl ExerciseFilter {
    /// Filter predicate (pagination excluded).
    pub fn matches(&self, exercise: &Exercise) -> bool {
        if let Some(program_id) = self.program_id {
            if exercise.program_id != program_id {
                return false;
            }
        }
        match self.search.as_deref() {
            Some(term) => exercise.name.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }

    /// Search term as an `ILIKE` pattern, with wildcards in the term escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fittrack_core::ExerciseId;

    fn exercise(name: &str, program: i64) -> Exercise {
        let now = Utc::now();
        Exercise {
            id: ExerciseId::new(1),
            name: name.into(),
            difficulty: None,
            program_id: ProgramId::new(program),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ExerciseFilter::default().matches(&exercise("Squat", 1)));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filter = ExerciseFilter {
            search: Some("SQU".into()),
            ..ExerciseFilter::default()
        };
        assert!(filter.matches(&exercise("Front squat", 1)));
        assert!(!filter.matches(&exercise("Deadlift", 1)));
    }

    #[test]
    fn program_filter() {
        let filter = ExerciseFilter {
            program_id: Some(ProgramId::new(2)),
            ..ExerciseFilter::default()
        };
        assert!(filter.matches(&exercise("Squat", 2)));
        assert!(!filter.matches(&exercise("Squat", 3)));
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        let filter = ExerciseFilter {
            search: Some("100%_a".into()),
            ..ExerciseFilter::default()
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("%100\\%\\_a%"));
    }
}
