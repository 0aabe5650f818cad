use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use fittrack_auth::{NewUser, UserAccount, UserPatch};
use fittrack_core::{Entity, ExerciseId, HistoryId, ProgramId, UserId};
use fittrack_training::{
    Exercise, ExerciseHistory, ExercisePatch, ExerciseSummary, ExerciseWithProgram, HistoryWithExercise,
    NewExercise, NewHistoryEntry, NewProgram, Program, ProgramPatch, ProgramSummary,
};

use super::query::ExerciseFilter;
use super::{ExerciseStore, HistoryStore, ProgramDeletion, ProgramStore, StoreError, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, UserAccount>,
    programs: BTreeMap<ProgramId, Program>,
    exercises: BTreeMap<ExerciseId, Exercise>,
    history: BTreeMap<HistoryId, ExerciseHistory>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn live_program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(&id).filter(|p| !p.is_deleted())
    }

    fn live_exercise(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.get(&id).filter(|e| !e.is_deleted())
    }
}

/// In-memory store for tests/dev.
///
/// Every table lives behind one lock, so multi-row operations (cascading
/// delete, check-then-insert on email) are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount, StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict(format!("email '{}' already registered", new_user.email)));
        }

        let now = Utc::now();
        let account = UserAccount {
            id: UserId::new(tables.next_id()),
            name: new_user.name,
            surname: new_user.surname,
            nick_name: new_user.nick_name,
            email: new_user.email,
            age: new_user.age,
            role: new_user.role,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let tables = self.read()?;
        Ok(tables.users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .users
            .values()
            .find(|u| !u.is_deleted() && u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let tables = self.read()?;
        Ok(tables.users.values().filter(|u| !u.is_deleted()).cloned().collect())
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<Option<UserAccount>, StoreError> {
        let mut tables = self.write()?;
        let Some(account) = tables.users.get_mut(&id).filter(|u| !u.is_deleted()) else {
            return Ok(None);
        };
        patch.apply_to(account, Utc::now());
        Ok(Some(account.clone()))
    }
}

#[async_trait]
impl ProgramStore for InMemoryStore {
    async fn create_program(&self, new_program: NewProgram) -> Result<Program, StoreError> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let program = Program {
            id: ProgramId::new(tables.next_id()),
            name: new_program.name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.programs.insert(program.id, program.clone());
        Ok(program)
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let tables = self.read()?;
        Ok(tables.programs.values().filter(|p| !p.is_deleted()).cloned().collect())
    }

    async fn find_program(&self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        Ok(self.read()?.live_program(id).cloned())
    }

    async fn update_program(&self, id: ProgramId, patch: &ProgramPatch) -> Result<Option<Program>, StoreError> {
        let mut tables = self.write()?;
        let Some(program) = tables.programs.get_mut(&id).filter(|p| !p.is_deleted()) else {
            return Ok(None);
        };
        patch.apply_to(program, Utc::now());
        Ok(Some(program.clone()))
    }

    async fn delete_program(&self, id: ProgramId) -> Result<Option<ProgramDeletion>, StoreError> {
        let mut tables = self.write()?;
        if tables.live_program(id).is_none() {
            return Ok(None);
        }

        let now = Utc::now();
        let mut exercises_deleted = 0;
        for exercise in tables
            .exercises
            .values_mut()
            .filter(|e| e.program_id == id && !e.is_deleted())
        {
            exercise.deleted_at = Some(now);
            exercises_deleted += 1;
        }
        if let Some(program) = tables.programs.get_mut(&id) {
            program.deleted_at = Some(now);
        }

        Ok(Some(ProgramDeletion { exercises_deleted }))
    }
}

#[async_trait]
impl ExerciseStore for InMemoryStore {
    async fn create_exercise(&self, new_exercise: NewExercise) -> Result<Exercise, StoreError> {
        let mut tables = self.write()?;
        if tables.live_program(new_exercise.program_id).is_none() {
            return Err(StoreError::MissingReference(format!(
                "program {} does not exist",
                new_exercise.program_id
            )));
        }

        let now = Utc::now();
        let exercise = Exercise {
            id: ExerciseId::new(tables.next_id()),
            name: new_exercise.name,
            difficulty: new_exercise.difficulty,
            program_id: new_exercise.program_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.exercises.insert(exercise.id, exercise.clone());
        Ok(exercise)
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<ExerciseWithProgram>, StoreError> {
        let tables = self.read()?;
        let matching = tables
            .exercises
            .values()
            .filter(|e| !e.is_deleted() && filter.matches(e))
            .filter_map(|e| {
                tables.live_program(e.program_id).map(|p| ExerciseWithProgram {
                    exercise: e.clone(),
                    program: ProgramSummary::from(p),
                })
            });

        let rows: Vec<ExerciseWithProgram> = match filter.page {
            Some(page) => matching
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(page.limit() as usize)
                .collect(),
            None => matching.collect(),
        };
        Ok(rows)
    }

    async fn update_exercise(&self, id: ExerciseId, patch: &ExercisePatch) -> Result<Option<Exercise>, StoreError> {
        let mut tables = self.write()?;
        let Some(exercise) = tables.exercises.get_mut(&id).filter(|e| !e.is_deleted()) else {
            return Ok(None);
        };
        patch.apply_to(exercise, Utc::now());
        Ok(Some(exercise.clone()))
    }

    async fn delete_exercise(&self, id: ExerciseId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables.exercises.get_mut(&id).filter(|e| !e.is_deleted()) {
            Some(exercise) => {
                exercise.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn create_history(&self, entry: NewHistoryEntry) -> Result<ExerciseHistory, StoreError> {
        let mut tables = self.write()?;
        if tables.live_exercise(entry.exercise_id).is_none() {
            return Err(StoreError::MissingReference(format!(
                "exercise {} does not exist",
                entry.exercise_id
            )));
        }
        if !tables.users.contains_key(&entry.user_id) {
            return Err(StoreError::MissingReference(format!("user {} does not exist", entry.user_id)));
        }

        let now = Utc::now();
        let record = ExerciseHistory {
            id: HistoryId::new(tables.next_id()),
            date_of_completion: entry.date_of_completion,
            duration: entry.duration,
            user_id: entry.user_id,
            exercise_id: entry.exercise_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.history.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_history_for_user(&self, user_id: UserId) -> Result<Vec<HistoryWithExercise>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<HistoryWithExercise> = tables
            .history
            .values()
            .filter(|h| h.user_id == user_id && !h.is_deleted())
            .filter_map(|h| {
                // Entries keep their exercise even after it is retired from the catalog.
                tables.exercises.get(&h.exercise_id).map(|e| HistoryWithExercise {
                    entry: h.clone(),
                    exercise: ExerciseSummary {
                        name: e.name.clone(),
                        difficulty: e.difficulty,
                        program_id: e.program_id,
                    },
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.entry
                .date_of_completion
                .cmp(&a.entry.date_of_completion)
                .then(b.entry.id.cmp(&a.entry.id))
        });
        Ok(rows)
    }

    async fn delete_history_owned(&self, id: HistoryId, user_id: UserId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables
            .history
            .get_mut(&id)
            .filter(|h| h.user_id == user_id && !h.is_deleted())
        {
            Some(record) => {
                record.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
