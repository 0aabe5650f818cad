//! Postgres-backed record store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` | `Conflict` | Duplicate email on registration |
//! | `23503` | `MissingReference` | Tracking entry for a user that does not exist |
//! | Any other / pool / IO | `Backend` | Everything else |
//!
//! "Live parent" checks (an exercise needs a live program, a tracking entry a
//! live exercise) are done inside the INSERT itself with `INSERT ... SELECT`,
//! so there is no window between check and write.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use async_trait::async_trait;

use fittrack_auth::{NewUser, PasswordHash, Role, UserAccount, UserPatch};
use fittrack_core::{ExerciseId, HistoryId, ProgramId, UserId};
use fittrack_training::{
    Difficulty, Exercise, ExerciseHistory, ExercisePatch, ExerciseSummary, ExerciseWithProgram,
    HistoryWithExercise, NewExercise, NewHistoryEntry, NewProgram, Program, ProgramPatch, ProgramSummary,
};

use super::query::ExerciseFilter;
use super::{ExerciseStore, HistoryStore, ProgramDeletion, ProgramStore, StoreError, UserStore};

const USER_COLUMNS: &str =
    "id, name, surname, nick_name, email, age, role, password_hash, created_at, updated_at, deleted_at";
const PROGRAM_COLUMNS: &str = "id, name, created_at, updated_at, deleted_at";
const EXERCISE_COLUMNS: &str = "id, name, difficulty, program_id, created_at, updated_at, deleted_at";
const HISTORY_COLUMNS: &str =
    "id, date_of_completion, duration, user_id, exercise_id, created_at, updated_at, deleted_at";

/// Postgres store. Cheap to clone (the pool is reference-counted).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, new_user), fields(email = %new_user.email), err)]
    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount, StoreError> {
        let sql = format!(
            "INSERT INTO users (name, surname, nick_name, email, age, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new_user.name)
            .bind(&new_user.surname)
            .bind(&new_user.nick_name)
            .bind(&new_user.email)
            .bind(new_user.age)
            .bind(new_user.role.as_str())
            .bind(new_user.password_hash.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_user", e))?;

        row.try_into()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?
            .map(UserAccount::try_from)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?
            .map(UserAccount::try_from)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        debug!(count = rows.len(), "users loaded");
        rows.into_iter().map(UserAccount::try_from).collect()
    }

    #[instrument(skip(self, patch), fields(user_id = %id), err)]
    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<Option<UserAccount>, StoreError> {
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                surname = COALESCE($3, surname), \
                nick_name = COALESCE($4, nick_name), \
                age = COALESCE($5, age), \
                role = COALESCE($6, role), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.get())
            .bind(&patch.name)
            .bind(&patch.surname)
            .bind(&patch.nick_name)
            .bind(patch.age)
            .bind(patch.role.map(|r| r.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_user", e))?
            .map(UserAccount::try_from)
            .transpose()
    }
}

#[async_trait]
impl ProgramStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn create_program(&self, new_program: NewProgram) -> Result<Program, StoreError> {
        let sql = format!("INSERT INTO programs (name) VALUES ($1) RETURNING {PROGRAM_COLUMNS}");
        let row = sqlx::query_as::<_, ProgramRow>(&sql)
            .bind(&new_program.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_program", e))?;
        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let sql = format!("SELECT {PROGRAM_COLUMNS} FROM programs WHERE deleted_at IS NULL ORDER BY id");
        let rows = sqlx::query_as::<_, ProgramRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_programs", e))?;
        Ok(rows.into_iter().map(Program::from).collect())
    }

    #[instrument(skip(self), fields(program_id = %id), err)]
    async fn find_program(&self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        let sql = format!("SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, ProgramRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_program", e))?;
        Ok(row.map(Program::from))
    }

    #[instrument(skip(self, patch), fields(program_id = %id), err)]
    async fn update_program(&self, id: ProgramId, patch: &ProgramPatch) -> Result<Option<Program>, StoreError> {
        let sql = format!(
            "UPDATE programs SET name = COALESCE($2, name), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {PROGRAM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProgramRow>(&sql)
            .bind(id.get())
            .bind(&patch.name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_program", e))?;
        Ok(row.map(Program::from))
    }

    #[instrument(skip(self), fields(program_id = %id), err)]
    async fn delete_program(&self, id: ProgramId) -> Result<Option<ProgramDeletion>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_program.begin", e))?;

        let exercises = sqlx::query(
            "UPDATE exercises SET deleted_at = NOW(), updated_at = NOW() \
             WHERE program_id = $1 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_program.exercises", e))?;

        let program = sqlx::query(
            "UPDATE programs SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_program.program", e))?;

        if program.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("delete_program.rollback", e))?;
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_program.commit", e))?;

        Ok(Some(ProgramDeletion {
            exercises_deleted: exercises.rows_affected(),
        }))
    }
}

#[async_trait]
impl ExerciseStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn create_exercise(&self, new_exercise: NewExercise) -> Result<Exercise, StoreError> {
        let sql = format!(
            "INSERT INTO exercises (name, difficulty, program_id) \
             SELECT $1, $2, p.id FROM programs p WHERE p.id = $3 AND p.deleted_at IS NULL \
             RETURNING {EXERCISE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ExerciseRow>(&sql)
            .bind(&new_exercise.name)
            .bind(new_exercise.difficulty.map(|d| d.as_str()))
            .bind(new_exercise.program_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_exercise", e))?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StoreError::MissingReference(format!(
                "program {} does not exist",
                new_exercise.program_id
            ))),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<ExerciseWithProgram>, StoreError> {
        let (limit, offset) = match filter.page {
            Some(page) => (Some(i64::from(page.limit())), i64::try_from(page.offset()).unwrap_or(i64::MAX)),
            None => (None, 0),
        };

        let rows = sqlx::query_as::<_, ExerciseListingRow>(
            r#"
            SELECT
                e.id,
                e.name,
                e.difficulty,
                e.program_id,
                e.created_at,
                e.updated_at,
                e.deleted_at,
                p.name AS program_name
            FROM exercises e
            JOIN programs p ON p.id = e.program_id AND p.deleted_at IS NULL
            WHERE e.deleted_at IS NULL
              AND ($1::BIGINT IS NULL OR e.program_id = $1)
              AND ($2::TEXT IS NULL OR e.name ILIKE $2)
            ORDER BY e.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.program_id.map(|p| p.get()))
        .bind(filter.search_pattern())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_exercises", e))?;

        rows.into_iter().map(ExerciseWithProgram::try_from).collect()
    }

    #[instrument(skip(self, patch), fields(exercise_id = %id), err)]
    async fn update_exercise(&self, id: ExerciseId, patch: &ExercisePatch) -> Result<Option<Exercise>, StoreError> {
        let sql = format!(
            "UPDATE exercises SET \
                name = COALESCE($2, name), \
                difficulty = COALESCE($3, difficulty), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {EXERCISE_COLUMNS}"
        );
        sqlx::query_as::<_, ExerciseRow>(&sql)
            .bind(id.get())
            .bind(&patch.name)
            .bind(patch.difficulty.map(|d| d.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_exercise", e))?
            .map(Exercise::try_from)
            .transpose()
    }

    #[instrument(skip(self), fields(exercise_id = %id), err)]
    async fn delete_exercise(&self, id: ExerciseId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE exercises SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_exercise", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HistoryStore for PostgresStore {
    #[instrument(skip(self), fields(user_id = %entry.user_id, exercise_id = %entry.exercise_id), err)]
    async fn create_history(&self, entry: NewHistoryEntry) -> Result<ExerciseHistory, StoreError> {
        let sql = format!(
            "INSERT INTO exercise_history (date_of_completion, duration, user_id, exercise_id) \
             SELECT $1, $2, $3, e.id FROM exercises e WHERE e.id = $4 AND e.deleted_at IS NULL \
             RETURNING {HISTORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(entry.date_of_completion)
            .bind(entry.duration)
            .bind(entry.user_id.get())
            .bind(entry.exercise_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_history", e))?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(StoreError::MissingReference(format!(
                "exercise {} does not exist",
                entry.exercise_id
            ))),
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn list_history_for_user(&self, user_id: UserId) -> Result<Vec<HistoryWithExercise>, StoreError> {
        let rows = sqlx::query_as::<_, HistoryListingRow>(
            r#"
            SELECT
                h.id,
                h.date_of_completion,
                h.duration,
                h.user_id,
                h.exercise_id,
                h.created_at,
                h.updated_at,
                h.deleted_at,
                e.name AS exercise_name,
                e.difficulty AS exercise_difficulty,
                e.program_id AS exercise_program_id
            FROM exercise_history h
            JOIN exercises e ON e.id = h.exercise_id
            WHERE h.user_id = $1 AND h.deleted_at IS NULL
            ORDER BY h.date_of_completion DESC, h.id DESC
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_history_for_user", e))?;

        rows.into_iter().map(HistoryWithExercise::try_from).collect()
    }

    #[instrument(skip(self), fields(history_id = %id, user_id = %user_id), err)]
    async fn delete_history_owned(&self, id: HistoryId, user_id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE exercise_history SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .bind(user_id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_history_owned", e))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map SQLx errors to `StoreError` (see the table in the module docs).
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::MissingReference(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        other => StoreError::Backend(format!("sqlx error in {}: {}", operation, other)),
    }
}

fn parse_difficulty(raw: Option<String>) -> Result<Option<Difficulty>, StoreError> {
    raw.as_deref()
        .map(str::parse::<Difficulty>)
        .transpose()
        .map_err(|e| StoreError::Backend(format!("corrupt difficulty column: {e}")))
}

// SQLx row types

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: Option<String>,
    surname: Option<String>,
    nick_name: Option<String>,
    email: String,
    age: Option<i32>,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Backend(format!("corrupt role column: {e}")))?;

        Ok(UserAccount {
            id: UserId::new(row.id),
            name: row.name,
            surname: row.surname,
            nick_name: row.nick_name,
            email: row.email,
            age: row.age,
            role,
            password_hash: PasswordHash::from_digest(row.password_hash),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProgramRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ProgramRow> for Program {
    fn from(row: ProgramRow) -> Self {
        Program {
            id: ProgramId::new(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ExerciseRow {
    id: i64,
    name: String,
    difficulty: Option<String>,
    program_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = StoreError;

    fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
        Ok(Exercise {
            id: ExerciseId::new(row.id),
            name: row.name,
            difficulty: parse_difficulty(row.difficulty)?,
            program_id: ProgramId::new(row.program_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ExerciseListingRow {
    #[sqlx(flatten)]
    exercise: ExerciseRow,
    program_name: String,
}

impl TryFrom<ExerciseListingRow> for ExerciseWithProgram {
    type Error = StoreError;

    fn try_from(row: ExerciseListingRow) -> Result<Self, Self::Error> {
        let exercise = Exercise::try_from(row.exercise)?;
        let program = ProgramSummary {
            id: exercise.program_id,
            name: row.program_name,
        };
        Ok(ExerciseWithProgram { exercise, program })
    }
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i64,
    date_of_completion: DateTime<Utc>,
    duration: i32,
    user_id: i64,
    exercise_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<HistoryRow> for ExerciseHistory {
    fn from(row: HistoryRow) -> Self {
        ExerciseHistory {
            id: HistoryId::new(row.id),
            date_of_completion: row.date_of_completion,
            duration: row.duration,
            user_id: UserId::new(row.user_id),
            exercise_id: ExerciseId::new(row.exercise_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct HistoryListingRow {
    #[sqlx(flatten)]
    entry: HistoryRow,
    exercise_name: String,
    exercise_difficulty: Option<String>,
    exercise_program_id: i64,
}

impl TryFrom<HistoryListingRow> for HistoryWithExercise {
    type Error = StoreError;

    fn try_from(row: HistoryListingRow) -> Result<Self, Self::Error> {
        Ok(HistoryWithExercise {
            entry: row.entry.into(),
            exercise: ExerciseSummary {
                name: row.exercise_name,
                difficulty: parse_difficulty(row.exercise_difficulty)?,
                program_id: ProgramId::new(row.exercise_program_id),
            },
        })
    }
}

/// Runs against a real database only when `DATABASE_URL` is set; otherwise
/// each test returns early. Names are suffixed per run so a shared database
/// can be reused.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> Option<PostgresStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping postgres store test");
            return None;
        };
        let pool = db::connect(&url, 2).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        Some(PostgresStore::new(pool))
    }

    fn unique(prefix: &str) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{prefix}-{nanos}")
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: PasswordHash::from_digest("$2b$04$digest"),
            role: Role::User,
            name: None,
            surname: None,
            nick_name: Some("nick".into()),
            age: Some(30),
        }
    }

    async fn seed_program(store: &PostgresStore, exercises: usize) -> (Program, Vec<Exercise>) {
        let name = unique("program");
        let program = store.create_program(NewProgram::new(&name).unwrap()).await.unwrap();
        let mut created = Vec::new();
        for i in 0..exercises {
            let ex = NewExercise::new(&format!("{name} ex {i}"), Some(Difficulty::Hard), program.id).unwrap();
            created.push(store.create_exercise(ex).await.unwrap());
        }
        (program, created)
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_conflict() {
        let Some(store) = store().await else { return };
        let email = format!("{}@example.com", unique("dup"));

        store.create_user(new_user(&email)).await.unwrap();
        let err = store.create_user(new_user(&email)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn program_delete_cascades_in_one_transaction() {
        let Some(store) = store().await else { return };
        let (program, _) = seed_program(&store, 3).await;
        let (other, _) = seed_program(&store, 1).await;

        let deletion = store.delete_program(program.id).await.unwrap().unwrap();
        assert_eq!(deletion.exercises_deleted, 3);
        assert!(store.find_program(program.id).await.unwrap().is_none());

        let gone = ExerciseFilter {
            program_id: Some(program.id),
            ..ExerciseFilter::default()
        };
        assert!(store.list_exercises(&gone).await.unwrap().is_empty());

        let kept = ExerciseFilter {
            program_id: Some(other.id),
            ..ExerciseFilter::default()
        };
        let rows = store.list_exercises(&kept).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].program.name, other.name);

        assert!(store.delete_program(program.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exercise_requires_a_live_program() {
        let Some(store) = store().await else { return };
        let (program, _) = seed_program(&store, 0).await;
        store.delete_program(program.id).await.unwrap();

        let ex = NewExercise::new("Orphan", None, program.id).unwrap();
        let err = store.create_exercise(ex).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }

    #[tokio::test]
    async fn history_delete_is_scoped_to_the_owner() {
        let Some(store) = store().await else { return };
        let owner = store
            .create_user(new_user(&format!("{}@example.com", unique("owner"))))
            .await
            .unwrap();
        let other = store
            .create_user(new_user(&format!("{}@example.com", unique("other"))))
            .await
            .unwrap();
        let (_, exercises) = seed_program(&store, 1).await;

        let entry = NewHistoryEntry::new(owner.id, exercises[0].id, None, Some(600), Utc::now()).unwrap();
        let record = store.create_history(entry).await.unwrap();

        assert!(!store.delete_history_owned(record.id, other.id).await.unwrap());
        let listed = store.list_history_for_user(owner.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].entry.duration, 600);
        assert_eq!(listed[0].exercise.name, exercises[0].name);

        assert!(store.delete_history_owned(record.id, owner.id).await.unwrap());
        assert!(store.list_history_for_user(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_for_unknown_user_is_a_missing_reference() {
        let Some(store) = store().await else { return };
        let (_, exercises) = seed_program(&store, 1).await;

        let entry = NewHistoryEntry::new(UserId::new(i64::MAX), exercises[0].id, None, None, Utc::now()).unwrap();
        let err = store.create_history(entry).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }
}
