use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{AttendanceRecord, ExamOverride, RecordFilter, Role, Student, Teacher, User};
use crate::store::Store;

pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(config.database_url()?)
        .await
        .context("failed to connect to Postgres")?;
    info!("Connected to Postgres");
    Ok(pool)
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn column<'r, T>(row: &'r PgRow, collection: &'static str, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| StoreError::MalformedRecord {
        collection,
        reason: format!("{name}: {e}"),
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = column(row, "users", "role")?;
    let role = role
        .parse::<Role>()
        .map_err(|reason| StoreError::MalformedRecord {
            collection: "users",
            reason,
        })?;

    Ok(User {
        id: column(row, "users", "id")?,
        name: column(row, "users", "name")?,
        email: column(row, "users", "email")?,
        branch: column(row, "users", "branch")?,
        role,
    })
}

fn student_from_row(row: &PgRow) -> Result<Student, StoreError> {
    Ok(Student {
        id: column(row, "students", "id")?,
        user_id: column(row, "students", "user_id")?,
        year: column(row, "students", "year")?,
        subjects: column(row, "students", "subjects")?,
        avatar_url: column(row, "students", "avatar_url")?,
        branch: column(row, "students", "branch")?,
    })
}

fn teacher_from_row(row: &PgRow) -> Result<Teacher, StoreError> {
    Ok(Teacher {
        id: column(row, "teachers", "id")?,
    })
}

fn record_from_row(row: &PgRow) -> Result<AttendanceRecord, StoreError> {
    Ok(AttendanceRecord {
        id: column(row, "attendance", "id")?,
        student_id: column(row, "attendance", "student_id")?,
        class_id: column(row, "attendance", "class_id")?,
        date: column(row, "attendance", "date")?,
        period: column(row, "attendance", "period")?,
        present: column(row, "attendance", "present")?,
    })
}

fn exam_from_row(row: &PgRow) -> Result<ExamOverride, StoreError> {
    Ok(ExamOverride {
        id: column(row, "exam_overrides", "id")?,
        date: column(row, "exam_overrides", "date")?,
        name: column(row, "exam_overrides", "name")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, branch, role FROM smart_attendance.users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_student_by_id(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, year, subjects, avatar_url, branch \
             FROM smart_attendance.students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn find_student_by_user_id(&self, user_id: Uuid) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, year, subjects, avatar_url, branch \
             FROM smart_attendance.students WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn count_records(&self, student_id: Uuid, filter: RecordFilter) -> Result<i64, StoreError> {
        let mut query = String::from(
            "SELECT COUNT(*) AS count FROM smart_attendance.attendance WHERE student_id = $1",
        );
        if filter == RecordFilter::PresentOnly {
            query.push_str(" AND present");
        }

        let row = sqlx::query(&query)
            .bind(student_id)
            .fetch_one(&self.pool)
            .await?;

        column(&row, "attendance", "count")
    }

    async fn find_recent_records(
        &self,
        student_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, student_id, class_id, date, period, present \
             FROM smart_attendance.attendance \
             WHERE student_id = $1 \
             ORDER BY date DESC, recorded_at ASC, id ASC \
             LIMIT $2",
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn find_teacher_by_user_id(&self, user_id: Uuid) -> Result<Option<Teacher>, StoreError> {
        let row = sqlx::query(
            "SELECT id FROM smart_attendance.teachers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(teacher_from_row).transpose()
    }

    async fn list_exams(&self, teacher_id: Uuid) -> Result<Vec<ExamOverride>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, date, name FROM smart_attendance.exam_overrides \
             WHERE teacher_id = $1 ORDER BY created_at, id",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(exam_from_row).collect()
    }

    async fn insert_exam(&self, teacher_id: Uuid, exam: &ExamOverride) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO smart_attendance.exam_overrides (id, teacher_id, date, name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(exam.id)
        .bind(teacher_id)
        .bind(exam.date)
        .bind(&exam.name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_exam(&self, teacher_id: Uuid, exam: &ExamOverride) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE smart_attendance.exam_overrides
            SET date = $3, name = $4
            WHERE teacher_id = $1 AND id = $2
            "#,
        )
        .bind(teacher_id)
        .bind(exam.id)
        .bind(exam.date)
        .bind(&exam.name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_exam(&self, teacher_id: Uuid, exam_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM smart_attendance.exam_overrides WHERE teacher_id = $1 AND id = $2",
        )
        .bind(teacher_id)
        .bind(exam_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn upsert_user(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    branch: Option<&str>,
    role: Role,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO smart_attendance.users (id, name, email, branch, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE
        SET name = EXCLUDED.name, branch = EXCLUDED.branch, role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(branch)
    .bind(role.to_string())
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        (
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?,
            Uuid::parse_str("8f1c2b7e-5a0d-4c3e-9b1f-2d6a7e8c9f01")?,
            "Avery Lee",
            "avery.lee@college.edu",
            Some("CSE"),
            None,
            2,
            vec!["CS201", "MA202", "PH101"],
            [true, true, false, true, true, true, false, true, true, true],
        ),
        (
            Uuid::parse_str("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc")?,
            Uuid::parse_str("4b9e6d3a-1c7f-4e2a-8d5b-6f0a3c2e1d09")?,
            "Jules Moreno",
            "jules.moreno@college.edu",
            None,
            Some("EEE"),
            3,
            vec!["EE301", "MA301"],
            [false, true, false, false, true, false, false, true, false, false],
        ),
    ];

    let class_id = Uuid::parse_str("a5c0e1f2-7b3d-4e9a-8c6f-1d2e3f4a5b6c")?;
    let first_day = NaiveDate::from_ymd_opt(2026, 1, 5).context("invalid date")?;

    for (user_id, student_id, name, email, branch, student_branch, year, subjects, marks) in students {
        let user_id = upsert_user(pool, user_id, name, email, branch, Role::Student).await?;

        let student_id: Uuid = sqlx::query(
            r#"
            INSERT INTO smart_attendance.students (id, user_id, year, subjects, branch)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET year = EXCLUDED.year, subjects = EXCLUDED.subjects
            RETURNING id
            "#,
        )
        .bind(student_id)
        .bind(user_id)
        .bind(year)
        .bind(subjects.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .bind(student_branch)
        .fetch_one(pool)
        .await?
        .get("id");

        for (day, present) in marks.into_iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO smart_attendance.attendance
                (id, student_id, class_id, date, period, present)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (student_id, date, period) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(student_id)
            .bind(class_id)
            .bind(first_day + Duration::days(day as i64))
            .bind("1")
            .bind(present)
            .execute(pool)
            .await?;
        }
        debug!(%student_id, "seeded student");
    }

    let teacher_user = upsert_user(
        pool,
        Uuid::parse_str("d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2")?,
        "Kiara Patel",
        "kiara.patel@college.edu",
        Some("CSE"),
        Role::Teacher,
    )
    .await?;

    sqlx::query(
        r#"
        INSERT INTO smart_attendance.teachers (id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::parse_str("e7b2c4d6-8f0a-4b1c-9d3e-5f6a7b8c9d0e")?)
    .bind(teacher_user)
    .execute(pool)
    .await?;

    info!("seed data loaded");
    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        email: String,
        date: NaiveDate,
        period: String,
        present: bool,
        class_id: Uuid,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let student_id: Uuid = sqlx::query(
            r#"
            SELECT s.id
            FROM smart_attendance.students s
            JOIN smart_attendance.users u ON u.id = s.user_id
            WHERE u.email = $1
            "#,
        )
        .bind(&row.email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no student registered for {}", row.email))?
        .get("id");

        let result = sqlx::query(
            r#"
            INSERT INTO smart_attendance.attendance
            (id, student_id, class_id, date, period, present)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (student_id, date, period) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(row.class_id)
        .bind(row.date)
        .bind(&row.period)
        .bind(row.present)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
