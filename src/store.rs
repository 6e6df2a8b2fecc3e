//! Data-access seam between the attendance core and its backing database.
//!
//! The aggregator and composer only ever see `&dyn Store`; the process owns
//! the concrete handle (see [`crate::db::PgStore`]) and passes it in.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{AttendanceRecord, ExamOverride, RecordFilter, Student, Teacher, User};

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_student_by_id(&self, id: Uuid) -> Result<Option<Student>, StoreError>;

    async fn find_student_by_user_id(&self, user_id: Uuid) -> Result<Option<Student>, StoreError>;

    async fn count_records(&self, student_id: Uuid, filter: RecordFilter) -> Result<i64, StoreError>;

    /// Most recent records first; records sharing a date keep insertion order.
    async fn find_recent_records(
        &self,
        student_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn find_teacher_by_user_id(&self, user_id: Uuid) -> Result<Option<Teacher>, StoreError>;

    async fn list_exams(&self, teacher_id: Uuid) -> Result<Vec<ExamOverride>, StoreError>;

    /// Returns `false` when nothing was written.
    async fn insert_exam(&self, teacher_id: Uuid, exam: &ExamOverride) -> Result<bool, StoreError>;

    /// Returns `false` when the teacher has no exam with `exam.id`.
    async fn update_exam(&self, teacher_id: Uuid, exam: &ExamOverride) -> Result<bool, StoreError>;

    async fn delete_exam(&self, teacher_id: Uuid, exam_id: Uuid) -> Result<bool, StoreError>;
}

/// Parses a caller-supplied identifier into the store's key format.
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::MalformedIdentifier(raw.to_string()))
}
