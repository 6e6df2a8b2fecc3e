//! In-memory [`Store`] used by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{AttendanceRecord, ExamOverride, RecordFilter, Role, Student, Teacher, User};
use crate::store::Store;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    students: Vec<Student>,
    teachers: Vec<(Uuid, Teacher)>,
    attendance: Vec<AttendanceRecord>,
    exams: Vec<(Uuid, ExamOverride)>,
}

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    unavailable: AtomicBool,
    attendance_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every attendance query fail as if the pool were exhausted.
    pub fn break_attendance(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    pub fn attendance_queries(&self) -> usize {
        self.attendance_queries.load(Ordering::SeqCst)
    }

    pub fn add_user(&self, name: &str, email: &str, branch: Option<&str>, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            branch: branch.map(str::to_string),
            role,
        };
        self.lock().users.push(user.clone());
        user
    }

    pub fn add_student(&self, user_id: Uuid, year: i32, subjects: &[&str], branch: Option<&str>) -> Student {
        let student = Student {
            id: Uuid::new_v4(),
            user_id,
            year,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            avatar_url: None,
            branch: branch.map(str::to_string),
        };
        self.lock().students.push(student.clone());
        student
    }

    pub fn add_teacher(&self, user_id: Uuid) -> Teacher {
        let teacher = Teacher { id: Uuid::new_v4() };
        self.lock().teachers.push((user_id, teacher.clone()));
        teacher
    }

    pub fn add_record(&self, student_id: Uuid, date: NaiveDate, period: &str, present: bool) -> AttendanceRecord {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            student_id,
            class_id: Uuid::new_v4(),
            date,
            period: period.to_string(),
            present,
        };
        self.lock().attendance.push(record.clone());
        record
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn attendance_guard(&self) -> Result<(), StoreError> {
        self.attendance_queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_student_by_id(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        Ok(self.lock().students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_student_by_user_id(&self, user_id: Uuid) -> Result<Option<Student>, StoreError> {
        Ok(self.lock().students.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn count_records(&self, student_id: Uuid, filter: RecordFilter) -> Result<i64, StoreError> {
        self.attendance_guard()?;
        let count = self
            .lock()
            .attendance
            .iter()
            .filter(|r| r.student_id == student_id)
            .filter(|r| filter == RecordFilter::All || r.present)
            .count();
        Ok(count as i64)
    }

    async fn find_recent_records(
        &self,
        student_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.attendance_guard()?;
        let mut records: Vec<AttendanceRecord> = self
            .lock()
            .attendance
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        // stable: same-day records stay in insertion order
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(limit);
        Ok(records)
    }

    async fn find_teacher_by_user_id(&self, user_id: Uuid) -> Result<Option<Teacher>, StoreError> {
        Ok(self
            .lock()
            .teachers
            .iter()
            .find(|(owner, _)| *owner == user_id)
            .map(|(_, teacher)| teacher.clone()))
    }

    async fn list_exams(&self, teacher_id: Uuid) -> Result<Vec<ExamOverride>, StoreError> {
        Ok(self
            .lock()
            .exams
            .iter()
            .filter(|(owner, _)| *owner == teacher_id)
            .map(|(_, exam)| exam.clone())
            .collect())
    }

    async fn insert_exam(&self, teacher_id: Uuid, exam: &ExamOverride) -> Result<bool, StoreError> {
        let mut collections = self.lock();
        if collections.exams.iter().any(|(_, e)| e.id == exam.id) {
            return Ok(false);
        }
        collections.exams.push((teacher_id, exam.clone()));
        Ok(true)
    }

    async fn update_exam(&self, teacher_id: Uuid, exam: &ExamOverride) -> Result<bool, StoreError> {
        let mut collections = self.lock();
        match collections
            .exams
            .iter_mut()
            .find(|(owner, e)| *owner == teacher_id && e.id == exam.id)
        {
            Some((_, stored)) => {
                *stored = exam.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_exam(&self, teacher_id: Uuid, exam_id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.lock();
        let before = collections.exams.len();
        collections
            .exams
            .retain(|(owner, e)| !(*owner == teacher_id && e.id == exam_id));
        Ok(collections.exams.len() < before)
    }
}
