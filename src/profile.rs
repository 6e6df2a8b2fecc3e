//! Student profile composition.
//!
//! A profile is the union of the user's identity, the student's enrollment
//! record and the attendance summary. Callers reach it through one of two
//! identifier spaces:
//!
//! - [`profile_for_user`] takes a *user* id (the session's own account).
//! - [`profile_for_student`] takes a *student* id (a path parameter).
//!
//! Both return `Ok(None)` when either record is missing; a profile is never
//! partially filled.

use tracing::{debug, instrument};

use crate::attendance::summarize_attendance;
use crate::error::StoreError;
use crate::models::{AttendanceSummary, Student, StudentProfile, User};
use crate::store::{parse_id, Store};

#[instrument(skip(store))]
pub async fn profile_for_user(
    store: &dyn Store,
    user_id: &str,
) -> Result<Option<StudentProfile>, StoreError> {
    let user_id = parse_id(user_id)?;

    let Some(user) = store.find_user_by_id(user_id).await? else {
        debug!("no user");
        return Ok(None);
    };
    let Some(student) = store.find_student_by_user_id(user.id).await? else {
        debug!("user has no student record");
        return Ok(None);
    };

    build_profile(store, user, student).await.map(Some)
}

#[instrument(skip(store))]
pub async fn profile_for_student(
    store: &dyn Store,
    student_id: &str,
) -> Result<Option<StudentProfile>, StoreError> {
    let student_id = parse_id(student_id)?;

    let Some(student) = store.find_student_by_id(student_id).await? else {
        debug!("no student");
        return Ok(None);
    };
    let Some(user) = store.find_user_by_id(student.user_id).await? else {
        debug!("student references a missing user");
        return Ok(None);
    };

    build_profile(store, user, student).await.map(Some)
}

async fn build_profile(
    store: &dyn Store,
    user: User,
    student: Student,
) -> Result<StudentProfile, StoreError> {
    let summary = summarize_attendance(store, student.id).await?;
    Ok(compose(user, student, summary))
}

pub fn compose(user: User, student: Student, attendance: AttendanceSummary) -> StudentProfile {
    StudentProfile {
        id: student.id.to_string(),
        name: user.name,
        email: user.email,
        branch: user.branch.or(student.branch),
        year: student.year,
        subjects: student.subjects,
        avatar_url: student.avatar_url,
        recent_attendance: attendance.recent_attendance.clone(),
        attendance,
    }
}
