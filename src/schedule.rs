use tracing::info;
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::models::ExamOverride;
use crate::store::Store;

pub async fn list_exams(store: &dyn Store, teacher_id: Uuid) -> Result<Vec<ExamOverride>, ScheduleError> {
    Ok(store.list_exams(teacher_id).await?)
}

pub async fn add_exam(
    store: &dyn Store,
    teacher_id: Uuid,
    exam: ExamOverride,
) -> Result<ExamOverride, ScheduleError> {
    if !store.insert_exam(teacher_id, &exam).await? {
        return Err(ScheduleError::NotPersisted("add"));
    }

    info!(%teacher_id, exam_id = %exam.id, "exam override added");
    Ok(exam)
}

/// Replaces an exam; the id in `exam_id` wins over any id in the body.
pub async fn update_exam(
    store: &dyn Store,
    teacher_id: Uuid,
    exam_id: Uuid,
    mut exam: ExamOverride,
) -> Result<ExamOverride, ScheduleError> {
    exam.id = exam_id;
    if !store.update_exam(teacher_id, &exam).await? {
        return Err(ScheduleError::ExamNotFound);
    }

    Ok(exam)
}

pub async fn delete_exam(store: &dyn Store, teacher_id: Uuid, exam_id: Uuid) -> Result<(), ScheduleError> {
    if !store.delete_exam(teacher_id, exam_id).await? {
        return Err(ScheduleError::ExamNotFound);
    }

    info!(%teacher_id, %exam_id, "exam override deleted");
    Ok(())
}
