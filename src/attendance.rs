use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{AttendanceSummary, RecentAttendance, RecordFilter};
use crate::store::Store;

pub const RECENT_LIMIT: usize = 5;
pub const FORECAST_BREAKPOINT: f64 = 50.0;
pub const FORECAST_LOW: u8 = 2;
pub const FORECAST_HIGH: u8 = 5;

/// Builds the attendance summary for one student.
///
/// The caller is expected to have resolved the student already; an unknown id
/// simply yields an empty summary.
#[instrument(skip(store))]
pub async fn summarize_attendance(
    store: &dyn Store,
    student_id: Uuid,
) -> Result<AttendanceSummary, StoreError> {
    let (total_classes, present, recent) = tokio::try_join!(
        store.count_records(student_id, RecordFilter::All),
        store.count_records(student_id, RecordFilter::PresentOnly),
        store.find_recent_records(student_id, RECENT_LIMIT),
    )?;

    let percentage = attendance_percentage(present, total_classes);
    debug!(total_classes, present, percentage, "attendance counted");

    Ok(AttendanceSummary {
        total_classes,
        present,
        absent: total_classes - present,
        percentage,
        forecasted_score: forecast_score(percentage),
        recent_attendance: recent
            .iter()
            .take(RECENT_LIMIT)
            .map(RecentAttendance::from)
            .collect(),
    })
}

/// Percentage of sessions attended, rounded half away from zero to two
/// decimals. Zero sessions gives `0.0`.
pub fn attendance_percentage(present: i64, total_classes: i64) -> f64 {
    if total_classes <= 0 {
        return 0.0;
    }

    let present = present.clamp(0, total_classes);
    // integer hundredths so x.xx5 boundaries round exactly
    let hundredths = (present * 20_000 + total_classes) / (2 * total_classes);
    hundredths as f64 / 100.0
}

pub fn forecast_score(percentage: f64) -> u8 {
    if percentage < FORECAST_BREAKPOINT {
        FORECAST_LOW
    } else {
        FORECAST_HIGH
    }
}
