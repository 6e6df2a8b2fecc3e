use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Teacher => f.write_str("teacher"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub branch: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub subjects: Vec<String>,
    pub avatar_url: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Teacher {
    pub id: Uuid,
}

#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub period: String,
    pub present: bool,
}

/// Restricts an attendance count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    PresentOnly,
}

/// Lightweight projection of an [`AttendanceRecord`] for profile views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAttendance {
    pub id: String,
    pub date: NaiveDate,
    pub period: String,
    pub present: bool,
    pub class_id: String,
}

impl From<&AttendanceRecord> for RecentAttendance {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: record.date,
            period: record.period.clone(),
            present: record.present,
            class_id: record.class_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_classes: i64,
    pub present: i64,
    pub absent: i64,
    pub percentage: f64,
    pub forecasted_score: u8,
    pub recent_attendance: Vec<RecentAttendance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub branch: Option<String>,
    pub year: i32,
    pub subjects: Vec<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    pub attendance: AttendanceSummary,
    pub recent_attendance: Vec<RecentAttendance>,
}

/// A teacher-defined exam day that overrides the regular timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamOverride {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    pub name: String,
}
