use std::fmt::Write;

use crate::models::StudentProfile;

pub fn build_report(profile: &StudentProfile) -> String {
    let summary = &profile.attendance;
    let mut output = String::new();

    let _ = writeln!(output, "# Attendance Report: {}", profile.name);
    let _ = writeln!(
        output,
        "{} · year {} · {}",
        profile.email,
        profile.year,
        profile.branch.as_deref().unwrap_or("no branch")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Classes held: {}", summary.total_classes);
    let _ = writeln!(output, "- Present: {}", summary.present);
    let _ = writeln!(output, "- Absent: {}", summary.absent);
    let _ = writeln!(output, "- Attendance: {:.2}%", summary.percentage);
    let _ = writeln!(output, "- Forecasted score: {}", summary.forecasted_score);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");
    if profile.subjects.is_empty() {
        let _ = writeln!(output, "No subjects enrolled.");
    } else {
        let _ = writeln!(output, "{}", profile.subjects.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Attendance");
    if profile.recent_attendance.is_empty() {
        let _ = writeln!(output, "No attendance recorded yet.");
    } else {
        for record in profile.recent_attendance.iter() {
            let _ = writeln!(
                output,
                "- {} period {}: {}",
                record.date,
                record.period,
                if record.present { "present" } else { "absent" }
            );
        }
    }

    output
}
