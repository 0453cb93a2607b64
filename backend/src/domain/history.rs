//! History accounting for staff assignments.
//!
//! Pure functions: closing an open assignment into an immutable history record,
//! and the duration labels shown next to history entries.

use chrono::{DateTime, Utc};

use crate::domain::models::enrollment::{StaffAssignment, StaffHistoryRecord};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Whole 24h periods between two instants, never negative
pub fn duration_days(assigned_at: DateTime<Utc>, removed_at: DateTime<Utc>) -> i64 {
    let elapsed = (removed_at - assigned_at).num_seconds();
    if elapsed <= 0 {
        return 0;
    }
    elapsed / SECONDS_PER_DAY
}

/// Close an assignment into a history record.
///
/// The duration is fixed here and never recomputed. Only `history_id` differs between
/// two calls with the same inputs.
pub fn close_assignment(
    assignment: &StaffAssignment,
    removed_at: DateTime<Utc>,
    reason: &str,
    notes: Option<String>,
) -> StaffHistoryRecord {
    StaffHistoryRecord {
        history_id: shared::StaffHistoryRecord::generate_id(),
        staff_id: assignment.staff_id.clone(),
        staff_name: assignment.staff_name.clone(),
        staff_role: assignment.staff_role,
        assigned_at: assignment.assigned_at,
        assigned_by: assignment.assigned_by.clone(),
        removed_at,
        removal_reason: reason.to_string(),
        removal_notes: notes,
        duration_days: duration_days(assignment.assigned_at, removed_at),
    }
}

/// Format a day count for display.
///
/// "Less than a day", "N days" under 30, "N months" under 365 (whole months of 30
/// days), otherwise years with the month remainder, e.g. "1y 1m" or "2 years".
pub fn format_duration(days: i64) -> String {
    if days < 1 {
        return "Less than a day".to_string();
    }
    if days < 30 {
        return plural(days, "day");
    }
    if days < 365 {
        return plural(days / 30, "month");
    }

    let years = days / 365;
    let months = (days % 365) / 30;
    if months == 0 {
        plural(years, "year")
    } else {
        format!("{}y {}m", years, months)
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
