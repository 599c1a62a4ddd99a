use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Attendance is one record per employee per date, append-only. The
/// UNIQUE(employee_id, date) key in the schema is the authority for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum AttendanceStatus {
    OnTime,
    Late,
    Leave,
    OffDay,
}

/// Single-row schedule configuration as stored. `daily_start_time` is kept
/// as raw text; the window engine owns its validation.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceConfigRow {
    pub daily_start_time: Option<String>,
    pub active_date: Option<NaiveDate>,
    pub start_time: Option<NaiveDateTime>,
    pub grace_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OffDay {
    pub date: NaiveDate,
    pub reason: Option<String>,
}
