use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A weekly-repeating availability template owned by a provider.
///
/// `weekday` uses 0 = Sunday .. 6 = Saturday. Patterns are deactivated, not
/// deleted, so historical slot provenance survives edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub tenant_id: Uuid,
    pub service_type: String,
    pub date_start: NaiveDate,
    /// None = open-ended.
    pub date_end: Option<NaiveDate>,
    pub weekday: u8,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub slot_duration_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new recurrence pattern (tenant/provider come from context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurrencePattern {
    pub provider_id: Uuid,
    pub service_type: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub weekday: u8,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    /// None = use the provider's configured default.
    pub slot_duration_minutes: Option<i32>,
}

/// An exception interval removing availability from a provider's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub tenant_id: Uuid,
    pub kind: BlockKind,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Planned,
    Incident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub provider_id: Uuid,
    pub kind: BlockKind,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub reason: Option<String>,
}

/// A booked (or cancelled) appointment. The interval is immutable after
/// creation; only status transitions are allowed (cancel-and-rebook instead
/// of moving an appointment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub tenant_id: Uuid,
    pub service_type: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancel_reason: Option<String>,
}

/// Closed status machine: `Pending → Confirmed → Cancelled`,
/// `Confirmed → Cancelled`. Nothing leaves `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Request to book one generated slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub provider_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub service_type: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
}

/// A bookable candidate interval derived from a recurrence pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A calendar month used as the quota accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodMonth {
    pub year: i32,
    pub month: u32,
}

impl PeriodMonth {
    /// Period containing the given instant (UTC calendar month).
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl fmt::Display for PeriodMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Per-student-per-course monthly allowance and consumption counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaCounter {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub tenant_id: Uuid,
    pub period: PeriodMonth,
    pub allowance: i32,
    pub consumed: i32,
}

/// Filter for listing appointments.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub provider_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
}
