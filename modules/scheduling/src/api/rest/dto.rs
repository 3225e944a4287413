use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentStatus, Block, BlockKind, BookingRequest, NewBlock,
    NewRecurrencePattern, RecurrencePattern, Slot,
};

/// REST DTO for a bookable slot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// REST DTO for an appointment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentDto {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub service_type: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    /// "pending", "confirmed" or "cancelled"
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancel_reason: Option<String>,
}

/// REST DTO for booking a slot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookAppointmentReq {
    pub provider_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub service_type: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
}

/// REST DTO for a recurrence pattern
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatternDto {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub service_type: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub slot_duration_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a recurrence pattern
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePatternReq {
    pub provider_id: Uuid,
    pub service_type: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    /// Defaults to the provider's configured slot length
    pub slot_duration_minutes: Option<i32>,
}

/// REST DTO for a calendar block
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockDto {
    pub id: Uuid,
    pub provider_id: Uuid,
    /// "planned" or "incident"
    pub kind: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// REST DTO for creating a block
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBlockReq {
    pub provider_id: Uuid,
    /// "planned" or "incident"
    pub kind: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Query parameters for GET /slots
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListSlotsQuery {
    pub provider_id: Uuid,
    pub service_type: String,
    /// First date of the window (inclusive)
    pub from: NaiveDate,
    /// Last date of the window (inclusive)
    pub to: NaiveDate,
}

/// Query parameters for GET /bookings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListAppointmentsQuery {
    pub provider_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    /// "pending", "confirmed" or "cancelled"
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Query parameters for DELETE /bookings/{id}
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

/// Query parameters for GET /availability
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListPatternsQuery {
    pub provider_id: Uuid,
    pub service_type: Option<String>,
}

/// Query parameters for provider-scoped listings
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ProviderQuery {
    pub provider_id: Uuid,
}

pub fn status_label(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "pending",
        AppointmentStatus::Confirmed => "confirmed",
        AppointmentStatus::Cancelled => "cancelled",
    }
}

pub fn parse_status(value: &str) -> Option<AppointmentStatus> {
    match value {
        "pending" => Some(AppointmentStatus::Pending),
        "confirmed" => Some(AppointmentStatus::Confirmed),
        "cancelled" => Some(AppointmentStatus::Cancelled),
        _ => None,
    }
}

pub fn kind_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Planned => "planned",
        BlockKind::Incident => "incident",
    }
}

pub fn parse_kind(value: &str) -> Option<BlockKind> {
    match value {
        "planned" => Some(BlockKind::Planned),
        "incident" => Some(BlockKind::Incident),
        _ => None,
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
        }
    }
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            provider_id: a.provider_id,
            student_id: a.student_id,
            course_id: a.course_id,
            service_type: a.service_type,
            interval_start: a.interval_start,
            interval_end: a.interval_end,
            status: status_label(a.status).to_string(),
            created_at: a.created_at,
            confirmed_at: a.confirmed_at,
            cancelled_at: a.cancelled_at,
            cancelled_by: a.cancelled_by,
            cancel_reason: a.cancel_reason,
        }
    }
}

impl From<BookAppointmentReq> for BookingRequest {
    fn from(req: BookAppointmentReq) -> Self {
        Self {
            provider_id: req.provider_id,
            student_id: req.student_id,
            course_id: req.course_id,
            service_type: req.service_type,
            interval_start: req.interval_start,
            interval_end: req.interval_end,
        }
    }
}

impl From<RecurrencePattern> for PatternDto {
    fn from(p: RecurrencePattern) -> Self {
        Self {
            id: p.id,
            provider_id: p.provider_id,
            service_type: p.service_type,
            date_start: p.date_start,
            date_end: p.date_end,
            weekday: p.weekday,
            time_start: p.time_start,
            time_end: p.time_end,
            slot_duration_minutes: p.slot_duration_minutes,
            active: p.active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<CreatePatternReq> for NewRecurrencePattern {
    fn from(req: CreatePatternReq) -> Self {
        Self {
            provider_id: req.provider_id,
            service_type: req.service_type,
            date_start: req.date_start,
            date_end: req.date_end,
            weekday: req.weekday,
            time_start: req.time_start,
            time_end: req.time_end,
            slot_duration_minutes: req.slot_duration_minutes,
        }
    }
}

impl From<Block> for BlockDto {
    fn from(b: Block) -> Self {
        Self {
            id: b.id,
            provider_id: b.provider_id,
            kind: kind_label(b.kind).to_string(),
            interval_start: b.interval_start,
            interval_end: b.interval_end,
            reason: b.reason,
            created_by: b.created_by,
            created_at: b.created_at,
        }
    }
}

impl CreateBlockReq {
    /// Fails on an unknown kind label
    pub fn into_new_block(self) -> Option<NewBlock> {
        Some(NewBlock {
            provider_id: self.provider_id,
            kind: parse_kind(&self.kind)?,
            interval_start: self.interval_start,
            interval_end: self.interval_end,
            reason: self.reason,
        })
    }
}
