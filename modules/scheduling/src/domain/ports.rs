//! Outbound ports for the scheduling domain. Storage runs everything inside
//! a transaction handed out by [`SchedulingStore::begin`]; the service decides
//! when to commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentFilter, Block, PeriodMonth, QuotaCounter, RecurrencePattern,
};
use crate::domain::error::DomainError;

/// Entry point to storage: every unit of work gets its own transaction.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn SchedulingTxn>, DomainError>;
}

/// One open transaction spanning all scheduling tables.
#[async_trait]
pub trait SchedulingTxn:
    RecurrenceStore + BlockStore + BookingStore + QuotaStore + Send + Sync
{
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

#[async_trait]
pub trait RecurrenceStore {
    async fn list_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: Option<&str>,
    ) -> Result<Vec<RecurrencePattern>, DomainError>;

    /// Only `active = true` rows of one service type; what slot generation
    /// feeds on. Patterns of other service types never mix into a grid.
    async fn list_active_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: &str,
    ) -> Result<Vec<RecurrencePattern>, DomainError>;

    async fn find_pattern(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecurrencePattern>, DomainError>;

    async fn insert_pattern(&self, pattern: &RecurrencePattern) -> Result<(), DomainError>;

    /// Returns false when the pattern does not exist in this tenant.
    async fn deactivate_pattern(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait BlockStore {
    async fn list_blocks(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Vec<Block>, DomainError>;

    async fn list_blocks_overlapping(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Block>, DomainError>;

    async fn insert_block(&self, block: &Block) -> Result<(), DomainError>;

    async fn delete_block(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait BookingStore {
    /// Maps a unique-index violation on (provider, interval_start) to
    /// [`DomainError::SlotUnavailable`].
    async fn insert_appointment(&self, appointment: &Appointment) -> Result<(), DomainError>;

    async fn find_appointment(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Appointment>, DomainError>;

    async fn list_appointments(
        &self,
        tenant_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, DomainError>;

    /// Non-cancelled appointments overlapping the given range.
    async fn list_active_overlapping(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, DomainError>;

    async fn update_appointment(&self, appointment: &Appointment) -> Result<(), DomainError>;
}

#[async_trait]
pub trait QuotaStore {
    /// Makes sure a counter row exists for the period, creating it with the
    /// given allowance if missing, and returns the current row.
    async fn get_or_init_counter(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        course_id: Uuid,
        period: PeriodMonth,
        allowance: i32,
    ) -> Result<QuotaCounter, DomainError>;

    /// Atomically increments `consumed` if it is still below `allowance`.
    /// Returns false when the quota is exhausted.
    async fn try_consume(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        course_id: Uuid,
        period: PeriodMonth,
    ) -> Result<bool, DomainError>;

    /// Decrements `consumed`, flooring at zero. Missing counters are a no-op.
    async fn release(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        course_id: Uuid,
        period: PeriodMonth,
    ) -> Result<(), DomainError>;
}

/// Per-provider booking policy. The default implementation reads module
/// config; deployments with per-provider settings plug in their own.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSettings {
    pub minimum_lead_minutes: i64,
    pub auto_confirm: bool,
    pub default_slot_duration_minutes: i32,
}

#[async_trait]
pub trait ProviderConfigPort: Send + Sync {
    async fn provider_settings(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
    ) -> Result<ProviderSettings, DomainError>;
}

#[async_trait]
pub trait CourseConfigPort: Send + Sync {
    /// Monthly appointment allowance for a course. Zero refuses all bookings.
    async fn monthly_allowance(
        &self,
        tenant_id: Uuid,
        course_id: Uuid,
    ) -> Result<i32, DomainError>;
}
