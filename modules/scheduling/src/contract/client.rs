use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentFilter, Block, BookingRequest, NewBlock, NewRecurrencePattern,
    RecurrencePattern, Slot,
};

/// Public API trait for the scheduling module that other modules can use
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    /// List bookable slots of one service type for a provider over a date window
    async fn list_slots(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<Slot>>;

    /// Book a slot for a student, consuming one unit of monthly quota
    async fn book(&self, tenant_id: Uuid, request: BookingRequest) -> anyhow::Result<Appointment>;

    /// Cancel an appointment and release its quota unit
    async fn cancel(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> anyhow::Result<Appointment>;

    /// Confirm a pending appointment
    async fn confirm(&self, tenant_id: Uuid, appointment_id: Uuid)
        -> anyhow::Result<Appointment>;

    /// Get an appointment by ID
    async fn get_appointment(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
    ) -> anyhow::Result<Appointment>;

    /// List appointments matching a filter
    async fn list_appointments(
        &self,
        tenant_id: Uuid,
        filter: AppointmentFilter,
    ) -> anyhow::Result<Vec<Appointment>>;

    /// List a provider's recurrence patterns, optionally for one service type
    async fn list_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: Option<&str>,
    ) -> anyhow::Result<Vec<RecurrencePattern>>;

    /// Create a recurrence pattern
    async fn create_pattern(
        &self,
        tenant_id: Uuid,
        pattern: NewRecurrencePattern,
    ) -> anyhow::Result<RecurrencePattern>;

    /// Deactivate a recurrence pattern
    async fn deactivate_pattern(&self, tenant_id: Uuid, pattern_id: Uuid) -> anyhow::Result<()>;

    /// List a provider's blocks
    async fn list_blocks(&self, tenant_id: Uuid, provider_id: Uuid) -> anyhow::Result<Vec<Block>>;

    /// Create a block
    async fn create_block(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        block: NewBlock,
    ) -> anyhow::Result<Block>;

    /// Delete a block
    async fn delete_block(&self, tenant_id: Uuid, block_id: Uuid) -> anyhow::Result<()>;
}
