use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::SchedulingApi,
    error::SchedulingError,
    model::{
        Appointment, AppointmentFilter, Block, BookingRequest, NewBlock, NewRecurrencePattern,
        RecurrencePattern, Slot,
    },
};
use crate::domain::{error::DomainError, service::SchedulingService};

/// Local implementation of the SchedulingApi trait that delegates to the domain service
pub struct SchedulingLocalClient {
    service: Arc<SchedulingService>,
}

impl SchedulingLocalClient {
    pub fn new(service: Arc<SchedulingService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SchedulingApi for SchedulingLocalClient {
    async fn list_slots(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<Slot>> {
        self.service
            .list_slots(tenant_id, provider_id, service_type, from, to)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn book(&self, tenant_id: Uuid, request: BookingRequest) -> anyhow::Result<Appointment> {
        self.service
            .book(tenant_id, request)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn cancel(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> anyhow::Result<Appointment> {
        self.service
            .cancel(tenant_id, appointment_id, cancelled_by, reason)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn confirm(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
    ) -> anyhow::Result<Appointment> {
        self.service
            .confirm(tenant_id, appointment_id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn get_appointment(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
    ) -> anyhow::Result<Appointment> {
        self.service
            .get_appointment(tenant_id, appointment_id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn list_appointments(
        &self,
        tenant_id: Uuid,
        filter: AppointmentFilter,
    ) -> anyhow::Result<Vec<Appointment>> {
        self.service
            .list_appointments(tenant_id, filter)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn list_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: Option<&str>,
    ) -> anyhow::Result<Vec<RecurrencePattern>> {
        self.service
            .list_patterns(tenant_id, provider_id, service_type)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn create_pattern(
        &self,
        tenant_id: Uuid,
        pattern: NewRecurrencePattern,
    ) -> anyhow::Result<RecurrencePattern> {
        self.service
            .create_pattern(tenant_id, pattern)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn deactivate_pattern(&self, tenant_id: Uuid, pattern_id: Uuid) -> anyhow::Result<()> {
        self.service
            .deactivate_pattern(tenant_id, pattern_id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn list_blocks(&self, tenant_id: Uuid, provider_id: Uuid) -> anyhow::Result<Vec<Block>> {
        self.service
            .list_blocks(tenant_id, provider_id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn create_block(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        block: NewBlock,
    ) -> anyhow::Result<Block> {
        self.service
            .create_block(tenant_id, created_by, block)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn delete_block(&self, tenant_id: Uuid, block_id: Uuid) -> anyhow::Result<()> {
        self.service
            .delete_block(tenant_id, block_id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn map_domain_error_to_anyhow(domain_error: DomainError) -> anyhow::Error {
    let contract_error = match domain_error {
        DomainError::AppointmentNotFound { id } => SchedulingError::not_found(id),
        DomainError::PatternNotFound { id } | DomainError::BlockNotFound { id } => {
            SchedulingError::not_found(id)
        }
        DomainError::InvalidInterval => SchedulingError::invalid_interval(),
        DomainError::SlotUnavailable => SchedulingError::slot_unavailable(),
        DomainError::QuotaExceeded { .. } => SchedulingError::quota_exceeded(),
        DomainError::AlreadyCancelled { id } => SchedulingError::already_cancelled(id),
        DomainError::Validation { field, message } => {
            SchedulingError::validation(format!("{field}: {message}"))
        }
        DomainError::Database { .. } => SchedulingError::internal(),
    };

    anyhow::Error::new(contract_error)
}
