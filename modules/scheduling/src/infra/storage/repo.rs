//! SeaORM implementation of the scheduling storage ports. One
//! [`SeaOrmSchedulingTxn`] wraps one database transaction; the domain service
//! drives commit/rollback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, SqlErr, TransactionTrait};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentFilter, Block, PeriodMonth, QuotaCounter, RecurrencePattern,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{
    BlockStore, BookingStore, QuotaStore, RecurrenceStore, SchedulingStore, SchedulingTxn,
};
use crate::infra::storage::{appointment, block, mapper, pattern, quota};

fn db_err(err: DbErr) -> DomainError {
    DomainError::database(err.to_string())
}

pub struct SeaOrmSchedulingStore {
    db: DatabaseConnection,
}

impl SeaOrmSchedulingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SchedulingStore for SeaOrmSchedulingStore {
    async fn begin(&self) -> Result<Box<dyn SchedulingTxn>, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(Box::new(SeaOrmSchedulingTxn { txn }))
    }
}

pub struct SeaOrmSchedulingTxn {
    txn: DatabaseTransaction,
}

#[async_trait]
impl SchedulingTxn for SeaOrmSchedulingTxn {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.txn.commit().await.map_err(db_err)
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.txn.rollback().await.map_err(db_err)
    }
}

#[async_trait]
impl RecurrenceStore for SeaOrmSchedulingTxn {
    async fn list_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: Option<&str>,
    ) -> Result<Vec<RecurrencePattern>, DomainError> {
        let rows = pattern::find_by_provider(&self.txn, tenant_id, provider_id, service_type, false)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(mapper::pattern_to_contract).collect())
    }

    async fn list_active_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: &str,
    ) -> Result<Vec<RecurrencePattern>, DomainError> {
        let rows =
            pattern::find_by_provider(&self.txn, tenant_id, provider_id, Some(service_type), true)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(mapper::pattern_to_contract).collect())
    }

    async fn find_pattern(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecurrencePattern>, DomainError> {
        let row = pattern::find_by_id(&self.txn, tenant_id, id)
            .await
            .map_err(db_err)?;
        Ok(row.map(mapper::pattern_to_contract))
    }

    async fn insert_pattern(&self, model: &RecurrencePattern) -> Result<(), DomainError> {
        pattern::insert(&self.txn, mapper::pattern_to_entity(model))
            .await
            .map_err(db_err)
    }

    async fn deactivate_pattern(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        pattern::deactivate(&self.txn, tenant_id, id, Utc::now())
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl BlockStore for SeaOrmSchedulingTxn {
    async fn list_blocks(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Vec<Block>, DomainError> {
        let rows = block::find_by_provider(&self.txn, tenant_id, provider_id)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(mapper::block_to_contract).collect()
    }

    async fn list_blocks_overlapping(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Block>, DomainError> {
        let rows =
            block::find_overlapping(&self.txn, tenant_id, provider_id, range_start, range_end)
                .await
                .map_err(db_err)?;
        rows.into_iter().map(mapper::block_to_contract).collect()
    }

    async fn insert_block(&self, model: &Block) -> Result<(), DomainError> {
        block::insert(&self.txn, mapper::block_to_entity(model))
            .await
            .map_err(db_err)
    }

    async fn delete_block(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        block::delete(&self.txn, tenant_id, id).await.map_err(db_err)
    }
}

#[async_trait]
impl BookingStore for SeaOrmSchedulingTxn {
    async fn insert_appointment(&self, model: &Appointment) -> Result<(), DomainError> {
        appointment::insert(&self.txn, mapper::appointment_to_entity(model))
            .await
            .map_err(|err| match err.sql_err() {
                // Partial unique index on (provider, interval_start) for
                // non-cancelled rows: a concurrent booking got there first.
                Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::slot_unavailable(),
                _ => db_err(err),
            })
    }

    async fn find_appointment(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Appointment>, DomainError> {
        let row = appointment::find_by_id(&self.txn, tenant_id, id)
            .await
            .map_err(db_err)?;
        row.map(mapper::appointment_to_contract).transpose()
    }

    async fn list_appointments(
        &self,
        tenant_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, DomainError> {
        let storage_filter = appointment::Filter {
            provider_id: filter.provider_id,
            student_id: filter.student_id,
            status: filter.status.map(mapper::status_to_str),
            range_start: filter.range_start,
            range_end: filter.range_end,
        };
        let rows = appointment::find_filtered(&self.txn, tenant_id, storage_filter)
            .await
            .map_err(db_err)?;
        rows.into_iter()
            .map(mapper::appointment_to_contract)
            .collect()
    }

    async fn list_active_overlapping(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, DomainError> {
        let rows = appointment::find_active_overlapping(
            &self.txn,
            tenant_id,
            provider_id,
            range_start,
            range_end,
        )
        .await
        .map_err(db_err)?;
        rows.into_iter()
            .map(mapper::appointment_to_contract)
            .collect()
    }

    async fn update_appointment(&self, model: &Appointment) -> Result<(), DomainError> {
        appointment::update_status(&self.txn, mapper::appointment_to_entity(model))
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl QuotaStore for SeaOrmSchedulingTxn {
    async fn get_or_init_counter(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        course_id: Uuid,
        period: PeriodMonth,
        allowance: i32,
    ) -> Result<QuotaCounter, DomainError> {
        let period_key = period.to_string();
        quota::ensure(
            &self.txn,
            quota::Model {
                id: Uuid::new_v4(),
                student_id,
                course_id,
                tenant_id,
                period: period_key.clone(),
                allowance,
                consumed: 0,
            },
        )
        .await
        .map_err(db_err)?;
        let row = quota::find(&self.txn, tenant_id, student_id, course_id, &period_key)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::database("quota counter vanished after ensure"))?;
        mapper::quota_to_contract(row)
    }

    async fn try_consume(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        course_id: Uuid,
        period: PeriodMonth,
    ) -> Result<bool, DomainError> {
        quota::try_consume(
            &self.txn,
            tenant_id,
            student_id,
            course_id,
            &period.to_string(),
        )
        .await
        .map_err(db_err)
    }

    async fn release(
        &self,
        tenant_id: Uuid,
        student_id: Uuid,
        course_id: Uuid,
        period: PeriodMonth,
    ) -> Result<(), DomainError> {
        quota::release(
            &self.txn,
            tenant_id,
            student_id,
            course_id,
            &period.to_string(),
        )
        .await
        .map_err(db_err)
    }
}
