use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentFilter, AppointmentStatus, Block, BookingRequest, NewBlock,
    NewRecurrencePattern, PeriodMonth, RecurrencePattern, Slot,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{CourseConfigPort, ProviderConfigPort, SchedulingStore, SchedulingTxn};
use crate::domain::slots;

type TxnFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DomainError>> + Send + 'a>>;

/// Scheduling use cases. Each operation runs in its own storage transaction;
/// on any domain error the transaction is rolled back, so quota reservations
/// never outlive a failed booking.
pub struct SchedulingService {
    store: Arc<dyn SchedulingStore>,
    provider_config: Arc<dyn ProviderConfigPort>,
    course_config: Arc<dyn CourseConfigPort>,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn SchedulingStore>,
        provider_config: Arc<dyn ProviderConfigPort>,
        course_config: Arc<dyn CourseConfigPort>,
    ) -> Self {
        Self {
            store,
            provider_config,
            course_config,
        }
    }

    async fn run_txn<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: for<'a> FnOnce(&'a dyn SchedulingTxn) -> TxnFuture<'a, T>,
    {
        let txn = self.store.begin().await?;
        let result = f(txn.as_ref()).await;
        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(err) => {
                // Surface the original error even if rollback also fails.
                if let Err(rb) = txn.rollback().await {
                    debug!(error = %rb, "Transaction rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Available slots of one service type for a provider over `[from, to]`
    /// (dates inclusive): pattern expansion minus blocks and non-cancelled
    /// appointments, with slots inside the minimum lead window dropped.
    #[instrument(skip(self))]
    pub async fn list_slots(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Slot>, DomainError> {
        if from > to {
            return Err(DomainError::validation("to", "window end before start"));
        }
        let settings = self
            .provider_config
            .provider_settings(tenant_id, provider_id)
            .await?;
        let min_start = Utc::now() + Duration::minutes(settings.minimum_lead_minutes);
        let service_type = service_type.to_owned();

        self.run_txn(|txn| {
            Box::pin(async move {
                let patterns = txn
                    .list_active_patterns(tenant_id, provider_id, &service_type)
                    .await?;
                let grid = slots::candidate_grid(&patterns, from, to);
                if grid.is_empty() {
                    return Ok(Vec::new());
                }
                let busy = busy_intervals(txn, tenant_id, provider_id, from, to).await?;
                Ok(slots::filter_available(&grid, &busy, min_start))
            })
        })
        .await
    }

    /// Book one slot. Re-derives the day's grid inside the transaction, so a
    /// stale client request cannot book an interval that stopped existing.
    #[instrument(skip(self, request), fields(provider_id = %request.provider_id, student_id = %request.student_id))]
    pub async fn book(
        &self,
        tenant_id: Uuid,
        request: BookingRequest,
    ) -> Result<Appointment, DomainError> {
        if request.interval_start >= request.interval_end {
            return Err(DomainError::validation(
                "interval_end",
                "must be after interval_start",
            ));
        }
        let settings = self
            .provider_config
            .provider_settings(tenant_id, request.provider_id)
            .await?;
        let allowance = self
            .course_config
            .monthly_allowance(tenant_id, request.course_id)
            .await?;
        let now = Utc::now();
        let min_start = now + Duration::minutes(settings.minimum_lead_minutes);
        let day = request.interval_start.date_naive();
        let requested = Slot {
            start: request.interval_start,
            end: request.interval_end,
        };
        let period = PeriodMonth::containing(request.interval_start);

        self.run_txn(|txn| {
            Box::pin(async move {
                let patterns = txn
                    .list_active_patterns(tenant_id, request.provider_id, &request.service_type)
                    .await?;
                let grid = slots::candidate_grid(&patterns, day, day);
                if !grid.contains(&requested) {
                    return Err(DomainError::invalid_interval());
                }
                let busy = busy_intervals(txn, tenant_id, request.provider_id, day, day).await?;
                let available = slots::filter_available(&grid, &busy, min_start);
                if !available.contains(&requested) {
                    return Err(DomainError::slot_unavailable());
                }

                txn.get_or_init_counter(
                    tenant_id,
                    request.student_id,
                    request.course_id,
                    period,
                    allowance,
                )
                .await?;
                let consumed = txn
                    .try_consume(tenant_id, request.student_id, request.course_id, period)
                    .await?;
                if !consumed {
                    return Err(DomainError::quota_exceeded(
                        request.student_id,
                        request.course_id,
                    ));
                }

                let appointment = Appointment {
                    id: Uuid::new_v4(),
                    provider_id: request.provider_id,
                    student_id: request.student_id,
                    course_id: request.course_id,
                    tenant_id,
                    service_type: request.service_type,
                    interval_start: request.interval_start,
                    interval_end: request.interval_end,
                    status: if settings.auto_confirm {
                        AppointmentStatus::Confirmed
                    } else {
                        AppointmentStatus::Pending
                    },
                    created_at: now,
                    confirmed_at: settings.auto_confirm.then_some(now),
                    cancelled_at: None,
                    cancelled_by: None,
                    cancel_reason: None,
                };
                // Unique index on (provider, interval_start) backstops the
                // availability check against concurrent writers.
                txn.insert_appointment(&appointment).await?;
                info!(appointment_id = %appointment.id, status = ?appointment.status, "Appointment booked");
                Ok(appointment)
            })
        })
        .await
    }

    /// Cancel an appointment, releasing the quota unit it consumed in the
    /// month of its original interval. Cancelling twice is an error.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> Result<Appointment, DomainError> {
        let now = Utc::now();
        self.run_txn(|txn| {
            Box::pin(async move {
                let mut appointment = txn
                    .find_appointment(tenant_id, appointment_id)
                    .await?
                    .ok_or_else(|| DomainError::appointment_not_found(appointment_id))?;
                if appointment.status == AppointmentStatus::Cancelled {
                    return Err(DomainError::already_cancelled(appointment_id));
                }
                let period = PeriodMonth::containing(appointment.interval_start);
                txn.release(
                    tenant_id,
                    appointment.student_id,
                    appointment.course_id,
                    period,
                )
                .await?;

                appointment.status = AppointmentStatus::Cancelled;
                appointment.cancelled_at = Some(now);
                appointment.cancelled_by = Some(cancelled_by);
                appointment.cancel_reason = reason;
                txn.update_appointment(&appointment).await?;
                info!(appointment_id = %appointment.id, "Appointment cancelled");
                Ok(appointment)
            })
        })
        .await
    }

    /// Move a pending appointment to confirmed. Confirming an already
    /// confirmed appointment is a no-op; a cancelled one is gone for good.
    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, DomainError> {
        let now = Utc::now();
        self.run_txn(|txn| {
            Box::pin(async move {
                let mut appointment = txn
                    .find_appointment(tenant_id, appointment_id)
                    .await?
                    .ok_or_else(|| DomainError::appointment_not_found(appointment_id))?;
                match appointment.status {
                    AppointmentStatus::Cancelled => {
                        Err(DomainError::already_cancelled(appointment_id))
                    }
                    AppointmentStatus::Confirmed => Ok(appointment),
                    AppointmentStatus::Pending => {
                        appointment.status = AppointmentStatus::Confirmed;
                        appointment.confirmed_at = Some(now);
                        txn.update_appointment(&appointment).await?;
                        Ok(appointment)
                    }
                }
            })
        })
        .await
    }

    pub async fn get_appointment(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, DomainError> {
        self.run_txn(|txn| {
            Box::pin(async move {
                txn.find_appointment(tenant_id, appointment_id)
                    .await?
                    .ok_or_else(|| DomainError::appointment_not_found(appointment_id))
            })
        })
        .await
    }

    pub async fn list_appointments(
        &self,
        tenant_id: Uuid,
        filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>, DomainError> {
        self.run_txn(|txn| Box::pin(async move { txn.list_appointments(tenant_id, &filter).await }))
            .await
    }

    pub async fn list_patterns(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
        service_type: Option<&str>,
    ) -> Result<Vec<RecurrencePattern>, DomainError> {
        let service_type = service_type.map(str::to_owned);
        self.run_txn(|txn| {
            Box::pin(async move {
                txn.list_patterns(tenant_id, provider_id, service_type.as_deref())
                    .await
            })
        })
        .await
    }

    #[instrument(skip(self, new_pattern), fields(provider_id = %new_pattern.provider_id))]
    pub async fn create_pattern(
        &self,
        tenant_id: Uuid,
        new_pattern: NewRecurrencePattern,
    ) -> Result<RecurrencePattern, DomainError> {
        if new_pattern.weekday > 6 {
            return Err(DomainError::validation(
                "weekday",
                "must be 0..=6 (0 = Sunday)",
            ));
        }
        if new_pattern.time_start >= new_pattern.time_end {
            return Err(DomainError::validation(
                "time_end",
                "must be after time_start",
            ));
        }
        if new_pattern
            .date_end
            .is_some_and(|end| end < new_pattern.date_start)
        {
            return Err(DomainError::validation(
                "date_end",
                "must not precede date_start",
            ));
        }
        let settings = self
            .provider_config
            .provider_settings(tenant_id, new_pattern.provider_id)
            .await?;
        let duration = new_pattern
            .slot_duration_minutes
            .unwrap_or(settings.default_slot_duration_minutes);
        if duration <= 0 {
            return Err(DomainError::validation(
                "slot_duration_minutes",
                "must be positive",
            ));
        }
        let now = Utc::now();
        let pattern = RecurrencePattern {
            id: Uuid::new_v4(),
            provider_id: new_pattern.provider_id,
            tenant_id,
            service_type: new_pattern.service_type,
            date_start: new_pattern.date_start,
            date_end: new_pattern.date_end,
            weekday: new_pattern.weekday,
            time_start: new_pattern.time_start,
            time_end: new_pattern.time_end,
            slot_duration_minutes: duration,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.run_txn(|txn| {
            Box::pin(async move {
                txn.insert_pattern(&pattern).await?;
                Ok(pattern)
            })
        })
        .await
    }

    /// Deactivation keeps the row so existing appointments keep their
    /// provenance; the pattern just stops producing slots.
    #[instrument(skip(self))]
    pub async fn deactivate_pattern(
        &self,
        tenant_id: Uuid,
        pattern_id: Uuid,
    ) -> Result<(), DomainError> {
        self.run_txn(|txn| {
            Box::pin(async move {
                if txn.deactivate_pattern(tenant_id, pattern_id).await? {
                    Ok(())
                } else {
                    Err(DomainError::pattern_not_found(pattern_id))
                }
            })
        })
        .await
    }

    pub async fn list_blocks(
        &self,
        tenant_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Vec<Block>, DomainError> {
        self.run_txn(|txn| Box::pin(async move { txn.list_blocks(tenant_id, provider_id).await }))
            .await
    }

    #[instrument(skip(self, new_block), fields(provider_id = %new_block.provider_id))]
    pub async fn create_block(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        new_block: NewBlock,
    ) -> Result<Block, DomainError> {
        if new_block.interval_start >= new_block.interval_end {
            return Err(DomainError::validation(
                "interval_end",
                "must be after interval_start",
            ));
        }
        let block = Block {
            id: Uuid::new_v4(),
            provider_id: new_block.provider_id,
            tenant_id,
            kind: new_block.kind,
            interval_start: new_block.interval_start,
            interval_end: new_block.interval_end,
            reason: new_block.reason,
            created_by,
            created_at: Utc::now(),
        };
        self.run_txn(|txn| {
            Box::pin(async move {
                txn.insert_block(&block).await?;
                Ok(block)
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_block(&self, tenant_id: Uuid, block_id: Uuid) -> Result<(), DomainError> {
        self.run_txn(|txn| {
            Box::pin(async move {
                if txn.delete_block(tenant_id, block_id).await? {
                    Ok(())
                } else {
                    Err(DomainError::block_not_found(block_id))
                }
            })
        })
        .await
    }
}

async fn busy_intervals(
    txn: &dyn SchedulingTxn,
    tenant_id: Uuid,
    provider_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, DomainError> {
    let range_start = from.and_time(NaiveTime::MIN).and_utc();
    let range_end = range_start + Duration::days((to - from).num_days() + 1);
    let blocks = txn
        .list_blocks_overlapping(tenant_id, provider_id, range_start, range_end)
        .await?;
    let appointments = txn
        .list_active_overlapping(tenant_id, provider_id, range_start, range_end)
        .await?;
    let mut busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocks
        .into_iter()
        .map(|b| (b.interval_start, b.interval_end))
        .collect();
    busy.extend(
        appointments
            .into_iter()
            .map(|a| (a.interval_start, a.interval_end)),
    );
    Ok(busy)
}
