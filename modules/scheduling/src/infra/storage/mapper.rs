use crate::contract::model::{
    Appointment, AppointmentStatus, Block, BlockKind, PeriodMonth, QuotaCounter,
    RecurrencePattern,
};
use crate::domain::error::DomainError;
use crate::infra::storage::{appointment, block, pattern, quota};

pub fn status_to_str(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => appointment::STATUS_PENDING,
        AppointmentStatus::Confirmed => appointment::STATUS_CONFIRMED,
        AppointmentStatus::Cancelled => appointment::STATUS_CANCELLED,
    }
}

pub fn status_from_str(value: &str) -> Result<AppointmentStatus, DomainError> {
    match value {
        appointment::STATUS_PENDING => Ok(AppointmentStatus::Pending),
        appointment::STATUS_CONFIRMED => Ok(AppointmentStatus::Confirmed),
        appointment::STATUS_CANCELLED => Ok(AppointmentStatus::Cancelled),
        other => Err(DomainError::database(format!(
            "unknown appointment status '{other}'"
        ))),
    }
}

pub fn kind_to_str(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Planned => "planned",
        BlockKind::Incident => "incident",
    }
}

pub fn kind_from_str(value: &str) -> Result<BlockKind, DomainError> {
    match value {
        "planned" => Ok(BlockKind::Planned),
        "incident" => Ok(BlockKind::Incident),
        other => Err(DomainError::database(format!("unknown block kind '{other}'"))),
    }
}

fn period_from_str(value: &str) -> Result<PeriodMonth, DomainError> {
    let parsed = value
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)));
    match parsed {
        Some((year, month)) if (1..=12).contains(&month) => Ok(PeriodMonth { year, month }),
        _ => Err(DomainError::database(format!(
            "malformed quota period '{value}'"
        ))),
    }
}

/// Convert a database entity to a contract model
pub fn pattern_to_contract(entity: pattern::Model) -> RecurrencePattern {
    RecurrencePattern {
        id: entity.id,
        provider_id: entity.provider_id,
        tenant_id: entity.tenant_id,
        service_type: entity.service_type,
        date_start: entity.date_start,
        date_end: entity.date_end,
        weekday: entity.weekday as u8,
        time_start: entity.time_start,
        time_end: entity.time_end,
        slot_duration_minutes: entity.slot_duration_minutes,
        active: entity.active,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

pub fn pattern_to_entity(model: &RecurrencePattern) -> pattern::Model {
    pattern::Model {
        id: model.id,
        provider_id: model.provider_id,
        tenant_id: model.tenant_id,
        service_type: model.service_type.clone(),
        date_start: model.date_start,
        date_end: model.date_end,
        weekday: model.weekday as i16,
        time_start: model.time_start,
        time_end: model.time_end,
        slot_duration_minutes: model.slot_duration_minutes,
        active: model.active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn block_to_contract(entity: block::Model) -> Result<Block, DomainError> {
    Ok(Block {
        id: entity.id,
        provider_id: entity.provider_id,
        tenant_id: entity.tenant_id,
        kind: kind_from_str(&entity.kind)?,
        interval_start: entity.interval_start,
        interval_end: entity.interval_end,
        reason: entity.reason,
        created_by: entity.created_by,
        created_at: entity.created_at,
    })
}

pub fn block_to_entity(model: &Block) -> block::Model {
    block::Model {
        id: model.id,
        provider_id: model.provider_id,
        tenant_id: model.tenant_id,
        kind: kind_to_str(model.kind).to_string(),
        interval_start: model.interval_start,
        interval_end: model.interval_end,
        reason: model.reason.clone(),
        created_by: model.created_by,
        created_at: model.created_at,
    }
}

pub fn appointment_to_contract(entity: appointment::Model) -> Result<Appointment, DomainError> {
    Ok(Appointment {
        id: entity.id,
        provider_id: entity.provider_id,
        student_id: entity.student_id,
        course_id: entity.course_id,
        tenant_id: entity.tenant_id,
        service_type: entity.service_type,
        interval_start: entity.interval_start,
        interval_end: entity.interval_end,
        status: status_from_str(&entity.status)?,
        created_at: entity.created_at,
        confirmed_at: entity.confirmed_at,
        cancelled_at: entity.cancelled_at,
        cancelled_by: entity.cancelled_by,
        cancel_reason: entity.cancel_reason,
    })
}

pub fn appointment_to_entity(model: &Appointment) -> appointment::Model {
    appointment::Model {
        id: model.id,
        provider_id: model.provider_id,
        student_id: model.student_id,
        course_id: model.course_id,
        tenant_id: model.tenant_id,
        service_type: model.service_type.clone(),
        interval_start: model.interval_start,
        interval_end: model.interval_end,
        status: status_to_str(model.status).to_string(),
        created_at: model.created_at,
        confirmed_at: model.confirmed_at,
        cancelled_at: model.cancelled_at,
        cancelled_by: model.cancelled_by,
        cancel_reason: model.cancel_reason.clone(),
    }
}

pub fn quota_to_contract(entity: quota::Model) -> Result<QuotaCounter, DomainError> {
    Ok(QuotaCounter {
        id: entity.id,
        student_id: entity.student_id,
        course_id: entity.course_id,
        tenant_id: entity.tenant_id,
        period: period_from_str(&entity.period)?,
        allowance: entity.allowance,
        consumed: entity.consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(status_from_str(status_to_str(status)).unwrap(), status);
        }
        assert!(status_from_str("bogus").is_err());
    }

    #[test]
    fn period_parses_display_format() {
        let period = PeriodMonth {
            year: 2025,
            month: 6,
        };
        assert_eq!(period.to_string(), "2025-06");
        assert_eq!(period_from_str("2025-06").unwrap(), period);
        assert!(period_from_str("2025-13").is_err());
        assert!(period_from_str("junk").is_err());
    }
}
