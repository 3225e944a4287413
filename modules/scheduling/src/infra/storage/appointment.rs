use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub tenant_id: Uuid,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Filter values already lowered to storage representation
#[derive(Debug, Default)]
pub struct Filter {
    pub provider_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub status: Option<&'static str>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id)
        .filter(Column::TenantId.eq(tenant_id))
        .one(db)
        .await
}

pub async fn find_filtered<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    filter: Filter,
) -> Result<Vec<Model>, DbErr> {
    let mut query = Entity::find().filter(Column::TenantId.eq(tenant_id));
    if let Some(provider_id) = filter.provider_id {
        query = query.filter(Column::ProviderId.eq(provider_id));
    }
    if let Some(student_id) = filter.student_id {
        query = query.filter(Column::StudentId.eq(student_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status));
    }
    if let Some(range_start) = filter.range_start {
        query = query.filter(Column::IntervalEnd.gt(range_start));
    }
    if let Some(range_end) = filter.range_end {
        query = query.filter(Column::IntervalStart.lt(range_end));
    }
    query.order_by_asc(Column::IntervalStart).all(db).await
}

/// Non-cancelled appointments overlapping `[range_start, range_end)`
pub async fn find_active_overlapping<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    provider_id: Uuid,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::ProviderId.eq(provider_id))
        .filter(Column::Status.ne(STATUS_CANCELLED))
        .filter(Column::IntervalStart.lt(range_end))
        .filter(Column::IntervalEnd.gt(range_start))
        .order_by_asc(Column::IntervalStart)
        .all(db)
        .await
}

pub async fn insert<C: ConnectionTrait>(db: &C, model: Model) -> Result<(), DbErr> {
    let active_model = ActiveModel {
        id: Set(model.id),
        provider_id: Set(model.provider_id),
        student_id: Set(model.student_id),
        course_id: Set(model.course_id),
        tenant_id: Set(model.tenant_id),
        service_type: Set(model.service_type),
        interval_start: Set(model.interval_start),
        interval_end: Set(model.interval_end),
        status: Set(model.status),
        created_at: Set(model.created_at),
        confirmed_at: Set(model.confirmed_at),
        cancelled_at: Set(model.cancelled_at),
        cancelled_by: Set(model.cancelled_by),
        cancel_reason: Set(model.cancel_reason),
    };
    active_model.insert(db).await?;
    Ok(())
}

/// Persist a status transition and its audit columns
pub async fn update_status<C: ConnectionTrait>(db: &C, model: Model) -> Result<(), DbErr> {
    let active_model = ActiveModel {
        id: Set(model.id),
        status: Set(model.status),
        confirmed_at: Set(model.confirmed_at),
        cancelled_at: Set(model.cancelled_at),
        cancelled_by: Set(model.cancelled_by),
        cancel_reason: Set(model.cancel_reason),
        ..Default::default()
    };
    active_model.update(db).await?;
    Ok(())
}
