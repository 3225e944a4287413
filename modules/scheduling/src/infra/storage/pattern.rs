use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurrence_patterns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub tenant_id: Uuid,
    pub service_type: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: i16,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub slot_duration_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Find a provider's patterns, optionally narrowed to one service type
pub async fn find_by_provider<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    provider_id: Uuid,
    service_type: Option<&str>,
    only_active: bool,
) -> Result<Vec<Model>, DbErr> {
    let mut query = Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::ProviderId.eq(provider_id));
    if let Some(service_type) = service_type {
        query = query.filter(Column::ServiceType.eq(service_type));
    }
    if only_active {
        query = query.filter(Column::Active.eq(true));
    }
    query
        .order_by_asc(Column::Weekday)
        .order_by_asc(Column::TimeStart)
        .all(db)
        .await
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

pub async fn insert<C: ConnectionTrait>(db: &C, model: Model) -> Result<(), DbErr> {
    let active_model = ActiveModel {
        id: Set(model.id),
        provider_id: Set(model.provider_id),
        tenant_id: Set(model.tenant_id),
        service_type: Set(model.service_type),
        date_start: Set(model.date_start),
        date_end: Set(model.date_end),
        weekday: Set(model.weekday),
        time_start: Set(model.time_start),
        time_end: Set(model.time_end),
        slot_duration_minutes: Set(model.slot_duration_minutes),
        active: Set(model.active),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    };
    active_model.insert(db).await?;
    Ok(())
}

/// Flip `active` off, returns true when the row existed
pub async fn deactivate<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
    updated_at: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Active, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(updated_at))
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
