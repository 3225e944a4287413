use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub tenant_id: Uuid,
    /// "planned" or "incident"
    pub kind: String,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_provider<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    provider_id: Uuid,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::ProviderId.eq(provider_id))
        .order_by_asc(Column::IntervalStart)
        .all(db)
        .await
}

/// Blocks overlapping `[range_start, range_end)` (half-open)
pub async fn find_overlapping<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    provider_id: Uuid,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::ProviderId.eq(provider_id))
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
        tenant_id: Set(model.tenant_id),
        kind: Set(model.kind),
        interval_start: Set(model.interval_start),
        interval_end: Set(model.interval_end),
        reason: Set(model.reason),
        created_by: Set(model.created_by),
        created_at: Set(model.created_at),
    };
    active_model.insert(db).await?;
    Ok(())
}

/// Delete a block by ID, returns true if a row was deleted
pub async fn delete<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<bool, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
