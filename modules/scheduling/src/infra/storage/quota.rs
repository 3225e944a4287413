use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quota_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub tenant_id: Uuid,
    /// Calendar month as "YYYY-MM"
    pub period: String,
    pub allowance: i32,
    pub consumed: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn keyed(
    tenant_id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    period: &str,
) -> Select<Entity> {
    Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::CourseId.eq(course_id))
        .filter(Column::Period.eq(period))
}

pub async fn find<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    period: &str,
) -> Result<Option<Model>, DbErr> {
    keyed(tenant_id, student_id, course_id, period).one(db).await
}

/// Insert the period's counter if missing; a concurrent insert of the same
/// key is fine and ignored.
pub async fn ensure<C: ConnectionTrait>(db: &C, model: Model) -> Result<(), DbErr> {
    let active_model = ActiveModel {
        id: Set(model.id),
        student_id: Set(model.student_id),
        course_id: Set(model.course_id),
        tenant_id: Set(model.tenant_id),
        period: Set(model.period),
        allowance: Set(model.allowance),
        consumed: Set(model.consumed),
    };
    let result = Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([
                Column::TenantId,
                Column::StudentId,
                Column::CourseId,
                Column::Period,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(db)
        .await;
    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(err) => Err(err),
    }
}

/// `consumed += 1` guarded by `consumed < allowance`; false when exhausted
pub async fn try_consume<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    period: &str,
) -> Result<bool, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Consumed, Expr::col(Column::Consumed).add(1))
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::CourseId.eq(course_id))
        .filter(Column::Period.eq(period))
        .filter(Expr::col(Column::Consumed).lt(Expr::col(Column::Allowance)))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// `consumed -= 1` floored at zero; a missing counter is a no-op
pub async fn release<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    period: &str,
) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::Consumed, Expr::col(Column::Consumed).sub(1))
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::CourseId.eq(course_id))
        .filter(Column::Period.eq(period))
        .filter(Column::Consumed.gt(0))
        .exec(db)
        .await?;
    Ok(())
}
