use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecurrencePatterns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurrencePatterns::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::ProviderId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::ServiceType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::DateStart)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurrencePatterns::DateEnd).date())
                    .col(
                        ColumnDef::new(RecurrencePatterns::Weekday)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::TimeStart)
                            .time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::TimeEnd)
                            .time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::SlotDurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::Active)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurrencePatterns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recurrence_patterns_tenant_provider")
                    .table(RecurrencePatterns::Table)
                    .col(RecurrencePatterns::TenantId)
                    .col(RecurrencePatterns::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Blocks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Blocks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Blocks::ProviderId).uuid().not_null())
                    .col(ColumnDef::new(Blocks::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Blocks::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Blocks::IntervalStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Blocks::IntervalEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Blocks::Reason).string())
                    .col(ColumnDef::new(Blocks::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Blocks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blocks_tenant_provider_start")
                    .table(Blocks::Table)
                    .col(Blocks::TenantId)
                    .col(Blocks::ProviderId)
                    .col(Blocks::IntervalStart)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Appointments::ProviderId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(Appointments::ServiceType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::IntervalStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::IntervalEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::ConfirmedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Appointments::CancelledAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Appointments::CancelledBy).uuid())
                    .col(ColumnDef::new(Appointments::CancelReason).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_tenant_provider_start")
                    .table(Appointments::Table)
                    .col(Appointments::TenantId)
                    .col(Appointments::ProviderId)
                    .col(Appointments::IntervalStart)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_tenant_student")
                    .table(Appointments::Table)
                    .col(Appointments::TenantId)
                    .col(Appointments::StudentId)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: one live appointment per provider per slot
        // start. Cancelled rows drop out so the slot can be rebooked.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_appointments_provider_slot \
                 ON appointments (provider_id, interval_start) \
                 WHERE status != 'cancelled'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuotaCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuotaCounters::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuotaCounters::StudentId).uuid().not_null())
                    .col(ColumnDef::new(QuotaCounters::CourseId).uuid().not_null())
                    .col(ColumnDef::new(QuotaCounters::TenantId).uuid().not_null())
                    .col(ColumnDef::new(QuotaCounters::Period).string().not_null())
                    .col(ColumnDef::new(QuotaCounters::Allowance).integer().not_null())
                    .col(ColumnDef::new(QuotaCounters::Consumed).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_quota_counters_key")
                    .table(QuotaCounters::Table)
                    .col(QuotaCounters::TenantId)
                    .col(QuotaCounters::StudentId)
                    .col(QuotaCounters::CourseId)
                    .col(QuotaCounters::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuotaCounters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Blocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurrencePatterns::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum RecurrencePatterns {
    Table,
    Id,
    ProviderId,
    TenantId,
    ServiceType,
    DateStart,
    DateEnd,
    Weekday,
    TimeStart,
    TimeEnd,
    SlotDurationMinutes,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Blocks {
    Table,
    Id,
    ProviderId,
    TenantId,
    Kind,
    IntervalStart,
    IntervalEnd,
    Reason,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Appointments {
    Table,
    Id,
    ProviderId,
    StudentId,
    CourseId,
    TenantId,
    ServiceType,
    IntervalStart,
    IntervalEnd,
    Status,
    CreatedAt,
    ConfirmedAt,
    CancelledAt,
    CancelledBy,
    CancelReason,
}

#[derive(DeriveIden)]
enum QuotaCounters {
    Table,
    Id,
    StudentId,
    CourseId,
    TenantId,
    Period,
    Allowance,
    Consumed,
}
