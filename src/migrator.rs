use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_table::Migration),
            Box::new(m20240301_000002_create_farms_table::Migration),
            Box::new(m20240301_000003_create_batches_table::Migration),
            Box::new(m20240301_000004_create_batch_updates_table::Migration),
            Box::new(m20240301_000005_create_analytics_snapshots_table::Migration),
        ]
    }
}

mod m20240301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                        .col(ColumnDef::new(Users::Phone).string().null())
                        .col(ColumnDef::new(Users::FarmId).uuid().null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_role")
                        .table(Users::Table)
                        .col(Users::Role)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        Phone,
        FarmId,
        IsActive,
        LastLogin,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_farms_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_farms_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Farms::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Farms::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Farms::Name).string().not_null())
                        .col(ColumnDef::new(Farms::FarmCode).string().not_null().unique_key())
                        .col(ColumnDef::new(Farms::OwnerId).uuid().not_null())
                        .col(ColumnDef::new(Farms::Location).json().not_null())
                        .col(ColumnDef::new(Farms::Contact).json().not_null())
                        .col(ColumnDef::new(Farms::Certifications).json().not_null())
                        .col(
                            ColumnDef::new(Farms::SheepCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Farms::Description).text().null())
                        .col(ColumnDef::new(Farms::ApprovalStatus).string_len(16).not_null())
                        .col(ColumnDef::new(Farms::ApprovedBy).uuid().null())
                        .col(ColumnDef::new(Farms::ApprovedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Farms::RejectionReason).string().null())
                        .col(
                            ColumnDef::new(Farms::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Farms::TotalBatches)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Farms::TotalWoolProduced)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(ColumnDef::new(Farms::LastBatchDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Farms::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Farms::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_farms_approval_status")
                        .table(Farms::Table)
                        .col(Farms::ApprovalStatus)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Farms::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Farms {
        Table,
        Id,
        Name,
        FarmCode,
        OwnerId,
        Location,
        Contact,
        Certifications,
        SheepCount,
        Description,
        ApprovalStatus,
        ApprovedBy,
        ApprovedAt,
        RejectionReason,
        IsActive,
        TotalBatches,
        TotalWoolProduced,
        LastBatchDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_batches_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_batches_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Batches::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Batches::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Batches::BatchCode).string_len(24).not_null().unique_key())
                        .col(ColumnDef::new(Batches::FarmId).uuid().not_null())
                        .col(ColumnDef::new(Batches::FarmName).string().not_null())
                        .col(ColumnDef::new(Batches::WeightValue).double().not_null())
                        .col(ColumnDef::new(Batches::WeightUnit).string_len(8).not_null())
                        .col(ColumnDef::new(Batches::ShearingDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Batches::QualityMetrics).json().not_null())
                        .col(ColumnDef::new(Batches::CurrentStage).string_len(32).not_null())
                        .col(ColumnDef::new(Batches::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Batches::CurrentLocation).json().not_null())
                        .col(ColumnDef::new(Batches::CurrentProcessor).json().null())
                        .col(ColumnDef::new(Batches::Certifications).json().not_null())
                        .col(ColumnDef::new(Batches::QualityIssues).json().not_null())
                        .col(ColumnDef::new(Batches::Documents).json().not_null())
                        .col(ColumnDef::new(Batches::Timeline).json().not_null())
                        .col(
                            ColumnDef::new(Batches::EstimatedCompletionDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Batches::ActualCompletionDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Batches::ProcessingDuration).big_integer().null())
                        .col(ColumnDef::new(Batches::RevenueEstimate).json().null())
                        .col(ColumnDef::new(Batches::Notes).text().null())
                        .col(
                            ColumnDef::new(Batches::IsPubliclyVisible)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Batches::TotalUpdates)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Batches::LastUpdateDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Batches::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Batches::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Batches::UpdatedAt).timestamp_with_time_zone().not_null())
                        .col(
                            ColumnDef::new(Batches::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batches_farm_id")
                                .from(Batches::Table, Batches::FarmId)
                                .to(Farms::Table, Farms::Id),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, column) in [
                ("idx_batches_farm_id", Batches::FarmId),
                ("idx_batches_current_stage", Batches::CurrentStage),
                ("idx_batches_status", Batches::Status),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(Batches::Table)
                            .col(column)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Batches::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Farms {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Batches {
        Table,
        Id,
        BatchCode,
        FarmId,
        FarmName,
        WeightValue,
        WeightUnit,
        ShearingDate,
        QualityMetrics,
        CurrentStage,
        Status,
        CurrentLocation,
        CurrentProcessor,
        Certifications,
        QualityIssues,
        Documents,
        Timeline,
        EstimatedCompletionDate,
        ActualCompletionDate,
        ProcessingDuration,
        RevenueEstimate,
        Notes,
        IsPubliclyVisible,
        TotalUpdates,
        LastUpdateDate,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240301_000004_create_batch_updates_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_batch_updates_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BatchUpdates::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BatchUpdates::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(BatchUpdates::BatchId).uuid().not_null())
                        .col(ColumnDef::new(BatchUpdates::BatchCode).string_len(24).not_null())
                        .col(ColumnDef::new(BatchUpdates::Sequence).integer().not_null())
                        .col(ColumnDef::new(BatchUpdates::Stage).string_len(32).not_null())
                        .col(ColumnDef::new(BatchUpdates::Status).string_len(32).not_null())
                        .col(ColumnDef::new(BatchUpdates::FlaggedStage).string_len(32).null())
                        .col(ColumnDef::new(BatchUpdates::Location).json().not_null())
                        .col(ColumnDef::new(BatchUpdates::UpdatedBy).json().not_null())
                        .col(
                            ColumnDef::new(BatchUpdates::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BatchUpdates::Notes).text().null())
                        .col(ColumnDef::new(BatchUpdates::Documents).json().not_null())
                        .col(ColumnDef::new(BatchUpdates::Measurements).json().null())
                        .col(ColumnDef::new(BatchUpdates::QualityCheck).json().null())
                        .col(ColumnDef::new(BatchUpdates::ProcessingDetails).json().null())
                        .col(ColumnDef::new(BatchUpdates::Issues).json().not_null())
                        .col(
                            ColumnDef::new(BatchUpdates::EstimatedCompletionDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(BatchUpdates::PreviousStage).string_len(32).null())
                        .col(ColumnDef::new(BatchUpdates::NextStage).string_len(32).null())
                        .col(
                            ColumnDef::new(BatchUpdates::IsRealtimeUpdate)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(BatchUpdates::NotificationsSent)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(BatchUpdates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batch_updates_batch_id")
                                .from(BatchUpdates::Table, BatchUpdates::BatchId)
                                .to(Batches::Table, Batches::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batch_updates_batch_sequence")
                        .table(BatchUpdates::Table)
                        .col(BatchUpdates::BatchId)
                        .col(BatchUpdates::Sequence)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batch_updates_timestamp")
                        .table(BatchUpdates::Table)
                        .col(BatchUpdates::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BatchUpdates::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Batches {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum BatchUpdates {
        Table,
        Id,
        BatchId,
        BatchCode,
        Sequence,
        Stage,
        Status,
        FlaggedStage,
        Location,
        UpdatedBy,
        Timestamp,
        Notes,
        Documents,
        Measurements,
        QualityCheck,
        ProcessingDetails,
        Issues,
        EstimatedCompletionDate,
        PreviousStage,
        NextStage,
        IsRealtimeUpdate,
        NotificationsSent,
        CreatedAt,
    }
}

mod m20240301_000005_create_analytics_snapshots_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_analytics_snapshots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AnalyticsSnapshots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AnalyticsSnapshots::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AnalyticsSnapshots::Date).date().not_null())
                        .col(ColumnDef::new(AnalyticsSnapshots::Period).string_len(16).not_null())
                        .col(ColumnDef::new(AnalyticsSnapshots::Metrics).json().not_null())
                        .col(
                            ColumnDef::new(AnalyticsSnapshots::CalculatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AnalyticsSnapshots::CalculatedBy).string().not_null())
                        .col(ColumnDef::new(AnalyticsSnapshots::Notes).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_analytics_snapshots_date_period")
                        .table(AnalyticsSnapshots::Table)
                        .col(AnalyticsSnapshots::Date)
                        .col(AnalyticsSnapshots::Period)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AnalyticsSnapshots::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AnalyticsSnapshots {
        Table,
        Id,
        Date,
        Period,
        Metrics,
        CalculatedAt,
        CalculatedBy,
        Notes,
    }
}
