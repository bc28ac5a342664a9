use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InvestmentFirms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvestmentFirms::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InvestmentFirms::Name).string().not_null())
                    .col(
                        ColumnDef::new(InvestmentFirms::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(InvestmentFirms::Headquarters).string().null())
                    .col(ColumnDef::new(InvestmentFirms::State).string_len(32).null())
                    .col(ColumnDef::new(InvestmentFirms::Description).text().null())
                    .col(ColumnDef::new(InvestmentFirms::Website).string().null())
                    .col(ColumnDef::new(InvestmentFirms::FoundedYear).integer().null())
                    .col(ColumnDef::new(InvestmentFirms::Aum).string().null())
                    .col(ColumnDef::new(InvestmentFirms::FeeStructure).text().null())
                    .col(ColumnDef::new(InvestmentFirms::MinimumInvestment).string().null())
                    .col(
                        ColumnDef::new(InvestmentFirms::MinimumInvestmentAmount)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InvestmentFirms::AssetClasses)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(InvestmentFirms::ClientTypes)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(InvestmentFirms::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InvestmentFirms::Premium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(InvestmentFirms::Rating).decimal_len(2, 1).null())
                    .col(
                        ColumnDef::new(InvestmentFirms::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InvestmentFirms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(InvestmentFirms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountingFirms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingFirms::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountingFirms::Name).string().not_null())
                    .col(
                        ColumnDef::new(AccountingFirms::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AccountingFirms::Headquarters).string().null())
                    .col(ColumnDef::new(AccountingFirms::State).string_len(32).null())
                    .col(ColumnDef::new(AccountingFirms::Description).text().null())
                    .col(ColumnDef::new(AccountingFirms::Website).string().null())
                    .col(ColumnDef::new(AccountingFirms::FoundedYear).integer().null())
                    .col(ColumnDef::new(AccountingFirms::FeeStructure).text().null())
                    .col(ColumnDef::new(AccountingFirms::MinimumFee).string().null())
                    .col(
                        ColumnDef::new(AccountingFirms::MinimumFeeAmount)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AccountingFirms::Services)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(AccountingFirms::ClientTypes)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(AccountingFirms::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AccountingFirms::Premium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AccountingFirms::Rating).decimal_len(2, 1).null())
                    .col(
                        ColumnDef::new(AccountingFirms::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AccountingFirms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(AccountingFirms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Child collections are shared by both firm kinds, keyed by (firm_kind, firm_id)
        manager
            .create_table(
                Table::create()
                    .table(FirmLeaders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FirmLeaders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FirmLeaders::FirmKind).string_len(16).not_null())
                    .col(ColumnDef::new(FirmLeaders::FirmId).uuid().not_null())
                    .col(ColumnDef::new(FirmLeaders::Name).string().not_null())
                    .col(ColumnDef::new(FirmLeaders::Title).string().not_null())
                    .col(ColumnDef::new(FirmLeaders::Bio).text().null())
                    .col(
                        ColumnDef::new(FirmLeaders::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FirmFeatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FirmFeatures::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FirmFeatures::FirmKind).string_len(16).not_null())
                    .col(ColumnDef::new(FirmFeatures::FirmId).uuid().not_null())
                    .col(ColumnDef::new(FirmFeatures::Label).string().not_null())
                    .col(
                        ColumnDef::new(FirmFeatures::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FirmRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FirmRegistrations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FirmRegistrations::FirmKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FirmRegistrations::FirmId).uuid().not_null())
                    .col(ColumnDef::new(FirmRegistrations::Regulator).string().not_null())
                    .col(
                        ColumnDef::new(FirmRegistrations::RegistrationNumber)
                            .string()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SimilarFirms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SimilarFirms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SimilarFirms::FirmKind).string_len(16).not_null())
                    .col(ColumnDef::new(SimilarFirms::FirmId).uuid().not_null())
                    .col(ColumnDef::new(SimilarFirms::SimilarFirmId).uuid().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_firm_leaders_firm")
                    .table(FirmLeaders::Table)
                    .col(FirmLeaders::FirmKind)
                    .col(FirmLeaders::FirmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_firm_features_firm")
                    .table(FirmFeatures::Table)
                    .col(FirmFeatures::FirmKind)
                    .col(FirmFeatures::FirmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_firm_registrations_firm")
                    .table(FirmRegistrations::Table)
                    .col(FirmRegistrations::FirmKind)
                    .col(FirmRegistrations::FirmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_similar_firms_firm")
                    .table(SimilarFirms::Table)
                    .col(SimilarFirms::FirmKind)
                    .col(SimilarFirms::FirmId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SimilarFirms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FirmRegistrations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FirmFeatures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FirmLeaders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingFirms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestmentFirms::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InvestmentFirms {
    Table,
    Id,
    Name,
    Slug,
    Headquarters,
    State,
    Description,
    Website,
    FoundedYear,
    Aum,
    FeeStructure,
    MinimumInvestment,
    MinimumInvestmentAmount,
    AssetClasses,
    ClientTypes,
    Verified,
    Premium,
    Rating,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AccountingFirms {
    Table,
    Id,
    Name,
    Slug,
    Headquarters,
    State,
    Description,
    Website,
    FoundedYear,
    FeeStructure,
    MinimumFee,
    MinimumFeeAmount,
    Services,
    ClientTypes,
    Verified,
    Premium,
    Rating,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FirmLeaders {
    Table,
    Id,
    FirmKind,
    FirmId,
    Name,
    Title,
    Bio,
    Position,
}

#[derive(Iden)]
enum FirmFeatures {
    Table,
    Id,
    FirmKind,
    FirmId,
    Label,
    Position,
}

#[derive(Iden)]
enum FirmRegistrations {
    Table,
    Id,
    FirmKind,
    FirmId,
    Regulator,
    RegistrationNumber,
}

#[derive(Iden)]
enum SimilarFirms {
    Table,
    Id,
    FirmKind,
    FirmId,
    SimilarFirmId,
}
