use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Advisors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Advisors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Advisors::UserId).uuid().null().unique_key())
                    .col(ColumnDef::new(Advisors::FirmId).uuid().null())
                    .col(ColumnDef::new(Advisors::Name).string().not_null())
                    .col(
                        ColumnDef::new(Advisors::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Advisors::FirmName).string().not_null())
                    .col(ColumnDef::new(Advisors::Position).string().null())
                    .col(ColumnDef::new(Advisors::PersonalBio).text().not_null())
                    .col(ColumnDef::new(Advisors::FirmBio).text().not_null())
                    .col(ColumnDef::new(Advisors::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Advisors::Phone).string_len(32).null())
                    .col(ColumnDef::new(Advisors::Website).string().null())
                    .col(ColumnDef::new(Advisors::City).string().null())
                    .col(ColumnDef::new(Advisors::State).string_len(32).null())
                    .col(
                        ColumnDef::new(Advisors::YearsOfExperience)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Advisors::MinimumInvestment).string().null())
                    .col(
                        ColumnDef::new(Advisors::MinimumInvestmentAmount)
                            .big_integer()
                            .null(),
                    )
                    .col(json_array(Advisors::Services))
                    .col(json_array(Advisors::Designations))
                    .col(json_array(Advisors::Licenses))
                    .col(json_array(Advisors::CompensationTypes))
                    .col(json_array(Advisors::ClientTypes))
                    .col(json_array(Advisors::RegisteredStates))
                    .col(ColumnDef::new(Advisors::HeadshotUrl).text().null())
                    .col(
                        ColumnDef::new(Advisors::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending_approval"),
                    )
                    .col(ColumnDef::new(Advisors::ApprovedBy).uuid().null())
                    .col(
                        ColumnDef::new(Advisors::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Advisors::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(Advisors::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Advisors::Premium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Advisors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Advisors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_advisors_user")
                            .from(Advisors::Table, Advisors::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_advisors_firm")
                            .from(Advisors::Table, Advisors::FirmId)
                            .to(InvestmentFirms::Table, InvestmentFirms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing queries filter on status first
        manager
            .create_index(
                Index::create()
                    .name("idx_advisors_status")
                    .table(Advisors::Table)
                    .col(Advisors::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_advisors_state")
                    .table(Advisors::Table)
                    .col(Advisors::State)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Advisors::Table).to_owned())
            .await
    }
}

fn json_array(col: Advisors) -> ColumnDef {
    ColumnDef::new(col)
        .json_binary()
        .not_null()
        .default(Expr::cust("'[]'::jsonb"))
        .to_owned()
}

#[derive(Iden)]
enum Advisors {
    Table,
    Id,
    UserId,
    FirmId,
    Name,
    Slug,
    FirmName,
    Position,
    PersonalBio,
    FirmBio,
    Email,
    Phone,
    Website,
    City,
    State,
    YearsOfExperience,
    MinimumInvestment,
    MinimumInvestmentAmount,
    Services,
    Designations,
    Licenses,
    CompensationTypes,
    ClientTypes,
    RegisteredStates,
    HeadshotUrl,
    Status,
    ApprovedBy,
    ApprovedAt,
    RejectionReason,
    Verified,
    Premium,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
}

#[derive(Iden)]
enum InvestmentFirms {
    Table,
    Id,
}
