use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeetingRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeetingRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeetingRequests::AdvisorId).uuid().not_null())
                    .col(ColumnDef::new(MeetingRequests::Name).string().not_null())
                    .col(ColumnDef::new(MeetingRequests::Email).string_len(320).not_null())
                    .col(ColumnDef::new(MeetingRequests::Phone).string_len(32).null())
                    .col(
                        ColumnDef::new(MeetingRequests::PreferredContactMethod)
                            .string_len(16)
                            .not_null()
                            .default("email"),
                    )
                    .col(
                        ColumnDef::new(MeetingRequests::Topics)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(MeetingRequests::Message).text().null())
                    .col(
                        ColumnDef::new(MeetingRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(MeetingRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(MeetingRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_requests_advisor")
                            .from(MeetingRequests::Table, MeetingRequests::AdvisorId)
                            .to(Advisors::Table, Advisors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meeting_requests_advisor_id")
                    .table(MeetingRequests::Table)
                    .col(MeetingRequests::AdvisorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeetingRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MeetingRequests {
    Table,
    Id,
    AdvisorId,
    Name,
    Email,
    Phone,
    PreferredContactMethod,
    Topics,
    Message,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Advisors {
    Table,
    Id,
}
