use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000000_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(TaskStatus::Enum)
                    .values([TaskStatus::Active, TaskStatus::Deferred, TaskStatus::Done])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Tasks::Title, 255))
                    .col(text(Tasks::Message).default(""))
                    .col(
                        timestamp_with_time_zone(Tasks::DateAdd)
                            .default(Expr::current_timestamp()),
                    )
                    .col(boolean(Tasks::Public).default(false))
                    .col(boolean(Tasks::Important).default(false))
                    .col(uuid(Tasks::Author))
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .enumeration(
                                TaskStatus::Enum,
                                [TaskStatus::Active, TaskStatus::Deferred, TaskStatus::Done],
                            )
                            .not_null()
                            .default("active"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_author")
                            .from(Tasks::Table, Tasks::Author)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Public listing filters on both flags and sorts by date_add
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_public_important_date_add")
                    .table(Tasks::Table)
                    .col(Tasks::Public)
                    .col(Tasks::Important)
                    .col(Tasks::DateAdd)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_author")
                    .table(Tasks::Table)
                    .col(Tasks::Author)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TaskStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Tasks {
    Table,
    Id,
    Title,
    Message,
    DateAdd,
    Public,
    Important,
    Author,
    Status,
}

#[derive(DeriveIden)]
enum TaskStatus {
    #[sea_orm(iden = "task_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "deferred")]
    Deferred,
    #[sea_orm(iden = "done")]
    Done,
}
