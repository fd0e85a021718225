use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the teams table
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(pk_uuid(Teams::Id))
                    .col(ColumnDef::new(Teams::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Teams::InboxId).string_len(255).null())
                    .col(ColumnDef::new(Teams::Email).string_len(255).null())
                    .col(
                        timestamp_with_time_zone(Teams::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create the users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(ColumnDef::new(Users::FullName).string_len(255).null())
                    .col(ColumnDef::new(Users::Email).string_len(255).null())
                    .col(ColumnDef::new(Users::Locale).string_len(10).null())
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create the users_on_team table
        manager
            .create_table(
                Table::create()
                    .table(UsersOnTeam::Table)
                    .if_not_exists()
                    .col(pk_uuid(UsersOnTeam::Id))
                    .col(ColumnDef::new(UsersOnTeam::UserId).uuid().not_null())
                    .col(ColumnDef::new(UsersOnTeam::TeamId).uuid().not_null())
                    .col(
                        ColumnDef::new(UsersOnTeam::Role)
                            .string_len(20)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        timestamp_with_time_zone(UsersOnTeam::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_on_team_user")
                            .from(UsersOnTeam::Table, UsersOnTeam::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_on_team_team")
                            .from(UsersOnTeam::Table, UsersOnTeam::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create the activities table
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(pk_uuid(Activities::Id))
                    .col(
                        timestamp_with_time_zone(Activities::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Activities::TeamId).uuid().not_null())
                    .col(ColumnDef::new(Activities::UserId).uuid().null())
                    .col(ColumnDef::new(Activities::Type).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Activities::Source)
                            .string_len(20)
                            .not_null()
                            .default("system"),
                    )
                    .col(
                        ColumnDef::new(Activities::Priority)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Activities::GroupId).uuid().null())
                    .col(ColumnDef::new(Activities::Metadata).json_binary().not_null())
                    .col(
                        ColumnDef::new(Activities::Status)
                            .string_len(20)
                            .not_null()
                            .default("unread"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_team")
                            .from(Activities::Table, Activities::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_user")
                            .from(Activities::Table, Activities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create the notification_settings table
        manager
            .create_table(
                Table::create()
                    .table(NotificationSettings::Table)
                    .if_not_exists()
                    .col(pk_uuid(NotificationSettings::Id))
                    .col(ColumnDef::new(NotificationSettings::UserId).uuid().not_null())
                    .col(ColumnDef::new(NotificationSettings::TeamId).uuid().not_null())
                    .col(
                        ColumnDef::new(NotificationSettings::NotificationType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationSettings::Channel)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationSettings::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        timestamp_with_time_zone(NotificationSettings::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(NotificationSettings::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_settings_user")
                            .from(NotificationSettings::Table, NotificationSettings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_settings_team")
                            .from(NotificationSettings::Table, NotificationSettings::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_users_on_team_team_id")
                    .table(UsersOnTeam::Table)
                    .col(UsersOnTeam::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_team_priority")
                    .table(Activities::Table)
                    .col(Activities::TeamId)
                    .col(Activities::Priority)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_group_id")
                    .table(Activities::Table)
                    .col(Activities::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notification_settings_unique")
                    .table(NotificationSettings::Table)
                    .col(NotificationSettings::UserId)
                    .col(NotificationSettings::TeamId)
                    .col(NotificationSettings::NotificationType)
                    .col(NotificationSettings::Channel)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationSettings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UsersOnTeam::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    InboxId,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FullName,
    Email,
    Locale,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UsersOnTeam {
    Table,
    Id,
    UserId,
    TeamId,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    CreatedAt,
    TeamId,
    UserId,
    Type,
    Source,
    Priority,
    GroupId,
    Metadata,
    Status,
}

#[derive(DeriveIden)]
enum NotificationSettings {
    Table,
    Id,
    UserId,
    TeamId,
    NotificationType,
    Channel,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
