//! Follows and institute posts.
//!
//! - `follows`: user → institute subscriptions
//! - `posts`: announcements published by institutes
//! - `post_comments`, `post_replies`: discussion rows owned by a post
//! - `post_likes`, `post_shares`: reactions
//! - `post_blocks`: posts a user hid from their feed

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}

#[derive(Iden)]
enum Follows {
    Table,
    UserId,
    InstituteId,
    CreatedAt,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
    InstituteId,
    Kind,
    Title,
    Description,
    Location,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PostComments {
    Table,
    PostId,
    Id,
    Position,
    AuthorKind,
    AuthorId,
    Text,
    CreatedAt,
}

#[derive(Iden)]
enum PostReplies {
    Table,
    PostId,
    Id,
    CommentId,
    Position,
    AuthorKind,
    AuthorId,
    Text,
    CreatedAt,
}

#[derive(Iden)]
enum PostLikes {
    Table,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum PostShares {
    Table,
    Id,
    PostId,
    UserId,
    Platform,
    CreatedAt,
}

#[derive(Iden)]
enum PostBlocks {
    Table,
    UserId,
    PostId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follows::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Follows::UserId).string().not_null())
                    .col(ColumnDef::new(Follows::InstituteId).string().not_null())
                    .col(ColumnDef::new(Follows::CreatedAt).timestamp().not_null())
                    .primary_key(
                        Index::create()
                            .col(Follows::UserId)
                            .col(Follows::InstituteId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-follows-user_id")
                            .from(Follows::Table, Follows::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-follows-institute_id")
                            .from(Follows::Table, Follows::InstituteId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-follows-institute_id")
                    .table(Follows::Table)
                    .col(Follows::InstituteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Posts::InstituteId).string().not_null())
                    .col(ColumnDef::new(Posts::Kind).string().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Description).string())
                    .col(ColumnDef::new(Posts::Location).string())
                    .col(
                        ColumnDef::new(Posts::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Posts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Posts::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-posts-institute_id")
                            .from(Posts::Table, Posts::InstituteId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-posts-status-created_at")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostComments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostComments::PostId).string().not_null())
                    .col(ColumnDef::new(PostComments::Id).string().not_null())
                    .col(ColumnDef::new(PostComments::Position).integer().not_null())
                    .col(ColumnDef::new(PostComments::AuthorKind).string().not_null())
                    .col(ColumnDef::new(PostComments::AuthorId).string().not_null())
                    .col(ColumnDef::new(PostComments::Text).string().not_null())
                    .col(
                        ColumnDef::new(PostComments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PostComments::PostId)
                            .col(PostComments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_comments-post_id")
                            .from(PostComments::Table, PostComments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostReplies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostReplies::PostId).string().not_null())
                    .col(ColumnDef::new(PostReplies::Id).string().not_null())
                    .col(ColumnDef::new(PostReplies::CommentId).string().not_null())
                    .col(ColumnDef::new(PostReplies::Position).integer().not_null())
                    .col(ColumnDef::new(PostReplies::AuthorKind).string().not_null())
                    .col(ColumnDef::new(PostReplies::AuthorId).string().not_null())
                    .col(ColumnDef::new(PostReplies::Text).string().not_null())
                    .col(
                        ColumnDef::new(PostReplies::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PostReplies::PostId)
                            .col(PostReplies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_replies-post_id")
                            .from(PostReplies::Table, PostReplies::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLikes::PostId).string().not_null())
                    .col(ColumnDef::new(PostLikes::UserId).string().not_null())
                    .col(ColumnDef::new(PostLikes::CreatedAt).timestamp().not_null())
                    .primary_key(
                        Index::create()
                            .col(PostLikes::PostId)
                            .col(PostLikes::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_likes-post_id")
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_likes-user_id")
                            .from(PostLikes::Table, PostLikes::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostShares::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostShares::PostId).string().not_null())
                    .col(ColumnDef::new(PostShares::UserId).string().not_null())
                    .col(ColumnDef::new(PostShares::Platform).string().not_null())
                    .col(ColumnDef::new(PostShares::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_shares-post_id")
                            .from(PostShares::Table, PostShares::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_shares-user_id")
                            .from(PostShares::Table, PostShares::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-post_shares-post_id")
                    .table(PostShares::Table)
                    .col(PostShares::PostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostBlocks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostBlocks::UserId).string().not_null())
                    .col(ColumnDef::new(PostBlocks::PostId).string().not_null())
                    .col(ColumnDef::new(PostBlocks::CreatedAt).timestamp().not_null())
                    .primary_key(
                        Index::create()
                            .col(PostBlocks::UserId)
                            .col(PostBlocks::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_blocks-user_id")
                            .from(PostBlocks::Table, PostBlocks::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_blocks-post_id")
                            .from(PostBlocks::Table, PostBlocks::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostBlocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostReplies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Follows::Table).to_owned())
            .await?;
        Ok(())
    }
}
