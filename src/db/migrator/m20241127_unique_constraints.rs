use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const TITLE_NAME_CATEGORY: &str = "idx_titles_name_category_unique";
const REVIEW_AUTHOR_TITLE: &str = "idx_reviews_author_title_unique";
const REVIEW_TITLE: &str = "idx_reviews_title";
const COMMENT_REVIEW: &str = "idx_comments_review";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(TITLE_NAME_CATEGORY)
                    .table(Titles::Table)
                    .col(Titles::Name)
                    .col(Titles::CategoryId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(REVIEW_AUTHOR_TITLE)
                    .table(Reviews::Table)
                    .col(Reviews::AuthorId)
                    .col(Reviews::TitleId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(REVIEW_TITLE)
                    .table(Reviews::Table)
                    .col(Reviews::TitleId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(COMMENT_REVIEW)
                    .table(Comments::Table)
                    .col(Comments::ReviewId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            COMMENT_REVIEW,
            REVIEW_TITLE,
            REVIEW_AUTHOR_TITLE,
            TITLE_NAME_CATEGORY,
        ] {
            manager
                .drop_index(Index::drop().name(name).if_exists().to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Titles {
    Table,
    Name,
    CategoryId,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    AuthorId,
    TitleId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    ReviewId,
}
