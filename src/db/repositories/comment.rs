use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{Page, PageRequest};
use crate::entities::{comments, prelude::*};

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_review(
        &self,
        review_id: i32,
        page: PageRequest,
    ) -> Result<Page<comments::Model>> {
        let paginator = Comments::find()
            .filter(comments::Column::ReviewId.eq(review_id))
            .order_by_desc(comments::Column::PubDate)
            .order_by_desc(comments::Column::Id)
            .paginate(&self.conn, page.page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page { items, total })
    }

    pub async fn get_in_review(&self, review_id: i32, id: i32) -> Result<Option<comments::Model>> {
        Comments::find_by_id(id)
            .filter(comments::Column::ReviewId.eq(review_id))
            .one(&self.conn)
            .await
            .context("Failed to query comment")
    }

    pub async fn create(&self, review_id: i32, author_id: i32, text: &str) -> Result<comments::Model> {
        let model = comments::ActiveModel {
            review_id: Set(review_id),
            author_id: Set(author_id),
            text: Set(text.to_string()),
            pub_date: Set(super::now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model)
    }

    pub async fn update_text(&self, comment: comments::Model, text: String) -> Result<comments::Model> {
        let mut active: comments::ActiveModel = comment.into();
        active.text = Set(text);
        let model = active.update(&self.conn).await?;
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected > 0)
    }
}
