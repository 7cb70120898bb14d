use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{Page, PageRequest};
use crate::entities::{prelude::*, reviews};

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Reviews of a title, newest first.
    pub async fn list_for_title(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<Page<reviews::Model>> {
        let paginator = Reviews::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .order_by_desc(reviews::Column::PubDate)
            .order_by_desc(reviews::Column::Id)
            .paginate(&self.conn, page.page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page { items, total })
    }

    /// A review, but only if it belongs to `title_id`.
    pub async fn get_in_title(&self, title_id: i32, id: i32) -> Result<Option<reviews::Model>> {
        Reviews::find_by_id(id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .one(&self.conn)
            .await
            .context("Failed to query review")
    }

    pub async fn exists_for_author(&self, title_id: i32, author_id: i32) -> Result<bool> {
        let count = Reviews::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .filter(reviews::Column::AuthorId.eq(author_id))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    /// `(title_id, score)` rows for every review of `title_ids`.
    pub async fn scores_for_titles(&self, title_ids: &[i32]) -> Result<Vec<(i32, i32)>> {
        if title_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Reviews::find()
            .select_only()
            .column(reviews::Column::TitleId)
            .column(reviews::Column::Score)
            .filter(reviews::Column::TitleId.is_in(title_ids.iter().copied()))
            .into_tuple::<(i32, i32)>()
            .all(&self.conn)
            .await
            .context("Failed to load review scores")?;

        Ok(rows)
    }

    pub async fn create(
        &self,
        title_id: i32,
        author_id: i32,
        text: &str,
        score: i32,
    ) -> Result<reviews::Model> {
        let model = reviews::ActiveModel {
            title_id: Set(title_id),
            author_id: Set(author_id),
            text: Set(text.to_string()),
            score: Set(score),
            pub_date: Set(super::now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model)
    }

    pub async fn update(
        &self,
        review: reviews::Model,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<reviews::Model> {
        if text.is_none() && score.is_none() {
            return Ok(review);
        }

        let mut active: reviews::ActiveModel = review.into();
        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(score) = score {
            active.score = Set(score);
        }

        let model = active.update(&self.conn).await?;
        Ok(model)
    }

    /// Deletes the review together with its comments.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Reviews::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete review")?;

        Ok(result.rows_affected > 0)
    }
}
