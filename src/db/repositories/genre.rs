use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{Page, PageRequest};
use crate::entities::{genres, prelude::*};

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<genres::Model>> {
        let mut query = Genres::find()
            .order_by_asc(genres::Column::Name)
            .order_by_asc(genres::Column::Id);

        if let Some(search) = search {
            query = query.filter(genres::Column::Name.contains(search));
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page { items, total })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<genres::Model>> {
        Genres::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query genre by slug")
    }

    pub async fn get_by_slugs(&self, slugs: &[String]) -> Result<Vec<genres::Model>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Genres::find()
            .filter(genres::Column::Slug.is_in(slugs.iter().cloned()))
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<genres::Model> {
        let model = genres::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model)
    }

    pub async fn rename(&self, slug: &str, name: &str) -> Result<Option<genres::Model>> {
        let Some(genre) = self.get_by_slug(slug).await? else {
            return Ok(None);
        };

        let mut active: genres::ActiveModel = genre.into();
        active.name = Set(name.to_string());
        let model = active.update(&self.conn).await?;

        Ok(Some(model))
    }

    /// Deletes the genre and unlinks it from every title.
    pub async fn delete(&self, slug: &str) -> Result<bool> {
        let result = Genres::delete_many()
            .filter(genres::Column::Slug.eq(slug))
            .exec(&self.conn)
            .await
            .context("Failed to delete genre")?;

        Ok(result.rows_affected > 0)
    }
}
