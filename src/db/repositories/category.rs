use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{Page, PageRequest};
use crate::entities::{categories, prelude::*};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<categories::Model>> {
        let mut query = Categories::find()
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id);

        if let Some(search) = search {
            query = query.filter(categories::Column::Name.contains(search));
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page { items, total })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<categories::Model>> {
        Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query category by slug")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<categories::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Categories::find()
            .filter(categories::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<categories::Model> {
        let model = categories::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(model)
    }

    pub async fn rename(&self, slug: &str, name: &str) -> Result<Option<categories::Model>> {
        let Some(category) = self.get_by_slug(slug).await? else {
            return Ok(None);
        };

        let mut active: categories::ActiveModel = category.into();
        active.name = Set(name.to_string());
        let model = active.update(&self.conn).await?;

        Ok(Some(model))
    }

    /// Deletes the category; its titles go with it through the foreign key.
    pub async fn delete(&self, slug: &str) -> Result<bool> {
        let result = Categories::delete_many()
            .filter(categories::Column::Slug.eq(slug))
            .exec(&self.conn)
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected > 0)
    }
}
