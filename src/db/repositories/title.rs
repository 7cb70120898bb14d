use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

use super::{Page, PageRequest};
use crate::entities::{categories, genres, prelude::*, title_genres, titles};

/// List filters; all present filters must match.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    pub year: Option<i32>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Category slug.
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: i32,
    pub genre_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    /// Replaces the whole genre set when present.
    pub genre_ids: Option<Vec<i32>>,
}

pub struct TitleRepository {
    conn: DatabaseConnection,
}

impl TitleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, filter: &TitleFilter, page: PageRequest) -> Result<Page<titles::Model>> {
        let mut query = Titles::find()
            .order_by_asc(titles::Column::Name)
            .order_by_asc(titles::Column::Id);

        if let Some(year) = filter.year {
            query = query.filter(titles::Column::Year.eq(year));
        }

        if let Some(name) = &filter.name {
            query = query.filter(titles::Column::Name.contains(name));
        }

        if let Some(genre) = &filter.genre {
            query = query.filter(
                titles::Column::Id.in_subquery(
                    Query::select()
                        .column((TitleGenres, title_genres::Column::TitleId))
                        .from(TitleGenres)
                        .inner_join(
                            Genres,
                            Expr::col((Genres, genres::Column::Id))
                                .equals((TitleGenres, title_genres::Column::GenreId)),
                        )
                        .and_where(Expr::col((Genres, genres::Column::Slug)).eq(genre.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(category) = &filter.category {
            query = query.filter(
                titles::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(categories::Column::Id)
                        .from(Categories)
                        .and_where(categories::Column::Slug.eq(category.as_str()))
                        .to_owned(),
                ),
            );
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page { items, total })
    }

    pub async fn get(&self, id: i32) -> Result<Option<titles::Model>> {
        Titles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query title")
    }

    /// Whether another title already uses `name` within `category_id`.
    pub async fn name_taken(
        &self,
        name: &str,
        category_id: i32,
        except: Option<i32>,
    ) -> Result<bool> {
        let mut query = Titles::find()
            .filter(titles::Column::Name.eq(name))
            .filter(titles::Column::CategoryId.eq(category_id));

        if let Some(id) = except {
            query = query.filter(titles::Column::Id.ne(id));
        }

        Ok(query.count(&self.conn).await? > 0)
    }

    /// Genres linked to each of `title_ids`, ordered by name.
    pub async fn genres_for(&self, title_ids: &[i32]) -> Result<HashMap<i32, Vec<genres::Model>>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = TitleGenres::find()
            .filter(title_genres::Column::TitleId.is_in(title_ids.iter().copied()))
            .find_also_related(Genres)
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to load title genres")?;

        let mut map: HashMap<i32, Vec<genres::Model>> = HashMap::new();
        for (link, genre) in rows {
            if let Some(genre) = genre {
                map.entry(link.title_id).or_default().push(genre);
            }
        }

        Ok(map)
    }

    pub async fn create(&self, title: NewTitle) -> Result<titles::Model> {
        let txn = self.conn.begin().await?;

        let model = titles::ActiveModel {
            name: Set(title.name),
            year: Set(title.year),
            description: Set(title.description),
            category_id: Set(title.category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !title.genre_ids.is_empty() {
            let links = title
                .genre_ids
                .into_iter()
                .map(|genre_id| title_genres::ActiveModel {
                    title_id: Set(model.id),
                    genre_id: Set(genre_id),
                });
            TitleGenres::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(model)
    }

    pub async fn update(&self, id: i32, changes: TitleChanges) -> Result<Option<titles::Model>> {
        let txn = self.conn.begin().await?;

        let Some(title) = Titles::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let mut active: titles::ActiveModel = title.clone().into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        let model = if active.is_changed() {
            active.update(&txn).await?
        } else {
            title
        };

        if let Some(genre_ids) = changes.genre_ids {
            TitleGenres::delete_many()
                .filter(title_genres::Column::TitleId.eq(id))
                .exec(&txn)
                .await?;

            if !genre_ids.is_empty() {
                let links = genre_ids
                    .into_iter()
                    .map(|genre_id| title_genres::ActiveModel {
                        title_id: Set(id),
                        genre_id: Set(genre_id),
                    });
                TitleGenres::insert_many(links)
                    .exec_without_returning(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Titles::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete title")?;

        Ok(result.rows_affected > 0)
    }
}
