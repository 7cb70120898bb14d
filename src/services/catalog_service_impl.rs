//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

use crate::constants::{limits, messages};
use crate::db::repositories::title::{NewTitle, TitleChanges, TitleFilter};
use crate::db::{Page, PageRequest, Store};
use crate::domain::permissions::{Action, Resource, authorize};
use crate::domain::validators::{FieldErrors, validate_slug, validate_text, validate_year};
use crate::domain::{Actor, TitleId, rating};
use crate::entities::{categories, genres, titles};
use crate::services::catalog_service::{
    CatalogError, CatalogService, TermInfo, TermInput, TermKind, TitleInfo, TitleInput,
};

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find_term(&self, kind: TermKind, slug: &str) -> Result<Option<TermInfo>, CatalogError> {
        let term = match kind {
            TermKind::Category => self
                .store
                .category_repo()
                .get_by_slug(slug)
                .await?
                .map(category_info),
            TermKind::Genre => self
                .store
                .genre_repo()
                .get_by_slug(slug)
                .await?
                .map(genre_info),
        };
        Ok(term)
    }

    /// Resolves the category slug and genre slugs of a title payload,
    /// recording unknown ones in `errors`.
    async fn resolve_links(
        &self,
        category: Option<&str>,
        genre: Option<&[String]>,
        errors: &mut FieldErrors,
    ) -> Result<(Option<categories::Model>, Option<Vec<genres::Model>>), CatalogError> {
        let category = match category {
            Some(slug) => {
                let found = self.store.category_repo().get_by_slug(slug).await?;
                if found.is_none() {
                    errors.add(
                        "category",
                        format!("Object with slug={slug} does not exist."),
                    );
                }
                found
            }
            None => None,
        };

        let genres = match genre {
            Some([]) => {
                errors.add("genre", "This list may not be empty.");
                None
            }
            Some(slugs) => {
                let found = self.store.genre_repo().get_by_slugs(slugs).await?;
                for slug in slugs {
                    if !found.iter().any(|g| &g.slug == slug) {
                        errors.add("genre", format!("Object with slug={slug} does not exist."));
                    }
                }
                Some(found)
            }
            None => None,
        };

        Ok((category, genres))
    }

    /// Builds the read representation for `models`, keeping their order.
    async fn render_titles(&self, models: Vec<titles::Model>) -> Result<Vec<TitleInfo>, CatalogError> {
        let ids: Vec<i32> = models.iter().map(|t| t.id).collect();
        let mut category_ids: Vec<i32> = models.iter().map(|t| t.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let mut genres_by_title = self.store.title_repo().genres_for(&ids).await?;
        let categories: HashMap<i32, TermInfo> = self
            .store
            .category_repo()
            .get_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, category_info(c)))
            .collect();
        let scores = self.store.review_repo().scores_for_titles(&ids).await?;
        let ratings = rating::by_title(&scores);

        Ok(models
            .into_iter()
            .map(|title| {
                let id = TitleId::new(title.id);
                TitleInfo {
                    id,
                    rating: ratings.get(&id).copied(),
                    genre: genres_by_title
                        .remove(&title.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(genre_info)
                        .collect(),
                    category: categories.get(&title.category_id).cloned(),
                    name: title.name,
                    year: title.year,
                    description: title.description,
                }
            })
            .collect())
    }

    async fn render_title(&self, model: titles::Model) -> Result<TitleInfo, CatalogError> {
        self.render_titles(vec![model])
            .await?
            .pop()
            .ok_or_else(|| CatalogError::Internal("Title vanished while rendering".to_string()))
    }
}

fn category_info(model: categories::Model) -> TermInfo {
    TermInfo {
        name: model.name,
        slug: model.slug,
    }
}

fn genre_info(model: genres::Model) -> TermInfo {
    TermInfo {
        name: model.name,
        slug: model.slug,
    }
}

fn not_found(kind: TermKind) -> CatalogError {
    CatalogError::NotFound(kind.label().to_string())
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_terms(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<TermInfo>, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Read, None).check()?;

        let page = match kind {
            TermKind::Category => self
                .store
                .category_repo()
                .list(search, page)
                .await?
                .map(category_info),
            TermKind::Genre => self
                .store
                .genre_repo()
                .list(search, page)
                .await?
                .map(genre_info),
        };
        Ok(page)
    }

    async fn get_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        slug: &str,
    ) -> Result<TermInfo, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Read, None).check()?;

        self.find_term(kind, slug)
            .await?
            .ok_or_else(|| not_found(kind))
    }

    async fn create_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        input: TermInput,
    ) -> Result<TermInfo, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Create, None).check()?;

        let mut errors = FieldErrors::new();
        let name = errors.require("name", input.name);
        let slug = errors.require("slug", input.slug);
        if let Some(name) = &name {
            errors.check("name", validate_text(name, Some(limits::NAME_MAX_LENGTH)));
        }
        if let Some(slug) = &slug {
            errors.check("slug", validate_slug(slug));
        }
        errors.into_result()?;

        let name = name.unwrap_or_default();
        let slug = slug.unwrap_or_default();

        if self.find_term(kind, &slug).await?.is_some() {
            return Err(FieldErrors::single("slug", messages::SLUG_TAKEN).into());
        }

        let term = match kind {
            TermKind::Category => {
                category_info(self.store.category_repo().create(&name, &slug).await?)
            }
            TermKind::Genre => genre_info(self.store.genre_repo().create(&name, &slug).await?),
        };

        info!(kind = kind.label(), slug = %term.slug, "Created catalog term");
        Ok(term)
    }

    async fn update_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        slug: &str,
        input: TermInput,
    ) -> Result<TermInfo, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Update, None).check()?;

        let current = self
            .find_term(kind, slug)
            .await?
            .ok_or_else(|| not_found(kind))?;

        let mut errors = FieldErrors::new();
        if let Some(new_slug) = &input.slug
            && new_slug != slug
        {
            errors.add("slug", messages::SLUG_IMMUTABLE);
        }
        if let Some(name) = &input.name {
            errors.check("name", validate_text(name, Some(limits::NAME_MAX_LENGTH)));
        }
        errors.into_result()?;

        let Some(name) = input.name else {
            return Ok(current);
        };

        let renamed = match kind {
            TermKind::Category => self
                .store
                .category_repo()
                .rename(slug, &name)
                .await?
                .map(category_info),
            TermKind::Genre => self
                .store
                .genre_repo()
                .rename(slug, &name)
                .await?
                .map(genre_info),
        };

        renamed.ok_or_else(|| not_found(kind))
    }

    async fn delete_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        slug: &str,
    ) -> Result<(), CatalogError> {
        authorize(actor, Resource::Catalog, Action::Delete, None).check()?;

        let deleted = match kind {
            TermKind::Category => self.store.category_repo().delete(slug).await?,
            TermKind::Genre => self.store.genre_repo().delete(slug).await?,
        };

        if !deleted {
            return Err(not_found(kind));
        }

        info!(kind = kind.label(), slug, "Deleted catalog term");
        Ok(())
    }

    async fn list_titles(
        &self,
        actor: Option<&Actor>,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Page<TitleInfo>, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Read, None).check()?;

        let Page { items, total } = self.store.title_repo().list(filter, page).await?;
        let items = self.render_titles(items).await?;

        Ok(Page { items, total })
    }

    async fn get_title(
        &self,
        actor: Option<&Actor>,
        id: TitleId,
    ) -> Result<TitleInfo, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Read, None).check()?;

        let title = self
            .store
            .title_repo()
            .get(id.value())
            .await?
            .ok_or_else(|| CatalogError::NotFound("Title".to_string()))?;

        self.render_title(title).await
    }

    async fn create_title(
        &self,
        actor: Option<&Actor>,
        input: TitleInput,
    ) -> Result<TitleInfo, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Create, None).check()?;

        let mut errors = FieldErrors::new();
        let name = errors.require("name", input.name);
        let year = errors.require("year", input.year);
        let category_slug = errors.require("category", input.category);
        let genre_slugs = errors.require("genre", input.genre);

        if let Some(name) = &name {
            errors.check("name", validate_text(name, Some(limits::NAME_MAX_LENGTH)));
        }
        if let Some(year) = year {
            errors.check("year", validate_year(year));
        }

        let (category, genres) = self
            .resolve_links(
                category_slug.as_deref(),
                genre_slugs.as_deref(),
                &mut errors,
            )
            .await?;
        errors.into_result()?;

        let (Some(name), Some(year), Some(category), Some(genres)) = (name, year, category, genres)
        else {
            return Err(CatalogError::Internal(
                "Title payload passed validation incomplete".to_string(),
            ));
        };

        let repo = self.store.title_repo();
        if repo.name_taken(&name, category.id, None).await? {
            return Err(FieldErrors::single(FieldErrors::NON_FIELD, messages::DUPLICATE_TITLE).into());
        }

        let title = repo
            .create(NewTitle {
                name,
                year,
                description: input.description.unwrap_or_default(),
                category_id: category.id,
                genre_ids: genres.iter().map(|g| g.id).collect(),
            })
            .await?;

        info!(title_id = title.id, name = %title.name, "Created title");
        self.render_title(title).await
    }

    async fn update_title(
        &self,
        actor: Option<&Actor>,
        id: TitleId,
        input: TitleInput,
    ) -> Result<TitleInfo, CatalogError> {
        authorize(actor, Resource::Catalog, Action::Update, None).check()?;

        let repo = self.store.title_repo();
        let current = repo
            .get(id.value())
            .await?
            .ok_or_else(|| CatalogError::NotFound("Title".to_string()))?;

        let mut errors = FieldErrors::new();
        if let Some(name) = &input.name {
            errors.check("name", validate_text(name, Some(limits::NAME_MAX_LENGTH)));
        }
        if let Some(year) = input.year {
            errors.check("year", validate_year(year));
        }

        let (category, genres) = self
            .resolve_links(
                input.category.as_deref(),
                input.genre.as_deref(),
                &mut errors,
            )
            .await?;
        errors.into_result()?;

        let category_id = category.as_ref().map(|c| c.id);
        if input.name.is_some() || category_id.is_some() {
            let name = input.name.as_deref().unwrap_or(&current.name);
            let category_id = category_id.unwrap_or(current.category_id);
            if repo.name_taken(name, category_id, Some(current.id)).await? {
                return Err(
                    FieldErrors::single(FieldErrors::NON_FIELD, messages::DUPLICATE_TITLE).into(),
                );
            }
        }

        let updated = repo
            .update(
                current.id,
                TitleChanges {
                    name: input.name,
                    year: input.year,
                    description: input.description,
                    category_id,
                    genre_ids: genres.map(|gs| gs.iter().map(|g| g.id).collect()),
                },
            )
            .await?
            .ok_or_else(|| CatalogError::NotFound("Title".to_string()))?;

        self.render_title(updated).await
    }

    async fn delete_title(&self, actor: Option<&Actor>, id: TitleId) -> Result<(), CatalogError> {
        authorize(actor, Resource::Catalog, Action::Delete, None).check()?;

        if !self.store.title_repo().delete(id.value()).await? {
            return Err(CatalogError::NotFound("Title".to_string()));
        }

        info!(title_id = %id, "Deleted title");
        Ok(())
    }
}
