//! Domain service for categories, genres and titles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Page, PageRequest, is_unique_violation};
use crate::db::repositories::title::TitleFilter;
use crate::domain::permissions::Denied;
use crate::domain::validators::FieldErrors;
use crate::domain::{Actor, TitleId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Denied(#[from] Denied),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for CatalogError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Categories and genres share one shape and one set of rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Genre,
}

impl TermKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Genre => "Genre",
        }
    }
}

/// Category or genre as rendered by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermInfo {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleInfo {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    /// Rounded mean review score; `null` until the first review.
    pub rating: Option<i32>,
    pub description: String,
    pub genre: Vec<TermInfo>,
    pub category: Option<TermInfo>,
}

/// Write payload for titles. `genre` and `category` are slugs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleInput {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_terms(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<TermInfo>, CatalogError>;

    async fn get_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        slug: &str,
    ) -> Result<TermInfo, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for bad fields or a slug that is
    /// already taken.
    async fn create_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        input: TermInput,
    ) -> Result<TermInfo, CatalogError>;

    /// Renames a category or genre. The slug is immutable.
    async fn update_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        slug: &str,
        input: TermInput,
    ) -> Result<TermInfo, CatalogError>;

    async fn delete_term(
        &self,
        actor: Option<&Actor>,
        kind: TermKind,
        slug: &str,
    ) -> Result<(), CatalogError>;

    async fn list_titles(
        &self,
        actor: Option<&Actor>,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Page<TitleInfo>, CatalogError>;

    async fn get_title(&self, actor: Option<&Actor>, id: TitleId)
    -> Result<TitleInfo, CatalogError>;

    async fn create_title(
        &self,
        actor: Option<&Actor>,
        input: TitleInput,
    ) -> Result<TitleInfo, CatalogError>;

    async fn update_title(
        &self,
        actor: Option<&Actor>,
        id: TitleId,
        input: TitleInput,
    ) -> Result<TitleInfo, CatalogError>;

    async fn delete_title(&self, actor: Option<&Actor>, id: TitleId) -> Result<(), CatalogError>;
}
