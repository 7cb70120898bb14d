//! Domain service for reviews and their comments.
//!
//! Reviews live under a title and comments under a review; every lookup is
//! scoped to its parent, so an id reached through the wrong parent is
//! reported as not found.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Page, PageRequest, is_unique_violation};
use crate::domain::permissions::Denied;
use crate::domain::validators::FieldErrors;
use crate::domain::{Actor, CommentId, ReviewId, TitleId};

#[derive(Debug, Error)]
pub enum ReviewError {
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

impl From<FieldErrors> for ReviewError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewInfo {
    pub id: ReviewId,
    pub text: String,
    /// Username of the author.
    pub author: String,
    pub score: i32,
    pub pub_date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub text: Option<String>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentInfo {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    pub pub_date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    pub text: Option<String>,
}

#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    async fn list_reviews(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<Page<ReviewInfo>, ReviewError>;

    async fn get_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<ReviewInfo, ReviewError>;

    /// Posts the caller's review of a title.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Validation`] when the caller already reviewed
    /// the title, and [`ReviewError::Conflict`] when a concurrent request
    /// won the race to the unique index.
    async fn create_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        input: ReviewInput,
    ) -> Result<ReviewInfo, ReviewError>;

    async fn update_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        input: ReviewInput,
    ) -> Result<ReviewInfo, ReviewError>;

    async fn delete_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<(), ReviewError>;

    async fn list_comments(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<Page<CommentInfo>, ReviewError>;

    async fn get_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<CommentInfo, ReviewError>;

    async fn create_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        input: CommentInput,
    ) -> Result<CommentInfo, ReviewError>;

    async fn update_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
        input: CommentInput,
    ) -> Result<CommentInfo, ReviewError>;

    async fn delete_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<(), ReviewError>;
}
