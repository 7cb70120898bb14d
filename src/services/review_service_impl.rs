//! `SeaORM` implementation of the `ReviewService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::constants::{limits, messages};
use crate::db::{Page, PageRequest, Store};
use crate::domain::permissions::{Action, Resource, authorize, require_authenticated};
use crate::domain::validators::{FieldErrors, validate_score, validate_text};
use crate::domain::{Actor, CommentId, ReviewId, TitleId, UserId};
use crate::entities::{comments, reviews};
use crate::services::review_service::{
    CommentInfo, CommentInput, ReviewError, ReviewInfo, ReviewInput, ReviewService,
};

pub struct SeaOrmReviewService {
    store: Store,
}

impl SeaOrmReviewService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_title(&self, title_id: TitleId) -> Result<(), ReviewError> {
        if self.store.title_repo().get(title_id.value()).await?.is_none() {
            return Err(ReviewError::NotFound("Title".to_string()));
        }
        Ok(())
    }

    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<reviews::Model, ReviewError> {
        self.ensure_title(title_id).await?;
        self.store
            .review_repo()
            .get_in_title(title_id.value(), review_id.value())
            .await?
            .ok_or_else(|| ReviewError::NotFound("Review".to_string()))
    }

    async fn find_comment(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<comments::Model, ReviewError> {
        let review = self.find_review(title_id, review_id).await?;
        self.store
            .comment_repo()
            .get_in_review(review.id, comment_id.value())
            .await?
            .ok_or_else(|| ReviewError::NotFound("Comment".to_string()))
    }

    async fn render_reviews(&self, models: Vec<reviews::Model>) -> Result<Vec<ReviewInfo>, ReviewError> {
        let author_ids: Vec<i32> = models.iter().map(|r| r.author_id).collect();
        let authors = self.store.user_repo().usernames_by_ids(&author_ids).await?;

        Ok(models
            .into_iter()
            .map(|review| ReviewInfo {
                id: ReviewId::new(review.id),
                text: review.text,
                author: authors.get(&review.author_id).cloned().unwrap_or_default(),
                score: review.score,
                pub_date: review.pub_date,
            })
            .collect())
    }

    async fn render_review(&self, model: reviews::Model) -> Result<ReviewInfo, ReviewError> {
        self.render_reviews(vec![model])
            .await?
            .pop()
            .ok_or_else(|| ReviewError::Internal("Review vanished while rendering".to_string()))
    }

    async fn render_comments(
        &self,
        models: Vec<comments::Model>,
    ) -> Result<Vec<CommentInfo>, ReviewError> {
        let author_ids: Vec<i32> = models.iter().map(|c| c.author_id).collect();
        let authors = self.store.user_repo().usernames_by_ids(&author_ids).await?;

        Ok(models
            .into_iter()
            .map(|comment| CommentInfo {
                id: CommentId::new(comment.id),
                text: comment.text,
                author: authors.get(&comment.author_id).cloned().unwrap_or_default(),
                pub_date: comment.pub_date,
            })
            .collect())
    }

    async fn render_comment(&self, model: comments::Model) -> Result<CommentInfo, ReviewError> {
        self.render_comments(vec![model])
            .await?
            .pop()
            .ok_or_else(|| ReviewError::Internal("Comment vanished while rendering".to_string()))
    }
}

fn check_owner(actor: &Actor, action: Action, author_id: i32) -> Result<(), ReviewError> {
    authorize(
        Some(actor),
        Resource::Discussion,
        action,
        Some(UserId::new(author_id)),
    )
    .check()?;
    Ok(())
}

#[async_trait]
impl ReviewService for SeaOrmReviewService {
    async fn list_reviews(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<Page<ReviewInfo>, ReviewError> {
        authorize(actor, Resource::Discussion, Action::Read, None).check()?;
        self.ensure_title(title_id).await?;

        let Page { items, total } = self
            .store
            .review_repo()
            .list_for_title(title_id.value(), page)
            .await?;
        let items = self.render_reviews(items).await?;

        Ok(Page { items, total })
    }

    async fn get_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<ReviewInfo, ReviewError> {
        authorize(actor, Resource::Discussion, Action::Read, None).check()?;

        let review = self.find_review(title_id, review_id).await?;
        self.render_review(review).await
    }

    async fn create_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        input: ReviewInput,
    ) -> Result<ReviewInfo, ReviewError> {
        authorize(actor, Resource::Discussion, Action::Create, None).check()?;
        let actor = require_authenticated(actor)?;
        self.ensure_title(title_id).await?;

        let mut errors = FieldErrors::new();
        let text = errors.require("text", input.text);
        let score = errors.require("score", input.score);
        if let Some(text) = &text {
            errors.check(
                "text",
                validate_text(text, Some(limits::REVIEW_TEXT_MAX_LENGTH)),
            );
        }
        if let Some(score) = score {
            errors.check("score", validate_score(score));
        }
        errors.into_result()?;

        let repo = self.store.review_repo();
        if repo
            .exists_for_author(title_id.value(), actor.id.value())
            .await?
        {
            return Err(
                FieldErrors::single(FieldErrors::NON_FIELD, messages::DUPLICATE_REVIEW).into(),
            );
        }

        let review = repo
            .create(
                title_id.value(),
                actor.id.value(),
                &text.unwrap_or_default(),
                score.unwrap_or_default(),
            )
            .await?;

        info!(review_id = review.id, title_id = %title_id, author = %actor.username, "Review posted");
        self.render_review(review).await
    }

    async fn update_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        input: ReviewInput,
    ) -> Result<ReviewInfo, ReviewError> {
        let actor = require_authenticated(actor)?;
        let review = self.find_review(title_id, review_id).await?;
        check_owner(actor, Action::Update, review.author_id)?;

        let mut errors = FieldErrors::new();
        if let Some(text) = &input.text {
            errors.check(
                "text",
                validate_text(text, Some(limits::REVIEW_TEXT_MAX_LENGTH)),
            );
        }
        if let Some(score) = input.score {
            errors.check("score", validate_score(score));
        }
        errors.into_result()?;

        let updated = self
            .store
            .review_repo()
            .update(review, input.text, input.score)
            .await?;

        self.render_review(updated).await
    }

    async fn delete_review(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<(), ReviewError> {
        let actor = require_authenticated(actor)?;
        let review = self.find_review(title_id, review_id).await?;
        check_owner(actor, Action::Delete, review.author_id)?;

        if !self.store.review_repo().delete(review.id).await? {
            return Err(ReviewError::NotFound("Review".to_string()));
        }

        info!(review_id = review.id, by = %actor.username, "Review deleted");
        Ok(())
    }

    async fn list_comments(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<Page<CommentInfo>, ReviewError> {
        authorize(actor, Resource::Discussion, Action::Read, None).check()?;
        let review = self.find_review(title_id, review_id).await?;

        let Page { items, total } = self
            .store
            .comment_repo()
            .list_for_review(review.id, page)
            .await?;
        let items = self.render_comments(items).await?;

        Ok(Page { items, total })
    }

    async fn get_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<CommentInfo, ReviewError> {
        authorize(actor, Resource::Discussion, Action::Read, None).check()?;

        let comment = self.find_comment(title_id, review_id, comment_id).await?;
        self.render_comment(comment).await
    }

    async fn create_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        input: CommentInput,
    ) -> Result<CommentInfo, ReviewError> {
        authorize(actor, Resource::Discussion, Action::Create, None).check()?;
        let actor = require_authenticated(actor)?;
        let review = self.find_review(title_id, review_id).await?;

        let mut errors = FieldErrors::new();
        let text = errors.require("text", input.text);
        if let Some(text) = &text {
            errors.check("text", validate_text(text, None));
        }
        errors.into_result()?;

        let comment = self
            .store
            .comment_repo()
            .create(review.id, actor.id.value(), &text.unwrap_or_default())
            .await?;

        info!(comment_id = comment.id, review_id = review.id, "Comment posted");
        self.render_comment(comment).await
    }

    async fn update_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
        input: CommentInput,
    ) -> Result<CommentInfo, ReviewError> {
        let actor = require_authenticated(actor)?;
        let comment = self.find_comment(title_id, review_id, comment_id).await?;
        check_owner(actor, Action::Update, comment.author_id)?;

        let Some(text) = input.text else {
            return self.render_comment(comment).await;
        };
        validate_text(&text, None).map_err(|msg| FieldErrors::single("text", msg))?;

        let updated = self.store.comment_repo().update_text(comment, text).await?;
        self.render_comment(updated).await
    }

    async fn delete_comment(
        &self,
        actor: Option<&Actor>,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<(), ReviewError> {
        let actor = require_authenticated(actor)?;
        let comment = self.find_comment(title_id, review_id, comment_id).await?;
        check_owner(actor, Action::Delete, comment.author_id)?;

        if !self.store.comment_repo().delete(comment.id).await? {
            return Err(ReviewError::NotFound("Comment".to_string()));
        }

        info!(comment_id = comment.id, by = %actor.username, "Comment deleted");
        Ok(())
    }
}
