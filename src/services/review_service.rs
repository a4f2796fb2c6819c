//! Review service - order reviews and the staff reply workflow.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::review::ensure_rating;
use crate::domain::{Actor, NewReview, OrderStatus, Review, ReviewChanges, ReviewFilter};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Review a completed order the caller placed; one review per order
    async fn create_review(
        &self,
        actor: Actor,
        order_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> AppResult<Review>;

    async fn list_reviews(&self, filter: ReviewFilter, params: PaginationParams) -> AppResult<Paginated<Review>>;

    async fn get_review(&self, id: Uuid) -> AppResult<Review>;

    /// Author edits rating and/or comment
    async fn update_review(
        &self,
        actor: Actor,
        id: Uuid,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> AppResult<Review>;

    /// Set the staff reply (admin)
    async fn reply_to_review(&self, id: Uuid, reply: String) -> AppResult<Review>;

    /// Author or admin
    async fn delete_review(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct ReviewManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReviewManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, id: Uuid) -> AppResult<Review> {
        self.uow.reviews().find_by_id(id).await?.ok_or_not_found("Review")
    }
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewManager<U> {
    async fn create_review(
        &self,
        actor: Actor,
        order_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> AppResult<Review> {
        ensure_rating(rating)?;

        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order")?;
        if !order.is_owned_by(actor.id) {
            return Err(AppError::Forbidden);
        }
        if order.status != OrderStatus::Completed {
            return Err(AppError::bad_request("Only completed orders can be reviewed"));
        }
        if self.uow.reviews().find_by_order(order_id).await?.is_some() {
            return Err(AppError::conflict("This order has already been reviewed"));
        }

        let review = self
            .uow
            .reviews()
            .create(NewReview {
                order_id,
                user_id: actor.id,
                rating,
                comment,
            })
            .await?;

        tracing::info!(review_id = %review.id, order_id = %order_id, rating, "Review created");
        Ok(review)
    }

    async fn list_reviews(&self, filter: ReviewFilter, params: PaginationParams) -> AppResult<Paginated<Review>> {
        if let Some(rating) = filter.rating {
            ensure_rating(rating)?;
        }
        self.uow.reviews().list(filter, params).await
    }

    async fn get_review(&self, id: Uuid) -> AppResult<Review> {
        self.find(id).await
    }

    async fn update_review(
        &self,
        actor: Actor,
        id: Uuid,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> AppResult<Review> {
        if let Some(rating) = rating {
            ensure_rating(rating)?;
        }

        let review = self.find(id).await?;
        if !review.is_written_by(actor.id) {
            return Err(AppError::Forbidden);
        }

        let changes = ReviewChanges {
            rating,
            comment,
            admin_reply: None,
        };
        self.uow.reviews().update(id, changes).await
    }

    async fn reply_to_review(&self, id: Uuid, reply: String) -> AppResult<Review> {
        let reply = reply.trim().to_string();
        if reply.is_empty() {
            return Err(AppError::validation("Reply must not be empty"));
        }

        self.find(id).await?;

        let changes = ReviewChanges {
            admin_reply: Some(reply),
            ..Default::default()
        };
        let review = self.uow.reviews().update(id, changes).await?;
        tracing::info!(review_id = %id, "Review replied");
        Ok(review)
    }

    async fn delete_review(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let review = self.find(id).await?;
        if !actor.can_access(review.user_id) {
            return Err(AppError::Forbidden);
        }
        self.uow.reviews().delete(id).await
    }
}
