//! Review repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::base;
use super::entities::review::{self, ActiveModel, Entity as ReviewEntity};
use crate::domain::{NewReview, Review, ReviewChanges, ReviewFilter};
use crate::errors::{AppResult, OptionExt};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>>;

    /// The review left on an order, if any (at most one exists)
    async fn find_by_order(&self, order_id: Uuid) -> AppResult<Option<Review>>;

    async fn list(&self, filter: ReviewFilter, params: PaginationParams) -> AppResult<Paginated<Review>>;

    async fn create(&self, review: NewReview) -> AppResult<Review>;

    async fn update(&self, id: Uuid, changes: ReviewChanges) -> AppResult<Review>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        let result = ReviewEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Review::from))
    }

    async fn find_by_order(&self, order_id: Uuid) -> AppResult<Option<Review>> {
        let result = ReviewEntity::find()
            .filter(review::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await?;

        Ok(result.map(Review::from))
    }

    async fn list(&self, filter: ReviewFilter, params: PaginationParams) -> AppResult<Paginated<Review>> {
        let mut condition = Condition::all();

        if let Some(rating) = filter.rating {
            condition = condition.add(review::Column::Rating.eq(rating));
        }
        if let Some(user_id) = filter.user_id {
            condition = condition.add(review::Column::UserId.eq(user_id));
        }
        if let Some(order_id) = filter.order_id {
            condition = condition.add(review::Column::OrderId.eq(order_id));
        }

        let query = ReviewEntity::find()
            .filter(condition)
            .order_by_desc(review::Column::CreatedAt);

        let (models, total) = base::fetch_page(&self.db, query, &params).await?;
        let reviews = models.into_iter().map(Review::from).collect();

        Ok(Paginated::new(reviews, &params, total))
    }

    async fn create(&self, review: NewReview) -> AppResult<Review> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(review.order_id),
            user_id: Set(review.user_id),
            rating: Set(review.rating),
            comment: Set(review.comment),
            admin_reply: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Review::from(model))
    }

    async fn update(&self, id: Uuid, changes: ReviewChanges) -> AppResult<Review> {
        let model = ReviewEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Review")?;

        let mut active: ActiveModel = model.into();

        if let Some(rating) = changes.rating {
            active.rating = Set(rating);
        }
        if let Some(comment) = changes.comment {
            active.comment = Set(Some(comment));
        }
        if let Some(admin_reply) = changes.admin_reply {
            active.admin_reply = Set(Some(admin_reply));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Review::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        base::delete_by_id::<ReviewEntity, _>(&self.db, id, "Review").await
    }
}
