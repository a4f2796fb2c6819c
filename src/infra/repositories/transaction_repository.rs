//! Payment transaction repository.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::base;
use super::entities::user_transaction::{self, ActiveModel, Entity as TransactionEntity};
use crate::domain::{NewTransaction, TransactionStatus, UserTransaction};
use crate::errors::{AppResult, OptionExt};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserTransaction>>;

    /// Page through transactions, newest first, optionally for one order
    async fn list(
        &self,
        order_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserTransaction>>;

    /// Whether the order already has a successful payment
    async fn has_success(&self, order_id: Uuid) -> AppResult<bool>;

    async fn create(&self, transaction: NewTransaction) -> AppResult<UserTransaction>;

    async fn update_status(&self, id: Uuid, status: TransactionStatus) -> AppResult<UserTransaction>;
}

pub struct TransactionStore {
    db: DatabaseConnection,
}

impl TransactionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionRepository for TransactionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserTransaction>> {
        TransactionEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(UserTransaction::try_from)
            .transpose()
    }

    async fn list(
        &self,
        order_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserTransaction>> {
        let mut query = TransactionEntity::find().order_by_desc(user_transaction::Column::CreatedAt);

        if let Some(order_id) = order_id {
            query = query.filter(user_transaction::Column::OrderId.eq(order_id));
        }

        let (models, total) = base::fetch_page(&self.db, query, &params).await?;
        let transactions = models
            .into_iter()
            .map(UserTransaction::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Paginated::new(transactions, &params, total))
    }

    async fn has_success(&self, order_id: Uuid) -> AppResult<bool> {
        has_success(&self.db, order_id).await
    }

    async fn create(&self, transaction: NewTransaction) -> AppResult<UserTransaction> {
        insert(&self.db, transaction).await
    }

    async fn update_status(&self, id: Uuid, status: TransactionStatus) -> AppResult<UserTransaction> {
        set_status(&self.db, id, status).await
    }
}

/// Load a transaction row with `SELECT ... FOR UPDATE`
pub(crate) async fn find_for_update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<UserTransaction>> {
    TransactionEntity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .map(UserTransaction::try_from)
        .transpose()
}

pub(crate) async fn has_success<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<bool> {
    let query = TransactionEntity::find()
        .filter(user_transaction::Column::OrderId.eq(order_id))
        .filter(user_transaction::Column::Status.eq(TransactionStatus::Success.as_str()));

    Ok(base::count(conn, query).await? > 0)
}

/// Fail every pending transaction of an order; returns how many were failed
pub(crate) async fn fail_pending<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<u64> {
    let result = TransactionEntity::update_many()
        .col_expr(
            user_transaction::Column::Status,
            Expr::value(TransactionStatus::Failed.as_str()),
        )
        .col_expr(user_transaction::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(user_transaction::Column::OrderId.eq(order_id))
        .filter(user_transaction::Column::Status.eq(TransactionStatus::Pending.as_str()))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

pub(crate) async fn insert<C: ConnectionTrait>(
    conn: &C,
    transaction: NewTransaction,
) -> AppResult<UserTransaction> {
    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(transaction.order_id),
        amount: Set(transaction.amount),
        method: Set(transaction.method.as_str().to_string()),
        status: Set(transaction.status.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(conn).await?;
    UserTransaction::try_from(model)
}

pub(crate) async fn set_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: TransactionStatus,
) -> AppResult<UserTransaction> {
    let model = TransactionEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_not_found("Transaction")?;

    let mut active: ActiveModel = model.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(conn).await?;
    UserTransaction::try_from(model)
}
