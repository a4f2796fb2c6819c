//! Query helpers shared by every repository.
//!
//! Each helper is generic over `ConnectionTrait` so the same code runs
//! against the pooled connection and inside a `DatabaseTransaction`.

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, PrimaryKeyTrait, Select};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Fetch one page of `query` together with the total row count
pub(crate) async fn fetch_page<E, C>(
    conn: &C,
    query: Select<E>,
    params: &PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let paginator = query.paginate(conn, params.limit());
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(params.page_index()).await?;
    Ok((models, total))
}

/// Count rows matched by `query`
pub(crate) async fn count<E, C>(conn: &C, query: Select<E>) -> AppResult<u64>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    query.count(conn).await.map_err(AppError::from)
}

/// Hard delete by primary key; `NotFound(entity)` when nothing was removed
pub(crate) async fn delete_by_id<E, C>(conn: &C, id: Uuid, entity: &'static str) -> AppResult<()>
where
    E: EntityTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    C: ConnectionTrait,
{
    let result = E::delete_by_id(id).exec(conn).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(entity));
    }

    Ok(())
}

/// Case-insensitive substring match: `LOWER(col) LIKE '%needle%'`
pub(crate) fn contains_ci<T: IntoColumnRef>(col: T, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.trim().to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

fn escape_like(s: &str) -> String {
    s.replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("pizza"), "pizza");
    }
}
