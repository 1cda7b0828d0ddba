use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::error;

use crate::db::entities::subscription;
use crate::db::models::{
    ListSubscriptionsResponse, NewSubscription, Pagination, Subscription, SubscriptionPatch,
    TotalCostResponse,
};
use crate::db::services::total_cost_query::TotalCostFilter;
use crate::web::AppError;

const NOT_FOUND_MESSAGE: &str = "subscription not found";

/// Lifecycle operations over live subscription records.
///
/// Every operation issues a single statement (listing issues a count and a
/// page select) and leaves atomicity to the database.
pub struct SubscriptionService {
    db: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_subscription(
        &self,
        new_subscription: NewSubscription,
    ) -> Result<Subscription, AppError> {
        let active = subscription::ActiveModel {
            id: NotSet,
            service_name: Set(new_subscription.service_name),
            price: Set(new_subscription.price),
            user_id: Set(new_subscription.user_id),
            start_date: Set(new_subscription.start_date.first_day()),
            end_date: Set(new_subscription.end_date.map(|month| month.first_day())),
            created_at: NotSet,
            updated_at: NotSet,
            deleted_at: NotSet,
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| persistence_error("create", e))?;
        Ok(model.into())
    }

    pub async fn get_subscription(&self, id: i32) -> Result<Subscription, AppError> {
        subscription::Entity::find_by_id(id)
            .filter(subscription::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| persistence_error("get", e))?
            .map(Subscription::from)
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    pub async fn list_subscriptions(
        &self,
        pagination: Pagination,
    ) -> Result<ListSubscriptionsResponse, AppError> {
        let live = subscription::Entity::find()
            .filter(subscription::Column::DeletedAt.is_null());

        let total = live
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| persistence_error("list", e))?;

        let subscriptions = live
            .order_by_asc(subscription::Column::Id)
            .limit(pagination.limit())
            .offset(pagination.offset())
            .all(&self.db)
            .await
            .map_err(|e| persistence_error("list", e))?
            .into_iter()
            .map(Subscription::from)
            .collect();

        Ok(ListSubscriptionsResponse {
            subscriptions,
            total,
        })
    }

    /// Marks a live record as deleted. A missing or already deleted id is `NotFound`.
    pub async fn delete_subscription(&self, id: i32) -> Result<(), AppError> {
        let result = subscription::Entity::update_many()
            .col_expr(
                subscription::Column::DeletedAt,
                Expr::current_timestamp().into(),
            )
            .filter(subscription::Column::Id.eq(id))
            .filter(subscription::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| persistence_error("delete", e))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Applies only the fields present in `patch` and refreshes `updated_at`.
    pub async fn update_subscription(
        &self,
        id: i32,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, AppError> {
        let mut update = subscription::Entity::update_many();
        if let Some(service_name) = patch.service_name {
            update = update.col_expr(subscription::Column::ServiceName, Expr::value(service_name));
        }
        if let Some(price) = patch.price {
            update = update.col_expr(subscription::Column::Price, Expr::value(price));
        }
        if let Some(start_date) = patch.start_date {
            update = update.col_expr(
                subscription::Column::StartDate,
                Expr::value(start_date.first_day()),
            );
        }
        if let Some(end_date) = patch.end_date {
            update = update.col_expr(
                subscription::Column::EndDate,
                Expr::value(end_date.first_day()),
            );
        }

        let updated = update
            .col_expr(
                subscription::Column::UpdatedAt,
                Expr::current_timestamp().into(),
            )
            .filter(subscription::Column::Id.eq(id))
            .filter(subscription::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| persistence_error("update", e))?;

        updated
            .into_iter()
            .next()
            .map(Subscription::from)
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    pub async fn get_total_cost(
        &self,
        filter: &TotalCostFilter,
    ) -> Result<TotalCostResponse, AppError> {
        let total = filter
            .fetch_total(&self.db)
            .await
            .map_err(|e| persistence_error("calculate total cost of", e))?;
        Ok(TotalCostResponse { total })
    }
}

/// Logs the store failure and keeps its details out of the response.
fn persistence_error(operation: &str, err: DbErr) -> AppError {
    error!(operation, error = %err, "Subscription store operation failed.");
    AppError::DatabaseError(format!("failed to {operation} subscription"))
}
