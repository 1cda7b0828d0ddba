//! Aggregate cost over a billing period.
//!
//! A subscription counts towards a period when its active months intersect
//! the period: it starts in the period's last month or earlier, and it either
//! never ends or ends in the period's first month or later. Months are stored
//! as the first day of the month, so comparing dates compares months.

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QuerySelect, Select,
};
use uuid::Uuid;

use crate::db::entities::subscription;
use crate::db::models::MonthYear;

/// Validated total-cost request: mandatory bounds plus optional equality filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalCostFilter {
    pub period_start: MonthYear,
    pub period_end: MonthYear,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct TotalCostRow {
    total: i64,
}

impl TotalCostFilter {
    pub fn new(period_start: MonthYear, period_end: MonthYear) -> Self {
        Self {
            period_start,
            period_end,
            user_id: None,
            service_name: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Predicates in a fixed order: live, start bound, end bound, user, service.
    /// Optional filters only contribute when they are set.
    pub fn condition(&self) -> Condition {
        Condition::all()
            .add(subscription::Column::DeletedAt.is_null())
            .add(subscription::Column::StartDate.lte(self.period_end.first_day()))
            .add(
                Condition::any()
                    .add(subscription::Column::EndDate.is_null())
                    .add(subscription::Column::EndDate.gte(self.period_start.first_day())),
            )
            .add_option(self.user_id.map(|user_id| subscription::Column::UserId.eq(user_id)))
            .add_option(
                self.service_name
                    .as_deref()
                    .map(|name| subscription::Column::ServiceName.eq(name)),
            )
    }

    /// `SELECT COALESCE(SUM(price), 0) AS total ... WHERE <condition>`
    pub fn select(&self) -> Select<subscription::Entity> {
        subscription::Entity::find()
            .select_only()
            .column_as(
                SimpleExpr::from(Func::coalesce([
                    Expr::col(subscription::Column::Price).sum(),
                    Expr::val(0i64).into(),
                ])),
                "total",
            )
            .filter(self.condition())
    }

    pub async fn fetch_total(&self, db: &DatabaseConnection) -> Result<i64, DbErr> {
        let row = self
            .select()
            .into_model::<TotalCostRow>()
            .one(db)
            .await?;
        Ok(row.map(|row| row.total).unwrap_or(0))
    }
}
