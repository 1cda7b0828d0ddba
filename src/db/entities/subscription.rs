use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;

/// A subscription row. Month columns hold the first day of the month.
///
/// Timestamps come from the database clock.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: ChronoDateTimeUtc,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: ChronoDateTimeUtc,
    pub deleted_at: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
