//! Database access for the subscription domain.
//!
//! The SQL lives here so handlers only deal with validated domain values and
//! API models.

pub mod subscription_service;
pub mod total_cost_query;

pub use subscription_service::*;
pub use total_cost_query::*;
