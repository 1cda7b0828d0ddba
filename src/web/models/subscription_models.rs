use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::models::{
    DEFAULT_LIMIT, DEFAULT_PAGE, MonthYear, NewSubscription, Pagination, SubscriptionPatch,
};
use crate::db::services::TotalCostFilter;
use crate::web::AppError;

// --- Request Structs ---

/// Body of `POST /api/v1/subscriptions`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[serde(default)]
    #[schema(example = 400)]
    pub price: i32,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[serde(default)]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// Body of `PUT /api/v1/subscriptions/{id}`; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query of `GET /api/v1/subscriptions/total`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostQuery {
    /// First month of the period, `MM-YYYY`.
    #[param(required = true, example = "01-2025")]
    pub start: Option<String>,
    /// Last month of the period, `MM-YYYY`.
    #[param(required = true, example = "12-2025")]
    pub end: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Query of `GET /api/v1/subscriptions/list`. Values are parsed leniently.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

// --- Validation ---

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidInput(message.into())
}

fn parse_month(raw: &str, field: &str) -> Result<MonthYear, AppError> {
    raw.parse()
        .map_err(|_| invalid(format!("{field} must be in format MM-YYYY")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl CreateSubscriptionRequest {
    /// Checks the rules in order and stops at the first violation.
    pub fn validate(self) -> Result<NewSubscription, AppError> {
        if self.user_id.is_nil() {
            return Err(invalid("user_id is required"));
        }
        if self.service_name.is_empty() {
            return Err(invalid("service_name is required"));
        }
        if self.price < 0 {
            return Err(invalid("price must be greater than or equal to 0"));
        }
        if self.start_date.is_empty() {
            return Err(invalid("start_date is required"));
        }
        let start_date = parse_month(&self.start_date, "start_date")?;
        let end_date = non_empty(self.end_date)
            .map(|raw| parse_month(&raw, "end_date"))
            .transpose()?;

        Ok(NewSubscription {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}

impl UpdateSubscriptionRequest {
    /// Validates each provided field. An empty `end_date` counts as not provided.
    pub fn into_patch(self) -> Result<SubscriptionPatch, AppError> {
        if self.service_name.as_deref() == Some("") {
            return Err(invalid("service_name must not be empty"));
        }
        if self.price.is_some_and(|price| price < 0) {
            return Err(invalid("price must be greater than or equal to 0"));
        }
        let start_date = self
            .start_date
            .as_deref()
            .map(|raw| parse_month(raw, "start_date"))
            .transpose()?;
        let end_date = non_empty(self.end_date)
            .map(|raw| parse_month(&raw, "end_date"))
            .transpose()?;

        Ok(SubscriptionPatch {
            service_name: self.service_name,
            price: self.price,
            start_date,
            end_date,
        })
    }
}

impl TotalCostQuery {
    pub fn validate(self) -> Result<TotalCostFilter, AppError> {
        let start = non_empty(self.start).ok_or_else(|| invalid("start is required"))?;
        let end = non_empty(self.end).ok_or_else(|| invalid("end is required"))?;
        let period_start = parse_month(&start, "start")?;
        let period_end = parse_month(&end, "end")?;
        if period_start > period_end {
            return Err(invalid("start must not be after end"));
        }

        let mut filter = TotalCostFilter::new(period_start, period_end);
        if let Some(raw) = non_empty(self.user_id) {
            let user_id = Uuid::parse_str(&raw)
                .map_err(|_| invalid("user_id must be a valid UUID"))?;
            filter = filter.with_user(user_id);
        }
        if let Some(service_name) = non_empty(self.service_name) {
            filter = filter.with_service_name(service_name);
        }
        Ok(filter)
    }
}

impl ListQuery {
    /// Unparseable values fall back to the defaults before clamping.
    pub fn pagination(&self) -> Pagination {
        let parse = |raw: &Option<String>, default: u64| {
            raw.as_deref()
                .and_then(|value| value.trim().parse::<i64>().ok())
                .unwrap_or(default as i64)
        };
        Pagination::new(parse(&self.page, DEFAULT_PAGE), parse(&self.limit, DEFAULT_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            service_name: "Netflix".to_string(),
            price: 1500,
            user_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            start_date: "01-2026".to_string(),
            end_date: Some("10-2026".to_string()),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::InvalidInput(msg) => msg,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_accepts_valid_request() {
        let new_subscription = valid_create().validate().unwrap();
        assert_eq!(new_subscription.start_date.to_string(), "01-2026");
        assert_eq!(new_subscription.end_date.unwrap().to_string(), "10-2026");
    }

    #[test]
    fn create_reports_first_violation() {
        let request = CreateSubscriptionRequest {
            price: -1,
            start_date: "bad".to_string(),
            ..Default::default()
        };
        assert_eq!(message(request.validate().unwrap_err()), "user_id is required");

        let request = CreateSubscriptionRequest {
            service_name: String::new(),
            price: -1,
            ..valid_create()
        };
        assert_eq!(message(request.validate().unwrap_err()), "service_name is required");

        let request = CreateSubscriptionRequest {
            price: -1,
            start_date: String::new(),
            ..valid_create()
        };
        assert_eq!(
            message(request.validate().unwrap_err()),
            "price must be greater than or equal to 0"
        );

        let request = CreateSubscriptionRequest {
            start_date: String::new(),
            ..valid_create()
        };
        assert_eq!(message(request.validate().unwrap_err()), "start_date is required");
    }

    #[test]
    fn create_rejects_non_month_year_dates() {
        for raw in ["2026-01", "1-2026", "01.2026"] {
            let request = CreateSubscriptionRequest {
                start_date: raw.to_string(),
                ..valid_create()
            };
            assert_eq!(
                message(request.validate().unwrap_err()),
                "start_date must be in format MM-YYYY"
            );
        }

        let request = CreateSubscriptionRequest {
            end_date: Some("2026-10".to_string()),
            ..valid_create()
        };
        assert_eq!(
            message(request.validate().unwrap_err()),
            "end_date must be in format MM-YYYY"
        );
    }

    #[test]
    fn create_treats_empty_end_date_as_open_ended() {
        let request = CreateSubscriptionRequest {
            end_date: Some(String::new()),
            ..valid_create()
        };
        assert_eq!(request.validate().unwrap().end_date, None);
    }

    #[test]
    fn create_request_defaults_missing_fields() {
        let request: CreateSubscriptionRequest =
            serde_json::from_str(r#"{"service_name":"Netflix","start_date":"01-2026"}"#).unwrap();
        assert!(request.user_id.is_nil());
        assert_eq!(request.price, 0);
        assert_eq!(message(request.validate().unwrap_err()), "user_id is required");
    }

    #[test]
    fn patch_keeps_only_provided_fields() {
        let request: UpdateSubscriptionRequest = serde_json::from_str(r#"{"price":500}"#).unwrap();
        let patch = request.into_patch().unwrap();
        assert_eq!(
            patch,
            SubscriptionPatch {
                price: Some(500),
                ..Default::default()
            }
        );
    }

    #[test]
    fn patch_validates_provided_fields() {
        let cases = [
            (r#"{"service_name":""}"#, "service_name must not be empty"),
            (r#"{"price":-5}"#, "price must be greater than or equal to 0"),
            (r#"{"start_date":"2026-02"}"#, "start_date must be in format MM-YYYY"),
            (r#"{"end_date":"12/2026"}"#, "end_date must be in format MM-YYYY"),
        ];
        for (body, expected) in cases {
            let request: UpdateSubscriptionRequest = serde_json::from_str(body).unwrap();
            assert_eq!(message(request.into_patch().unwrap_err()), expected, "{body}");
        }

        let request: UpdateSubscriptionRequest =
            serde_json::from_str(r#"{"start_date":"02-2026","end_date":""}"#).unwrap();
        let patch = request.into_patch().unwrap();
        assert_eq!(patch.start_date.unwrap().to_string(), "02-2026");
        assert_eq!(patch.end_date, None);
    }

    #[test]
    fn total_query_validation_order() {
        let query = TotalCostQuery::default();
        assert_eq!(message(query.validate().unwrap_err()), "start is required");

        let query = TotalCostQuery {
            start: Some("bad".to_string()),
            ..Default::default()
        };
        assert_eq!(message(query.validate().unwrap_err()), "end is required");

        let query = TotalCostQuery {
            start: Some("2026-01".to_string()),
            end: Some("bad".to_string()),
            ..Default::default()
        };
        assert_eq!(message(query.validate().unwrap_err()), "start must be in format MM-YYYY");

        let query = TotalCostQuery {
            start: Some("01-2026".to_string()),
            end: Some("13-2026".to_string()),
            ..Default::default()
        };
        assert_eq!(message(query.validate().unwrap_err()), "end must be in format MM-YYYY");
    }

    #[test]
    fn total_query_rejects_inverted_period() {
        let query = TotalCostQuery {
            start: Some("07-2026".to_string()),
            end: Some("05-2026".to_string()),
            ..Default::default()
        };
        assert_eq!(message(query.validate().unwrap_err()), "start must not be after end");
    }

    #[test]
    fn total_query_builds_optional_filters() {
        let query = TotalCostQuery {
            start: Some("05-2026".to_string()),
            end: Some("07-2026".to_string()),
            user_id: Some("550e8400-e29b-41d4-a716-446655440000".to_string()),
            service_name: Some(String::new()),
        };
        let filter = query.validate().unwrap();
        assert!(filter.user_id.is_some());
        assert_eq!(filter.service_name, None);

        let query = TotalCostQuery {
            start: Some("05-2026".to_string()),
            end: Some("07-2026".to_string()),
            user_id: Some("not-a-uuid".to_string()),
            service_name: None,
        };
        assert_eq!(message(query.validate().unwrap_err()), "user_id must be a valid UUID");
    }

    #[test]
    fn list_query_falls_back_and_clamps() {
        let query = ListQuery {
            page: Some("0".to_string()),
            limit: Some("500".to_string()),
        };
        let pagination = query.pagination();
        assert_eq!((pagination.page(), pagination.limit()), (1, 10));

        let query = ListQuery {
            page: Some("abc".to_string()),
            limit: None,
        };
        let pagination = query.pagination();
        assert_eq!((pagination.page(), pagination.limit()), (1, 10));

        let query = ListQuery {
            page: Some("3".to_string()),
            limit: Some("25".to_string()),
        };
        assert_eq!(query.pagination().offset(), 50);
    }
}
