use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::entities::subscription;

/// A calendar month, written `MM-YYYY` on the wire.
///
/// Ordering is chronological: the year is compared before the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthYearError;

impl fmt::Display for ParseMonthYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected a month in MM-YYYY format")
    }
}

impl std::error::Error for ParseMonthYearError {}

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The first day of the month, which is how months are stored.
    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction and day 1 exists in every month
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl FromStr for MonthYear {
    type Err = ParseMonthYearError;

    /// Accepts exactly two month digits, a dash and four year digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[2] != b'-' {
            return Err(ParseMonthYearError);
        }
        let (month, year) = (&s[..2], &s[3..]);
        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ParseMonthYearError);
        }
        let month: u32 = month.parse().map_err(|_| ParseMonthYearError)?;
        let year: i32 = year.parse().map_err(|_| ParseMonthYearError)?;
        Self::new(month, year).ok_or(ParseMonthYearError)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A live subscription as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Subscription {
    pub id: i32,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "07-2025")]
    pub start_date: MonthYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "12-2025")]
    pub end_date: Option<MonthYear>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<subscription::Model> for Subscription {
    fn from(model: subscription::Model) -> Self {
        Self {
            id: model.id,
            service_name: model.service_name,
            price: model.price,
            user_id: model.user_id,
            start_date: model.start_date.into(),
            end_date: model.end_date.map(MonthYear::from),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A validated subscription ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

/// Sparse update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub start_date: Option<MonthYear>,
    pub end_date: Option<MonthYear>,
}

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Page selection for listing, always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    /// Pages below 1 become 1; limits outside `1..=100` become 10.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = u64::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = u64::try_from(limit)
            .ok()
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListSubscriptionsResponse {
    pub subscriptions: Vec<Subscription>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct TotalCostResponse {
    pub total: i64,
}
