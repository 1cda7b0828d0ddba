//! Runs the lifecycle and aggregate queries against a real Postgres.
//!
//! Set `TEST_DATABASE_URL` to enable; without it every test returns early.

use sea_orm::{Database, DatabaseConnection};
use tokio::sync::OnceCell;
use uuid::Uuid;

use subscriptions_backend::db::models::{MonthYear, NewSubscription, Pagination, SubscriptionPatch};
use subscriptions_backend::db::schema;
use subscriptions_backend::db::services::{SubscriptionService, TotalCostFilter};
use subscriptions_backend::web::AppError;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn service() -> Option<SubscriptionService> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let db: DatabaseConnection = Database::connect(url).await.expect("connect to test database");
    SCHEMA
        .get_or_init(|| async {
            schema::ensure_schema(&db).await.expect("create schema");
        })
        .await;
    Some(SubscriptionService::new(db))
}

fn month(raw: &str) -> MonthYear {
    raw.parse().unwrap()
}

fn new_subscription(user_id: Uuid, start: &str, end: Option<&str>) -> NewSubscription {
    NewSubscription {
        service_name: "Netflix".to_string(),
        price: 1500,
        user_id,
        start_date: month(start),
        end_date: end.map(month),
    }
}

#[tokio::test]
async fn created_ids_are_positive_and_unique() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();

    let first = service
        .create_subscription(new_subscription(user_id, "01-2026", None))
        .await
        .unwrap();
    let second = service
        .create_subscription(new_subscription(user_id, "02-2026", None))
        .await
        .unwrap();

    assert!(first.id > 0);
    assert!(second.id > 0);
    assert_ne!(first.id, second.id);
    assert_eq!(service.get_subscription(first.id).await.unwrap(), first);
}

#[tokio::test]
async fn total_counts_overlapping_subscriptions_only() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();
    service
        .create_subscription(new_subscription(user_id, "01-2026", Some("06-2026")))
        .await
        .unwrap();

    let overlapping = TotalCostFilter::new(month("05-2026"), month("07-2026")).with_user(user_id);
    assert_eq!(service.get_total_cost(&overlapping).await.unwrap().total, 1500);

    let disjoint = TotalCostFilter::new(month("07-2026"), month("12-2026")).with_user(user_id);
    assert_eq!(service.get_total_cost(&disjoint).await.unwrap().total, 0);
}

#[tokio::test]
async fn total_compares_months_across_years() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();
    service
        .create_subscription(new_subscription(user_id, "12-2025", None))
        .await
        .unwrap();

    let filter = TotalCostFilter::new(month("01-2026"), month("02-2026")).with_user(user_id);
    assert_eq!(service.get_total_cost(&filter).await.unwrap().total, 1500);

    let before = TotalCostFilter::new(month("01-2025"), month("11-2025")).with_user(user_id);
    assert_eq!(service.get_total_cost(&before).await.unwrap().total, 0);
}

#[tokio::test]
async fn total_applies_service_filter() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();
    service
        .create_subscription(new_subscription(user_id, "01-2026", None))
        .await
        .unwrap();
    service
        .create_subscription(NewSubscription {
            service_name: "Spotify".to_string(),
            price: 300,
            ..new_subscription(user_id, "01-2026", None)
        })
        .await
        .unwrap();

    let all = TotalCostFilter::new(month("01-2026"), month("01-2026")).with_user(user_id);
    assert_eq!(service.get_total_cost(&all).await.unwrap().total, 1800);

    let spotify = all.clone().with_service_name("Spotify");
    assert_eq!(service.get_total_cost(&spotify).await.unwrap().total, 300);
}

#[tokio::test]
async fn soft_deleted_records_disappear_from_reads() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();
    let created = service
        .create_subscription(new_subscription(user_id, "01-2026", None))
        .await
        .unwrap();

    service.delete_subscription(created.id).await.unwrap();

    assert!(matches!(
        service.get_subscription(created.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_subscription(created.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service
            .update_subscription(created.id, SubscriptionPatch::default())
            .await,
        Err(AppError::NotFound(_))
    ));

    let filter = TotalCostFilter::new(month("01-2026"), month("12-2026")).with_user(user_id);
    assert_eq!(service.get_total_cost(&filter).await.unwrap().total, 0);

    let page = service
        .list_subscriptions(Pagination::new(1, 100))
        .await
        .unwrap();
    assert!(page.subscriptions.iter().all(|s| s.id != created.id));
}

#[tokio::test]
async fn patch_changes_only_given_fields() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();
    let created = service
        .create_subscription(new_subscription(user_id, "01-2026", Some("06-2026")))
        .await
        .unwrap();

    let updated = service
        .update_subscription(
            created.id,
            SubscriptionPatch {
                price: Some(2000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.price, 2000);
    assert_eq!(updated.service_name, created.service_name);
    assert_eq!(updated.start_date, created.start_date);
    assert_eq!(updated.end_date, created.end_date);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let Some(service) = service().await else { return };
    let user_id = Uuid::new_v4();
    for start in ["01-2026", "02-2026", "03-2026"] {
        service
            .create_subscription(new_subscription(user_id, start, None))
            .await
            .unwrap();
    }

    let page = service
        .list_subscriptions(Pagination::new(1, 100))
        .await
        .unwrap();
    assert!(page.total >= 3);
    assert!(page.subscriptions.windows(2).all(|pair| pair[0].id < pair[1].id));
}
