use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::db::models::{ListSubscriptionsResponse, Subscription, TotalCostResponse};
use crate::web::models::{CreateSubscriptionRequest, StatusResponse, UpdateSubscriptionRequest};
use crate::web::routes::subscription_routes;

pub const SWAGGER_PATH: &str = "/swagger";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscriptions API",
        description = "Records users' online subscriptions and totals their monthly cost over a period."
    ),
    paths(
        crate::web::health_check_handler,
        subscription_routes::create_subscription_handler,
        subscription_routes::get_subscription_handler,
        subscription_routes::update_subscription_handler,
        subscription_routes::delete_subscription_handler,
        subscription_routes::list_subscriptions_handler,
        subscription_routes::get_total_cost_handler,
    ),
    components(schemas(
        Subscription,
        ListSubscriptionsResponse,
        TotalCostResponse,
        CreateSubscriptionRequest,
        UpdateSubscriptionRequest,
        StatusResponse,
    )),
    tags((name = "subscriptions", description = "Subscription records and cost totals"))
)]
pub struct ApiDoc;

/// Interactive docs at `/swagger`, backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}
