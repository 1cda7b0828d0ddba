pub mod subscription_routes;
