use axum::{response::Html, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

const HOME_PAGE: &str = include_str!("../templates/home.html");

pub fn build_app() -> Router {
    Router::new()
        .route("/", get(home))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}
