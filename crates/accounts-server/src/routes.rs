use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::users as user_handlers;
use crate::service::UserService;
use crate::Config;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub config: Config,
}

pub fn create_router(users: UserService, config: Config) -> Router {
    let state = AppState {
        users: Arc::new(users),
        config,
    };

    let user_routes = Router::new()
        .route("/signup", post(user_handlers::create_user))
        .route("/login", post(user_handlers::login))
        .route("/getUser/:username", get(user_handlers::get_user))
        .route("/deleteUser/:username", delete(user_handlers::delete_user))
        .route("/resetPassword", patch(user_handlers::reset_password))
        .route("/updateBiography", patch(user_handlers::update_biography));

    Router::new()
        .route("/health", get(health_check))
        .nest("/user", user_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
