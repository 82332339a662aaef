use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth;
use crate::handlers::{admin, pages, plant, system};
use crate::AppState;

/// Complete application router.
pub fn build_router(state: AppState, cors_allowed_origins: Option<&str>) -> Router {
    let frontend_dir = state.frontend_dir.clone();

    let app = Router::new()
        .route("/health", get(system::health_check))
        .route("/api/status", get(system::api_status))
        .merge(plant_routes(state.clone()))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes(state.clone()))
        .merge(page_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(build_cors_layer(cors_allowed_origins))
        .with_state(state);

    // Serve static frontend files if the directory exists
    if std::path::Path::new(&frontend_dir).exists() {
        tracing::info!("Serving frontend from {}", frontend_dir);
        let index_path = format!("{}/index.html", frontend_dir);
        let serve_dir = ServeDir::new(&frontend_dir).not_found_service(ServeFile::new(&index_path));
        app.fallback_service(serve_dir)
    } else {
        tracing::info!(
            "Frontend directory not found at {}, serving API only",
            frontend_dir
        );
        app
    }
}

fn plant_routes(state: AppState) -> Router<AppState> {
    let members = Router::new()
        .route("/api/plant/water", post(plant::water_plant))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_auth,
        ));

    let admin_only = Router::new()
        .route("/api/plant/settings", put(plant::update_settings))
        .route("/api/plant/reset", post(plant::reset_plant))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth::require_api_auth));

    Router::new()
        .route("/api/plant", get(plant::get_plant))
        .route("/api/plant/status", get(plant::get_status))
        .route("/api/plant/timer", get(plant::get_timer))
        .merge(members)
        .merge(admin_only)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::auth_login))
        .route("/callback", get(auth::auth_callback))
        .route("/logout", post(auth::auth_logout))
        .route("/status", get(auth::auth_status))
        .route(
            "/demo-login",
            get(auth::demo_login_get).post(auth::demo_login_post),
        )
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/config", get(admin::get_config))
        .route("/config/timeout", put(admin::update_timeout))
        .route(
            "/users",
            get(admin::list_users)
                .post(admin::add_user)
                .delete(admin::remove_user_by_query),
        )
        .route("/users/:email", delete(admin::remove_user))
        .route("/history", get(admin::get_history))
        .route("/stats", get(admin::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth::require_api_auth))
}

fn page_routes(state: AppState) -> Router<AppState> {
    let admin_page = Router::new()
        .route("/admin", get(pages::admin_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth));

    Router::new()
        .route("/login", get(pages::login_page))
        .merge(admin_page)
}

/// Build CORS layer from the configured origin list.
///
/// Without an explicit list, CORS is permissive (for development only).
fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                tracing::warn!(
                    "CORS_ALLOWED_ORIGINS is set but empty, using permissive CORS (not recommended for production)"
                );
                CorsLayer::permissive()
            } else {
                tracing::info!("CORS configured for origins: {:?}", origins);
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([header::CONTENT_TYPE, header::COOKIE])
                    .allow_credentials(true)
            }
        }
        None => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
            );
            CorsLayer::permissive()
        }
    }
}
