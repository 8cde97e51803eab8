use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_project::create_project;
use super::handlers::create_qris_payment::create_qris_payment;
use super::handlers::create_user::create_user;
use super::handlers::enroll::enroll;
use super::handlers::get_course::get_course;
use super::handlers::get_payment_status::get_payment_status;
use super::handlers::get_project::get_project;
use super::handlers::get_user::get_user;
use super::handlers::list_courses::list_courses;
use super::handlers::list_projects::list_projects;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::payment_webhook::payment_webhook;
use super::handlers::simulate_payment::simulate_payment;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::course::ports::CourseServicePort;
use crate::domain::payment::ports::PaymentServicePort;
use crate::domain::project::ports::ProjectServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub project_service: Arc<dyn ProjectServicePort>,
    pub course_service: Arc<dyn CourseServicePort>,
    pub payment_service: Arc<dyn PaymentServicePort>,
}

/// Build the HTTP application.
///
/// `POST /api/payments/simulate/:payment_id` is only routed when
/// `simulation_enabled` is set.
pub fn create_router(state: AppState, simulation_enabled: bool) -> Router {
    let mut public_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/courses", get(list_courses))
        .route("/api/courses/:slug", get(get_course))
        .route("/api/enrollments", post(enroll))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/:project_id", get(get_project))
        .route("/api/payments/status/:payment_id", get(get_payment_status))
        .route("/api/payments/webhook", post(payment_webhook));

    if simulation_enabled {
        tracing::warn!("Payment simulation endpoint enabled");
        public_routes = public_routes.route(
            "/api/payments/simulate/:payment_id",
            post(simulate_payment),
        );
    }

    let protected_routes = Router::new()
        .route("/api/users/:user_id", get(get_user))
        .route("/api/projects", post(create_project))
        .route("/api/payments/qris", post(create_qris_payment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
