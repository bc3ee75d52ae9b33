/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - public / identity gate / admin gate の 3 つの Router に分けて merge する
 * - gate は route_layer で掛けるので、gate の内側の handler は検証済みの前提で書ける
 * - 同じ path でも method ごとに gate が違うことがある (例: GET /classes/{id} は public, PUT は auth)
 */
use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::{
    middleware::auth::access::{require_identity, require_role},
    services::auth::Role,
    state::AppState,
};

use crate::api::v1::handlers::{
    assignments, auth, classes, feedbacks, health::health, instructor_requests, payments,
    stats::stats, users,
};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(require_identity(authed_routes(), state.clone()))
        .merge(require_role(admin_routes(), state, Role::Admin))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/token", post(auth::issue_token))
        .route("/auth/logout", post(auth::logout))
        .route("/users", put(users::upsert_user))
        .route("/classes", get(classes::list_accepted_classes))
        .route("/classes/popular", get(classes::list_popular_classes))
        .route("/classes/{id}", get(classes::get_class))
        .route("/classes/{id}/feedbacks", get(classes::list_class_feedbacks))
        .route("/feedbacks", get(feedbacks::list_feedbacks))
        .route("/stats", get(stats))
}

fn authed_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/by-email/{email}", get(users::get_user_by_email))
        .route("/classes", post(classes::create_class))
        .route(
            "/classes/by-teacher/{email}",
            get(classes::list_teacher_classes),
        )
        .route(
            "/classes/{id}",
            put(classes::update_class).delete(classes::delete_class),
        )
        .route(
            "/classes/{id}/enrollments/count",
            get(classes::count_enrollments),
        )
        .route(
            "/classes/{id}/assignments/count",
            get(classes::count_assignments),
        )
        .route(
            "/classes/{id}/submissions/count",
            get(classes::count_submissions),
        )
        .route(
            "/classes/{id}/assignments",
            get(classes::list_class_assignments),
        )
        .route("/assignments", post(assignments::create_assignment))
        .route(
            "/assignments/{id}/submissions",
            post(assignments::submit_assignment),
        )
        .route("/feedbacks", post(feedbacks::create_feedback))
        .route(
            "/instructor-requests",
            post(instructor_requests::create_request),
        )
        .route(
            "/instructor-requests/by-email/{email}",
            get(instructor_requests::get_request_by_email),
        )
        .route("/payments/intent", post(payments::create_intent))
        .route("/payments", post(payments::record_payment))
        .route(
            "/payments/by-email/{email}",
            get(payments::list_payments_by_email),
        )
        .route("/payments/{id}", get(payments::get_payment))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", patch(users::update_user))
        .route("/users/by-email/{email}", patch(users::update_user_by_email))
        .route("/classes/all", get(classes::list_all_classes))
        .route("/classes/{id}/status", patch(classes::update_class))
        .route(
            "/instructor-requests",
            get(instructor_requests::list_requests),
        )
        .route(
            "/instructor-requests/{id}",
            patch(instructor_requests::update_request),
        )
}
