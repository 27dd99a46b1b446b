//! Route registration

use super::handlers;
use crate::domain::Service;
use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;

/// Register all REST routes on `router`
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        // Accounts
        .route("/accounts", post(handlers::provision_account))
        .route("/accounts/{account_id}/profile", get(handlers::get_account_profile))
        // Activity catalog
        .route(
            "/activities",
            get(handlers::list_activities).post(handlers::create_activity),
        )
        .route(
            "/activities/{activity_id}",
            get(handlers::get_activity)
                .patch(handlers::update_activity)
                .delete(handlers::delete_activity),
        )
        .route(
            "/activities/{activity_id}/deactivate",
            post(handlers::deactivate_activity),
        )
        .route(
            "/activities/{activity_id}/creator",
            get(handlers::get_activity_creator),
        )
        // Participation ledger
        .route(
            "/activities/{activity_id}/participants",
            get(handlers::list_participants).post(handlers::register),
        )
        .route(
            "/activities/{activity_id}/participants/{student_id}/attendance",
            put(handlers::mark_attendance),
        )
        .route(
            "/students/{student_id}/participations",
            get(handlers::list_participations),
        )
        // Training point ledger
        .route(
            "/students/{student_id}/training-points",
            get(handlers::list_training_points),
        )
        .route(
            "/students/{student_id}/semesters/{semester_id}/total",
            get(handlers::get_semester_total),
        )
        .route(
            "/students/{student_id}/semesters/{semester_id}/report",
            get(handlers::get_semester_report),
        )
        // Deficiency report desk
        .route(
            "/activities/{activity_id}/reports",
            post(handlers::file_report),
        )
        .route("/reports", get(handlers::list_reports))
        .route("/reports/{report_id}", get(handlers::get_report))
        .route("/reports/{report_id}/resolve", post(handlers::resolve_report))
        .layer(Extension(service))
}
