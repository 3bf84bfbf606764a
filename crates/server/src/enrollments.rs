//! Enrollment endpoints, including the reconcile-on-edit path.

use api_types::enrollment::{
    EnrollmentDetailResponse, EnrollmentNew, EnrollmentStatus as ApiStatus, EnrollmentUpdate,
    EnrollmentView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, payments::payment_view, principal_for, server::ServerState};
use engine::{EnrollmentEdit, EnrollmentStatus, users};

fn map_status(status: EnrollmentStatus) -> ApiStatus {
    match status {
        EnrollmentStatus::Active => ApiStatus::Active,
        EnrollmentStatus::Completed => ApiStatus::Completed,
        EnrollmentStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn map_api_status(status: ApiStatus) -> EnrollmentStatus {
    match status {
        ApiStatus::Active => EnrollmentStatus::Active,
        ApiStatus::Completed => EnrollmentStatus::Completed,
        ApiStatus::Cancelled => EnrollmentStatus::Cancelled,
    }
}

pub(crate) fn enrollment_view(enrollment: engine::Enrollment) -> EnrollmentView {
    EnrollmentView {
        id: enrollment.id,
        student_id: enrollment.student_id,
        course_id: enrollment.course_id,
        status: map_status(enrollment.status),
        total_amount_minor: enrollment.total_amount_minor,
        paid_amount_minor: enrollment.paid_amount_minor,
        start_date: enrollment.start_date,
        end_date: enrollment.end_date,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EnrollmentNew>,
) -> Result<(StatusCode, Json<EnrollmentView>), ServerError> {
    let principal = principal_for(&user)?;
    let enrollment = state
        .engine
        .create_enrollment(
            &principal,
            &payload.student_id,
            payload.course_id,
            payload.start_date,
            payload.end_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment_view(enrollment))))
}

pub async fn get_detail(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentDetailResponse>, ServerError> {
    let principal = principal_for(&user)?;
    let (enrollment, history) = state.engine.enrollment_with_payments(&principal, id).await?;
    Ok(Json(EnrollmentDetailResponse {
        enrollment: enrollment_view(enrollment),
        payments: history.into_iter().map(payment_view).collect(),
    }))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnrollmentUpdate>,
) -> Result<Json<EnrollmentView>, ServerError> {
    let principal = principal_for(&user)?;
    let edit = EnrollmentEdit {
        paid_amount_minor: payload.paid_amount_minor,
        total_amount_minor: payload.total_amount_minor,
        status: map_api_status(payload.status),
        start_date: payload.start_date,
    };
    let enrollment = state.engine.update_enrollment(&principal, id, edit).await?;
    Ok(Json(enrollment_view(enrollment)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let principal = principal_for(&user)?;
    state.engine.delete_enrollment(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
