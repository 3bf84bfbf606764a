//! Mentor assignment endpoints.

use api_types::assignment::{
    AssignmentNew, AssignmentReassign, AssignmentStatus as ApiStatus, AssignmentView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, principal_for, server::ServerState};
use engine::{AssignmentStatus, users};

fn map_status(status: AssignmentStatus) -> ApiStatus {
    match status {
        AssignmentStatus::Active => ApiStatus::Active,
        AssignmentStatus::Inactive => ApiStatus::Inactive,
    }
}

fn view(assignment: engine::MentorAssignment) -> AssignmentView {
    AssignmentView {
        id: assignment.id,
        mentor_id: assignment.mentor_id,
        student_id: assignment.student_id,
        course_id: assignment.course_id,
        enrollment_id: assignment.enrollment_id,
        commission_bps: assignment.commission_bps,
        status: map_status(assignment.status),
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AssignmentNew>,
) -> Result<(StatusCode, Json<AssignmentView>), ServerError> {
    let principal = principal_for(&user)?;
    let assignment = state
        .engine
        .create_assignment(
            &principal,
            &payload.mentor_id,
            payload.enrollment_id,
            payload.commission_bps,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(assignment))))
}

pub async fn reassign(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentReassign>,
) -> Result<Json<AssignmentView>, ServerError> {
    let principal = principal_for(&user)?;
    let assignment = state.engine.reassign(&principal, id, &payload.mentor_id).await?;
    Ok(Json(view(assignment)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let principal = principal_for(&user)?;
    state.engine.unassign(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
