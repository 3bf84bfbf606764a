//! Course catalog endpoints.

use api_types::course::{CourseNew, CourseView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, principal_for, server::ServerState};
use engine::users;

fn view(course: engine::Course) -> CourseView {
    CourseView {
        id: course.id,
        title: course.title,
        price_minor: course.price_minor,
        active: course.active,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CourseNew>,
) -> Result<(StatusCode, Json<CourseView>), ServerError> {
    let principal = principal_for(&user)?;
    let course = state
        .engine
        .create_course(&principal, &payload.title, payload.price_minor)
        .await?;
    Ok((StatusCode::CREATED, Json(view(course))))
}

pub async fn get_one(
    Extension(_): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseView>, ServerError> {
    let course = state.engine.course(id).await?;
    Ok(Json(view(course)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let principal = principal_for(&user)?;
    state.engine.delete_course(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
