//! Discount code endpoints.

use api_types::discount::{
    DiscountApplied, DiscountApply, DiscountKind as ApiKind, DiscountNew, DiscountRemoved,
    DiscountView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, principal_for, server::ServerState};
use engine::{DiscountKind, NewDiscount, users};

fn map_kind(kind: DiscountKind) -> ApiKind {
    match kind {
        DiscountKind::Percentage => ApiKind::Percentage,
        DiscountKind::Fixed => ApiKind::Fixed,
    }
}

fn map_api_kind(kind: ApiKind) -> DiscountKind {
    match kind {
        ApiKind::Percentage => DiscountKind::Percentage,
        ApiKind::Fixed => DiscountKind::Fixed,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DiscountNew>,
) -> Result<(StatusCode, Json<DiscountView>), ServerError> {
    let principal = principal_for(&user)?;
    let discount = state
        .engine
        .create_discount(
            &principal,
            NewDiscount {
                code: payload.code,
                kind: map_api_kind(payload.kind),
                value: payload.value,
                min_amount_minor: payload.min_amount_minor,
                max_discount_minor: payload.max_discount_minor,
                usage_limit: payload.usage_limit,
                starts_at: payload.starts_at,
                ends_at: payload.ends_at,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DiscountView {
            id: discount.id,
            code: discount.code,
            kind: map_kind(discount.kind),
            value: discount.value,
            used_count: discount.used_count,
            usage_limit: discount.usage_limit,
            active: discount.active,
        }),
    ))
}

pub async fn apply(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(enrollment_id): Path<Uuid>,
    Json(payload): Json<DiscountApply>,
) -> Result<Json<DiscountApplied>, ServerError> {
    let principal = principal_for(&user)?;
    let outcome = state
        .engine
        .apply_discount(&principal, &payload.code, enrollment_id)
        .await?;
    Ok(Json(DiscountApplied {
        discount_amount_minor: outcome.discount_amount_minor,
        final_amount_minor: outcome.final_amount_minor,
    }))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Json<DiscountRemoved>, ServerError> {
    let principal = principal_for(&user)?;
    let restored = state.engine.remove_discount(&principal, enrollment_id).await?;
    Ok(Json(DiscountRemoved {
        restored_amount_minor: restored,
    }))
}
