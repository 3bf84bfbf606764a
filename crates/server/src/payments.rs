//! Payment endpoints: manual recording and the gateway capture callback.

use api_types::payment::{PaymentCapture, PaymentNew, PaymentStatus as ApiStatus, PaymentView};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, principal_for, server::ServerState};
use engine::{PaymentStatus, users};

fn map_status(status: PaymentStatus) -> ApiStatus {
    match status {
        PaymentStatus::Pending => ApiStatus::Pending,
        PaymentStatus::Completed => ApiStatus::Completed,
        PaymentStatus::Failed => ApiStatus::Failed,
    }
}

pub(crate) fn payment_view(payment: engine::Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        enrollment_id: payment.enrollment_id,
        amount_minor: payment.amount_minor,
        mentor_commission_minor: payment.mentor_commission_minor,
        platform_fee_minor: payment.platform_fee_minor,
        status: map_status(payment.status),
        paid_at: payment.paid_at,
        payer_id: payment.payer_id,
        assignment_id: payment.assignment_id,
        gateway_reference: payment.gateway_reference,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let principal = principal_for(&user)?;
    let payment = state
        .engine
        .record_payment(
            &principal,
            payload.enrollment_id,
            payload.amount_minor,
            payload.payer_id.as_deref(),
            payload.assignment_id,
            payload.gateway_reference,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(payment_view(payment))))
}

/// Gateway capture callback. The payment is addressed either by our id or by
/// the gateway's own reference, whichever the callback carries. Admin-only:
/// the gateway integration authenticates with an admin credential, and a
/// student must not be able to settle someone else's pending payment.
pub async fn capture(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentCapture>,
) -> Result<Json<PaymentView>, ServerError> {
    let principal = principal_for(&user)?;
    principal.require_admin()?;
    let payment = match (payload.payment_id, payload.gateway_reference) {
        (Some(id), _) => state.engine.capture_payment_result(id, payload.succeeded).await?,
        (None, Some(reference)) => {
            state
                .engine
                .capture_payment_by_reference(&reference, payload.succeeded)
                .await?
        }
        (None, None) => {
            return Err(ServerError::Generic(
                "payment_id or gateway_reference is required".to_string(),
            ));
        }
    };
    Ok(Json(payment_view(payment)))
}
