use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod assignments;
mod courses;
mod discounts;
mod enrollments;
mod payments;
mod server;

pub mod types {
    pub mod course {
        pub use api_types::course::{CourseNew, CourseView};
    }

    pub mod enrollment {
        pub use api_types::enrollment::{
            EnrollmentDetailResponse, EnrollmentNew, EnrollmentStatus, EnrollmentUpdate,
            EnrollmentView,
        };
    }

    pub mod payment {
        pub use api_types::payment::{PaymentCapture, PaymentNew, PaymentStatus, PaymentView};
    }

    pub mod discount {
        pub use api_types::discount::{
            DiscountApplied, DiscountApply, DiscountKind, DiscountNew, DiscountRemoved,
            DiscountView,
        };
    }

    pub mod assignment {
        pub use api_types::assignment::{
            AssignmentNew, AssignmentReassign, AssignmentStatus, AssignmentView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::BusinessRule(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Builds the engine-side caller identity from the authenticated user row.
pub(crate) fn principal_for(user: &engine::users::Model) -> Result<engine::Principal, ServerError> {
    let role = engine::Role::try_from(user.role.as_str())?;
    Ok(engine::Principal::new(user.username.clone(), role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res =
            ServerError::from(EngineError::Unauthorized("nope".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_business_rule_maps_to_400() {
        let res = ServerError::from(EngineError::BusinessRule("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
