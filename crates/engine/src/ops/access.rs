//! Shared pre-condition guards used by the ops modules.
//!
//! Guards read through the surrounding transaction so pre-conditions and
//! writes observe the same snapshot.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, access::Role, assignments, courses, enrollments, payments, users,
};

use super::Engine;

impl Engine {
    /// Looks up a user and checks it carries the expected role.
    pub(super) async fn require_user_with_role(
        &self,
        db: &DatabaseTransaction,
        username: &str,
        role: Role,
    ) -> ResultEngine<users::Model> {
        let user = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {username}")))?;
        if Role::try_from(user.role.as_str())? != role {
            return Err(EngineError::BusinessRule(format!(
                "user {username} is not a {}",
                role.as_str()
            )));
        }
        Ok(user)
    }

    pub(super) async fn require_enrollment(
        &self,
        db: &DatabaseTransaction,
        enrollment_id: Uuid,
    ) -> ResultEngine<enrollments::Model> {
        enrollments::Entity::find_by_id(enrollment_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("enrollment".to_string()))
    }

    pub(super) async fn require_course(
        &self,
        db: &DatabaseTransaction,
        course_id: Uuid,
    ) -> ResultEngine<courses::Model> {
        courses::Entity::find_by_id(course_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("course".to_string()))
    }

    pub(super) async fn require_assignment(
        &self,
        db: &DatabaseTransaction,
        assignment_id: Uuid,
    ) -> ResultEngine<assignments::Model> {
        assignments::Entity::find_by_id(assignment_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("assignment".to_string()))
    }

    /// Sum of COMPLETED payment amounts for an enrollment.
    ///
    /// This is the ground truth the cached `paid_amount_minor` must match.
    pub(super) async fn completed_paid_total(
        &self,
        db: &DatabaseTransaction,
        enrollment_id: Uuid,
    ) -> ResultEngine<i64> {
        let rows = payments::Entity::find()
            .filter(payments::Column::EnrollmentId.eq(enrollment_id.to_string()))
            .filter(payments::Column::Status.eq(payments::PaymentStatus::Completed.as_str()))
            .all(db)
            .await?;
        Ok(rows.iter().map(|p| p.amount_minor).sum())
    }
}
