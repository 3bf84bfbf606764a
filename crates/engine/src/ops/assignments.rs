//! Mentor assignment management.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    access::{Principal, Role},
    assignments::{self, AssignmentStatus, DEFAULT_ASSIGNMENT_COMMISSION_BPS, MentorAssignment},
    payments,
};

use super::{Engine, with_tx};

impl Engine {
    /// Links a mentor to an enrollment.
    ///
    /// Student and course are derived from the enrollment; both sides are
    /// role-checked and a mentor can hold at most one assignment per
    /// enrollment.
    pub async fn create_assignment(
        &self,
        principal: &Principal,
        mentor_id: &str,
        enrollment_id: Uuid,
        commission_bps: Option<i32>,
    ) -> ResultEngine<MentorAssignment> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                let enrollment = self.require_enrollment(&db_tx, enrollment_id).await?;
                self.require_user_with_role(&db_tx, mentor_id, Role::Mentor)
                    .await?;
                self.require_user_with_role(&db_tx, &enrollment.student_id, Role::Student)
                    .await?;
                let course_id = Uuid::parse_str(&enrollment.course_id)
                    .map_err(|_| EngineError::NotFound("course".to_string()))?;
                self.require_course(&db_tx, course_id).await?;

                let duplicate = assignments::Entity::find()
                    .filter(assignments::Column::MentorId.eq(mentor_id))
                    .filter(assignments::Column::EnrollmentId.eq(enrollment.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if duplicate {
                    return Err(EngineError::BusinessRule(
                        "mentor is already assigned to the enrollment".to_string(),
                    ));
                }

                let assignment = MentorAssignment::new(
                    mentor_id.to_string(),
                    enrollment.student_id.clone(),
                    course_id,
                    enrollment_id,
                    commission_bps.unwrap_or(DEFAULT_ASSIGNMENT_COMMISSION_BPS),
                )?;
                assignments::ActiveModel::from(&assignment)
                    .insert(&db_tx)
                    .await?;
                Ok(assignment)
            }
            .await
        })
    }

    /// Moves an assignment to a different mentor and reactivates it.
    pub async fn reassign(
        &self,
        principal: &Principal,
        assignment_id: Uuid,
        new_mentor_id: &str,
    ) -> ResultEngine<MentorAssignment> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                let model = self.require_assignment(&db_tx, assignment_id).await?;
                self.require_user_with_role(&db_tx, new_mentor_id, Role::Mentor)
                    .await?;

                let duplicate = assignments::Entity::find()
                    .filter(assignments::Column::MentorId.eq(new_mentor_id))
                    .filter(assignments::Column::EnrollmentId.eq(model.enrollment_id.clone()))
                    .filter(assignments::Column::Id.ne(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if duplicate {
                    return Err(EngineError::BusinessRule(
                        "mentor is already assigned to the enrollment".to_string(),
                    ));
                }

                let active = assignments::ActiveModel {
                    id: ActiveValue::Set(model.id.clone()),
                    mentor_id: ActiveValue::Set(new_mentor_id.to_string()),
                    status: ActiveValue::Set(AssignmentStatus::Active.as_str().to_string()),
                    ..Default::default()
                };
                let updated = active.update(&db_tx).await?;
                MentorAssignment::try_from(updated)
            }
            .await
        })
    }

    /// Deletes an assignment with no payment history.
    pub async fn unassign(
        &self,
        principal: &Principal,
        assignment_id: Uuid,
    ) -> ResultEngine<()> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                let model = self.require_assignment(&db_tx, assignment_id).await?;

                let has_payment = payments::Entity::find()
                    .filter(payments::Column::AssignmentId.eq(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if has_payment {
                    return Err(EngineError::BusinessRule(
                        "payments still reference the assignment".to_string(),
                    ));
                }

                assignments::Entity::delete_by_id(model.id).exec(&db_tx).await?;
                Ok(())
            }
            .await
        })
    }
}
