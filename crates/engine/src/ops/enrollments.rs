//! Enrollment lifecycle and the reconcile-on-edit path.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    access::{Principal, Role},
    assignments, discount_applications, discounts,
    enrollments::{self, Enrollment, EnrollmentStatus},
    ledger::{DEFAULT_MENTOR_COMMISSION_BPS, DEFAULT_PLATFORM_FEE_BPS, split_payment},
    payments::{self, Payment, PaymentStatus},
};

use super::{Engine, with_tx};

/// Admin edit of an enrollment, reconciled against the payment ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrollmentEdit {
    pub paid_amount_minor: i64,
    pub total_amount_minor: i64,
    pub status: EnrollmentStatus,
    pub start_date: DateTime<Utc>,
}

impl Engine {
    /// Creates an enrollment for a (student, course) pair.
    ///
    /// The amount owed starts at the course price; discounts adjust it later.
    pub async fn create_enrollment(
        &self,
        principal: &Principal,
        student_id: &str,
        course_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Enrollment> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                self.require_user_with_role(&db_tx, student_id, Role::Student)
                    .await?;
                let course = self.require_course(&db_tx, course_id).await?;
                if !course.active {
                    return Err(EngineError::BusinessRule(
                        "course is not open for enrollment".to_string(),
                    ));
                }

                let existing = enrollments::Entity::find()
                    .filter(enrollments::Column::StudentId.eq(student_id))
                    .filter(enrollments::Column::CourseId.eq(course_id.to_string()))
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    return Err(EngineError::BusinessRule(
                        "student is already enrolled in the course".to_string(),
                    ));
                }

                let enrollment = Enrollment::new(
                    student_id.to_string(),
                    course_id,
                    course.price_minor,
                    start_date,
                    end_date,
                )?;
                enrollments::ActiveModel::from(&enrollment)
                    .insert(&db_tx)
                    .await?;
                Ok(enrollment)
            }
            .await
        })
    }

    /// Reconciles a direct admin edit of an enrollment with its payment rows.
    ///
    /// Comparing the requested paid amount against the COMPLETED payment sum:
    ///
    /// - higher: one new COMPLETED payment for the delta, attributed to the
    ///   enrollment's student, dated now;
    /// - lower: every payment row of the enrollment is deleted and, when the
    ///   new amount is positive, replaced by a single COMPLETED payment for
    ///   the full amount (history collapses into one record);
    /// - equal: no payment mutation.
    ///
    /// Enrollment fields and the payment mutation commit together. The
    /// requested status only sticks when it is `Cancelled`; otherwise the
    /// status is derived from paid vs total.
    pub async fn update_enrollment(
        &self,
        principal: &Principal,
        enrollment_id: Uuid,
        edit: EnrollmentEdit,
    ) -> ResultEngine<Enrollment> {
        principal.require_admin()?;
        if edit.paid_amount_minor < 0 {
            return Err(EngineError::Validation(
                "paid amount must be >= 0".to_string(),
            ));
        }
        if edit.total_amount_minor < 0 {
            return Err(EngineError::Validation(
                "total amount must be >= 0".to_string(),
            ));
        }

        let (enrollment, recorded_minor, newly_completed) = with_tx!(self, |db_tx| {
            async {
                let model = self.require_enrollment(&db_tx, enrollment_id).await?;
                let current = self.completed_paid_total(&db_tx, enrollment_id).await?;

                let mut recorded_minor = None;
                match edit.paid_amount_minor.cmp(&current) {
                    Ordering::Greater => {
                        let delta = edit.paid_amount_minor - current;
                        let split = split_payment(
                            delta,
                            DEFAULT_MENTOR_COMMISSION_BPS,
                            DEFAULT_PLATFORM_FEE_BPS,
                        );
                        let payment = Payment::new(
                            enrollment_id,
                            delta,
                            split,
                            PaymentStatus::Completed,
                            model.student_id.clone(),
                            None,
                            None,
                            Utc::now(),
                        )?;
                        payments::ActiveModel::from(&payment).insert(&db_tx).await?;
                        recorded_minor = Some(delta);
                    }
                    Ordering::Less => {
                        payments::Entity::delete_many()
                            .filter(
                                payments::Column::EnrollmentId.eq(enrollment_id.to_string()),
                            )
                            .exec(&db_tx)
                            .await?;
                        if edit.paid_amount_minor > 0 {
                            let split = split_payment(
                                edit.paid_amount_minor,
                                DEFAULT_MENTOR_COMMISSION_BPS,
                                DEFAULT_PLATFORM_FEE_BPS,
                            );
                            let payment = Payment::new(
                                enrollment_id,
                                edit.paid_amount_minor,
                                split,
                                PaymentStatus::Completed,
                                model.student_id.clone(),
                                None,
                                None,
                                Utc::now(),
                            )?;
                            payments::ActiveModel::from(&payment).insert(&db_tx).await?;
                        }
                    }
                    Ordering::Equal => {}
                }

                let prev_status = EnrollmentStatus::try_from(model.status.as_str())?;
                let status = if edit.status == EnrollmentStatus::Cancelled {
                    EnrollmentStatus::Cancelled
                } else {
                    EnrollmentStatus::derived(edit.paid_amount_minor, edit.total_amount_minor)
                };

                let active = enrollments::ActiveModel {
                    id: ActiveValue::Set(model.id.clone()),
                    total_amount_minor: ActiveValue::Set(edit.total_amount_minor),
                    paid_amount_minor: ActiveValue::Set(edit.paid_amount_minor),
                    status: ActiveValue::Set(status.as_str().to_string()),
                    start_date: ActiveValue::Set(edit.start_date),
                    ..Default::default()
                };
                let updated = active.update(&db_tx).await?;

                let newly_completed = status == EnrollmentStatus::Completed
                    && prev_status != EnrollmentStatus::Completed;
                Ok::<_, EngineError>((
                    Enrollment::try_from(updated)?,
                    recorded_minor,
                    newly_completed,
                ))
            }
            .await
        })?;

        if let Some(amount_minor) = recorded_minor {
            self.notifier.payment_recorded(enrollment.id, amount_minor);
        }
        if newly_completed {
            self.notifier.enrollment_completed(enrollment.id);
        }
        Ok(enrollment)
    }

    /// Deletes an enrollment with no remaining financial history.
    ///
    /// Payments and assignments block deletion. A dangling discount
    /// application is unwound here so the discount's usage count stays exact.
    pub async fn delete_enrollment(
        &self,
        principal: &Principal,
        enrollment_id: Uuid,
    ) -> ResultEngine<()> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                let model = self.require_enrollment(&db_tx, enrollment_id).await?;

                let has_payment = payments::Entity::find()
                    .filter(payments::Column::EnrollmentId.eq(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if has_payment {
                    return Err(EngineError::BusinessRule(
                        "payments still reference the enrollment".to_string(),
                    ));
                }

                let has_assignment = assignments::Entity::find()
                    .filter(assignments::Column::EnrollmentId.eq(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if has_assignment {
                    return Err(EngineError::BusinessRule(
                        "assignments still reference the enrollment".to_string(),
                    ));
                }

                if let Some(application) = discount_applications::Entity::find()
                    .filter(discount_applications::Column::EnrollmentId.eq(model.id.clone()))
                    .one(&db_tx)
                    .await?
                {
                    if let Some(discount) =
                        discounts::Entity::find_by_id(application.discount_id.clone())
                            .one(&db_tx)
                            .await?
                    {
                        let active = discounts::ActiveModel {
                            id: ActiveValue::Set(discount.id.clone()),
                            used_count: ActiveValue::Set(discount.used_count - 1),
                            ..Default::default()
                        };
                        active.update(&db_tx).await?;
                    }
                    discount_applications::Entity::delete_by_id(application.id)
                        .exec(&db_tx)
                        .await?;
                }

                enrollments::Entity::delete_by_id(model.id).exec(&db_tx).await?;
                Ok(())
            }
            .await
        })
    }

    /// Returns an enrollment together with its payment history.
    ///
    /// Admins see everything; a student sees only their own enrollment.
    pub async fn enrollment_with_payments(
        &self,
        principal: &Principal,
        enrollment_id: Uuid,
    ) -> ResultEngine<(Enrollment, Vec<Payment>)> {
        let rows = enrollments::Entity::find_by_id(enrollment_id.to_string())
            .find_with_related(payments::Entity)
            .all(&self.database)
            .await?;
        let (model, payment_models) = rows
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound("enrollment".to_string()))?;

        if !principal.is_admin() && model.student_id != principal.user_id {
            return Err(EngineError::Unauthorized(
                "not your enrollment".to_string(),
            ));
        }

        let enrollment = Enrollment::try_from(model)?;
        let mut history = Vec::with_capacity(payment_models.len());
        for payment_model in payment_models {
            history.push(Payment::try_from(payment_model)?);
        }
        Ok((enrollment, history))
    }
}
