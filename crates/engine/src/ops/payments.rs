//! Payment recording and gateway capture.
//!
//! Every completed payment moves the enrollment's cached paid aggregate and
//! re-derives its status inside the same transaction, so the enrollment row
//! and its payment rows never observably diverge.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    access::{Principal, Role},
    enrollments::{self, EnrollmentStatus},
    ledger::{DEFAULT_MENTOR_COMMISSION_BPS, DEFAULT_PLATFORM_FEE_BPS, split_payment},
    payments::{self, Payment, PaymentStatus},
};

use super::{Engine, with_tx};

/// Post-commit summary of a completed payment, consumed by the notifier.
pub(super) struct CompletionOutcome {
    pub enrollment_id: Uuid,
    pub amount_minor: i64,
    pub newly_completed: bool,
}

impl Engine {
    /// Records a payment against an enrollment.
    ///
    /// With a gateway reference the payment starts PENDING and waits for the
    /// capture callback; without one it is a manual payment, COMPLETED
    /// immediately. Students may only pay their own enrollment and only as
    /// themselves; admins may record on anyone's behalf.
    pub async fn record_payment(
        &self,
        principal: &Principal,
        enrollment_id: Uuid,
        amount_minor: i64,
        payer_id: Option<&str>,
        assignment_id: Option<Uuid>,
        gateway_reference: Option<String>,
    ) -> ResultEngine<Payment> {
        if principal.role == Role::Mentor {
            return Err(EngineError::Unauthorized(
                "mentors cannot record payments".to_string(),
            ));
        }
        let payer = payer_id.unwrap_or(principal.user_id.as_str()).to_string();
        if principal.role == Role::Student && payer != principal.user_id {
            return Err(EngineError::Unauthorized(
                "students can only pay as themselves".to_string(),
            ));
        }

        let (payment, outcome) = with_tx!(self, |db_tx| {
            async {
                let enrollment = self.require_enrollment(&db_tx, enrollment_id).await?;
                if principal.role == Role::Student && enrollment.student_id != principal.user_id {
                    return Err(EngineError::Unauthorized(
                        "students can only pay their own enrollment".to_string(),
                    ));
                }

                if let Some(assignment_id) = assignment_id {
                    let assignment = self.require_assignment(&db_tx, assignment_id).await?;
                    if assignment.enrollment_id != enrollment.id {
                        return Err(EngineError::BusinessRule(
                            "assignment does not belong to the enrollment".to_string(),
                        ));
                    }
                }

                if let Some(reference) = gateway_reference.as_deref() {
                    let taken = payments::Entity::find()
                        .filter(payments::Column::GatewayReference.eq(reference))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if taken {
                        return Err(EngineError::BusinessRule(
                            "gateway reference already recorded".to_string(),
                        ));
                    }
                }

                let status = if gateway_reference.is_some() {
                    PaymentStatus::Pending
                } else {
                    PaymentStatus::Completed
                };
                let split = split_payment(
                    amount_minor,
                    DEFAULT_MENTOR_COMMISSION_BPS,
                    DEFAULT_PLATFORM_FEE_BPS,
                );
                let payment = Payment::new(
                    enrollment_id,
                    amount_minor,
                    split,
                    status,
                    payer,
                    assignment_id,
                    gateway_reference,
                    Utc::now(),
                )?;
                payments::ActiveModel::from(&payment).insert(&db_tx).await?;

                let outcome = if status == PaymentStatus::Completed {
                    Some(
                        self.apply_completed_payment(&db_tx, &enrollment, amount_minor)
                            .await?,
                    )
                } else {
                    None
                };
                Ok((payment, outcome))
            }
            .await
        })?;

        if let Some(outcome) = outcome {
            self.notify_completion(&outcome);
        }
        Ok(payment)
    }

    /// Applies a gateway capture result to a PENDING payment.
    ///
    /// Exactly-once: a payment already in a terminal state is rejected.
    pub async fn capture_payment_result(
        &self,
        payment_id: Uuid,
        succeeded: bool,
    ) -> ResultEngine<Payment> {
        let (payment, outcome) = with_tx!(self, |db_tx| {
            async {
                let model = payments::Entity::find_by_id(payment_id.to_string())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("payment".to_string()))?;
                self.capture_model(&db_tx, model, succeeded).await
            }
            .await
        })?;

        if let Some(outcome) = outcome {
            self.notify_completion(&outcome);
        }
        Ok(payment)
    }

    /// Same as [`capture_payment_result`], resolved by the gateway's own
    /// reference id (what the callback actually carries).
    ///
    /// [`capture_payment_result`]: Engine::capture_payment_result
    pub async fn capture_payment_by_reference(
        &self,
        reference: &str,
        succeeded: bool,
    ) -> ResultEngine<Payment> {
        let (payment, outcome) = with_tx!(self, |db_tx| {
            async {
                let model = payments::Entity::find()
                    .filter(payments::Column::GatewayReference.eq(reference))
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("payment".to_string()))?;
                self.capture_model(&db_tx, model, succeeded).await
            }
            .await
        })?;

        if let Some(outcome) = outcome {
            self.notify_completion(&outcome);
        }
        Ok(payment)
    }

    async fn capture_model(
        &self,
        db: &DatabaseTransaction,
        model: payments::Model,
        succeeded: bool,
    ) -> ResultEngine<(Payment, Option<CompletionOutcome>)> {
        let status = PaymentStatus::try_from(model.status.as_str())?;
        if status.is_terminal() {
            return Err(EngineError::BusinessRule(
                "payment already processed".to_string(),
            ));
        }

        let new_status = if succeeded {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        };
        let active = payments::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            status: ActiveValue::Set(new_status.as_str().to_string()),
            ..Default::default()
        };
        active.update(db).await?;

        let enrollment_id = Uuid::parse_str(&model.enrollment_id)
            .map_err(|_| EngineError::NotFound("enrollment".to_string()))?;
        let outcome = if succeeded {
            let enrollment = self.require_enrollment(db, enrollment_id).await?;
            Some(
                self.apply_completed_payment(db, &enrollment, model.amount_minor)
                    .await?,
            )
        } else {
            None
        };

        let mut updated = model;
        updated.status = new_status.as_str().to_string();
        Ok((Payment::try_from(updated)?, outcome))
    }

    /// Bumps the cached paid aggregate for a payment that just completed and
    /// re-derives the enrollment status. Cancelled enrollments keep their
    /// status; the money is still accounted for.
    pub(super) async fn apply_completed_payment(
        &self,
        db: &DatabaseTransaction,
        enrollment: &enrollments::Model,
        amount_minor: i64,
    ) -> ResultEngine<CompletionOutcome> {
        let prev_status = EnrollmentStatus::try_from(enrollment.status.as_str())?;
        let new_paid = enrollment.paid_amount_minor + amount_minor;
        let new_status = if prev_status == EnrollmentStatus::Cancelled {
            EnrollmentStatus::Cancelled
        } else {
            EnrollmentStatus::derived(new_paid, enrollment.total_amount_minor)
        };

        let active = enrollments::ActiveModel {
            id: ActiveValue::Set(enrollment.id.clone()),
            paid_amount_minor: ActiveValue::Set(new_paid),
            status: ActiveValue::Set(new_status.as_str().to_string()),
            ..Default::default()
        };
        active.update(db).await?;

        Ok(CompletionOutcome {
            enrollment_id: Uuid::parse_str(&enrollment.id)
                .map_err(|_| EngineError::NotFound("enrollment".to_string()))?,
            amount_minor,
            newly_completed: new_status == EnrollmentStatus::Completed
                && prev_status != EnrollmentStatus::Completed,
        })
    }

    pub(super) fn notify_completion(&self, outcome: &CompletionOutcome) {
        self.notifier
            .payment_recorded(outcome.enrollment_id, outcome.amount_minor);
        if outcome.newly_completed {
            self.notifier.enrollment_completed(outcome.enrollment_id);
        }
    }
}
