//! Payment primitives.
//!
//! A `Payment` is one financial transaction against an enrollment, carrying
//! its commission/fee breakdown. Pending payments wait for a gateway capture
//! callback; only COMPLETED payments count toward the enrollment aggregate.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, ledger::PaymentSplit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// COMPLETED and FAILED are terminal; a terminal payment is never
    /// re-processed by a capture callback.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::Validation(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub amount_minor: i64,
    pub mentor_commission_minor: i64,
    pub platform_fee_minor: i64,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
    pub payer_id: String,
    pub assignment_id: Option<Uuid>,
    pub gateway_reference: Option<String>,
}

impl Payment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        enrollment_id: Uuid,
        amount_minor: i64,
        split: PaymentSplit,
        status: PaymentStatus,
        payer_id: String,
        assignment_id: Option<Uuid>,
        gateway_reference: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::Validation(
                "payment amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            enrollment_id,
            amount_minor,
            mentor_commission_minor: split.mentor_commission_minor,
            platform_fee_minor: split.platform_fee_minor,
            status,
            paid_at,
            payer_id,
            assignment_id,
            gateway_reference,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub enrollment_id: String,
    pub amount_minor: i64,
    pub mentor_commission_minor: i64,
    pub platform_fee_minor: i64,
    pub status: String,
    pub paid_at: DateTimeUtc,
    pub payer_id: String,
    pub assignment_id: Option<String>,
    pub gateway_reference: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollments::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollments::Column::Id"
    )]
    Enrollments,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            enrollment_id: ActiveValue::Set(payment.enrollment_id.to_string()),
            amount_minor: ActiveValue::Set(payment.amount_minor),
            mentor_commission_minor: ActiveValue::Set(payment.mentor_commission_minor),
            platform_fee_minor: ActiveValue::Set(payment.platform_fee_minor),
            status: ActiveValue::Set(payment.status.as_str().to_string()),
            paid_at: ActiveValue::Set(payment.paid_at),
            payer_id: ActiveValue::Set(payment.payer_id.clone()),
            assignment_id: ActiveValue::Set(payment.assignment_id.map(|id| id.to_string())),
            gateway_reference: ActiveValue::Set(payment.gateway_reference.clone()),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("payment".to_string()))?,
            enrollment_id: Uuid::parse_str(&model.enrollment_id)
                .map_err(|_| EngineError::NotFound("enrollment".to_string()))?,
            amount_minor: model.amount_minor,
            mentor_commission_minor: model.mentor_commission_minor,
            platform_fee_minor: model.platform_fee_minor,
            status: PaymentStatus::try_from(model.status.as_str())?,
            paid_at: model.paid_at,
            payer_id: model.payer_id,
            assignment_id: model.assignment_id.and_then(|s| Uuid::parse_str(&s).ok()),
            gateway_reference: model.gateway_reference,
        })
    }
}
