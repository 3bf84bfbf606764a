//! Discount application join records.
//!
//! One row per redeemed (discount, enrollment) pair, storing the amount that
//! was actually subtracted so removal can restore exactly that delta.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplication {
    pub id: Uuid,
    pub discount_id: Uuid,
    pub enrollment_id: Uuid,
    pub amount_minor: i64,
    pub applied_by: String,
    pub applied_at: DateTime<Utc>,
}

impl DiscountApplication {
    pub fn new(
        discount_id: Uuid,
        enrollment_id: Uuid,
        amount_minor: i64,
        applied_by: String,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            discount_id,
            enrollment_id,
            amount_minor,
            applied_by,
            applied_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "discount_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub discount_id: String,
    pub enrollment_id: String,
    pub amount_minor: i64,
    pub applied_by: String,
    pub applied_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discounts::Entity",
        from = "Column::DiscountId",
        to = "super::discounts::Column::Id"
    )]
    Discounts,
    #[sea_orm(
        belongs_to = "super::enrollments::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollments::Column::Id"
    )]
    Enrollments,
}

impl Related<super::discounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discounts.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DiscountApplication> for ActiveModel {
    fn from(application: &DiscountApplication) -> Self {
        Self {
            id: ActiveValue::Set(application.id.to_string()),
            discount_id: ActiveValue::Set(application.discount_id.to_string()),
            enrollment_id: ActiveValue::Set(application.enrollment_id.to_string()),
            amount_minor: ActiveValue::Set(application.amount_minor),
            applied_by: ActiveValue::Set(application.applied_by.clone()),
            applied_at: ActiveValue::Set(application.applied_at),
        }
    }
}

impl TryFrom<Model> for DiscountApplication {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("discount application".to_string()))?,
            discount_id: Uuid::parse_str(&model.discount_id)
                .map_err(|_| EngineError::NotFound("discount".to_string()))?,
            enrollment_id: Uuid::parse_str(&model.enrollment_id)
                .map_err(|_| EngineError::NotFound("enrollment".to_string()))?,
            amount_minor: model.amount_minor,
            applied_by: model.applied_by,
            applied_at: model.applied_at,
        })
    }
}
