//! Discount code primitives.
//!
//! Codes are stored uppercase and matched case-insensitively. `used_count`
//! moves only inside the apply/remove transactions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl DiscountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl TryFrom<&str> for DiscountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(EngineError::Validation(format!(
                "invalid discount kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: Uuid,
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_amount_minor: Option<i64>,
    pub max_discount_minor: Option<i64>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl Discount {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: &str,
        kind: DiscountKind,
        value: i64,
        min_amount_minor: Option<i64>,
        max_discount_minor: Option<i64>,
        usage_limit: Option<i32>,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    ) -> ResultEngine<Self> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(EngineError::Validation(
                "discount code must not be empty".to_string(),
            ));
        }
        if value <= 0 {
            return Err(EngineError::Validation(
                "discount value must be > 0".to_string(),
            ));
        }
        if kind == DiscountKind::Percentage && value > 100 {
            return Err(EngineError::Validation(
                "percentage discount must be <= 100".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            kind,
            value,
            min_amount_minor,
            max_discount_minor,
            usage_limit,
            used_count: 0,
            active: true,
            starts_at,
            ends_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub kind: String,
    pub value: i64,
    pub min_amount_minor: Option<i64>,
    pub max_discount_minor: Option<i64>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub active: bool,
    pub starts_at: Option<DateTimeUtc>,
    pub ends_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::discount_applications::Entity")]
    DiscountApplications,
}

impl Related<super::discount_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Discount> for ActiveModel {
    fn from(discount: &Discount) -> Self {
        Self {
            id: ActiveValue::Set(discount.id.to_string()),
            code: ActiveValue::Set(discount.code.clone()),
            kind: ActiveValue::Set(discount.kind.as_str().to_string()),
            value: ActiveValue::Set(discount.value),
            min_amount_minor: ActiveValue::Set(discount.min_amount_minor),
            max_discount_minor: ActiveValue::Set(discount.max_discount_minor),
            usage_limit: ActiveValue::Set(discount.usage_limit),
            used_count: ActiveValue::Set(discount.used_count),
            active: ActiveValue::Set(discount.active),
            starts_at: ActiveValue::Set(discount.starts_at),
            ends_at: ActiveValue::Set(discount.ends_at),
        }
    }
}

impl TryFrom<Model> for Discount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("discount".to_string()))?,
            code: model.code,
            kind: DiscountKind::try_from(model.kind.as_str())?,
            value: model.value,
            min_amount_minor: model.min_amount_minor,
            max_discount_minor: model.max_discount_minor,
            usage_limit: model.usage_limit,
            used_count: model.used_count,
            active: model.active,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uppercases_and_trims_code() {
        let discount = Discount::new("  spring24 ", DiscountKind::Fixed, 500, None, None, None, None, None)
            .unwrap();
        assert_eq!(discount.code, "SPRING24");
    }

    #[test]
    fn new_rejects_bad_values() {
        assert!(Discount::new("", DiscountKind::Fixed, 500, None, None, None, None, None).is_err());
        assert!(Discount::new("X", DiscountKind::Fixed, 0, None, None, None, None, None).is_err());
        assert!(
            Discount::new("X", DiscountKind::Percentage, 120, None, None, None, None, None)
                .is_err()
        );
    }
}
