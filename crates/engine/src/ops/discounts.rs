//! Discount code validation and atomic apply/remove.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    access::Principal,
    discount_applications::{self, DiscountApplication},
    discounts::{self, Discount, DiscountKind},
    enrollments,
    ledger::discount_amount,
};

use super::{Engine, with_tx};

/// Admin input for a new discount code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDiscount {
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_amount_minor: Option<i64>,
    pub max_discount_minor: Option<i64>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Result of a successful discount application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscountOutcome {
    pub discount_amount_minor: i64,
    pub final_amount_minor: i64,
    pub application: DiscountApplication,
}

impl Engine {
    pub async fn create_discount(
        &self,
        principal: &Principal,
        new: NewDiscount,
    ) -> ResultEngine<Discount> {
        principal.require_admin()?;
        let discount = Discount::new(
            &new.code,
            new.kind,
            new.value,
            new.min_amount_minor,
            new.max_discount_minor,
            new.usage_limit,
            new.starts_at,
            new.ends_at,
        )?;

        with_tx!(self, |db_tx| {
            async {
                let existing = discounts::Entity::find()
                    .filter(discounts::Column::Code.eq(discount.code.clone()))
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    return Err(EngineError::BusinessRule(
                        "discount code already exists".to_string(),
                    ));
                }
                discounts::ActiveModel::from(&discount).insert(&db_tx).await?;
                Ok(discount)
            }
            .await
        })
    }

    /// Applies a discount code to an enrollment.
    ///
    /// Checks run in a fixed order, each failing with its own error: code
    /// exists (case-insensitive), code active, inside the validity window,
    /// usage limit not reached, enrollment amount above the minimum, and no
    /// prior application for the pair. On success the application insert, the
    /// usage increment and the new total commit atomically.
    pub async fn apply_discount(
        &self,
        principal: &Principal,
        code: &str,
        enrollment_id: Uuid,
    ) -> ResultEngine<DiscountOutcome> {
        principal.require_admin()?;
        let code = code.trim().to_uppercase();

        with_tx!(self, |db_tx| {
            async {
                let discount_model = discounts::Entity::find()
                    .filter(discounts::Column::Code.eq(code.clone()))
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("discount code".to_string()))?;
                let discount = Discount::try_from(discount_model)?;

                if !discount.active {
                    return Err(EngineError::BusinessRule(
                        "discount code is not active".to_string(),
                    ));
                }
                let now = Utc::now();
                if let Some(starts_at) = discount.starts_at {
                    if now < starts_at {
                        return Err(EngineError::BusinessRule(
                            "discount code is not valid yet".to_string(),
                        ));
                    }
                }
                if let Some(ends_at) = discount.ends_at {
                    if now > ends_at {
                        return Err(EngineError::BusinessRule(
                            "discount code has expired".to_string(),
                        ));
                    }
                }
                if let Some(limit) = discount.usage_limit {
                    if discount.used_count >= limit {
                        return Err(EngineError::BusinessRule(
                            "discount code usage limit reached".to_string(),
                        ));
                    }
                }

                let enrollment = self.require_enrollment(&db_tx, enrollment_id).await?;
                let price = enrollment.total_amount_minor;
                if let Some(min) = discount.min_amount_minor {
                    if price < min {
                        return Err(EngineError::BusinessRule(
                            "enrollment amount is below the discount minimum".to_string(),
                        ));
                    }
                }

                let already_applied = discount_applications::Entity::find()
                    .filter(
                        discount_applications::Column::DiscountId.eq(discount.id.to_string()),
                    )
                    .filter(
                        discount_applications::Column::EnrollmentId
                            .eq(enrollment_id.to_string()),
                    )
                    .one(&db_tx)
                    .await?
                    .is_some();
                if already_applied {
                    return Err(EngineError::BusinessRule(
                        "discount already applied to the enrollment".to_string(),
                    ));
                }

                let amount = discount_amount(
                    price,
                    discount.kind,
                    discount.value,
                    discount.max_discount_minor,
                );
                let application = DiscountApplication::new(
                    discount.id,
                    enrollment_id,
                    amount,
                    principal.user_id.clone(),
                    now,
                );
                discount_applications::ActiveModel::from(&application)
                    .insert(&db_tx)
                    .await?;

                let discount_active = discounts::ActiveModel {
                    id: ActiveValue::Set(discount.id.to_string()),
                    used_count: ActiveValue::Set(discount.used_count + 1),
                    ..Default::default()
                };
                discount_active.update(&db_tx).await?;

                let enrollment_active = enrollments::ActiveModel {
                    id: ActiveValue::Set(enrollment.id.clone()),
                    total_amount_minor: ActiveValue::Set(price - amount),
                    ..Default::default()
                };
                enrollment_active.update(&db_tx).await?;

                Ok(DiscountOutcome {
                    discount_amount_minor: amount,
                    final_amount_minor: price - amount,
                    application,
                })
            }
            .await
        })
    }

    /// Removes the discount applied to an enrollment.
    ///
    /// The recorded application amount is added back onto the total exactly
    /// as it was subtracted; the original price is not recomputed, so
    /// intervening total edits survive.
    pub async fn remove_discount(
        &self,
        principal: &Principal,
        enrollment_id: Uuid,
    ) -> ResultEngine<i64> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                let enrollment = self.require_enrollment(&db_tx, enrollment_id).await?;
                let application = discount_applications::Entity::find()
                    .filter(
                        discount_applications::Column::EnrollmentId
                            .eq(enrollment_id.to_string()),
                    )
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| {
                        EngineError::NotFound("discount application".to_string())
                    })?;

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

                let restored = enrollment.total_amount_minor + application.amount_minor;
                let enrollment_active = enrollments::ActiveModel {
                    id: ActiveValue::Set(enrollment.id.clone()),
                    total_amount_minor: ActiveValue::Set(restored),
                    ..Default::default()
                };
                enrollment_active.update(&db_tx).await?;

                discount_applications::Entity::delete_by_id(application.id)
                    .exec(&db_tx)
                    .await?;

                Ok(restored)
            }
            .await
        })
    }
}
