//! Pure ledger arithmetic.
//!
//! All monetary values are **integer minor units** (cents) and all rates are
//! **basis points**, so splits and discounts never touch floating point.

use crate::discounts::DiscountKind;

/// Default mentor share of a payment: 37%.
pub const DEFAULT_MENTOR_COMMISSION_BPS: i64 = 3_700;
/// Default platform share of a payment: 3%.
pub const DEFAULT_PLATFORM_FEE_BPS: i64 = 300;

/// Commission/fee breakdown of a single payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentSplit {
    pub mentor_commission_minor: i64,
    pub platform_fee_minor: i64,
}

/// Splits a payment into mentor commission and platform fee.
///
/// Rates are per call: historical payments may carry rates that differ from
/// the current defaults. `commission + fee <= amount` holds only when the
/// rates sum to at most 10_000 bps; that is the caller's responsibility.
#[must_use]
pub fn split_payment(amount_minor: i64, commission_bps: i64, platform_bps: i64) -> PaymentSplit {
    PaymentSplit {
        mentor_commission_minor: amount_minor * commission_bps / 10_000,
        platform_fee_minor: amount_minor * platform_bps / 10_000,
    }
}

/// Computes the discount amount for a price.
///
/// Percentage discounts take `value` as a whole percent and respect the
/// optional cap; fixed discounts take `value` as minor units. The result is
/// never negative and never exceeds the price.
#[must_use]
pub fn discount_amount(
    price_minor: i64,
    kind: DiscountKind,
    value: i64,
    max_discount_minor: Option<i64>,
) -> i64 {
    let raw = match kind {
        DiscountKind::Percentage => {
            let amount = price_minor * value / 100;
            match max_discount_minor {
                Some(cap) => amount.min(cap),
                None => amount,
            }
        }
        DiscountKind::Fixed => value,
    };
    raw.clamp(0, price_minor.max(0))
}
