//! Back-office domain engine for the mentoring platform.
//!
//! The core is the enrollment/payment reconciliation: every operation keeps
//! `Enrollment.paid_amount_minor` equal to the sum of the enrollment's
//! COMPLETED payments, computes commission/fee splits and applies discounts
//! atomically. Each operation is one database transaction.

pub use access::{Principal, Role};
pub use assignments::{
    AssignmentStatus, DEFAULT_ASSIGNMENT_COMMISSION_BPS, MentorAssignment,
};
pub use courses::Course;
pub use discount_applications::DiscountApplication;
pub use discounts::{Discount, DiscountKind};
pub use enrollments::{Enrollment, EnrollmentStatus};
pub use error::EngineError;
pub use ledger::{
    DEFAULT_MENTOR_COMMISSION_BPS, DEFAULT_PLATFORM_FEE_BPS, PaymentSplit, discount_amount,
    split_payment,
};
pub use notify::{LogNotifier, Notifier};
pub use ops::{DiscountOutcome, Engine, EngineBuilder, EnrollmentEdit, NewDiscount};
pub use payments::{Payment, PaymentStatus};

mod access;
mod assignments;
mod courses;
mod discount_applications;
mod discounts;
mod enrollments;
mod error;
mod ledger;
mod notify;
mod ops;
mod payments;
pub mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
