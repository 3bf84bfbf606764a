//! Request/response bodies shared by the server and its clients.
//!
//! All monetary fields are integer minor units; enum values use snake_case
//! strings matching the engine's canonical representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod course {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CourseNew {
        pub title: String,
        pub price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CourseView {
        pub id: Uuid,
        pub title: String,
        pub price_minor: i64,
        pub active: bool,
    }
}

pub mod enrollment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EnrollmentStatus {
        Active,
        Completed,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnrollmentNew {
        pub student_id: String,
        pub course_id: Uuid,
        pub start_date: DateTime<Utc>,
        pub end_date: Option<DateTime<Utc>>,
    }

    /// Admin edit of an enrollment; reconciled against the payment ledger.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnrollmentUpdate {
        pub paid_amount_minor: i64,
        pub total_amount_minor: i64,
        pub status: EnrollmentStatus,
        pub start_date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnrollmentView {
        pub id: Uuid,
        pub student_id: String,
        pub course_id: Uuid,
        pub status: EnrollmentStatus,
        pub total_amount_minor: i64,
        pub paid_amount_minor: i64,
        pub start_date: DateTime<Utc>,
        pub end_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnrollmentDetailResponse {
        pub enrollment: EnrollmentView,
        pub payments: Vec<super::payment::PaymentView>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentStatus {
        Pending,
        Completed,
        Failed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub enrollment_id: Uuid,
        pub amount_minor: i64,
        /// Defaults to the authenticated user.
        pub payer_id: Option<String>,
        pub assignment_id: Option<Uuid>,
        /// Present when the payment goes through the external gateway and
        /// waits for a capture callback.
        pub gateway_reference: Option<String>,
    }

    /// Gateway capture callback payload.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentCapture {
        pub payment_id: Option<Uuid>,
        pub gateway_reference: Option<String>,
        pub succeeded: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
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
}

pub mod discount {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DiscountKind {
        Percentage,
        Fixed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DiscountNew {
        pub code: String,
        pub kind: DiscountKind,
        /// Percent for percentage codes, minor units for fixed codes.
        pub value: i64,
        pub min_amount_minor: Option<i64>,
        pub max_discount_minor: Option<i64>,
        pub usage_limit: Option<i32>,
        pub starts_at: Option<DateTime<Utc>>,
        pub ends_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DiscountView {
        pub id: Uuid,
        pub code: String,
        pub kind: DiscountKind,
        pub value: i64,
        pub used_count: i32,
        pub usage_limit: Option<i32>,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DiscountApply {
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DiscountApplied {
        pub discount_amount_minor: i64,
        pub final_amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DiscountRemoved {
        pub restored_amount_minor: i64,
    }
}

pub mod assignment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AssignmentStatus {
        Active,
        Inactive,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentNew {
        pub mentor_id: String,
        pub enrollment_id: Uuid,
        /// Basis points; defaults to the platform rate.
        pub commission_bps: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentReassign {
        pub mentor_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentView {
        pub id: Uuid,
        pub mentor_id: String,
        pub student_id: String,
        pub course_id: Uuid,
        pub enrollment_id: Uuid,
        pub commission_bps: i32,
        pub status: AssignmentStatus,
    }
}
