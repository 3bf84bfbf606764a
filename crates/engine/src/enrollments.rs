//! Enrollment primitives.
//!
//! An `Enrollment` is one (student, course) pair, tracking the amount owed
//! and a cached paid aggregate. The aggregate must equal the sum of the
//! COMPLETED payments of the enrollment after every engine operation; the
//! reconciliation ops own that invariant, not the storage layer.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Status derived from the paid/total comparison.
    ///
    /// `Cancelled` is an admin override and is never produced here.
    pub fn derived(paid_minor: i64, total_minor: i64) -> Self {
        if paid_minor >= total_minor {
            Self::Completed
        } else {
            Self::Active
        }
    }
}

impl TryFrom<&str> for EnrollmentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid enrollment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: String,
    pub course_id: Uuid,
    pub status: EnrollmentStatus,
    pub total_amount_minor: i64,
    pub paid_amount_minor: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(
        student_id: String,
        course_id: Uuid,
        total_amount_minor: i64,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Self> {
        if total_amount_minor < 0 {
            return Err(EngineError::Validation(
                "total amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            status: EnrollmentStatus::Active,
            total_amount_minor,
            paid_amount_minor: 0,
            start_date,
            end_date,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub status: String,
    pub total_amount_minor: i64,
    pub paid_amount_minor: i64,
    pub start_date: DateTimeUtc,
    pub end_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Courses,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::discount_applications::Entity")]
    DiscountApplications,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::discount_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Enrollment> for ActiveModel {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: ActiveValue::Set(enrollment.id.to_string()),
            student_id: ActiveValue::Set(enrollment.student_id.clone()),
            course_id: ActiveValue::Set(enrollment.course_id.to_string()),
            status: ActiveValue::Set(enrollment.status.as_str().to_string()),
            total_amount_minor: ActiveValue::Set(enrollment.total_amount_minor),
            paid_amount_minor: ActiveValue::Set(enrollment.paid_amount_minor),
            start_date: ActiveValue::Set(enrollment.start_date),
            end_date: ActiveValue::Set(enrollment.end_date),
        }
    }
}

impl TryFrom<Model> for Enrollment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("enrollment".to_string()))?,
            student_id: model.student_id,
            course_id: Uuid::parse_str(&model.course_id)
                .map_err(|_| EngineError::NotFound("course".to_string()))?,
            status: EnrollmentStatus::try_from(model.status.as_str())?,
            total_amount_minor: model.total_amount_minor,
            paid_amount_minor: model.paid_amount_minor,
            start_date: model.start_date,
            end_date: model.end_date,
        })
    }
}
