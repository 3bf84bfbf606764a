//! Mentor assignment primitives.
//!
//! A `MentorAssignment` links one mentor to one enrollment (and therefore to
//! its student and course). The commission rate is stored per assignment in
//! basis points because historical assignments may predate a rate change.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Default assignment commission: 37%.
pub const DEFAULT_ASSIGNMENT_COMMISSION_BPS: i32 = 3_700;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Inactive,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(EngineError::Validation(format!(
                "invalid assignment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorAssignment {
    pub id: Uuid,
    pub mentor_id: String,
    pub student_id: String,
    pub course_id: Uuid,
    pub enrollment_id: Uuid,
    pub commission_bps: i32,
    pub status: AssignmentStatus,
}

impl MentorAssignment {
    pub fn new(
        mentor_id: String,
        student_id: String,
        course_id: Uuid,
        enrollment_id: Uuid,
        commission_bps: i32,
    ) -> ResultEngine<Self> {
        if commission_bps < 0 {
            return Err(EngineError::Validation(
                "commission rate must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            mentor_id,
            student_id,
            course_id,
            enrollment_id,
            commission_bps,
            status: AssignmentStatus::Active,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "mentor_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub mentor_id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrollment_id: String,
    pub commission_bps: i32,
    pub status: String,
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

impl From<&MentorAssignment> for ActiveModel {
    fn from(assignment: &MentorAssignment) -> Self {
        Self {
            id: ActiveValue::Set(assignment.id.to_string()),
            mentor_id: ActiveValue::Set(assignment.mentor_id.clone()),
            student_id: ActiveValue::Set(assignment.student_id.clone()),
            course_id: ActiveValue::Set(assignment.course_id.to_string()),
            enrollment_id: ActiveValue::Set(assignment.enrollment_id.to_string()),
            commission_bps: ActiveValue::Set(assignment.commission_bps),
            status: ActiveValue::Set(assignment.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for MentorAssignment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("assignment".to_string()))?,
            mentor_id: model.mentor_id,
            student_id: model.student_id,
            course_id: Uuid::parse_str(&model.course_id)
                .map_err(|_| EngineError::NotFound("course".to_string()))?,
            enrollment_id: Uuid::parse_str(&model.enrollment_id)
                .map_err(|_| EngineError::NotFound("enrollment".to_string()))?,
            commission_bps: model.commission_bps,
            status: AssignmentStatus::try_from(model.status.as_str())?,
        })
    }
}
