//! Courses table.
//!
//! The catalog itself is a collaborator; the engine needs the price when an
//! enrollment is created and a dependency guard on deletion.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub price_minor: i64,
    pub active: bool,
}

impl Course {
    pub fn new(title: String, price_minor: i64) -> ResultEngine<Self> {
        if title.trim().is_empty() {
            return Err(EngineError::Validation(
                "course title must not be empty".to_string(),
            ));
        }
        if price_minor <= 0 {
            return Err(EngineError::Validation(
                "course price must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            price_minor,
            active: true,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub price_minor: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Course> for ActiveModel {
    fn from(course: &Course) -> Self {
        Self {
            id: ActiveValue::Set(course.id.to_string()),
            title: ActiveValue::Set(course.title.clone()),
            price_minor: ActiveValue::Set(course.price_minor),
            active: ActiveValue::Set(course.active),
        }
    }
}

impl TryFrom<Model> for Course {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("course".to_string()))?,
            title: model.title,
            price_minor: model.price_minor,
            active: model.active,
        })
    }
}
