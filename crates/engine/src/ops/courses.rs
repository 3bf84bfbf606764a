//! Course catalog surface.
//!
//! The catalog is a collaborator; the engine only needs creation, a guarded
//! delete and the price lookup done by enrollment creation.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    access::Principal,
    courses::{self, Course},
    enrollments,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_course(
        &self,
        principal: &Principal,
        title: &str,
        price_minor: i64,
    ) -> ResultEngine<Course> {
        principal.require_admin()?;
        let course = Course::new(title.to_string(), price_minor)?;
        courses::ActiveModel::from(&course)
            .insert(&self.database)
            .await?;
        Ok(course)
    }

    /// Deletes a course no enrollment references.
    pub async fn delete_course(
        &self,
        principal: &Principal,
        course_id: Uuid,
    ) -> ResultEngine<()> {
        principal.require_admin()?;

        with_tx!(self, |db_tx| {
            async {
                let model = self.require_course(&db_tx, course_id).await?;

                let has_enrollment = enrollments::Entity::find()
                    .filter(enrollments::Column::CourseId.eq(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if has_enrollment {
                    return Err(EngineError::BusinessRule(
                        "enrollments still reference the course".to_string(),
                    ));
                }

                courses::Entity::delete_by_id(model.id).exec(&db_tx).await?;
                Ok(())
            }
            .await
        })
    }

    pub async fn course(&self, course_id: Uuid) -> ResultEngine<Course> {
        let model = courses::Entity::find_by_id(course_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("course".to_string()))?;
        Course::try_from(model)
    }
}
