//! Mentor assignment lifecycle and deletion dependency guards.

use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    DEFAULT_ASSIGNMENT_COMMISSION_BPS, DiscountKind, Engine, EngineError, NewDiscount, Principal,
    Role,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [
        ("root", "admin"),
        ("alice", "student"),
        ("marta", "mentor"),
        ("nadia", "mentor"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

fn admin() -> Principal {
    Principal::new("root", Role::Admin)
}

async fn enrollment_for(engine: &Engine, student: &str, price_minor: i64) -> engine::Enrollment {
    let course = engine
        .create_course(&admin(), "Rust mentoring", price_minor)
        .await
        .unwrap();
    engine
        .create_enrollment(&admin(), student, course.id, Utc::now(), None)
        .await
        .unwrap()
}

#[tokio::test]
async fn assignment_defaults_to_the_platform_commission() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let assignment = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await
        .unwrap();
    assert_eq!(assignment.commission_bps, DEFAULT_ASSIGNMENT_COMMISSION_BPS);
    assert_eq!(assignment.student_id, "alice");
    assert_eq!(assignment.course_id, enrollment.course_id);
}

#[tokio::test]
async fn one_assignment_per_mentor_and_enrollment() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    engine
        .create_assignment(&admin(), "marta", enrollment.id, Some(4_000))
        .await
        .unwrap();
    let duplicate = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await;
    assert_eq!(
        duplicate,
        Err(EngineError::BusinessRule(
            "mentor is already assigned to the enrollment".to_string()
        ))
    );
}

#[tokio::test]
async fn only_mentors_can_be_assigned() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    assert!(
        engine
            .create_assignment(&admin(), "alice", enrollment.id, None)
            .await
            .is_err()
    );
    assert!(
        engine
            .create_assignment(&admin(), "nobody", enrollment.id, None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn reassign_moves_the_assignment_to_the_new_mentor() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let assignment = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await
        .unwrap();
    let moved = engine
        .reassign(&admin(), assignment.id, "nadia")
        .await
        .unwrap();
    assert_eq!(moved.mentor_id, "nadia");
    assert_eq!(moved.enrollment_id, enrollment.id);
    assert_eq!(moved.commission_bps, assignment.commission_bps);
}

#[tokio::test]
async fn reassign_rejects_an_already_assigned_mentor() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let first = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await
        .unwrap();
    engine
        .create_assignment(&admin(), "nadia", enrollment.id, None)
        .await
        .unwrap();

    assert_eq!(
        engine.reassign(&admin(), first.id, "nadia").await,
        Err(EngineError::BusinessRule(
            "mentor is already assigned to the enrollment".to_string()
        ))
    );
}

#[tokio::test]
async fn unassign_is_blocked_by_payment_history() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let assignment = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await
        .unwrap();
    engine
        .record_payment(
            &admin(),
            enrollment.id,
            10_000,
            Some("alice"),
            Some(assignment.id),
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        engine.unassign(&admin(), assignment.id).await,
        Err(EngineError::BusinessRule(
            "payments still reference the assignment".to_string()
        ))
    );
}

#[tokio::test]
async fn unassign_removes_an_unused_assignment() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let assignment = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await
        .unwrap();
    engine.unassign(&admin(), assignment.id).await.unwrap();
    assert_eq!(
        engine.unassign(&admin(), assignment.id).await,
        Err(EngineError::NotFound("assignment".to_string()))
    );
}

#[tokio::test]
async fn enrollment_deletion_respects_its_dependencies() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let assignment = engine
        .create_assignment(&admin(), "marta", enrollment.id, None)
        .await
        .unwrap();
    assert_eq!(
        engine.delete_enrollment(&admin(), enrollment.id).await,
        Err(EngineError::BusinessRule(
            "assignments still reference the enrollment".to_string()
        ))
    );

    engine.unassign(&admin(), assignment.id).await.unwrap();
    engine
        .record_payment(&admin(), enrollment.id, 10_000, Some("alice"), None, None)
        .await
        .unwrap();
    assert_eq!(
        engine.delete_enrollment(&admin(), enrollment.id).await,
        Err(EngineError::BusinessRule(
            "payments still reference the enrollment".to_string()
        ))
    );
}

#[tokio::test]
async fn enrollment_deletion_unwinds_a_dangling_discount() {
    let (engine, _db) = engine_with_db().await;
    let first = enrollment_for(&engine, "alice", 50_000).await;

    engine
        .create_discount(
            &admin(),
            NewDiscount {
                code: "ONCE".to_string(),
                kind: DiscountKind::Percentage,
                value: 10,
                min_amount_minor: None,
                max_discount_minor: None,
                usage_limit: Some(1),
                starts_at: None,
                ends_at: None,
            },
        )
        .await
        .unwrap();
    engine.apply_discount(&admin(), "ONCE", first.id).await.unwrap();
    engine.delete_enrollment(&admin(), first.id).await.unwrap();

    // the usage slot is free again
    let second = enrollment_for(&engine, "alice", 50_000).await;
    assert!(engine.apply_discount(&admin(), "ONCE", second.id).await.is_ok());
}

#[tokio::test]
async fn course_deletion_is_blocked_while_enrollments_exist() {
    let (engine, _db) = engine_with_db().await;
    let course = engine
        .create_course(&admin(), "Rust mentoring", 50_000)
        .await
        .unwrap();
    let enrollment = engine
        .create_enrollment(&admin(), "alice", course.id, Utc::now(), None)
        .await
        .unwrap();

    assert_eq!(
        engine.delete_course(&admin(), course.id).await,
        Err(EngineError::BusinessRule(
            "enrollments still reference the course".to_string()
        ))
    );

    engine.delete_enrollment(&admin(), enrollment.id).await.unwrap();
    engine.delete_course(&admin(), course.id).await.unwrap();
    assert_eq!(
        engine.course(course.id).await,
        Err(EngineError::NotFound("course".to_string()))
    );
}

#[tokio::test]
async fn only_admins_manage_assignments() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;
    let as_marta = Principal::new("marta", Role::Mentor);

    assert_eq!(
        engine
            .create_assignment(&as_marta, "marta", enrollment.id, None)
            .await,
        Err(EngineError::Unauthorized("admin role required".to_string()))
    );
}
