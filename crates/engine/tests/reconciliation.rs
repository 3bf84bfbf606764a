//! Payment recording, gateway capture and the reconcile-on-edit path.

use chrono::Utc;
use std::sync::{Arc, Mutex};

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    Engine, EngineError, EnrollmentEdit, EnrollmentStatus, Notifier, PaymentStatus, Principal,
    Role,
};
use migration::MigratorTrait;

#[derive(Default)]
struct RecordingNotifier {
    payments: Mutex<Vec<(Uuid, i64)>>,
    completions: Mutex<Vec<Uuid>>,
}

impl Notifier for RecordingNotifier {
    fn payment_recorded(&self, enrollment_id: Uuid, amount_minor: i64) {
        self.payments
            .lock()
            .unwrap()
            .push((enrollment_id, amount_minor));
    }

    fn enrollment_completed(&self, enrollment_id: Uuid) {
        self.completions.lock().unwrap().push(enrollment_id);
    }
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [
        ("root", "admin"),
        ("alice", "student"),
        ("bob", "student"),
        ("marta", "mentor"),
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

async fn engine_with_recorder() -> (Engine, DatabaseConnection, Arc<RecordingNotifier>) {
    let (_, db) = engine_with_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Engine::builder()
        .database(db.clone())
        .notifier(notifier.clone())
        .build();
    (engine, db, notifier)
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
async fn manual_payment_completes_and_moves_the_aggregate() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let payment = engine
        .record_payment(&admin(), enrollment.id, 20_000, Some("alice"), None, None)
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.mentor_commission_minor, 7_400);
    assert_eq!(payment.platform_fee_minor, 600);

    let (updated, history) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.paid_amount_minor, 20_000);
    assert_eq!(updated.status, EnrollmentStatus::Active);
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn full_payment_flips_the_enrollment_to_completed() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    engine
        .record_payment(&admin(), enrollment.id, 50_000, Some("alice"), None, None)
        .await
        .unwrap();

    let (updated, _) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.status, EnrollmentStatus::Completed);
}

#[tokio::test]
async fn raising_the_paid_amount_records_one_delta_payment() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 80_000).await;

    engine
        .record_payment(&admin(), enrollment.id, 50_000, Some("alice"), None, None)
        .await
        .unwrap();
    engine
        .update_enrollment(
            &admin(),
            enrollment.id,
            EnrollmentEdit {
                paid_amount_minor: 80_000,
                total_amount_minor: 80_000,
                status: EnrollmentStatus::Active,
                start_date: enrollment.start_date,
            },
        )
        .await
        .unwrap();

    let (updated, history) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.paid_amount_minor, 80_000);
    assert_eq!(updated.status, EnrollmentStatus::Completed);
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|p| p.amount_minor == 30_000));
}

#[tokio::test]
async fn reconciliation_notifies_new_funds_but_not_rewrites() {
    let (engine, _db, notifier) = engine_with_recorder().await;
    let enrollment = enrollment_for(&engine, "alice", 80_000).await;

    engine
        .record_payment(&admin(), enrollment.id, 50_000, Some("alice"), None, None)
        .await
        .unwrap();
    engine
        .update_enrollment(
            &admin(),
            enrollment.id,
            EnrollmentEdit {
                paid_amount_minor: 80_000,
                total_amount_minor: 80_000,
                status: EnrollmentStatus::Active,
                start_date: enrollment.start_date,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        *notifier.payments.lock().unwrap(),
        vec![(enrollment.id, 50_000), (enrollment.id, 30_000)]
    );
    assert_eq!(*notifier.completions.lock().unwrap(), vec![enrollment.id]);

    // collapsing the history is an accounting rewrite, no new funds
    engine
        .update_enrollment(
            &admin(),
            enrollment.id,
            EnrollmentEdit {
                paid_amount_minor: 20_000,
                total_amount_minor: 80_000,
                status: EnrollmentStatus::Active,
                start_date: enrollment.start_date,
            },
        )
        .await
        .unwrap();
    assert_eq!(notifier.payments.lock().unwrap().len(), 2);
    assert_eq!(notifier.completions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn lowering_the_paid_amount_collapses_the_history() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 80_000).await;

    engine
        .record_payment(&admin(), enrollment.id, 20_000, Some("alice"), None, None)
        .await
        .unwrap();
    engine
        .record_payment(&admin(), enrollment.id, 30_000, Some("alice"), None, None)
        .await
        .unwrap();

    engine
        .update_enrollment(
            &admin(),
            enrollment.id,
            EnrollmentEdit {
                paid_amount_minor: 20_000,
                total_amount_minor: 80_000,
                status: EnrollmentStatus::Active,
                start_date: enrollment.start_date,
            },
        )
        .await
        .unwrap();

    let (updated, history) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.paid_amount_minor, 20_000);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount_minor, 20_000);
    assert_eq!(history[0].status, PaymentStatus::Completed);
    assert_eq!(history[0].payer_id, "alice");
}

#[tokio::test]
async fn lowering_to_zero_leaves_no_payment_rows() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    engine
        .record_payment(&admin(), enrollment.id, 50_000, Some("alice"), None, None)
        .await
        .unwrap();
    engine
        .update_enrollment(
            &admin(),
            enrollment.id,
            EnrollmentEdit {
                paid_amount_minor: 0,
                total_amount_minor: 50_000,
                status: EnrollmentStatus::Active,
                start_date: enrollment.start_date,
            },
        )
        .await
        .unwrap();

    let (updated, history) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.paid_amount_minor, 0);
    assert_eq!(updated.status, EnrollmentStatus::Active);
    assert!(history.is_empty());
}

#[tokio::test]
async fn requested_cancellation_overrides_the_derived_status() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let updated = engine
        .update_enrollment(
            &admin(),
            enrollment.id,
            EnrollmentEdit {
                paid_amount_minor: 50_000,
                total_amount_minor: 50_000,
                status: EnrollmentStatus::Cancelled,
                start_date: enrollment.start_date,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, EnrollmentStatus::Cancelled);
}

#[tokio::test]
async fn pending_gateway_payment_counts_only_after_capture() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let payment = engine
        .record_payment(
            &admin(),
            enrollment.id,
            50_000,
            Some("alice"),
            None,
            Some("gw-123".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let (before, _) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(before.paid_amount_minor, 0);
    assert_eq!(before.status, EnrollmentStatus::Active);

    let captured = engine
        .capture_payment_by_reference("gw-123", true)
        .await
        .unwrap();
    assert_eq!(captured.status, PaymentStatus::Completed);

    let (after, _) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(after.paid_amount_minor, 50_000);
    assert_eq!(after.status, EnrollmentStatus::Completed);
}

#[tokio::test]
async fn capture_is_exactly_once() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let payment = engine
        .record_payment(
            &admin(),
            enrollment.id,
            50_000,
            Some("alice"),
            None,
            Some("gw-dup".to_string()),
        )
        .await
        .unwrap();

    engine.capture_payment_result(payment.id, true).await.unwrap();
    let second = engine.capture_payment_result(payment.id, true).await;
    assert_eq!(
        second,
        Err(EngineError::BusinessRule(
            "payment already processed".to_string()
        ))
    );

    let (updated, _) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.paid_amount_minor, 50_000);
}

#[tokio::test]
async fn failed_capture_leaves_the_aggregate_untouched() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let payment = engine
        .record_payment(
            &admin(),
            enrollment.id,
            50_000,
            Some("alice"),
            None,
            Some("gw-fail".to_string()),
        )
        .await
        .unwrap();

    let failed = engine.capture_payment_result(payment.id, false).await.unwrap();
    assert_eq!(failed.status, PaymentStatus::Failed);

    let (updated, _) = engine
        .enrollment_with_payments(&admin(), enrollment.id)
        .await
        .unwrap();
    assert_eq!(updated.paid_amount_minor, 0);

    // terminal either way
    let retry = engine.capture_payment_result(payment.id, true).await;
    assert!(retry.is_err());
}

#[tokio::test]
async fn duplicate_gateway_reference_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    engine
        .record_payment(
            &admin(),
            enrollment.id,
            20_000,
            Some("alice"),
            None,
            Some("gw-1".to_string()),
        )
        .await
        .unwrap();
    let duplicate = engine
        .record_payment(
            &admin(),
            enrollment.id,
            20_000,
            Some("alice"),
            None,
            Some("gw-1".to_string()),
        )
        .await;
    assert_eq!(
        duplicate,
        Err(EngineError::BusinessRule(
            "gateway reference already recorded".to_string()
        ))
    );
}

#[tokio::test]
async fn students_only_pay_their_own_enrollment() {
    let (engine, _db) = engine_with_db().await;
    let enrollment = enrollment_for(&engine, "alice", 50_000).await;

    let as_alice = Principal::new("alice", Role::Student);
    engine
        .record_payment(&as_alice, enrollment.id, 10_000, None, None, None)
        .await
        .unwrap();

    let as_bob = Principal::new("bob", Role::Student);
    assert!(
        engine
            .record_payment(&as_bob, enrollment.id, 10_000, None, None, None)
            .await
            .is_err()
    );
    assert!(
        engine
            .record_payment(&as_alice, enrollment.id, 10_000, Some("bob"), None, None)
            .await
            .is_err()
    );

    let as_marta = Principal::new("marta", Role::Mentor);
    assert_eq!(
        engine
            .record_payment(&as_marta, enrollment.id, 10_000, None, None, None)
            .await,
        Err(EngineError::Unauthorized(
            "mentors cannot record payments".to_string()
        ))
    );
}
