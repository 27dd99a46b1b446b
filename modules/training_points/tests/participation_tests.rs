//! Participation ledger and training point accrual

mod common;

use common::{print_test_header, Campus};
use futures::future::join_all;
use training_points::contract::*;
use training_points::domain::Paging;

#[tokio::test]
async fn test_register_then_attend_credits_once() {
    let campus = Campus::new();
    let service = &campus.service;

    print_test_header(
        "test_register_then_attend_credits_once",
        &[
            "Registering and confirming attendance mints exactly one training point.",
            "Confirming again neither changes state nor mints a second entry.",
        ],
    );

    let activity = campus.activity("Green Sunday", 5).await;

    println!("\n📝 Stage 1: Register");
    let participation = service
        .register(campus.alice, activity.id)
        .await
        .expect("Failed to register");
    assert_eq!(participation.state(), ParticipationState::Registered);
    assert!(!participation.is_attendance);
    assert!(!participation.is_point_added);

    println!("\n📝 Stage 2: Confirm attendance");
    let outcome = service
        .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
        .await
        .expect("Failed to mark attendance");
    assert_eq!(outcome.participation.state(), ParticipationState::Credited);
    let granted = outcome.granted.expect("first attendance must mint a point");
    assert_eq!(granted.point, 5);
    assert_eq!(granted.student_id, campus.alice);
    assert_eq!(granted.semester_id, campus.semester_id);
    assert_eq!(granted.criterion_id, Some(campus.volunteering_id));

    let total = service
        .sum_for_student_in_semester(campus.alice, campus.semester_id)
        .await
        .expect("Failed to sum");
    assert_eq!(total, 5);

    println!("\n📝 Stage 3: Confirm attendance again");
    let again = service
        .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
        .await
        .expect("Failed to repeat attendance");
    assert!(again.granted.is_none());
    assert_eq!(again.participation.state(), ParticipationState::Credited);
    assert_eq!(campus.db.training_point_count(), 1);

    let total = service
        .sum_for_student_in_semester(campus.alice, campus.semester_id)
        .await
        .expect("Failed to sum");
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let campus = Campus::new();
    let activity = campus.activity("Blood drive", 3).await;

    print_test_header(
        "test_duplicate_registration_rejected",
        &["A second registration for the same pair fails and leaves one row."],
    );

    campus
        .service
        .register(campus.alice, activity.id)
        .await
        .expect("Failed to register");

    let err = campus
        .service
        .register(campus.alice, activity.id)
        .await
        .expect_err("duplicate registration must fail");
    assert_eq!(
        err,
        TrainingPointsError::DuplicateRegistration {
            student_id: campus.alice,
            activity_id: activity.id,
        }
    );

    let participants = campus
        .service
        .list_participants(activity.id)
        .await
        .expect("Failed to list participants");
    assert_eq!(participants.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_yield_one_row() {
    let campus = Campus::new();
    let activity = campus.activity("Hackathon", 4).await;

    print_test_header(
        "test_concurrent_registrations_yield_one_row",
        &["Racing registrations for one pair produce exactly one success."],
    );

    let attempts = (0..8).map(|_| {
        let service = campus.service.clone();
        let (student, activity_id) = (campus.alice, activity.id);
        tokio::spawn(async move { service.register(student, activity_id).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(TrainingPointsError::DuplicateRegistration { .. })))
        .count();
    println!("   successes: {}, duplicates: {}", successes, duplicates);
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attendance_credits_once() {
    let campus = Campus::new();
    let activity = campus.activity("Charity run", 6).await;
    campus
        .service
        .register(campus.bao, activity.id)
        .await
        .expect("Failed to register");

    print_test_header(
        "test_concurrent_attendance_credits_once",
        &["Racing attendance confirmations mint exactly one training point."],
    );

    let marker = campus.assistant_ref();
    let attempts = (0..8).map(|_| {
        let service = campus.service.clone();
        let (student, activity_id) = (campus.bao, activity.id);
        tokio::spawn(async move {
            service
                .mark_attendance(student, activity_id, true, marker)
                .await
        })
    });
    let outcomes: Vec<AttendanceOutcome> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("attendance failed"))
        .collect();

    let minted = outcomes.iter().filter(|o| o.granted.is_some()).count();
    assert_eq!(minted, 1);
    assert_eq!(campus.db.training_point_count(), 1);

    let total = campus
        .service
        .sum_for_student_in_semester(campus.bao, campus.semester_id)
        .await
        .expect("Failed to sum");
    assert_eq!(total, 6);
}

#[tokio::test]
async fn test_clearing_attendance_keeps_credit() {
    let campus = Campus::new();
    let activity = campus.activity("Library day", 2).await;
    let service = &campus.service;

    print_test_header(
        "test_clearing_attendance_keeps_credit",
        &[
            "Clearing attendance after a credit leaves the point and the credit flag.",
            "Re-confirming does not mint again.",
        ],
    );

    service.register(campus.alice, activity.id).await.expect("register");
    service
        .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
        .await
        .expect("attend");

    let cleared = service
        .mark_attendance(campus.alice, activity.id, false, campus.specialist_ref())
        .await
        .expect("clear attendance");
    assert!(!cleared.participation.is_attendance);
    assert!(cleared.participation.is_point_added);
    assert!(cleared.granted.is_none());

    let again = service
        .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
        .await
        .expect("re-attend");
    assert!(again.granted.is_none());
    assert!(again.participation.is_attendance);
    assert_eq!(campus.db.training_point_count(), 1);
}

#[tokio::test]
async fn test_marking_absent_before_attendance_mints_nothing() {
    let campus = Campus::new();
    let activity = campus.activity("Seminar", 1).await;

    campus
        .service
        .register(campus.alice, activity.id)
        .await
        .expect("register");
    let outcome = campus
        .service
        .mark_attendance(campus.alice, activity.id, false, campus.specialist_ref())
        .await
        .expect("mark absent");

    assert_eq!(outcome.participation.state(), ParticipationState::Registered);
    assert!(outcome.granted.is_none());
    assert_eq!(campus.db.training_point_count(), 0);
}

#[tokio::test]
async fn test_failed_credit_leaves_nothing_and_can_be_retried() {
    let campus = Campus::new();
    let activity = campus.activity("Open day", 4).await;
    let service = &campus.service;

    print_test_header(
        "test_failed_credit_leaves_nothing_and_can_be_retried",
        &["A storage failure during credit persists neither the point nor the flag."],
    );

    service.register(campus.alice, activity.id).await.expect("register");

    campus.db.fail_next_credit();
    let err = service
        .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
        .await
        .expect_err("credit must fail");
    assert_eq!(err, TrainingPointsError::Internal);

    let participation = service
        .find_participation(campus.alice, activity.id)
        .await
        .expect("participation");
    assert!(!participation.is_point_added);
    assert!(!participation.is_attendance);
    assert_eq!(campus.db.training_point_count(), 0);

    let retried = service
        .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
        .await
        .expect("retry");
    assert!(retried.granted.is_some());
    assert_eq!(campus.db.training_point_count(), 1);
}

#[tokio::test]
async fn test_students_cannot_mark_attendance() {
    let campus = Campus::new();
    let activity = campus.activity("Tree planting", 2).await;

    campus
        .service
        .register(campus.alice, activity.id)
        .await
        .expect("register");

    let err = campus
        .service
        .mark_attendance(campus.alice, activity.id, true, campus.student_ref(campus.bao))
        .await
        .expect_err("students must not mark attendance");
    assert!(matches!(err, TrainingPointsError::Forbidden { .. }));
    assert_eq!(campus.db.training_point_count(), 0);
}

#[tokio::test]
async fn test_attendance_without_registration_not_found() {
    let campus = Campus::new();
    let activity = campus.activity("Career fair", 2).await;

    let err = campus
        .service
        .mark_attendance(campus.bao, activity.id, true, campus.specialist_ref())
        .await
        .expect_err("no registration");
    assert!(matches!(err, TrainingPointsError::NotFound { .. }));
}

#[tokio::test]
async fn test_register_rejects_unknown_or_inactive_activity() {
    let campus = Campus::new();
    let activity = campus.activity("Cancelled trip", 3).await;

    print_test_header(
        "test_register_rejects_unknown_or_inactive_activity",
        &["Registration requires an existing, active activity and an existing student."],
    );

    let err = campus
        .service
        .register(campus.alice, 9_999)
        .await
        .expect_err("unknown activity");
    assert!(matches!(err, TrainingPointsError::NotFound { .. }));

    let err = campus
        .service
        .register(9_999, activity.id)
        .await
        .expect_err("unknown student");
    assert!(matches!(err, TrainingPointsError::NotFound { .. }));

    campus
        .service
        .deactivate_activity(activity.id, campus.specialist_ref())
        .await
        .expect("deactivate");
    let err = campus
        .service
        .register(campus.alice, activity.id)
        .await
        .expect_err("inactive activity");
    assert!(matches!(err, TrainingPointsError::NotFound { .. }));
}

#[tokio::test]
async fn test_credit_uses_activity_values_at_credit_time() {
    let campus = Campus::new();
    let mut data = campus.new_activity("Music night", 7);
    data.criterion_id = Some(campus.culture_id);
    let activity = campus
        .service
        .create_activity(data, campus.specialist_ref())
        .await
        .expect("create");

    campus
        .service
        .register(campus.bao, activity.id)
        .await
        .expect("register");
    let outcome = campus
        .service
        .mark_attendance(campus.bao, activity.id, true, campus.assistant_ref())
        .await
        .expect("attend");

    let granted = outcome.granted.expect("minted");
    assert_eq!(granted.point, 7);
    assert_eq!(granted.criterion_id, Some(campus.culture_id));
    assert_eq!(granted.semester_id, activity.semester_id);
}

#[tokio::test]
async fn test_semester_report_caps_each_criterion() {
    let campus = Campus::new();
    let service = &campus.service;

    print_test_header(
        "test_semester_report_caps_each_criterion",
        &["Per-criterion totals are capped at the criterion maximum; raw totals are not."],
    );

    // Volunteering caps at 10; earn 6 + 6
    for name in ["Beach clean-up", "Food bank"] {
        let activity = campus.activity(name, 6).await;
        service.register(campus.alice, activity.id).await.expect("register");
        service
            .mark_attendance(campus.alice, activity.id, true, campus.specialist_ref())
            .await
            .expect("attend");
    }

    // No criterion
    let mut data = campus.new_activity("Alumni talk", 2);
    data.criterion_id = None;
    let talk = service
        .create_activity(data, campus.specialist_ref())
        .await
        .expect("create");
    service.register(campus.alice, talk.id).await.expect("register");
    service
        .mark_attendance(campus.alice, talk.id, true, campus.specialist_ref())
        .await
        .expect("attend");

    let report = service
        .semester_report(campus.alice, campus.semester_id)
        .await
        .expect("report");
    println!("   report: {:?}", report);

    assert_eq!(report.total, 14);
    assert_eq!(report.credited_total, 12);

    let volunteering = report
        .criteria
        .iter()
        .find(|t| t.criterion_id == Some(campus.volunteering_id))
        .expect("volunteering tally");
    assert_eq!(volunteering.earned, 12);
    assert_eq!(volunteering.credited, 10);
    assert_eq!(volunteering.max_point, Some(10));

    let uncategorized = report
        .criteria
        .iter()
        .find(|t| t.criterion_id.is_none())
        .expect("uncategorized tally");
    assert_eq!(uncategorized.earned, 2);
    assert_eq!(uncategorized.credited, 2);

    assert_eq!(
        service
            .sum_for_student_in_semester(campus.alice, campus.semester_id)
            .await
            .expect("sum"),
        14
    );
}

#[tokio::test]
async fn test_participation_listings() {
    let campus = Campus::new();
    let first = campus.activity("Workshop A", 1).await;
    let second = campus.activity("Workshop B", 1).await;

    for (student, activity) in [
        (campus.alice, first.id),
        (campus.bao, first.id),
        (campus.alice, second.id),
    ] {
        campus
            .service
            .register(student, activity)
            .await
            .expect("register");
    }

    let participants = campus
        .service
        .list_participants(first.id)
        .await
        .expect("participants");
    assert_eq!(participants.len(), 2);

    let alice = campus
        .service
        .list_participations(campus.alice)
        .await
        .expect("participations");
    assert_eq!(alice.len(), 2);
    assert!(alice.iter().all(|p| p.student_id == campus.alice));
}

#[tokio::test]
async fn test_delete_activity_refused_while_in_use() {
    let campus = Campus::new();
    let used = campus.activity("Used", 1).await;
    let unused = campus.activity("Unused", 1).await;

    campus
        .service
        .register(campus.alice, used.id)
        .await
        .expect("register");

    let err = campus
        .service
        .delete_activity(used.id, campus.assistant_ref())
        .await
        .expect_err("in use");
    assert_eq!(err, TrainingPointsError::ActivityInUse { activity_id: used.id });

    campus
        .service
        .delete_activity(unused.id, campus.assistant_ref())
        .await
        .expect("delete unused");
    let err = campus
        .service
        .get_activity(unused.id)
        .await
        .expect_err("deleted");
    assert!(matches!(err, TrainingPointsError::NotFound { .. }));
}

#[tokio::test]
async fn test_stream_walks_every_page() {
    let campus = Campus::with_paging(Paging {
        default_page_size: 2,
        max_page_size: 10,
    });
    for i in 0..5 {
        campus.activity(&format!("Session {}", i), 1).await;
    }

    use futures::TryStreamExt;
    let all: Vec<Activity> = campus
        .service
        .stream_activities(ActivityFilter::default())
        .try_collect()
        .await
        .expect("stream");
    assert_eq!(all.len(), 5);

    let first_page = campus
        .service
        .list_activities(ActivityFilter::default(), None, 0)
        .await
        .expect("list");
    assert_eq!(first_page.len(), 2);

    let capped = campus
        .service
        .list_activities(ActivityFilter::default(), Some(1_000), 0)
        .await
        .expect("list");
    assert_eq!(capped.len(), 5);
}
