//! End-to-end tests for ProgramBuilder: store → allocate → assemble → render → compile.

mod support;

use std::sync::Arc;

use program_builder::api::{
    ErrorKind, EventId, LocalSubmissionStore, ProgramBuilder, ProgramError, ProgramRequest,
    ScheduleNode, TimeWindow,
};
use support::{presentation, seeded_store, FailingCompiler, StaticCompiler};

fn six_presentations() -> Vec<program_builder::api::Presentation> {
    vec![
        presentation(1, "101"),
        presentation(2, "201"),
        presentation(1, "102"),
        presentation(2, "202"),
        presentation(1, "103"),
        presentation(2, "203"),
    ]
}

fn request(event: EventId) -> ProgramRequest {
    ProgramRequest::new(event, support::metadata(), support::morning_windows())
}

#[tokio::test]
async fn test_plan_places_every_presentation() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = support::builder(store, &["p"]);

    let plan = builder.plan(&request(event)).await.unwrap();

    assert_eq!(plan.assignment.total_assigned(), 6);
    for session in plan.assignment.sessions() {
        assert!(session.len() <= session.capacity);
    }
    let orders: Vec<u32> = plan
        .presentation_order
        .iter()
        .map(|e| e.global_order)
        .collect();
    assert_eq!(orders, (1..=6).collect::<Vec<u32>>());

    // Session windows sit at positions 0 and 2; the break is a passenger.
    let indices: Vec<usize> = plan
        .presentation_order
        .iter()
        .map(|e| e.session_index)
        .collect();
    assert!(indices.iter().all(|&i| i == 0 || i == 2));
    assert!(matches!(plan.document.nodes[1], ScheduleNode::Break(_)));
}

#[tokio::test]
async fn test_plan_markup_lists_every_presenter() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = support::builder(store, &["p"]);

    let plan = builder.plan(&request(event)).await.unwrap();

    for key in ["101", "102", "103", "201", "202", "203"] {
        assert!(plan.markup.contains(&format!("Student {}", key)));
    }
    assert!(plan.markup.contains("Session 1(09:00〜10:00)"));
    assert!(plan.markup.contains("Session 2(10:15〜11:15)"));
    assert!(plan.markup.contains("Break(10:00〜10:15)"));
}

#[tokio::test]
async fn test_build_compiles_rendered_markup() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let compiler = Arc::new(StaticCompiler::new(&["program"]));
    let builder = ProgramBuilder::new(store, compiler.clone(), support::config());

    let outcome = builder.build(&request(event)).await.unwrap();

    assert_eq!(compiler.calls(), 1);
    assert_eq!(
        compiler.last_markup().as_deref(),
        Some(outcome.plan.markup.as_str())
    );
    assert_eq!(outcome.program.filename, "program.pdf");
    assert_eq!(outcome.program.media_type, "application/pdf");
    let labels = support::page_labels(&outcome.program.bytes);
    assert_eq!(labels, vec!["program"]);
}

#[tokio::test]
async fn test_compiler_failure_is_surfaced() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = ProgramBuilder::new(store, Arc::new(FailingCompiler), support::config());

    let err = builder.build(&request(event)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompilationFailure);
}

#[tokio::test]
async fn test_event_without_submissions() {
    let (store, event) = seeded_store(Vec::new(), &[]);
    let compiler = Arc::new(StaticCompiler::new(&["p"]));
    let builder = ProgramBuilder::new(store, compiler.clone(), support::config());

    let err = builder.build(&request(event)).await.unwrap_err();
    assert!(matches!(err, ProgramError::NoSubmissions { .. }));
    assert!(err.is_validation());
    assert_eq!(compiler.calls(), 0);
}

#[tokio::test]
async fn test_unknown_event() {
    let store = Arc::new(LocalSubmissionStore::new());
    let builder = support::builder(store, &["p"]);

    let req = request(EventId::generate());
    let err = builder.plan(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_zero_duration_rejected() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = support::builder(store, &["p"]);

    let req = request(event).with_duration(0);
    let err = builder.plan(&req).await.unwrap_err();
    assert!(matches!(
        err,
        ProgramError::InvalidPresentationDuration { minutes: 0 }
    ));
}

#[tokio::test]
async fn test_explicit_duration_changes_capacity() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = support::builder(store, &["p"]);

    let req = request(event).with_duration(20);
    let plan = builder.plan(&req).await.unwrap();
    let capacities: Vec<usize> = plan
        .assignment
        .sessions()
        .iter()
        .map(|s| s.capacity)
        .collect();
    assert_eq!(capacities, vec![3, 3]);
}

#[tokio::test]
async fn test_allocation_failure_yields_no_plan() {
    let (store, event) = seeded_store(
        vec![
            presentation(1, "1"),
            presentation(1, "2"),
            presentation(2, "3"),
        ],
        &[],
    );
    let builder = support::builder(store, &["p"]);

    let err = builder.plan(&request(event)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientLabSupply);
}

#[tokio::test]
async fn test_only_breaks() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = support::builder(store, &["p"]);

    let mut req = request(event);
    req.sessions = vec![TimeWindow::break_window("12:00", "13:00")];
    let err = builder.plan(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoPresentationSessions);
}

#[tokio::test]
async fn test_malformed_time_names_value() {
    let (store, event) = seeded_store(six_presentations(), &[]);
    let builder = support::builder(store, &["p"]);

    let mut req = request(event);
    req.sessions[0] = TimeWindow::session("9am", "10:00");
    let err = builder.plan(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTimeFormat);
    assert!(err.to_string().contains("9am"));
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let (store_a, event_a) = seeded_store(six_presentations(), &[]);
    let (store_b, event_b) = seeded_store(
        vec![
            presentation(7, "1"),
            presentation(8, "2"),
            presentation(7, "3"),
            presentation(8, "4"),
        ],
        &[],
    );
    let builder_a = support::builder(store_a, &["a"]);
    let builder_b = support::builder(store_b, &["b"]);

    let req_a = request(event_a);
    let req_b = request(event_b);
    let (a, b) = tokio::join!(builder_a.build(&req_a), builder_b.build(&req_b));

    assert_eq!(a.unwrap().plan.presentation_order.len(), 6);
    assert_eq!(b.unwrap().plan.presentation_order.len(), 4);
}
