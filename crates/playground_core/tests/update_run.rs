use std::time::Duration;

use playground_core::{
    update, AppState, EditorCommand, Effect, ErrorEntry, ErrorMessage, JobId, MessagePart, Msg,
    OutputTone, PollStatus, RunPhase, POLL_INTERVAL,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    playground_logging::initialize_for_tests();
}

fn start_run(state: AppState, code: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::EditorChanged(code.to_string()));
    update(state, Msg::CommandInvoked(EditorCommand::Run))
}

fn poll(state: AppState, generation: u64, job: &str, status: PollStatus) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::PollCompleted {
            generation,
            job_id: JobId::new(job),
            status,
        },
    )
}

fn running(output: &str) -> PollStatus {
    PollStatus::Running {
        output: Some(output.to_string()),
    }
}

#[test]
fn run_submits_editor_text_and_disables_submit() {
    init_logging();
    let (mut state, effects) = start_run(AppState::new(), "print(1)");

    assert_eq!(
        effects,
        vec![Effect::StartRun {
            generation: 1,
            code: "print(1)".to_string(),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, RunPhase::Submitted);
    assert!(!view.submit_enabled);
    assert!(state.consume_dirty());
}

#[test]
fn print_one_scenario_ends_with_success() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "print(1)");
    let (state, effects) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("7"),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            generation: 1,
            job_id: JobId::new("7"),
            delay: POLL_INTERVAL,
        }]
    );
    assert_eq!(state.phase(), RunPhase::Running);

    let (state, effects) = poll(state, 1, "7", running("1\n"));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().output, "1\n");

    let (state, effects) = poll(state, 1, "7", PollStatus::Done { output: None });
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.output, "1\n");
    assert_eq!(view.tone, OutputTone::Success);
    assert_eq!(view.phase, RunPhase::Completed);
    assert!(view.submit_enabled);
}

#[test]
fn output_is_concatenated_in_tick_order() {
    init_logging();
    let chunks = ["a", "bc", "", "d\n", "ef"];
    let (state, _) = start_run(AppState::new(), "code");
    let (mut state, _) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("1"),
        },
    );
    for chunk in chunks {
        let (next, effects) = poll(state, 1, "1", running(chunk));
        assert!(matches!(effects.as_slice(), [Effect::SchedulePoll { .. }]));
        state = next;
    }
    let (state, _) = poll(state, 1, "1", PollStatus::Done { output: None });

    assert_eq!(state.view().output, chunks.concat());
}

#[test]
fn final_done_chunk_is_appended() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "code");
    let (state, _) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("1"),
        },
    );
    let (state, _) = poll(state, 1, "1", running("x"));
    let (state, _) = poll(
        state,
        1,
        "1",
        PollStatus::Done {
            output: Some("y".to_string()),
        },
    );
    assert_eq!(state.view().output, "xy");
}

#[test]
fn execution_error_renders_structured_block_and_keeps_output() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "let x: Str = 1");
    let (state, _) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("3"),
        },
    );
    let (state, _) = poll(state, 1, "3", running("partial\n"));
    let message = ErrorMessage::Entries(vec![ErrorEntry {
        category: "type".to_string(),
        name: "mismatch".to_string(),
        parts: vec![
            MessagePart::Text("expected Int".to_string()),
            MessagePart::source_quote([("3".to_string(), "let x: Str = 1".to_string())]),
        ],
    }]);
    let (state, effects) = poll(state, 1, "3", PollStatus::Failed { message });

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, RunPhase::Failed);
    assert_eq!(view.tone, OutputTone::Failure);
    assert!(view.submit_enabled);
    let error = view.error.as_ref().expect("error view");
    assert_eq!(error.blocks.len(), 1);
    assert_eq!(error.blocks[0].parts.len(), 2);

    let html = view.output_html();
    assert!(html.starts_with("<pre class=\"stdout\">partial\n</pre>"));
    assert!(html.contains("<td class=\"line-number\">3</td>"));
}

#[test]
fn transport_failure_reenables_submit_and_shows_raw_text() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "code");
    let (state, effects) = update(
        state,
        Msg::TransportFailed {
            generation: 1,
            message: "Internal Server Error".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.submit_enabled);
    assert_eq!(view.tone, OutputTone::Failure);
    assert_eq!(view.transport_error.as_deref(), Some("Internal Server Error"));
    assert!(view
        .output_html()
        .contains("<div class=\"transport-error\">Internal Server Error</div>"));
}

#[test]
fn new_run_supersedes_inflight_poll() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "first");
    let (state, _) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("10"),
        },
    );
    let (state, _) = poll(state, 1, "10", running("old "));

    let (state, effects) = start_run(state, "second");
    assert_eq!(
        effects,
        vec![
            Effect::CancelRun { generation: 1 },
            Effect::StartRun {
                generation: 2,
                code: "second".to_string(),
            },
        ]
    );
    assert_eq!(state.view().output, "");

    // Late results from the first run are ignored.
    let before = state.view();
    let (state, effects) = poll(state, 1, "10", running("stale"));
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
    let (state, effects) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("10"),
        },
    );
    assert!(effects.is_empty());
    let (state, _) = update(
        state,
        Msg::TransportFailed {
            generation: 1,
            message: "late".to_string(),
        },
    );
    assert_eq!(state.view().transport_error, None);
    assert_eq!(state.phase(), RunPhase::Submitted);
}

#[test]
fn poll_for_unknown_job_is_ignored() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "code");
    let (state, _) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("1"),
        },
    );
    let (state, effects) = poll(state, 1, "2", running("nope"));
    assert!(effects.is_empty());
    assert_eq!(state.view().output, "");
}

#[test]
fn results_after_completion_are_ignored() {
    init_logging();
    let (state, _) = start_run(AppState::new(), "code");
    let (state, _) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("1"),
        },
    );
    let (state, _) = poll(state, 1, "1", PollStatus::Done { output: Some("ok".into()) });
    let (state, effects) = poll(state, 1, "1", running("more"));

    assert!(effects.is_empty());
    assert_eq!(state.view().output, "ok");
    assert_eq!(state.phase(), RunPhase::Completed);
}

#[test]
fn configured_poll_interval_is_used() {
    init_logging();
    let interval = Duration::from_millis(40);
    let (state, _) = start_run(AppState::new().with_poll_interval(interval), "code");
    let (_, effects) = update(
        state,
        Msg::RunStarted {
            generation: 1,
            job_id: JobId::new("1"),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            generation: 1,
            job_id: JobId::new("1"),
            delay: interval,
        }]
    );
}
