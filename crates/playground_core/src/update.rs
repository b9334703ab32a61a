use crate::{save_filename, AppState, EditorCommand, Effect, Msg, PollStatus, RunPhase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::EditorChanged(text) => {
            state.set_editor_text(text);
            Vec::new()
        }
        Msg::KeyPressed(chord) => {
            let command = state.keymap().resolve(state.platform(), &chord);
            match command {
                Some(command) => run_command(&mut state, command),
                None => Vec::new(),
            }
        }
        Msg::CommandInvoked(command) => run_command(&mut state, command),
        Msg::ExampleSelected(value) => {
            let value = value.trim();
            if value.is_empty() {
                Vec::new()
            } else {
                vec![Effect::Navigate {
                    path: format!("/{}", value.trim_start_matches('/')),
                }]
            }
        }
        Msg::ViewportResized { width } => {
            state.set_viewport_width(width);
            Vec::new()
        }
        Msg::RunStarted { generation, job_id } => {
            // A superseded run may still report its job id; only the current one counts.
            if !state.is_current(generation) || state.phase() != RunPhase::Submitted {
                return (state, Vec::new());
            }
            state.mark_started(job_id.clone());
            vec![Effect::SchedulePoll {
                generation,
                job_id,
                delay: state.poll_interval(),
            }]
        }
        Msg::PollCompleted {
            generation,
            job_id,
            status,
        } => {
            if !state.is_polling(generation, &job_id) {
                return (state, Vec::new());
            }
            match status {
                PollStatus::Running { output } => {
                    state.append_output(output);
                    vec![Effect::SchedulePoll {
                        generation,
                        job_id,
                        delay: state.poll_interval(),
                    }]
                }
                PollStatus::Done { output } => {
                    state.append_output(output);
                    state.complete();
                    Vec::new()
                }
                PollStatus::Failed { message } => {
                    state.fail_execution(&message);
                    Vec::new()
                }
            }
        }
        Msg::TransportFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) {
                state.fail_transport(message);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn run_command(state: &mut AppState, command: EditorCommand) -> Vec<Effect> {
    match command {
        EditorCommand::Run => {
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = state.active_generation() {
                effects.push(Effect::CancelRun {
                    generation: previous,
                });
            }
            let generation = state.begin_run();
            effects.push(Effect::StartRun {
                generation,
                code: state.editor().get_value().to_owned(),
            });
            effects
        }
        EditorCommand::Save => vec![Effect::SaveFile {
            filename: save_filename(state.file_extension()),
            contents: state.editor().get_value().to_owned(),
        }],
    }
}
