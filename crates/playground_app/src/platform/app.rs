use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use playground_client::{ClientHandle, ClientSettings};
use playground_core::{update, AppState, EditorCommand, Msg, RunPhase};
use playground_logging::{playground_info, playground_warn};

use super::cli::{Cli, Command};
use super::config::{self, PlaygroundConfig};
use super::effects::{EffectRunner, Inbox, Notice};
use super::logging;
use super::ui;

/// How long to wait for a client event before dispatching a render tick.
const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(
        cli.log,
        logging::level_for_verbosity(cli.verbose),
        &cli.log_file,
    );

    let mut config = config::load_config(cli.config.as_deref());
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    match cli.command {
        Command::Run {
            file,
            html,
            poll_ms,
        } => {
            if let Some(ms) = poll_ms {
                config.poll_interval_ms = ms;
            }
            run_file(&config, &file, html.as_deref())
        }
        Command::Save { file, dir } => {
            if let Some(dir) = dir {
                config.save_dir = dir;
            }
            save_file(&config, &file)
        }
        Command::Example { name } => show_example(&config, &name),
        Command::InitConfig { dir } => {
            let path = config::save_config(&dir, &config)
                .with_context(|| format!("writing configuration to {}", dir.display()))?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_file(
    config: &PlaygroundConfig,
    file: &Path,
    html: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let mut session = Session::connect(config)?;
    session.dispatch_msg(Msg::EditorChanged(source.clone()));
    session.dispatch_msg(Msg::CommandInvoked(EditorCommand::Run));
    let phase = session.wait_for_completion();

    if let Some(path) = html {
        let page = ui::page::render_page(&session.state.view(), &source);
        fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
        playground_info!("Wrote output page to {:?}", path);
    }

    Ok(match phase {
        RunPhase::Completed => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn save_file(config: &PlaygroundConfig, file: &Path) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let mut session = Session::new(config, EffectRunner::new(config.save_dir.clone()));
    session.dispatch_msg(Msg::EditorChanged(source));
    session.dispatch_msg(Msg::CommandInvoked(EditorCommand::Save));
    session.report_notices()
}

fn show_example(config: &PlaygroundConfig, name: &str) -> anyhow::Result<ExitCode> {
    let settings = server_settings(config)?;
    let runner = EffectRunner::new(config.save_dir.clone()).with_settings(settings);
    let mut session = Session::new(config, runner);
    session.dispatch_msg(Msg::ExampleSelected(name.to_string()));
    if session.notices.is_empty() {
        bail!("example name must not be empty");
    }
    session.report_notices()
}

fn read_source(file: &Path) -> anyhow::Result<String> {
    fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn server_settings(config: &PlaygroundConfig) -> anyhow::Result<ClientSettings> {
    config
        .client_settings()
        .with_context(|| format!("invalid server url {:?}", config.server_url))
}

/// The terminal host: owns the state, executes effects and prints renders.
struct Session {
    state: AppState,
    runner: EffectRunner,
    cursor: ui::render::RenderCursor,
    notices: Vec<Notice>,
    /// Longest silence from the client before the run is failed.
    stall_limit: Duration,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Session {
    fn connect(config: &PlaygroundConfig) -> anyhow::Result<Self> {
        let settings = server_settings(config)?;
        let handle = ClientHandle::new(settings.clone()).context("starting the http client")?;
        let runner = EffectRunner::new(config.save_dir.clone())
            .with_settings(settings)
            .with_handle(handle);
        Ok(Self::new(config, runner))
    }

    fn new(config: &PlaygroundConfig, runner: EffectRunner) -> Self {
        let state = AppState::new()
            .with_poll_interval(config.poll_interval())
            .with_file_extension(config.file_extension.clone())
            .with_editor_options(config.editor_options());
        let mut session = Self {
            state,
            runner,
            cursor: ui::render::RenderCursor::default(),
            notices: Vec::new(),
            stall_limit: config.request_timeout() + config.poll_interval() + TICK_INTERVAL,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        };
        session.dispatch_msg(Msg::ViewportResized {
            width: config.viewport_width,
        });
        session
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        for effect in effects {
            if let Some(notice) = self.runner.execute(effect) {
                self.notices.push(notice);
            }
        }
        if state.consume_dirty() {
            let view = state.view();
            let cmds = ui::render::render(&view, &mut self.cursor);
            self.print(cmds);
        }
        self.state = state;
    }

    /// Pump client events until the current run completes or fails.
    ///
    /// A client that goes silent for longer than `stall_limit`, or stops
    /// altogether, fails the run as a transport error.
    fn wait_for_completion(&mut self) -> RunPhase {
        let mut last_event = Instant::now();
        loop {
            match self.state.phase() {
                RunPhase::Completed | RunPhase::Failed => return self.state.phase(),
                RunPhase::Idle => {
                    playground_warn!("No run in progress");
                    return RunPhase::Idle;
                }
                RunPhase::Submitted | RunPhase::Running => {}
            }
            let msg = match self.runner.recv(TICK_INTERVAL) {
                Inbox::Msg(msg) => {
                    last_event = Instant::now();
                    msg
                }
                Inbox::Idle if last_event.elapsed() > self.stall_limit => Msg::TransportFailed {
                    generation: self.state.generation(),
                    message: format!("no response from server within {:?}", self.stall_limit),
                },
                Inbox::Idle => Msg::Tick,
                Inbox::Closed(message) => Msg::TransportFailed {
                    generation: self.state.generation(),
                    message,
                },
            };
            self.dispatch_msg(msg);
        }
    }

    fn report_notices(&mut self) -> anyhow::Result<ExitCode> {
        let mut code = ExitCode::SUCCESS;
        for notice in std::mem::take(&mut self.notices) {
            match notice {
                Notice::Saved(path) => writeln!(self.stdout, "{}", path.display())?,
                Notice::Navigate(url) => writeln!(self.stdout, "{url}")?,
                Notice::SaveFailed(message) | Notice::NavigateFailed(message) => {
                    writeln!(self.stderr, "error: {message}")?;
                    code = ExitCode::FAILURE;
                }
            }
        }
        Ok(code)
    }

    fn print(&mut self, cmds: Vec<ui::render::TerminalCommand>) {
        use ui::render::TerminalCommand;

        for cmd in cmds {
            let _ = match cmd {
                TerminalCommand::WriteOutput(text) => self.stdout.write_all(text.as_bytes()),
                TerminalCommand::ShowError(text) => writeln!(self.stderr, "{text}"),
                TerminalCommand::ShowStatus(label) => writeln!(self.stderr, "run {label}"),
            };
        }
        let _ = self.stdout.flush();
    }
}
