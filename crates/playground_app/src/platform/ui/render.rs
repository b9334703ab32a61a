use playground_core::{AppViewModel, BlockPart, ErrorView, RunPhase};

/// What the terminal host should print after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Program output, written to stdout verbatim.
    WriteOutput(String),
    /// Error pane contents, written to stderr.
    ShowError(String),
    /// Phase change, written to stderr.
    ShowStatus(String),
}

/// Tracks what has already been printed so each render only emits the delta.
#[derive(Debug, Default)]
pub struct RenderCursor {
    printed: usize,
    phase: RunPhase,
    error_shown: bool,
}

pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<TerminalCommand> {
    let mut cmds = Vec::new();

    if view.phase != cursor.phase {
        if view.phase == RunPhase::Submitted {
            cursor.printed = 0;
            cursor.error_shown = false;
        }
        cursor.phase = view.phase;
        cmds.push(TerminalCommand::ShowStatus(phase_label(view).to_string()));
    }

    if view.output.len() < cursor.printed {
        cursor.printed = 0;
    }
    if let Some(fresh) = view.output.get(cursor.printed..) {
        if !fresh.is_empty() {
            cmds.push(TerminalCommand::WriteOutput(fresh.to_string()));
            cursor.printed = view.output.len();
        }
    }

    if !cursor.error_shown {
        let mut shown = false;
        if let Some(message) = &view.transport_error {
            cmds.push(TerminalCommand::ShowError(format!("request failed: {message}")));
            shown = true;
        }
        if let Some(error) = &view.error {
            cmds.push(TerminalCommand::ShowError(error_text(error)));
            shown = true;
        }
        cursor.error_shown = shown;
    }

    cmds
}

fn phase_label(view: &AppViewModel) -> &'static str {
    match view.phase {
        RunPhase::Idle => "idle",
        RunPhase::Submitted => "submitted",
        RunPhase::Running => "running",
        RunPhase::Completed => "completed",
        RunPhase::Failed => "failed",
    }
}

/// Plain-text form of the error pane: markup removed, entities restored,
/// source quotes printed as numbered lines.
pub fn error_text(error: &ErrorView) -> String {
    let mut text = String::from("Error");
    for block in &error.blocks {
        text.push('\n');
        if !block.classes.is_empty() {
            text.push('[');
            text.push_str(&unescape(&block.classes.join(" ")));
            text.push_str("] ");
        }
        for part in &block.parts {
            match part {
                BlockPart::Text(html) => text.push_str(&unescape(&strip_tags(html))),
                BlockPart::SourceTable(lines) => {
                    let width = lines.iter().map(|l| l.number.len()).max().unwrap_or(0);
                    for line in lines {
                        text.push_str(&format!(
                            "\n  {:>width$} | {}",
                            line.number,
                            line.text,
                            width = width
                        ));
                    }
                }
            }
        }
    }
    text
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
