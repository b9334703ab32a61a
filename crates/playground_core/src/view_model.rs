use crate::{escape_html, EditorOptions, ErrorView, RunPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTone {
    #[default]
    Neutral,
    Success,
    Failure,
}

impl OutputTone {
    /// Background colour of the output pane.
    pub fn background(self) -> &'static str {
        match self {
            OutputTone::Neutral => "white",
            OutputTone::Success => "antiquewhite",
            OutputTone::Failure => "lightpink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: RunPhase,
    pub submit_enabled: bool,
    pub output: String,
    pub tone: OutputTone,
    pub error: Option<ErrorView>,
    pub transport_error: Option<String>,
    pub editor: EditorOptions,
    pub dirty: bool,
}

impl AppViewModel {
    /// HTML contents of the output pane: accumulated output, then any error.
    pub fn output_html(&self) -> String {
        let mut html = String::new();
        if !self.output.is_empty() {
            html.push_str("<pre class=\"stdout\">");
            html.push_str(&escape_html(&self.output));
            html.push_str("</pre>");
        }
        if let Some(message) = &self.transport_error {
            html.push_str("<div class=\"transport-error\">");
            html.push_str(&escape_html(message));
            html.push_str("</div>");
        }
        if let Some(error) = &self.error {
            html.push_str(&error.to_html());
        }
        html
    }
}
