use crate::ansi::{decode_ansi_colors, escape_html};

/// Terminal error payload reported by the execution server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMessage {
    Plain(String),
    Entries(Vec<ErrorEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub category: String,
    pub name: String,
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Text(String),
    SourceQuote(Vec<SourceLine>),
}

impl MessagePart {
    /// Build a source quote ordered by line number.
    ///
    /// Numeric line labels sort numerically; anything else keeps its
    /// relative order after them.
    pub fn source_quote(lines: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut lines: Vec<SourceLine> = lines
            .into_iter()
            .map(|(number, text)| SourceLine { number, text })
            .collect();
        lines.sort_by_key(|line| line.number.trim().parse::<u64>().unwrap_or(u64::MAX));
        MessagePart::SourceQuote(lines)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: String,
    pub text: String,
}

/// Rendered form of an [`ErrorMessage`]: an `Error` header and one block per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub blocks: Vec<ErrorBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    pub classes: Vec<String>,
    pub parts: Vec<BlockPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockPart {
    /// ANSI-decoded, HTML-escaped text.
    Text(String),
    SourceTable(Vec<SourceLine>),
}

impl ErrorView {
    pub fn from_message(message: &ErrorMessage) -> Self {
        let blocks = match message {
            ErrorMessage::Plain(text) => vec![ErrorBlock {
                classes: Vec::new(),
                parts: vec![BlockPart::Text(decode_ansi_colors(text))],
            }],
            ErrorMessage::Entries(entries) => entries.iter().map(render_entry).collect(),
        };
        Self { blocks }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"error\"><h3>Error</h3>");
        for block in &self.blocks {
            if block.classes.is_empty() {
                html.push_str("<div class=\"message\">");
            } else {
                html.push_str("<div class=\"message ");
                html.push_str(&block.classes.join(" "));
                html.push_str("\">");
            }
            for part in &block.parts {
                match part {
                    BlockPart::Text(text) => {
                        html.push_str("<div class=\"text\">");
                        html.push_str(text);
                        html.push_str("</div>");
                    }
                    BlockPart::SourceTable(lines) => push_source_table(&mut html, lines),
                }
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}

fn render_entry(entry: &ErrorEntry) -> ErrorBlock {
    let classes = [&entry.category, &entry.name]
        .into_iter()
        .flat_map(|value| value.split_whitespace())
        .map(escape_html)
        .collect();
    let parts = entry
        .parts
        .iter()
        .map(|part| match part {
            MessagePart::Text(text) => BlockPart::Text(decode_ansi_colors(text)),
            MessagePart::SourceQuote(lines) => BlockPart::SourceTable(lines.clone()),
        })
        .collect();
    ErrorBlock { classes, parts }
}

fn push_source_table(html: &mut String, lines: &[SourceLine]) {
    html.push_str("<table class=\"source\">");
    for line in lines {
        html.push_str("<tr><td class=\"line-number\">");
        html.push_str(&escape_html(&line.number));
        html.push_str("</td><td class=\"line\">");
        html.push_str(&escape_html(&line.text));
        html.push_str("</td></tr>");
    }
    html.push_str("</table>");
}
