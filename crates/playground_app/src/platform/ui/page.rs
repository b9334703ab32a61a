use playground_core::{escape_html, AppViewModel};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1em; }
#output { padding: 0.5em; border: 1px solid #ccc; }
pre.stdout { margin: 0; white-space: pre-wrap; }
.error h3 { margin: 0.5em 0; color: darkred; }
.error .text { white-space: pre-wrap; font-family: monospace; }
table.source { border-collapse: collapse; font-family: monospace; }
td.line-number { color: gray; padding-right: 1em; text-align: right; }
td.line { white-space: pre; }
.transport-error { color: darkred; }
span.bold { font-weight: bold; }
span.red { color: red; }
span.blue { color: blue; }
";

/// A standalone HTML page holding the editor source and the output pane.
pub fn render_page(view: &AppViewModel, source: &str) -> String {
    let editor = &view.editor;
    let editor_class = if editor.show_gutter {
        "editor gutter"
    } else {
        "editor"
    };

    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Playground</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!(
        "<pre class=\"{}\" data-theme=\"{}\" style=\"font-size: {}\">{}</pre>\n",
        editor_class,
        escape_html(&editor.theme),
        escape_html(&editor.font_size),
        escape_html(source)
    ));
    html.push_str(&format!(
        "<div id=\"output\" style=\"background-color: {}\">{}</div>\n",
        view.tone.background(),
        view.output_html()
    ));
    html.push_str("</body>\n</html>\n");
    html
}
