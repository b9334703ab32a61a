//! Best-effort ANSI colour decoding for compiler diagnostics.
//!
//! Only the handful of SGR sequences the execution server emits are
//! recognized; anything else passes through verbatim.

const ESC: char = '\x1b';
const CLOSE_SPAN: &str = "</span>";

#[derive(Debug, Clone, Copy)]
enum SpanOp {
    Open(&'static str),
    /// Close the current span (if any) and open another.
    Replace(&'static str),
    Close,
}

// See https://en.wikipedia.org/wiki/ANSI_escape_code#Colors
const SEQUENCES: &[(&str, SpanOp)] = &[
    ("\x1b[31;1m", SpanOp::Open("bold red")),
    ("\x1b[97;1m", SpanOp::Open("bold")),
    ("\x1b[0;1;31m", SpanOp::Replace("bold red")),
    ("\x1b[0;1;34m", SpanOp::Replace("bold blue")),
    ("\x1b[0;1;37m", SpanOp::Replace("bold")),
    ("\x1b[0m", SpanOp::Close),
];

/// Convert recognized ANSI escapes to `<span class="...">` tags.
///
/// Text is HTML-escaped first. Open spans are tracked so the output is
/// always balanced: a reset with nothing open is dropped and spans left
/// open at the end are closed.
pub fn decode_ansi_colors(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut open = 0usize;
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if ch == ESC {
            if let Some((seq, op)) = SEQUENCES.iter().find(|(seq, _)| rest.starts_with(seq)) {
                apply(*op, &mut out, &mut open);
                rest = &rest[seq.len()..];
                continue;
            }
        }
        push_escaped(&mut out, ch);
        rest = &rest[ch.len_utf8()..];
    }

    for _ in 0..open {
        out.push_str(CLOSE_SPAN);
    }
    out
}

fn apply(op: SpanOp, out: &mut String, open: &mut usize) {
    match op {
        SpanOp::Open(class) => {
            push_open(out, class);
            *open += 1;
        }
        SpanOp::Replace(class) => {
            if *open > 0 {
                out.push_str(CLOSE_SPAN);
            } else {
                *open = 1;
            }
            push_open(out, class);
        }
        SpanOp::Close => {
            if *open > 0 {
                out.push_str(CLOSE_SPAN);
                *open -= 1;
            }
        }
    }
}

fn push_open(out: &mut String, class: &str) {
    out.push_str("<span class=\"");
    out.push_str(class);
    out.push_str("\">");
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_balanced(html: &str) -> bool {
        html.matches("<span").count() == html.matches(CLOSE_SPAN).count()
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(decode_ansi_colors("hello world"), "hello world");
    }

    #[test]
    fn markup_is_escaped() {
        assert_eq!(
            decode_ansi_colors("a < b && \"c\""),
            "a &lt; b &amp;&amp; &quot;c&quot;"
        );
    }

    #[test]
    fn recognized_codes_become_spans() {
        let decoded = decode_ansi_colors("\x1b[31;1merror:\x1b[0m bad");
        assert_eq!(decoded, "<span class=\"bold red\">error:</span> bad");
    }

    #[test]
    fn replace_codes_close_previous_span() {
        let decoded = decode_ansi_colors("\x1b[97;1mfile\x1b[0;1;31m error\x1b[0;1;34m note\x1b[0m");
        assert_eq!(
            decoded,
            "<span class=\"bold\">file</span><span class=\"bold red\"> error</span>\
             <span class=\"bold blue\"> note</span>"
        );
        assert!(spans_balanced(&decoded));
    }

    #[test]
    fn output_is_balanced_for_any_mix_of_recognized_codes() {
        let inputs = [
            "\x1b[0m stray reset",
            "\x1b[31;1m never closed",
            "\x1b[0;1;37m replace first",
            "\x1b[31;1m\x1b[97;1m nested \x1b[0m",
            "\x1b[0;1;31m\x1b[0;1;34m\x1b[0m\x1b[0m",
        ];
        for input in inputs {
            let decoded = decode_ansi_colors(input);
            assert!(spans_balanced(&decoded), "unbalanced output for {input:?}: {decoded}");
        }
    }

    #[test]
    fn unrecognized_codes_pass_through() {
        let decoded = decode_ansi_colors("\x1b[32mgreen\x1b[0m");
        assert_eq!(decoded, "\x1b[32mgreen");
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(decode_ansi_colors("\x1b[31;1mλ→\x1b[0m"), "<span class=\"bold red\">λ→</span>");
    }
}
