//! Message rendering for the central chat panel.
//!
//! Bot turns carry sanitized HTML limited to a small tag subset (`a`,
//! `strong`, `em`, `code`, `b`, `i`, `br`). `html_segments` turns that into
//! styled rich-text runs and real hyperlinks; user turns are plain text and
//! rendered as-is.

use eframe::egui;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::state::ChatState;
use crate::transcript::{ChatTurn, Role};
use crate::ui::theme::{msg_colors, role_color};

/// One styled run of a rendered bot message
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link { href: String, label: String },
    Break,
}

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<br\s*/?>").unwrap());
static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?s)<a\b[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)<(?:strong|b)\b[^>]*>(.*?)</(?:strong|b)>").unwrap());
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)<(?:em|i)\b[^>]*>(.*?)</(?:em|i)>").unwrap());
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)<code\b[^>]*>(.*?)</code>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Undo `sanitize::escape_html`. `&amp;` must be restored last so entity
/// names inside the text are not decoded twice.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn flatten(markup: &str) -> String {
    unescape_entities(&TAG_RE.replace_all(markup, ""))
}

/// Split a sanitized HTML string into renderable segments. A stray `<` that
/// opens no recognized tag is kept as literal text; nothing is dropped.
pub fn html_segments(html: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        match rest.find('<') {
            None => {
                segments.push(Segment::Text(unescape_entities(rest)));
                break;
            }
            Some(0) => {
                if let Some(m) = BR_RE.find(rest) {
                    segments.push(Segment::Break);
                    rest = &rest[m.end()..];
                } else if let Some(caps) = ANCHOR_RE.captures(rest) {
                    segments.push(Segment::Link {
                        href: caps[1].to_string(),
                        label: flatten(&caps[2]),
                    });
                    rest = &rest[caps.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
                } else if let Some(caps) = BOLD_RE.captures(rest) {
                    segments.push(Segment::Bold(flatten(&caps[1])));
                    rest = &rest[caps.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
                } else if let Some(caps) = ITALIC_RE.captures(rest) {
                    segments.push(Segment::Italic(flatten(&caps[1])));
                    rest = &rest[caps.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
                } else if let Some(caps) = CODE_RE.captures(rest) {
                    segments.push(Segment::Code(flatten(&caps[1])));
                    rest = &rest[caps.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
                } else {
                    segments.push(Segment::Text("<".to_string()));
                    rest = &rest[1..];
                }
            }
            Some(idx) => {
                segments.push(Segment::Text(unescape_entities(&rest[..idx])));
                rest = &rest[idx..];
            }
        }
    }

    segments
}

/// Render the transcript: welcome bubble, turns, typing indicator.
pub fn render_transcript(ui: &mut egui::Ui, state: &ChatState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 4.0;

            render_welcome(ui, state);
            for turn in &state.session.transcript.turns {
                render_turn(ui, turn);
            }

            if state.awaiting_reply {
                ui.label(
                    egui::RichText::new("Assistant is typing...")
                        .color(msg_colors::TYPING)
                        .italics(),
                );
            }
        });
}

fn render_welcome(ui: &mut egui::Ui, state: &ChatState) {
    ui.horizontal_wrapped(|ui| {
        ui.label(
            egui::RichText::new(format!("[{}]", state.welcome_time))
                .color(msg_colors::TIMESTAMP),
        );
        ui.label(
            egui::RichText::new("Assistant:")
                .color(role_color(Role::Bot))
                .strong(),
        );
        ui.label("Hi! Ask me anything, or pick one of the suggestions below.");
    });
}

/// Render a single turn: header row, then the content lines.
fn render_turn(ui: &mut egui::Ui, turn: &ChatTurn) {
    let sender = match turn.role {
        Role::User => "You:",
        Role::Bot => "Assistant:",
    };
    ui.horizontal_wrapped(|ui| {
        ui.label(
            egui::RichText::new(format!("[{}]", turn.timestamp)).color(msg_colors::TIMESTAMP),
        );
        ui.label(
            egui::RichText::new(sender)
                .color(role_color(turn.role))
                .strong(),
        );
        match turn.role {
            // User input is displayed literally, never as markup
            Role::User => {
                ui.label(&turn.raw);
            }
            Role::Bot => {
                let segments = html_segments(&turn.rendered);
                render_first_line(ui, &segments);
            }
        }
    });
    // Continuation lines after <br> breaks, indented under the header
    if turn.role == Role::Bot {
        let segments = html_segments(&turn.rendered);
        for line in segments.split(|s| matches!(s, Segment::Break)).skip(1) {
            ui.horizontal_wrapped(|ui| {
                ui.add_space(16.0);
                for segment in line {
                    render_segment(ui, segment);
                }
            });
        }
    }
}

fn render_first_line(ui: &mut egui::Ui, segments: &[Segment]) {
    if let Some(line) = segments.split(|s| matches!(s, Segment::Break)).next() {
        for segment in line {
            render_segment(ui, segment);
        }
    }
}

fn render_segment(ui: &mut egui::Ui, segment: &Segment) {
    ui.spacing_mut().item_spacing.x = 0.0; // spaces live inside text runs
    match segment {
        Segment::Text(text) => {
            ui.label(text);
        }
        Segment::Bold(text) => {
            ui.label(egui::RichText::new(text).strong());
        }
        Segment::Italic(text) => {
            ui.label(egui::RichText::new(text).italics());
        }
        Segment::Code(text) => {
            ui.label(egui::RichText::new(text).monospace());
        }
        Segment::Link { href, label } => {
            ui.hyperlink_to(
                egui::RichText::new(label).color(msg_colors::LINK),
                href,
            );
        }
        Segment::Break => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::format_bot_html;

    #[test]
    fn test_segments_for_markdown_reply() {
        let html = format_bot_html("Check **this** out: https://example.com");
        let segments = html_segments(&html);
        assert_eq!(segments[0], Segment::Text("Check ".into()));
        assert_eq!(segments[1], Segment::Bold("this".into()));
        assert_eq!(segments[2], Segment::Text(" out: ".into()));
        assert_eq!(
            segments[3],
            Segment::Link {
                href: "https://example.com".into(),
                label: "https://example.com".into(),
            }
        );
    }

    #[test]
    fn test_segments_breaks_and_code() {
        let html = format_bot_html("run `cargo build`\nthen wait");
        let segments = html_segments(&html);
        assert!(segments.contains(&Segment::Code("cargo build".into())));
        assert!(segments.contains(&Segment::Break));
        assert_eq!(segments.last(), Some(&Segment::Text("then wait".into())));
    }

    #[test]
    fn test_segments_unescape_entities() {
        let html = format_bot_html("5 < 10 & 10 > 5");
        let segments = html_segments(&html);
        assert_eq!(segments, vec![Segment::Text("5 < 10 & 10 > 5".into())]);
    }

    #[test]
    fn test_stray_angle_bracket_is_literal() {
        let segments = html_segments("a < b");
        let joined: String = segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(joined, "a < b");
    }

    #[test]
    fn test_anchor_label_with_nested_markup_is_flattened() {
        let segments =
            html_segments(r#"<a href="https://x.dev"><em>docs</em></a>"#);
        assert_eq!(
            segments,
            vec![Segment::Link {
                href: "https://x.dev".into(),
                label: "docs".into(),
            }]
        );
    }
}
