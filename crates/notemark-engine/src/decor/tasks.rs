use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

use crate::decor::{DecorationInstruction, Effect, WidgetDescriptor, normalize};
use crate::syntax::scan::line_spans;

/// Task status, a closed ring.
///
/// Toggling a checkbox always advances exactly one step along the fixed
/// cycle `Pending -> Done -> Deferred -> Cancelled -> Pending`, never
/// directly between arbitrary states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Done,
    Deferred,
    Cancelled,
}

impl TaskStatus {
    /// The single character written between the brackets
    pub fn glyph(self) -> char {
        match self {
            TaskStatus::Pending => ' ',
            TaskStatus::Done => 'x',
            TaskStatus::Deferred => '>',
            TaskStatus::Cancelled => '-',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            ' ' => Some(TaskStatus::Pending),
            'x' => Some(TaskStatus::Done),
            '>' => Some(TaskStatus::Deferred),
            '-' => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// Successor in the fixed ring
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Deferred,
            TaskStatus::Deferred => TaskStatus::Cancelled,
            TaskStatus::Cancelled => TaskStatus::Pending,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
            TaskStatus::Deferred => "deferred",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

/// A task marker found at the start of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMatch {
    /// Span of the whole matched marker text, `-` through `]`
    pub marker_span: Range<usize>,
    /// Byte offset of the status glyph inside the marker
    pub glyph_at: usize,
    pub status: TaskStatus,
    /// 1-based line number
    pub line: usize,
}

fn task_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Dash markers only, anchored at line start; nesting depth >= 1
    RE.get_or_init(|| Regex::new(r"^-(?:\s+-)*\s+\[([ x>-])\]").expect("Invalid task marker regex"))
}

/// Scan every line of the buffer for task markers.
///
/// This is deliberately an independent scan rather than a reuse of the line
/// classifier, so the checkbox renderer can evolve its own pattern in
/// isolation.
pub fn find_task_lines(text: &str) -> Vec<TaskMatch> {
    let mut matches = Vec::new();

    for (idx, (start, end)) in line_spans(text).into_iter().enumerate() {
        let line = &text[start..end];
        if let Some(caps) = task_marker_regex().captures(line) {
            let full = caps.get(0).expect("task marker match");
            let glyph_match = caps.get(1).expect("task glyph group");
            let glyph = glyph_match.as_str().chars().next().unwrap_or(' ');

            if let Some(status) = TaskStatus::from_glyph(glyph) {
                matches.push(TaskMatch {
                    marker_span: start + full.start()..start + full.end(),
                    glyph_at: start + glyph_match.start(),
                    status,
                    line: idx + 1,
                });
            }
        }
    }

    matches
}

/// Decorations for every task line: one checkbox widget placed immediately
/// before the marker, plus a conceal over the raw marker text.
///
/// The marker is concealed, not removed from the rendered flow, so the raw
/// markdown stays in the model for editing and undo and remains a valid
/// click/selection target underneath the widget.
pub fn task_decorations(text: &str) -> Vec<DecorationInstruction> {
    let mut out = Vec::new();

    for task in find_task_lines(text) {
        out.push(DecorationInstruction {
            span: task.marker_span.start..task.marker_span.start,
            effect: Effect::Widget(WidgetDescriptor::Checkbox {
                status: task.status,
                glyph_at: task.glyph_at,
            }),
        });
        out.push(DecorationInstruction {
            span: task.marker_span.clone(),
            effect: Effect::Conceal,
        });
    }

    normalize(out)
}
