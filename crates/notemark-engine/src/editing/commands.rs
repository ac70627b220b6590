use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::decor::tasks::TaskStatus;
use crate::editing::Document;

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: std::ops::Range<usize>,
    },
    ReplaceRange {
        range: std::ops::Range<usize>,
        text: String,
    },
    /// Advance the task status glyph at the given byte offset one step along
    /// the fixed ring `' ' -> 'x' -> '>' -> '-' -> ' '`. Emitted by the
    /// checkbox widget as an abstract intent; compilation reads the current
    /// glyph from the buffer so the widget never closes over editor state.
    ToggleTaskAt {
        at: usize,
    },
}

/// Compile a command into a delta
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Delta<RopeInfo> {
    match cmd {
        Cmd::InsertText { at, text } => {
            let mut builder = Builder::new(doc.len());
            builder.replace(*at..*at, Rope::from(text));
            builder.build()
        }
        Cmd::DeleteRange { range } => {
            let mut builder = Builder::new(doc.len());
            builder.delete(range.clone());
            builder.build()
        }
        Cmd::ReplaceRange { range, text } => {
            let mut builder = Builder::new(doc.len());
            builder.replace(range.clone(), Rope::from(text));
            builder.build()
        }
        Cmd::ToggleTaskAt { at } => {
            let mut builder = Builder::new(doc.len());

            // Read the glyph currently in the buffer; a non-glyph byte means
            // the offset is stale and the toggle compiles to an identity delta
            let glyph = doc.slice_to_cow(*at..*at + 1).chars().next();
            if let Some(status) = glyph.and_then(TaskStatus::from_glyph) {
                let next = status.next().glyph().to_string();
                builder.replace(*at..*at + 1, Rope::from(next));
            }

            builder.build()
        }
    }
}

/// Transform selection based on the command being applied
pub(crate) fn transform_selection_for_command(
    _doc: &Document,
    range: &std::ops::Range<usize>,
    cmd: &Cmd,
) -> std::ops::Range<usize> {
    match cmd {
        Cmd::InsertText { at, text } => {
            let text_len = text.len();
            if *at <= range.start {
                // Insertion before or at selection start - shift right
                (range.start + text_len)..(range.end + text_len)
            } else if *at < range.end {
                // Insertion is within selection - grow the end
                range.start..(range.end + text_len)
            } else {
                // Insertion is after selection - no change
                range.clone()
            }
        }
        Cmd::DeleteRange { range: del_range } => {
            let del_len = del_range.len();
            if del_range.end <= range.start {
                // Deletion is completely before selection - shift left
                (range.start - del_len)..(range.end - del_len)
            } else if del_range.start >= range.end {
                // Deletion is completely after selection - no change
                range.clone()
            } else {
                // Deletion overlaps with selection - collapse to deletion point
                let collapse_point = del_range.start;
                collapse_point..collapse_point
            }
        }
        Cmd::ReplaceRange {
            range: replace_range,
            text,
        } => {
            let del_len = replace_range.len();
            let insert_len = text.len();

            if replace_range.end <= range.start {
                // Replacement is before selection - shift by net change
                let net_change = insert_len as i64 - del_len as i64;
                if net_change >= 0 {
                    let shift = net_change as usize;
                    (range.start + shift)..(range.end + shift)
                } else {
                    let shift = (-net_change) as usize;
                    (range.start.saturating_sub(shift))..(range.end.saturating_sub(shift))
                }
            } else if replace_range.start >= range.end {
                // Replacement is after selection - no change
                range.clone()
            } else {
                // Replacement overlaps selection - keep selection unchanged
                range.clone()
            }
        }
        Cmd::ToggleTaskAt { .. } => {
            // Single-byte replacement, lengths match - no change
            range.clone()
        }
    }
}

/// Find the start of the line containing the given offset
pub(crate) fn find_line_start(doc: &Document, offset: usize) -> usize {
    let text = doc.slice_to_cow(0..offset);
    if let Some(newline_pos) = text.rfind('\n') {
        newline_pos + 1
    } else {
        0
    }
}

/// Get the text of the line starting at the given offset
pub(crate) fn get_line_at(doc: &Document, line_start: usize) -> String {
    let text = doc.slice_to_cow(line_start..doc.len());
    if let Some(newline_pos) = text.find('\n') {
        text[..newline_pos].to_string()
    } else {
        text.to_string()
    }
}
