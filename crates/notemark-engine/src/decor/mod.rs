/*!
 * Decoration synthesis: turning scanned markdown elements and task lines
 * into render-layer instructions.
 *
 * A decoration never mutates the buffer; it hides, restyles, or injects a
 * widget over a byte span for rendering only. The rendering layer rejects
 * unsorted or boundary-ambiguous sets, so ordering lives in one dedicated
 * [`normalize`]/[`validate`] step instead of emit-order discipline scattered
 * across branches.
 */

use std::ops::Range;
use thiserror::Error;

use crate::decor::tasks::TaskStatus;
use crate::tags::Tag;

pub mod synthesize;
pub mod tasks;

/// Styling tag attached to an element's content span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Bold,
    Italic,
    Code,
    Heading(u8),
    Link,
    CodeBlock,
}

/// Opaque leaf widget handed to the host for placement
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetDescriptor {
    /// Interactive checkbox rendered in place of a task marker. Clicking it
    /// emits `Cmd::ToggleTaskAt { at: glyph_at }`.
    Checkbox { status: TaskStatus, glyph_at: usize },
    /// Tag autocomplete popup anchored at the trigger position
    TagMenu { tags: Vec<Tag> },
}

/// What a decoration does to its span.
///
/// `Hide` removes the span from the rendered flow entirely (emphasis and
/// link markers). `Conceal` only visually suppresses the text, leaving it in
/// the document flow so it stays clickable and selectable (task markers sit
/// underneath their checkbox widget). The asymmetry is deliberate: unifying
/// them would change undo and click-target behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Hide,
    Conceal,
    Mark(MarkKind),
    Widget(WidgetDescriptor),
}

impl Effect {
    /// Tie-break rank for instructions opening at the same offset: widgets
    /// render before the text they annotate, replace-type hides before marks
    fn rank(&self) -> u8 {
        match self {
            Effect::Widget(_) => 0,
            Effect::Hide => 1,
            Effect::Conceal => 2,
            Effect::Mark(_) => 3,
        }
    }

    fn is_replacing(&self) -> bool {
        matches!(self, Effect::Hide)
    }
}

/// One visual instruction over a byte span
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationInstruction {
    pub span: Range<usize>,
    pub effect: Effect,
}

#[derive(Debug, Error, PartialEq)]
pub enum DecorationError {
    #[error("decoration set not sorted at index {0}")]
    Unsorted(usize),
    #[error("conflicting replace/mark decorations open at byte {0}")]
    ConflictingBoundary(usize),
}

/// Stable-sort instructions by `(start, end, rank)`.
///
/// Every synthesized set passes through here before being handed to the
/// rendering layer.
pub fn normalize(mut instructions: Vec<DecorationInstruction>) -> Vec<DecorationInstruction> {
    instructions.sort_by(|a, b| {
        (a.span.start, a.span.end, a.effect.rank()).cmp(&(
            b.span.start,
            b.span.end,
            b.effect.rank(),
        ))
    });
    instructions
}

/// Check the ordering invariant the rendering layer demands: ascending
/// `(start, end)` order, and no replace-type hide opening at the same offset
/// as a styled mark.
pub fn validate(instructions: &[DecorationInstruction]) -> Result<(), DecorationError> {
    for (i, pair) in instructions.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        if (b.span.start, b.span.end) < (a.span.start, a.span.end) {
            return Err(DecorationError::Unsorted(i + 1));
        }
    }
    for (i, a) in instructions.iter().enumerate() {
        if !a.effect.is_replacing() {
            continue;
        }
        let conflict = instructions
            .iter()
            .enumerate()
            .any(|(j, b)| j != i && b.span.start == a.span.start && matches!(b.effect, Effect::Mark(_)));
        if conflict {
            return Err(DecorationError::ConflictingBoundary(a.span.start));
        }
    }
    Ok(())
}
