use std::ops::Range;

use crate::decor::{DecorationInstruction, Effect, MarkKind, normalize};
use crate::syntax::scan::{ElementKind, MarkdownElement, line_number_at};

/// Decide per element whether to reveal raw markdown or hide-and-style.
///
/// Pure function of `(elements, cursor, viewport)` over the scanned text:
/// identical inputs yield byte-identical instruction sets. An element is
/// "co-located" with the cursor when the raw markdown should show
/// unprocessed - for code blocks that means the cursor offset lies inside
/// the block span (inclusive of both fences), for everything else that the
/// cursor sits on the element's line. Co-located elements emit nothing;
/// all others emit a style mark over their content and hides over their
/// marker spans.
///
/// Any document, selection, or viewport change invalidates the whole
/// previous set; callers recompute rather than diff.
pub fn synthesize(
    elements: &[MarkdownElement],
    text: &str,
    cursor: usize,
    viewport: Option<Range<usize>>,
) -> Vec<DecorationInstruction> {
    let cursor_line = line_number_at(text, cursor);
    let mut out = Vec::new();

    for element in elements {
        if let Some(vp) = &viewport {
            let visible = element.span.start < vp.end && vp.start < element.span.end;
            if !visible {
                continue;
            }
        }

        let co_located = match element.kind {
            ElementKind::CodeBlock => {
                element.span.start <= cursor && cursor <= element.span.end
            }
            _ => element.line == cursor_line,
        };
        if co_located {
            continue;
        }

        // A degenerate content span (e.g. `[](url)`) emits no mark; it would
        // open at the same offset as the closing-marker hide
        if !element.content_span.is_empty() {
            out.push(DecorationInstruction {
                span: element.content_span.clone(),
                effect: Effect::Mark(mark_kind(element)),
            });
        }
        // Links get two separate hides so the label stays visible between
        // them; symmetric kinds likewise hide each delimiter on its own
        for marker in &element.marker_spans {
            out.push(DecorationInstruction {
                span: marker.clone(),
                effect: Effect::Hide,
            });
        }
    }

    normalize(out)
}

fn mark_kind(element: &MarkdownElement) -> MarkKind {
    match element.kind {
        ElementKind::Bold => MarkKind::Bold,
        ElementKind::Italic => MarkKind::Italic,
        ElementKind::Code => MarkKind::Code,
        ElementKind::Heading => MarkKind::Heading(element.level.unwrap_or(1)),
        ElementKind::Link => MarkKind::Link,
        ElementKind::CodeBlock => MarkKind::CodeBlock,
    }
}
