use tracing::debug;

use crate::editing::commands::{find_line_start, get_line_at};
use crate::editing::{Cmd, Document, Patch};
use crate::syntax::classify::{LineClass, classify_line};

/// Result of intercepting the Enter key.
///
/// `NotHandled` means the line is not a list/task line and the host should
/// fall through to its default newline insertion.
#[derive(Debug, Clone, PartialEq)]
pub enum EnterOutcome {
    Handled(Patch),
    NotHandled,
}

/// Intercept the Enter key at the current cursor position.
///
/// Classifies the current line once, then either:
/// - continues a non-empty task/bullet/numbered item with a fresh marker on
///   a new line (tasks always restart at pending, numbered items increment
///   the current line's own number; whole-list renumbering is out of scope),
/// - deletes an empty marker line together with its preceding newline,
///   exiting the list, or
/// - declines to handle a plain line.
///
/// One-shot: runs synchronously before default key handling and fully owns
/// the keystroke when it matches.
pub fn handle_enter(doc: &mut Document) -> EnterOutcome {
    let cursor = doc.selection().start;
    let line_start = find_line_start(doc, cursor);
    let line = get_line_at(doc, line_start);
    let class = classify_line(&line);

    match class {
        LineClass::Plain => EnterOutcome::NotHandled,
        class if class.is_empty_item() => {
            // Remove the empty marker line and its preceding newline; at the
            // start of the buffer there is no preceding newline to remove
            let delete_from = line_start.saturating_sub(1);
            debug!(delete_from, cursor, "exiting list at empty item");

            let patch = doc.apply(Cmd::DeleteRange {
                range: delete_from..cursor,
            });
            EnterOutcome::Handled(patch)
        }
        LineClass::Task { indent, .. } => {
            // New task is always pending, whatever the continued line's status
            let text = format!("\n{indent}- [ ] ");
            EnterOutcome::Handled(insert_continuation(doc, cursor, text))
        }
        LineClass::Bullet { indent, marker, .. } => {
            let text = format!("\n{indent}{marker} ");
            EnterOutcome::Handled(insert_continuation(doc, cursor, text))
        }
        LineClass::Numbered { indent, number, .. } => {
            let text = format!("\n{indent}{}. ", number + 1);
            EnterOutcome::Handled(insert_continuation(doc, cursor, text))
        }
    }
}

fn insert_continuation(doc: &mut Document, cursor: usize, text: String) -> Patch {
    debug!(cursor, inserted = %text.escape_debug(), "continuing list item");
    // Cursor was at the insertion point, so the selection transform lands it
    // at the end of the inserted continuation text
    doc.apply(Cmd::InsertText { at: cursor, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_cursor(text: &str, cursor: usize) -> Document {
        let mut doc = Document::from_bytes(text.as_bytes()).unwrap();
        doc.set_selection(cursor..cursor);
        doc
    }

    // ============ Task continuation tests ============

    #[test]
    fn test_enter_continues_task_with_pending_status() {
        let mut doc = doc_with_cursor("- [x] Done", 10);

        let outcome = handle_enter(&mut doc);

        assert!(matches!(outcome, EnterOutcome::Handled(_)));
        assert_eq!(doc.text(), "- [x] Done\n- [ ] ");
        assert_eq!(doc.selection(), 17..17);
    }

    #[test]
    fn test_enter_continues_deferred_task_as_pending() {
        let mut doc = doc_with_cursor("- [>] Later", 11);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "- [>] Later\n- [ ] ");
    }

    #[test]
    fn test_enter_continues_indented_task() {
        let mut doc = doc_with_cursor("  - [ ] Indented", 16);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "  - [ ] Indented\n  - [ ] ");
    }

    // ============ Empty item exit tests ============

    #[test]
    fn test_enter_on_empty_task_clears_buffer() {
        let mut doc = doc_with_cursor("- [ ] ", 6);

        let outcome = handle_enter(&mut doc);

        assert!(matches!(outcome, EnterOutcome::Handled(_)));
        assert_eq!(doc.text(), "");
        assert_eq!(doc.selection(), 0..0);
    }

    #[test]
    fn test_enter_on_empty_task_after_content_removes_line_and_newline() {
        let mut doc = doc_with_cursor("- [x] Done\n- [ ] ", 17);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "- [x] Done");
        assert_eq!(doc.selection(), 10..10);
    }

    #[test]
    fn test_empty_item_exit_patch_reports_deletion_site() {
        let mut doc = doc_with_cursor("- [x] Done\n- [ ] ", 17);

        let outcome = handle_enter(&mut doc);

        // The host invalidates decorations from `changed`; the exit edit is
        // a pure deletion and must still show up there
        match outcome {
            EnterOutcome::Handled(patch) => assert_eq!(patch.changed, vec![10..10]),
            other => panic!("Expected handled outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_enter_on_empty_bullet_exits_list() {
        let mut doc = doc_with_cursor("- item\n- ", 9);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "- item");
    }

    #[test]
    fn test_enter_on_empty_numbered_exits_list() {
        let mut doc = doc_with_cursor("1. one\n2. ", 10);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "1. one");
    }

    // ============ Bullet continuation tests ============

    #[test]
    fn test_enter_continues_bullet_preserving_marker() {
        for marker in ['-', '*', '+'] {
            let text = format!("{marker} item");
            let mut doc = doc_with_cursor(&text, text.len());

            handle_enter(&mut doc);

            assert_eq!(doc.text(), format!("{marker} item\n{marker} "));
        }
    }

    #[test]
    fn test_enter_continues_nested_bullet_with_combined_indent() {
        let mut doc = doc_with_cursor("-   - Child", 11);

        handle_enter(&mut doc);

        // Parent marker + spaces reproduced exactly: `-   - ` prefix
        assert_eq!(doc.text(), "-   - Child\n-   - ");
    }

    #[test]
    fn test_enter_continues_indented_bullet() {
        let mut doc = doc_with_cursor("    - deep", 10);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "    - deep\n    - ");
    }

    // ============ Numbered continuation tests ============

    #[test]
    fn test_enter_increments_numbered_item() {
        let mut doc = doc_with_cursor("3. third", 8);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "3. third\n4. ");
    }

    #[test]
    fn test_enter_increments_from_current_line_not_list_count() {
        // Renumbering consistency across the list is explicitly out of
        // scope; the new number comes from the continued line alone
        let mut doc = doc_with_cursor("1. one\n5. five", 14);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "1. one\n5. five\n6. ");
    }

    // ============ Fallthrough tests ============

    #[test]
    fn test_enter_on_plain_line_not_handled() {
        let mut doc = doc_with_cursor("just some prose", 15);

        let outcome = handle_enter(&mut doc);

        assert_eq!(outcome, EnterOutcome::NotHandled);
        assert_eq!(doc.text(), "just some prose");
    }

    #[test]
    fn test_enter_mid_line_inserts_at_cursor() {
        let mut doc = doc_with_cursor("- [ ] buy milk", 9);

        handle_enter(&mut doc);

        // Continuation is inserted at the cursor, splitting the content
        assert_eq!(doc.text(), "- [ ] buy\n- [ ]  milk");
        assert_eq!(doc.selection(), 16..16);
    }

    #[test]
    fn test_enter_on_middle_line_of_list() {
        let mut doc = doc_with_cursor("- one\n- two\n- three", 11);

        handle_enter(&mut doc);

        assert_eq!(doc.text(), "- one\n- two\n- \n- three");
        assert_eq!(doc.selection(), 14..14);
    }
}
