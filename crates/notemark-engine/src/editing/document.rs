use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::{Cmd, Patch};

/// Core document model: a single rope buffer plus the primary selection.
///
/// The buffer is the only shared resource in the engine. Every mutation goes
/// through [`Document::apply`] as a [`Cmd`] compiled to an xi-rope `Delta`,
/// so the buffer is always read-after-write consistent within one dispatched
/// edit transaction. Decorations and line classifications are derived from
/// the current buffer contents on demand and never cached across edits.
///
/// ## Usage Pattern
///
/// ```rust
/// use notemark_engine::editing::{Cmd, Document};
///
/// let mut doc = Document::from_bytes(b"- [x] Done").unwrap();
/// doc.set_selection(10..10);
///
/// let patch = doc.apply(Cmd::InsertText { at: 10, text: "!".to_string() });
/// assert_eq!(doc.text(), "- [x] Done!");
/// assert_eq!(patch.version, doc.version());
/// ```
pub struct Document {
    /// Rope buffer containing the entire note as UTF-8 bytes
    pub(crate) buffer: Rope,
    /// Primary selection/cursor position as byte offsets in buffer
    pub(crate) selection: std::ops::Range<usize>,
    /// Version counter incremented on each edit (enables change detection)
    pub(crate) version: u64,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        // Convert bytes to string, ensuring valid UTF-8
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();

        Ok(Self {
            buffer,
            selection: len..len, // Start with cursor at end
            version: 0,
        })
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Apply a command to the document.
    ///
    /// Pipeline: compile the `Cmd` to a Delta, apply the Delta to the buffer,
    /// transform the selection through the command, and bump the version.
    /// Returns a [`Patch`] with the changed ranges (post-edit coordinates),
    /// the new selection, and the new version so a host can invalidate any
    /// derived decoration state.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        // Build delta from command
        let delta = self.compile_command(&cmd);

        // Track changed ranges for the patch. Inserts contribute their span
        // in post-edit coordinates; a pure deletion contributes an empty
        // range at the deletion site so hosts invalidating from `changed`
        // alone still see it.
        let mut changed: Vec<std::ops::Range<usize>> = Vec::new();
        let mut old_pos = 0;
        let mut new_pos = 0;
        for op in delta.els.iter() {
            match op {
                xi_rope::delta::DeltaElement::Copy(from, to) => {
                    // A gap in the copied old-document bytes is a deletion;
                    // skip the marker when an insert already covers the site
                    if *from > old_pos && changed.last().is_none_or(|r| r.end != new_pos) {
                        changed.push(new_pos..new_pos);
                    }
                    new_pos += *to - *from;
                    old_pos = *to;
                }
                xi_rope::delta::DeltaElement::Insert(inserted) => {
                    changed.push(new_pos..new_pos + inserted.len());
                    new_pos += inserted.len();
                }
            }
        }
        if old_pos < self.buffer.len() && changed.last().is_none_or(|r| r.end != new_pos) {
            // Trailing old-document bytes never copied: a deletion at the end
            changed.push(new_pos..new_pos);
        }

        self.buffer = delta.apply(&self.buffer);

        // Transform selection through command
        let new_selection = self.transform_selection_for_command(&self.selection, &cmd);
        self.selection = new_selection.clone();

        // Increment version
        self.version += 1;

        Patch {
            changed,
            new_selection,
            version: self.version,
        }
    }

    /// Get the current selection range
    pub fn selection(&self) -> std::ops::Range<usize> {
        self.selection.clone()
    }

    /// Set the selection range
    pub fn set_selection(&mut self, selection: std::ops::Range<usize>) {
        self.selection = selection;
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Get the buffer length
    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Slice the buffer to a cow string
    pub(crate) fn slice_to_cow(&self, range: std::ops::Range<usize>) -> std::borrow::Cow<'_, str> {
        let doc_len = self.buffer.len();

        // Clamp range to document bounds to prevent xi-rope panic
        let start = range.start.min(doc_len);
        let end = range.end.min(doc_len).max(start);

        self.buffer.slice_to_cow(start..end)
    }

    // Forward declarations for methods implemented in other modules
    pub(crate) fn compile_command(&self, cmd: &Cmd) -> Delta<RopeInfo> {
        crate::editing::commands::compile_command(self, cmd)
    }

    pub(crate) fn transform_selection_for_command(
        &self,
        range: &std::ops::Range<usize>,
        cmd: &Cmd,
    ) -> std::ops::Range<usize> {
        crate::editing::commands::transform_selection_for_command(self, range, cmd)
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            selection: self.selection.clone(),
            version: self.version,
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // Compare buffer content as strings; selection and version are part
        // of the observable editing state
        self.buffer.to_string() == other.buffer.to_string()
            && self.selection == other.selection
            && self.version == other.version
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.buffer.to_string())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ Basic document tests ============

    #[test]
    fn test_document_from_bytes_valid_utf8() {
        let text = "# Hello World\n\nThis is a test document.";
        let bytes = text.as_bytes();

        let doc = Document::from_bytes(bytes).expect("Should create document from valid UTF-8");

        assert_eq!(doc.to_bytes(), bytes);
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.selection(), text.len()..text.len());
    }

    #[test]
    fn test_document_from_bytes_invalid_utf8() {
        let invalid_bytes = vec![0xFF, 0xFE, 0xFD]; // Invalid UTF-8 sequence

        let result = Document::from_bytes(&invalid_bytes);

        assert!(result.is_err());
    }

    // ============ Round-trip preservation tests ============

    #[test]
    fn test_document_to_bytes_preserves_content() {
        let original = "# Notes\n\n- [ ] Task 1\n- [x] Task 2\n\n```rust\nfn main() {}\n```";
        let bytes = original.as_bytes();

        let doc = Document::from_bytes(bytes).expect("Should create document");
        let result_bytes = doc.to_bytes();

        assert_eq!(result_bytes, bytes);
        assert_eq!(std::str::from_utf8(&result_bytes).unwrap(), original);
    }

    #[test]
    fn test_document_with_unicode() {
        let text = "Hello 世界! 🦀\n\n- [ ] Unicode task 🎉";
        let bytes = text.as_bytes();

        let doc = Document::from_bytes(bytes).expect("Should handle Unicode");

        assert_eq!(doc.to_bytes(), bytes);
    }

    #[test]
    fn test_document_with_windows_line_endings() {
        let text = "Line 1\r\nLine 2\r\nLine 3";
        let bytes = text.as_bytes();

        let doc = Document::from_bytes(bytes).expect("Should handle Windows line endings");

        assert_eq!(doc.to_bytes(), bytes);
    }

    // ============ Slice clamping tests ============

    #[test]
    fn test_slice_to_cow_clamps_out_of_range() {
        let doc = Document::from_bytes(b"short").unwrap();

        assert_eq!(doc.slice_to_cow(0..100), "short");
        assert_eq!(doc.slice_to_cow(3..100), "rt");
        assert_eq!(doc.slice_to_cow(50..100), "");
    }

    // ============ Changed-range reporting tests ============

    #[test]
    fn test_delete_reports_empty_changed_range_at_site() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();

        let patch = doc.apply(Cmd::DeleteRange { range: 5..6 });

        // Pure deletions still surface in `changed` for invalidation
        assert_eq!(patch.changed, vec![5..5]);
    }

    #[test]
    fn test_delete_at_buffer_end_reports_changed_range() {
        let mut doc = Document::from_bytes(b"Hello!").unwrap();

        let patch = doc.apply(Cmd::DeleteRange { range: 5..6 });

        assert_eq!(patch.changed, vec![5..5]);
    }

    #[test]
    fn test_delete_at_buffer_start_reports_changed_range() {
        let mut doc = Document::from_bytes(b"Hello").unwrap();

        let patch = doc.apply(Cmd::DeleteRange { range: 0..2 });

        assert_eq!(patch.changed, vec![0..0]);
    }

    #[test]
    fn test_replace_reports_single_inserted_range() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();

        let patch = doc.apply(Cmd::ReplaceRange {
            range: 6..11,
            text: "Universe".to_string(),
        });

        // The insert span covers the deletion site; no extra marker
        assert_eq!(patch.changed, vec![6..14]);
    }

    #[test]
    fn test_noop_toggle_reports_no_changes() {
        let mut doc = Document::from_bytes(b"Plain").unwrap();

        let patch = doc.apply(Cmd::ToggleTaskAt { at: 0 });

        assert!(patch.changed.is_empty());
    }

    #[test]
    fn test_version_increments_per_edit() {
        let mut doc = Document::from_bytes(b"Hello").unwrap();
        assert_eq!(doc.version(), 0);

        doc.apply(Cmd::InsertText {
            at: 5,
            text: "!".to_string(),
        });
        assert_eq!(doc.version(), 1);

        doc.apply(Cmd::DeleteRange { range: 5..6 });
        assert_eq!(doc.version(), 2);
    }
}
