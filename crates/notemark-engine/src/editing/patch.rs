/// Result of applying a command: what changed and where the cursor went
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Byte ranges touched by this edit in post-edit coordinates: the span
    /// of each insertion, plus an empty range at the site of a pure deletion
    pub changed: Vec<std::ops::Range<usize>>,
    /// Selection after the edit
    pub new_selection: std::ops::Range<usize>,
    /// Document version after the edit
    pub version: u64,
}
