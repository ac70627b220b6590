pub mod decor;
pub mod editing;
pub mod syntax;
pub mod tags;

// Re-export key types for easier usage
pub use decor::{
    DecorationError, DecorationInstruction, Effect, MarkKind, WidgetDescriptor,
    synthesize::synthesize, tasks::TaskStatus,
};
pub use editing::{Cmd, Document, EnterOutcome, Patch, handle_enter};
pub use syntax::{
    classify::{LineClass, classify_line},
    scan::{ElementKind, MarkdownElement, scan},
    strip::strip_markdown,
};
pub use tags::{Tag, TagAutocomplete, TagPopup, TagSource};
