/*!
 * Buffer-text analysis: pure functions over strings, no editor state.
 *
 * - **`classify`**: per-line classification into task / bullet / numbered /
 *   plain, used by the Enter-key continuation handler.
 * - **`scan`**: whole-buffer markdown element scan (emphasis, inline code,
 *   headings, links, fenced code blocks) feeding the decoration synthesizer.
 * - **`strip`**: markdown-to-plain-text conversion for previews/snippets.
 */

pub mod classify;
pub mod scan;
pub mod strip;

pub use classify::{LineClass, classify_line};
pub use scan::{ElementKind, MarkdownElement, scan};
pub use strip::strip_markdown;
