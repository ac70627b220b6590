/*!
 * # Editing Core Module
 *
 * The editing system keeps the entire note in a single **`xi_rope::Rope`**
 * buffer as the source of truth. All mutations are expressed as **Commands**
 * (`Cmd` enum) that compile to xi-rope **Deltas**, so every edit is a single
 * atomic transaction with a well-defined selection afterwards.
 *
 * - **`document`**: Core `Document` type wrapping the rope buffer, the
 *   primary selection, and a version counter for change detection.
 * - **`commands`**: `Cmd` enum and delta compilation for all edit operations,
 *   including the task checkbox toggle.
 * - **`continuation`**: Enter-key interception that continues or terminates
 *   list and task structures.
 * - **`patch`**: Edit result metadata (changed ranges, new selection,
 *   version).
 *
 * Derived state (decorations, line classifications) is never cached across
 * edits; it is recomputed from the buffer on every change notification.
 */

pub mod commands;
pub mod continuation;
pub mod document;
pub mod patch;

pub use commands::Cmd;
pub use continuation::{EnterOutcome, handle_enter};
pub use document::Document;
pub use patch::Patch;
