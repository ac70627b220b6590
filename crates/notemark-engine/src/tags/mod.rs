/*!
 * Tag autocomplete: trigger detection, debounced lookup, transient popup
 * state.
 *
 * The controller is the only asynchronous component in the engine. It never
 * blocks the caller: `on_update` returns a future the host drives (or
 * spawns), and only the most recently scheduled lookup may publish its
 * result. A slow fetch superseded by a later keystroke is discarded on
 * arrival, never retried.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::decor::{DecorationInstruction, Effect, WidgetDescriptor};
use crate::editing::{Cmd, Document, Patch};

/// A tag known to the note store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
}

/// External tag lookup service.
///
/// Failures are swallowed by the controller and treated as an empty result:
/// the popup simply does not appear, and no error crosses this boundary.
#[async_trait]
pub trait TagSource: Send + Sync {
    async fn all_tags(&self) -> anyhow::Result<Vec<Tag>>;
}

/// Transient popup state published to the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPopup {
    /// Byte offset just after the trigger character; completions insert here
    pub at: usize,
    pub tags: Vec<Tag>,
}

impl TagPopup {
    /// Widget decoration anchored at the trigger position
    pub fn to_decoration(&self) -> DecorationInstruction {
        DecorationInstruction {
            span: self.at..self.at,
            effect: Effect::Widget(WidgetDescriptor::TagMenu {
                tags: self.tags.clone(),
            }),
        }
    }
}

/// Debounced tag autocomplete controller.
///
/// Recomputes its trigger condition on every document/selection change: the
/// popup is armed exactly when the byte immediately before the cursor is the
/// trigger character. Timer handles live as private instance state (the
/// generation counter), never module-level globals, so the controller stays
/// independently testable.
pub struct TagAutocomplete<S> {
    source: Arc<S>,
    trigger: char,
    debounce: Duration,
    /// Monotonic update counter; a lookup publishes only if it is still the
    /// newest when its debounce and fetch complete
    generation: Arc<AtomicU64>,
    state: watch::Sender<Option<TagPopup>>,
}

impl<S: TagSource + 'static> TagAutocomplete<S> {
    pub fn new(source: S, trigger: char, debounce: Duration) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            source: Arc::new(source),
            trigger,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            state,
        }
    }

    /// Subscribe to popup state changes
    pub fn subscribe(&self) -> watch::Receiver<Option<TagPopup>> {
        self.state.subscribe()
    }

    /// Current popup state, if any
    pub fn popup(&self) -> Option<TagPopup> {
        self.state.borrow().clone()
    }

    /// React to a document/selection change.
    ///
    /// Returns a future the host spawns (or awaits); dropping it cancels the
    /// pending debounce. Each call supersedes all earlier ones.
    pub fn on_update(&self, doc: &Document) -> impl Future<Output = ()> + Send + 'static {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cursor = doc.selection().start;
        let trigger_len = self.trigger.len_utf8();
        let triggered = cursor >= trigger_len
            && doc
                .text()
                .get(cursor - trigger_len..cursor)
                .and_then(|s| s.chars().next())
                == Some(self.trigger);

        let source = Arc::clone(&self.source);
        let latest = Arc::clone(&self.generation);
        let state = self.state.clone();
        let debounce = self.debounce;

        async move {
            if !triggered {
                // Deferred tick so the clear never re-enters the same update
                // cycle that scheduled it
                tokio::task::yield_now().await;
                if latest.load(Ordering::SeqCst) == generation {
                    state.send_replace(None);
                }
                return;
            }

            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                trace!(generation, "lookup superseded during debounce");
                return;
            }

            let tags = match source.all_tags().await {
                Ok(tags) => tags,
                Err(err) => {
                    // Lookup failures mean "no tags", never a surfaced error
                    debug!(error = %err, "tag source failed; suppressing popup");
                    Vec::new()
                }
            };
            if latest.load(Ordering::SeqCst) != generation {
                trace!(generation, "stale lookup result discarded");
                return;
            }

            if tags.is_empty() {
                state.send_replace(None);
            } else {
                debug!(at = cursor, count = tags.len(), "showing tag popup");
                state.send_replace(Some(TagPopup { at: cursor, tags }));
            }
        }
    }

    /// Insert the selected tag at the recorded trigger position, replacing
    /// any partial word already typed after the trigger, and clear the popup.
    pub fn accept(&self, doc: &mut Document, popup: &TagPopup, tag: &Tag) -> Patch {
        let text = doc.text();
        // Clamp a stale popup offset once up front; an unclamped `at` past
        // the buffer end would build an inverted replace range
        let at = popup.at.min(text.len());
        let end = text[at..]
            .find(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
            .map_or(text.len(), |i| at + i);

        let patch = doc.apply(Cmd::ReplaceRange {
            range: at..end,
            text: tag.tag.clone(),
        });
        self.state.send_replace(None);
        patch
    }

    /// Tear down: supersede any in-flight lookup and drop the popup
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(None);
    }
}

impl<S> Drop for TagAutocomplete<S> {
    fn drop(&mut self) {
        // In-flight lookups must not publish after teardown
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
