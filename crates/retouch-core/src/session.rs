//! The editing session: one source image, its history, and the derived
//! image that reflects the active chain.
//!
//! Every mutating call validates its input, commits through the
//! [`HistoryManager`], and re-renders before returning. Observers poll
//! [`EditSession::revision`] and take cheap [`Arc`] snapshots of the
//! derived image; nothing is pushed to them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chain::FilterChain;
use crate::decode::decode;
use crate::history::HistoryManager;
use crate::operation::{Category, Operation};
use crate::render::Renderer;
use crate::types::{Dimensions, EditError, RgbaImage, SessionConfig};

/// A serializable edit, replayable against a session.
///
/// ```json
/// [{"action":"set","operation":{"kind":"hue","value":30}},{"action":"undo"}]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditCommand {
    /// [`EditSession::set_continuous_parameter`].
    Set { operation: Operation },
    /// [`EditSession::add_discrete_operation`].
    Add { operation: Operation },
    /// [`EditSession::undo`].
    Undo,
    /// [`EditSession::redo`].
    Redo,
    /// [`EditSession::reset_all`].
    Reset,
}

/// Source image, edit history, and the current rendered result.
#[derive(Debug, Clone)]
pub struct EditSession {
    source: Arc<RgbaImage>,
    history: HistoryManager,
    derived: Arc<RgbaImage>,
    renderer: Renderer,
    config: SessionConfig,
    revision: u64,
}

impl EditSession {
    /// Decode `bytes` and start a session over the result.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::EmptyInput`] or [`EditError::Decode`] if the
    /// bytes are not a readable image.
    pub fn load(bytes: &[u8], config: SessionConfig) -> Result<Self, EditError> {
        let image = decode(bytes)?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        Ok(Self::from_image(image, config))
    }

    /// Start a session over an already-decoded raster.
    #[must_use]
    pub fn from_image(image: RgbaImage, config: SessionConfig) -> Self {
        let source = Arc::new(image);
        Self {
            derived: Arc::clone(&source),
            source,
            history: HistoryManager::new(config.history_limit),
            renderer: Renderer::new(config.resample),
            config,
            revision: 0,
        }
    }

    /// Replace the source image, discarding the chain and all history.
    ///
    /// The configuration is kept. If decoding fails the session is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::EmptyInput`] or [`EditError::Decode`] if the
    /// bytes are not a readable image.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), EditError> {
        let image = decode(bytes)?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            discarded_edits = self.history.active().len(),
            "Image replaced"
        );

        self.source = Arc::new(image);
        self.history = HistoryManager::new(self.config.history_limit);
        self.derived = Arc::clone(&self.source);
        self.revision += 1;
        Ok(())
    }

    /// Commit a continuous adjustment.
    ///
    /// Replaces the kind's existing slot in place, or appends it if the
    /// kind is not yet in the chain.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidParameter`] if a parameter is out of
    /// range, or [`EditError::WrongCategory`] if `op` is discrete. The
    /// chain and history are unchanged on error.
    pub fn set_continuous_parameter(&mut self, op: Operation) -> Result<(), EditError> {
        check(op, Category::Continuous)?;
        self.history
            .record_and_mutate(|chain| Ok(chain.replace_or_append(op)))?;
        self.rerender();
        Ok(())
    }

    /// Append a discrete transform to the end of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidParameter`] if a parameter is out of
    /// range, or [`EditError::WrongCategory`] if `op` is continuous. The
    /// chain and history are unchanged on error.
    pub fn add_discrete_operation(&mut self, op: Operation) -> Result<(), EditError> {
        check(op, Category::Discrete)?;
        self.history.record_and_mutate(|chain| chain.append(op))?;
        self.rerender();
        Ok(())
    }

    /// Step back one edit. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.rerender();
        }
        changed
    }

    /// Re-apply the last undone edit. Returns `false` if there was
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.rerender();
        }
        changed
    }

    /// Clear the chain as a single undoable edit.
    pub fn reset_all(&mut self) {
        self.history.record(FilterChain::reset);
        self.rerender();
    }

    /// Dispatch a serialized edit.
    ///
    /// Returns whether the chain changed, which is always `true` for
    /// `set`, `add` and `reset`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying `set` or `add`.
    pub fn apply(&mut self, command: &EditCommand) -> Result<bool, EditError> {
        match *command {
            EditCommand::Set { operation } => {
                self.set_continuous_parameter(operation)?;
                Ok(true)
            }
            EditCommand::Add { operation } => {
                self.add_discrete_operation(operation)?;
                Ok(true)
            }
            EditCommand::Undo => Ok(self.undo()),
            EditCommand::Redo => Ok(self.redo()),
            EditCommand::Reset => {
                self.reset_all();
                Ok(true)
            }
        }
    }

    /// The derived image for the active chain.
    #[must_use]
    pub const fn current_image(&self) -> &Arc<RgbaImage> {
        &self.derived
    }

    /// The immutable source image.
    #[must_use]
    pub const fn source_image(&self) -> &Arc<RgbaImage> {
        &self.source
    }

    /// The active chain.
    #[must_use]
    pub const fn chain(&self) -> &FilterChain {
        self.history.active()
    }

    /// Undo/redo state.
    #[must_use]
    pub const fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// The renderer used for every re-render.
    #[must_use]
    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Session settings.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Dimensions of the derived image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.derived)
    }

    /// Incremented every time the derived image is replaced.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn rerender(&mut self) {
        let chain = self.history.active();
        self.derived = if chain.is_empty() {
            Arc::clone(&self.source)
        } else {
            Arc::new(self.renderer.render(&self.source, chain))
        };
        self.revision += 1;
        tracing::debug!(
            steps = chain.len(),
            revision = self.revision,
            width = self.derived.width(),
            height = self.derived.height(),
            "Rendered"
        );
    }
}

/// Validate `op` and require it to belong to `expected`.
fn check(op: Operation, expected: Category) -> Result<(), EditError> {
    op.validate()?;
    if op.category() == expected {
        Ok(())
    } else {
        Err(EditError::WrongCategory {
            kind: op.kind(),
            expected,
        })
    }
}
