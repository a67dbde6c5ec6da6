//! Selection-to-highlight controller
//!
//! Turns a finished text selection into a pending highlight candidate and,
//! once the user confirms, into a [`Highlight`] record.
//!
//! ```text
//! Idle --mouse up--> Selecting --rects resolved--> PendingConfirm --confirm/cancel--> Idle
//!                        \--nothing resolvable--> Idle
//! ```

use std::time::Duration;

use crate::geometry::{self, PageRect, Point, Rect};
use crate::highlights::Highlight;
use crate::layout::PageBoxSource;

/// How long to wait after mouse release before reading the selection
pub const SELECTION_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Vertical gap between the selection and the confirmation affordance
pub const ANCHOR_OFFSET: f64 = 10.0;

/// The live text selection as read from the host
#[derive(Debug, Clone, Default)]
pub struct SelectionSnapshot {
    pub text: String,
    /// Client rectangles of the selection range, viewport coordinates
    pub client_rects: Vec<Rect>,
}

/// A resolved selection awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingHighlight {
    pub rects: Vec<PageRect>,
    pub text: String,
    /// Where the confirmation affordance is shown (viewport coordinates)
    pub anchor: Point,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Mouse released, waiting for the selection to settle
    Selecting,
    PendingConfirm(PendingHighlight),
}

/// Selection state machine; inert while highlighting is disabled
#[derive(Debug, Default)]
pub struct SelectionController {
    enabled: bool,
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable highlighting. Either way any pending selection is dropped.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.state = SelectionState::Idle;
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingHighlight> {
        match &self.state {
            SelectionState::PendingConfirm(pending) => Some(pending),
            _ => None,
        }
    }

    /// Mouse released somewhere in the document.
    ///
    /// Returns `true` when the host should read the selection after
    /// [`SELECTION_SETTLE_DELAY`] and pass it to [`Self::on_selection`].
    /// Releases on the confirmation affordance itself are ignored.
    pub fn on_mouse_up(&mut self, on_affordance: bool) -> bool {
        if !self.enabled || on_affordance {
            return false;
        }
        // A new selection gesture cancels whatever was pending
        self.state = SelectionState::Selecting;
        true
    }

    /// The settled selection. Resolves its rectangles against the page
    /// geometry; rectangles that cannot be placed are dropped.
    pub fn on_selection<S: PageBoxSource + ?Sized>(
        &mut self,
        selection: SelectionSnapshot,
        source: &S,
    ) -> Option<&PendingHighlight> {
        if !self.enabled {
            return None;
        }

        let text = selection.text.trim();
        let Some(last) = selection.client_rects.last() else {
            self.state = SelectionState::Idle;
            return None;
        };
        if text.is_empty() {
            self.state = SelectionState::Idle;
            return None;
        }

        let anchor = Point::new(last.bottom_center().x, last.bottom() + ANCHOR_OFFSET);
        let rects: Vec<PageRect> = selection
            .client_rects
            .iter()
            .filter_map(|rect| geometry::resolve_with(source, rect))
            .map(|rect| PageRect {
                text: Some(text.to_string()),
                ..rect
            })
            .collect();

        if rects.is_empty() {
            tracing::debug!("selection produced no resolvable rects");
            self.state = SelectionState::Idle;
            return None;
        }

        self.state = SelectionState::PendingConfirm(PendingHighlight {
            rects,
            text: text.to_string(),
            anchor,
        });
        self.pending()
    }

    /// Commit the pending selection. The caller clears the live selection.
    pub fn confirm(&mut self, color: &str, timestamp: String) -> Option<Highlight> {
        match std::mem::take(&mut self.state) {
            SelectionState::PendingConfirm(pending) => {
                Some(Highlight::new(pending.rects, color, pending.text, timestamp))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = SelectionState::Idle;
    }
}
