//! Document view
//!
//! Ties the overlay engine together for one open document: the highlight
//! store, the overlay panels and the selection controller.
//!
//! The host drives it from its event loop:
//! - layout events (`scroll`, `resize`, DOM mutations) go to [`DocumentView::request_sync`],
//!   and when that answers [`FrameRequest::Schedule`] the host calls
//!   [`DocumentView::on_frame`] on the next animation frame
//! - after mount, the host sleeps for [`DocumentView::next_warmup_delay`] and requests
//!   a [`SyncTrigger::Readiness`] sync, until it returns `None`
//! - mouse releases go to [`DocumentView::on_mouse_up`], the settled selection to
//!   [`DocumentView::on_selection`]
//! - user-facing messages are drained with [`DocumentView::take_notices`]
//!
//! The view never awaits the backend. Local changes apply at once and hand
//! back a [`FetchRequest`], [`SaveRequest`] or [`DeleteRequest`]; the host
//! sends it whenever it likes and reports the outcome through the matching
//! `apply_*` call. Outcomes for a document that is no longer open are
//! discarded.

use std::time::Duration;

use crate::client::{ClientError, HighlightBackend};
use crate::config::ViewerConfig;
use crate::highlights::{Highlight, HighlightStore, StampSource};
use crate::layout::PageBoxSource;
use crate::overlay::{
    FrameRequest, OverlayHost, OverlayPositioner, ReadinessBackoff, RenderReport, SyncOutcome,
    SyncScheduler, SyncTrigger, DELETE_PROMPT,
};
use crate::selection::{PendingHighlight, SelectionController, SelectionSnapshot};
use crate::tools::{Tool, ToolPalette};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save highlight";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete highlight";

/// Message the host shows to the user (blocking alert in a browser host)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub detail: Option<String>,
}

impl Notice {
    fn from_error(message: &str, error: &ClientError) -> Self {
        Self {
            message: message.to_string(),
            detail: Some(error.to_string()),
        }
    }
}

/// Load of a document's highlights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub pdf_id: String,
}

impl FetchRequest {
    pub async fn send<B: HighlightBackend + ?Sized>(&self, backend: &B) -> Result<Vec<Highlight>, ClientError> {
        backend.fetch_highlights(&self.pdf_id).await
    }
}

/// Persistence of one newly created highlight
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub pdf_id: String,
    pub user_id: String,
    pub highlight: Highlight,
}

impl SaveRequest {
    pub fn timestamp(&self) -> &str {
        &self.highlight.timestamp
    }

    pub async fn send<B: HighlightBackend + ?Sized>(&self, backend: &B) -> Result<(), ClientError> {
        backend
            .save_highlight(&self.pdf_id, &self.user_id, &self.highlight)
            .await
    }
}

/// Deletion of one highlight, keyed by its timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub pdf_id: String,
    pub timestamp: String,
}

impl DeleteRequest {
    pub async fn send<B: HighlightBackend + ?Sized>(&self, backend: &B) -> Result<(), ClientError> {
        backend.delete_highlight(&self.pdf_id, &self.timestamp).await
    }
}

/// What one animation frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub outcome: SyncOutcome,
    /// Set when marks were redrawn
    pub rendered: Option<RenderReport>,
}

pub struct DocumentView<H: OverlayHost> {
    pdf_id: Option<String>,
    user_id: String,
    color: String,
    store: HighlightStore,
    positioner: OverlayPositioner<H>,
    scheduler: SyncScheduler,
    backoff: ReadinessBackoff,
    controller: SelectionController,
    palette: ToolPalette,
    stamps: StampSource,
    notices: Vec<Notice>,
    rendered_revision: Option<u64>,
}

impl<H: OverlayHost> DocumentView<H> {
    pub fn new(host: H, config: &ViewerConfig) -> Self {
        Self {
            pdf_id: None,
            user_id: config.user_id.clone(),
            color: config.default_color.clone(),
            store: HighlightStore::new(),
            positioner: OverlayPositioner::new(host),
            scheduler: SyncScheduler::new(),
            backoff: ReadinessBackoff::new(config.warmup_initial(), config.warmup_cap(), config.warmup_attempts),
            controller: SelectionController::new(),
            palette: ToolPalette::new(),
            stamps: StampSource::new(),
            notices: Vec::new(),
            rendered_revision: None,
        }
    }

    pub fn pdf_id(&self) -> Option<&str> {
        self.pdf_id.as_deref()
    }

    pub fn store(&self) -> &HighlightStore {
        &self.store
    }

    pub fn positioner(&self) -> &OverlayPositioner<H> {
        &self.positioner
    }

    pub fn palette(&self) -> &ToolPalette {
        &self.palette
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    /// Drain messages for the user
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn is_open(&self, pdf_id: &str) -> bool {
        self.pdf_id.as_deref() == Some(pdf_id)
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    /// Switch to a document and return the load the host should send.
    ///
    /// Local highlights and the previous document's panels are dropped and
    /// the readiness probing starts over. The host schedules a frame after
    /// opening.
    pub fn open(&mut self, pdf_id: impl Into<String>) -> FetchRequest {
        let pdf_id = pdf_id.into();
        tracing::info!(pdf_id = %pdf_id, "opening document");

        self.positioner.teardown();
        self.rendered_revision = None;
        self.store.reset();
        self.controller.cancel();
        self.backoff.reset();
        self.scheduler.request(SyncTrigger::Mount);
        self.pdf_id = Some(pdf_id.clone());

        FetchRequest { pdf_id }
    }

    /// Apply a fetch result for `pdf_id`. Results for a document that is no
    /// longer open are discarded. Returns whether local state was replaced.
    pub fn apply_fetched(&mut self, pdf_id: &str, result: Result<Vec<Highlight>, ClientError>) -> bool {
        if !self.is_open(pdf_id) {
            tracing::debug!(pdf_id, "discarding highlights for a document no longer open");
            return false;
        }

        match result {
            Ok(highlights) => {
                tracing::info!(pdf_id, count = highlights.len(), "loaded highlights");
                self.store.replace_all(highlights);
                self.scheduler.request(SyncTrigger::StoreChanged);
                true
            }
            Err(e) => {
                tracing::error!("Error loading highlights: {}", e);
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Layout synchronization
    // ------------------------------------------------------------------

    pub fn request_sync(&mut self, trigger: SyncTrigger) -> FrameRequest {
        self.scheduler.request(trigger)
    }

    /// Run the pending sync, if any, and redraw marks when needed
    pub fn on_frame<S: PageBoxSource + ?Sized>(&mut self, source: &S) -> Option<FrameReport> {
        let triggers = self.scheduler.take_frame()?;
        tracing::trace!(?triggers, "overlay frame");

        let outcome = self.positioner.sync_overlays(source);
        let SyncOutcome::Synced(report) = outcome else {
            return Some(FrameReport {
                outcome,
                rendered: None,
            });
        };

        self.backoff.mark_ready();
        let stale = self.rendered_revision != Some(self.store.revision());
        let rendered = if stale || report.changed_panels() {
            self.rendered_revision = Some(self.store.revision());
            Some(self.positioner.render(self.store.iter()))
        } else {
            None
        };

        Some(FrameReport { outcome, rendered })
    }

    /// Explicit readiness signal from the viewer (first pages rendered)
    pub fn on_pages_ready(&mut self) -> FrameRequest {
        self.backoff.mark_ready();
        self.scheduler.request(SyncTrigger::Readiness)
    }

    /// Delay before the next readiness probe, `None` once ready or exhausted
    pub fn next_warmup_delay(&mut self) -> Option<Duration> {
        self.backoff.next_delay()
    }

    /// Probing gave up without seeing a page: offer a manual retry
    pub fn needs_manual_retry(&self) -> bool {
        self.backoff.is_exhausted()
    }

    pub fn manual_retry(&mut self) -> FrameRequest {
        self.backoff.reset();
        self.scheduler.request(SyncTrigger::ManualRetry)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_tool(&mut self, tool: Tool) {
        self.palette.select(tool);
        self.controller.set_enabled(self.palette.highlighting_enabled());
    }

    pub fn highlighting_enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    pub fn pending(&self) -> Option<&PendingHighlight> {
        self.controller.pending()
    }

    /// Returns `true` when the host should read the selection after the settle delay
    pub fn on_mouse_up(&mut self, on_affordance: bool) -> bool {
        self.controller.on_mouse_up(on_affordance)
    }

    pub fn on_selection<S: PageBoxSource + ?Sized>(
        &mut self,
        selection: SelectionSnapshot,
        source: &S,
    ) -> Option<&PendingHighlight> {
        self.controller.on_selection(selection, source)
    }

    pub fn cancel_selection(&mut self) {
        self.controller.cancel();
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Commit the pending selection. The highlight is appended right away
    /// (drawn on the next frame) and the returned request persists it.
    ///
    /// The host clears the live text selection afterwards.
    pub fn confirm_highlight(&mut self) -> Option<SaveRequest> {
        let Some(pdf_id) = self.pdf_id.clone() else {
            tracing::warn!("no document open, dropping selection");
            self.controller.cancel();
            return None;
        };

        let stamp = self.stamps.next();
        let highlight = self.controller.confirm(&self.color, stamp)?;

        self.store.append(highlight.clone());
        self.scheduler.request(SyncTrigger::StoreChanged);

        Some(SaveRequest {
            pdf_id,
            user_id: self.user_id.clone(),
            highlight,
        })
    }

    /// Record the outcome of a [`SaveRequest`]. A failed save keeps the
    /// highlight, marks it failed and queues a notice.
    pub fn apply_saved(&mut self, pdf_id: &str, timestamp: &str, result: Result<(), ClientError>) -> bool {
        if !self.is_open(pdf_id) {
            tracing::debug!(pdf_id, timestamp, "discarding save result for a document no longer open");
            return false;
        }

        match result {
            Ok(()) => self.store.mark_confirmed(timestamp),
            Err(e) => {
                tracing::error!("Error saving highlight: {}", e);
                self.notices.push(Notice::from_error(SAVE_FAILED_MESSAGE, &e));
                self.store.mark_failed(timestamp, e.to_string())
            }
        }
    }

    /// Remove a highlight locally; the returned request deletes it remotely
    pub fn delete_highlight(&mut self, timestamp: &str) -> Option<DeleteRequest> {
        let pdf_id = self.pdf_id.clone()?;
        self.store.remove(timestamp)?;
        self.scheduler.request(SyncTrigger::StoreChanged);

        Some(DeleteRequest {
            pdf_id,
            timestamp: timestamp.to_string(),
        })
    }

    /// A drawn mark was clicked; delete after the user confirms
    pub fn on_mark_clicked<F>(&mut self, timestamp: &str, confirm: F) -> Option<DeleteRequest>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_PROMPT) {
            return None;
        }
        self.delete_highlight(timestamp)
    }

    /// Empty the document, returning one delete per removed highlight
    pub fn delete_all(&mut self) -> Vec<DeleteRequest> {
        let Some(pdf_id) = self.pdf_id.clone() else {
            return Vec::new();
        };

        let removed = self.store.take_all();
        if !removed.is_empty() {
            self.scheduler.request(SyncTrigger::StoreChanged);
        }

        removed
            .into_iter()
            .map(|highlight| DeleteRequest {
                pdf_id: pdf_id.clone(),
                timestamp: highlight.timestamp,
            })
            .collect()
    }

    /// Record the outcome of a [`DeleteRequest`]. Failures are reported,
    /// the local removal stands.
    pub fn apply_deleted(&mut self, pdf_id: &str, timestamp: &str, result: Result<(), ClientError>) -> bool {
        if !self.is_open(pdf_id) {
            tracing::debug!(pdf_id, timestamp, "discarding delete result for a document no longer open");
            return false;
        }

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error deleting highlight: {}", e);
                self.notices.push(Notice::from_error(DELETE_FAILED_MESSAGE, &e));
                false
            }
        }
    }
}
