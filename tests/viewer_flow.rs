//! Document view flows against an in-memory host and backend

use std::sync::Mutex;

use async_trait::async_trait;
use pdf_highlighter::client::{ClientError, HighlightBackend};
use pdf_highlighter::config::ViewerConfig;
use pdf_highlighter::geometry::{Point, Rect};
use pdf_highlighter::highlights::{Highlight, PersistState};
use pdf_highlighter::layout::{ContainerBox, LayerTier, LayoutSnapshot, PageBox};
use pdf_highlighter::overlay::{FrameRequest, Mark, OverlayHost, PanelPlacement, SyncTrigger};
use pdf_highlighter::selection::SelectionSnapshot;
use pdf_highlighter::tools::Tool;
use pdf_highlighter::viewer::{DeleteRequest, DocumentView, DELETE_FAILED_MESSAGE, SAVE_FAILED_MESSAGE};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fetch(String),
    Save { pdf_id: String, timestamp: String },
    Delete { pdf_id: String, timestamp: String },
}

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    stored: Mutex<Vec<Highlight>>,
    fail_saves: bool,
    fail_deletes: bool,
}

impl FakeBackend {
    fn failing() -> Self {
        Self {
            fail_saves: true,
            fail_deletes: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete { timestamp, .. } => Some(timestamp),
                _ => None,
            })
            .collect()
    }

    fn unavailable() -> ClientError {
        ClientError::Status {
            status: 500,
            body: "database unavailable".to_string(),
        }
    }
}

#[async_trait]
impl HighlightBackend for FakeBackend {
    async fn fetch_highlights(&self, pdf_id: &str) -> Result<Vec<Highlight>, ClientError> {
        self.calls.lock().unwrap().push(Call::Fetch(pdf_id.to_string()));
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save_highlight(&self, pdf_id: &str, _user_id: &str, highlight: &Highlight) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Save {
            pdf_id: pdf_id.to_string(),
            timestamp: highlight.timestamp.clone(),
        });
        if self.fail_saves {
            return Err(Self::unavailable());
        }
        self.stored.lock().unwrap().push(highlight.clone());
        Ok(())
    }

    async fn delete_highlight(&self, pdf_id: &str, timestamp: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Delete {
            pdf_id: pdf_id.to_string(),
            timestamp: timestamp.to_string(),
        });
        if self.fail_deletes {
            return Err(Self::unavailable());
        }
        self.stored.lock().unwrap().retain(|h| h.timestamp != timestamp);
        Ok(())
    }
}

#[derive(Default)]
struct FakeHost {
    next_id: u32,
    created: usize,
    removed: usize,
    marks: Vec<(u32, Mark)>,
}

impl OverlayHost for FakeHost {
    type Panel = u32;

    fn create_panel(&mut self, _page: &PageBox) -> u32 {
        self.next_id += 1;
        self.created += 1;
        self.next_id
    }

    fn place_panel(&mut self, _panel: &u32, _placement: PanelPlacement) {}

    fn remove_panel(&mut self, panel: &u32) {
        self.removed += 1;
        self.marks.retain(|(p, _)| p != panel);
    }

    fn clear_marks(&mut self, panel: &u32) {
        self.marks.retain(|(p, _)| p != panel);
    }

    fn append_mark(&mut self, panel: &u32, mark: &Mark) {
        self.marks.push((*panel, mark.clone()));
    }
}

type View = DocumentView<FakeHost>;

/// Two text-layer pages stacked at y [0,800) and [800,1600)
fn two_pages() -> LayoutSnapshot {
    let page = |index: usize, top: f64| PageBox {
        index,
        tier: LayerTier::TextLayer,
        bounds: Rect::new(0.0, top, 600.0, 800.0),
        offset: Point::new(0.0, top),
    };
    LayoutSnapshot {
        container: Some(ContainerBox::default()),
        pages: vec![page(0, 0.0), page(1, 800.0)],
    }
}

fn no_pages() -> LayoutSnapshot {
    LayoutSnapshot {
        container: Some(ContainerBox::default()),
        pages: Vec::new(),
    }
}

fn selection(text: &str, rect: Rect) -> SelectionSnapshot {
    SelectionSnapshot {
        text: text.to_string(),
        client_rects: vec![rect],
    }
}

fn view() -> View {
    let mut view = DocumentView::new(FakeHost::default(), &ViewerConfig::default());
    view.open("doc-1");
    view.select_tool(Tool::Highlight);
    view
}

fn select_text(view: &mut View, text: &str, top: f64) {
    assert!(view.on_mouse_up(false));
    view.on_selection(selection(text, Rect::new(10.0, top, 100.0, 40.0)), &two_pages())
        .expect("selection resolves");
}

/// Select, confirm and persist one highlight, returning its timestamp
async fn highlight_text(view: &mut View, backend: &FakeBackend, text: &str, top: f64) -> String {
    select_text(view, text, top);
    let save = view.confirm_highlight().expect("pending highlight");
    let result = save.send(backend).await;
    view.apply_saved(&save.pdf_id, save.timestamp(), result);
    save.highlight.timestamp
}

async fn send_delete(view: &mut View, backend: &FakeBackend, request: DeleteRequest) -> bool {
    let result = request.send(backend).await;
    view.apply_deleted(&request.pdf_id, &request.timestamp, result)
}

#[tokio::test]
async fn test_create_then_delete_restores_store() {
    let backend = FakeBackend::default();
    let mut view = view();
    let first = highlight_text(&mut view, &backend, "kept", 100.0).await;
    let before = view.store().to_vec();

    let second = highlight_text(&mut view, &backend, "removed", 750.0).await;
    assert_ne!(first, second);
    assert_eq!(view.store().len(), 2);
    assert_eq!(view.store().state(&second), Some(&PersistState::Confirmed));

    let stored = view.store().get(&second).unwrap();
    assert_eq!(stored.rects[0].page_index, 0);
    assert_eq!(stored.rects[0].top, 750.0);

    let request = view.delete_highlight(&second).expect("highlight exists");
    assert!(send_delete(&mut view, &backend, request).await);
    assert_eq!(view.store().to_vec(), before);
    assert_eq!(backend.deletes(), vec![second]);
}

#[tokio::test]
async fn test_optimistic_mark_drawn_before_save_resolves() {
    let backend = FakeBackend::default();
    let mut view = view();
    let layout = two_pages();
    view.on_frame(&layout);

    select_text(&mut view, "draft", 100.0);
    let save = view.confirm_highlight().expect("pending highlight");
    let in_flight = save.send(&backend);

    // Confirming already queued the redraw
    assert_eq!(view.request_sync(SyncTrigger::Scroll), FrameRequest::Merged);
    let report = view.on_frame(&layout).expect("frame pending");
    assert_eq!(report.rendered.map(|r| r.drawn), Some(1));
    assert_eq!(view.positioner().host().marks.len(), 1);
    assert_eq!(view.positioner().host().marks[0].1.highlight, save.timestamp());
    assert_eq!(view.store().state(save.timestamp()), Some(&PersistState::Pending));

    select_text(&mut view, "second", 300.0);
    assert!(view.pending().is_some());

    let result = in_flight.await;
    assert!(view.apply_saved(&save.pdf_id, save.timestamp(), result));
    assert_eq!(view.store().state(save.timestamp()), Some(&PersistState::Confirmed));
}

#[tokio::test]
async fn test_mark_click_deletes_only_after_confirmation() {
    let backend = FakeBackend::default();
    let mut view = view();
    let timestamp = highlight_text(&mut view, &backend, "text", 100.0).await;

    assert!(view.on_mark_clicked(&timestamp, |_| false).is_none());
    assert_eq!(view.store().len(), 1);

    let mut prompt = String::new();
    let request = view.on_mark_clicked(&timestamp, |question| {
        prompt = question.to_string();
        true
    });
    assert_eq!(prompt, "Do you want to delete this highlight?");
    assert_eq!(request.map(|r| r.timestamp), Some(timestamp));
    assert!(view.store().is_empty());
}

#[tokio::test]
async fn test_bulk_delete_issues_one_delete_per_highlight() {
    let backend = FakeBackend::default();
    let mut view = view();
    let mut stamps = Vec::new();
    for (i, top) in [100.0, 300.0, 900.0].into_iter().enumerate() {
        stamps.push(highlight_text(&mut view, &backend, &format!("line {}", i), top).await);
    }

    let requests = view.delete_all();
    assert!(view.store().is_empty());
    assert_eq!(requests.len(), 3);

    for request in requests {
        assert!(send_delete(&mut view, &backend, request).await);
    }
    assert_eq!(backend.deletes(), stamps);
    assert!(backend.stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_disabling_highlighting_clears_pending_confirmation() {
    let mut view = view();
    let layout = two_pages();

    view.on_mouse_up(false);
    view.on_selection(selection("pending", Rect::new(10.0, 100.0, 50.0, 20.0)), &layout);
    assert!(view.pending().is_some());

    view.select_tool(Tool::Search);
    assert!(view.pending().is_none());
    assert!(!view.highlighting_enabled());
    assert!(view.confirm_highlight().is_none());
    assert!(!view.on_mouse_up(false));
}

#[tokio::test]
async fn test_failed_save_is_kept_and_reported() {
    let backend = FakeBackend::failing();
    let mut view = view();
    let timestamp = highlight_text(&mut view, &backend, "offline", 100.0).await;

    assert_eq!(view.store().len(), 1);
    assert!(matches!(view.store().state(&timestamp), Some(PersistState::Failed(_))));

    let notices = view.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, SAVE_FAILED_MESSAGE);
    assert!(view.take_notices().is_empty());
}

#[tokio::test]
async fn test_failed_delete_is_reported_without_rollback() {
    let backend = FakeBackend::failing();
    let mut view = view();
    select_text(&mut view, "gone", 100.0);
    let save = view.confirm_highlight().unwrap();

    let request = view.delete_highlight(save.timestamp()).unwrap();
    assert!(!send_delete(&mut view, &backend, request).await);
    assert!(view.store().is_empty());
    assert_eq!(view.take_notices()[0].message, DELETE_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_results_for_previous_document_are_discarded() {
    let backend = FakeBackend::failing();
    let mut view = view();
    select_text(&mut view, "doc one", 100.0);
    let save = view.confirm_highlight().unwrap();
    let saved = save.send(&backend).await;

    let fetch = view.open("doc-2");
    assert!(view.store().is_empty());

    assert!(!view.apply_saved(&save.pdf_id, save.timestamp(), saved));
    let stale = vec![Highlight::new(Vec::new(), "#ffff00", "old", "t".to_string())];
    assert!(!view.apply_fetched("doc-1", Ok(stale)));
    assert!(!view.apply_deleted("doc-1", "t", Err(FakeBackend::unavailable())));
    assert!(view.store().is_empty());
    assert!(view.take_notices().is_empty());

    let result = fetch.send(&backend).await;
    assert!(view.apply_fetched(&fetch.pdf_id, result));
    assert_eq!(backend.calls().last(), Some(&Call::Fetch("doc-2".to_string())));
}

#[tokio::test]
async fn test_opening_another_document_drops_old_panels() {
    let mut view = view();
    view.on_frame(&two_pages());
    assert_eq!(view.positioner().panel_count(), 2);

    view.open("doc-2");
    assert_eq!(view.positioner().panel_count(), 0);
    assert_eq!(view.positioner().host().removed, 2);

    view.on_frame(&two_pages());
    assert_eq!(view.positioner().host().created, 4);
}

#[tokio::test]
async fn test_load_replaces_local_state_and_renders_marks() {
    let backend = FakeBackend::default();
    let mut first = view();
    highlight_text(&mut first, &backend, "saved", 900.0).await;

    let mut view = view();
    let fetch = view.open("doc-1");
    let result = fetch.send(&backend).await;
    assert!(view.apply_fetched(&fetch.pdf_id, result));
    assert_eq!(view.store().len(), 1);

    let report = view.on_frame(&two_pages()).expect("frame pending");
    assert!(report.outcome.is_ready());
    assert_eq!(report.rendered.map(|r| r.drawn), Some(1));
    assert_eq!(view.positioner().panel_count(), 2);
}

#[test]
fn test_triggers_before_a_frame_coalesce_into_one_sync() {
    let mut view = DocumentView::new(FakeHost::default(), &ViewerConfig::default());
    view.open("doc-1");

    assert_eq!(view.request_sync(SyncTrigger::Scroll), FrameRequest::Merged);
    assert_eq!(view.request_sync(SyncTrigger::Resize), FrameRequest::Merged);

    let layout = two_pages();
    assert!(view.on_frame(&layout).is_some());
    assert!(view.on_frame(&layout).is_none());
    assert_eq!(view.positioner().host().created, 2);

    assert_eq!(view.request_sync(SyncTrigger::Scroll), FrameRequest::Schedule);
    let report = view.on_frame(&layout).unwrap();
    assert!(report.rendered.is_none());
    assert_eq!(view.positioner().host().created, 2);
}

#[test]
fn test_readiness_backoff_gives_up_then_retries_manually() {
    let mut view = DocumentView::new(FakeHost::default(), &ViewerConfig::default());
    view.open("doc-1");

    let mut delays = Vec::new();
    while let Some(delay) = view.next_warmup_delay() {
        delays.push(delay.as_millis());
        view.request_sync(SyncTrigger::Readiness);
        let report = view.on_frame(&no_pages()).unwrap();
        assert!(!report.outcome.is_ready());
    }
    assert_eq!(delays, vec![100, 200, 400, 800, 1600, 3200, 5000, 5000]);
    assert!(view.needs_manual_retry());

    assert_eq!(view.manual_retry(), FrameRequest::Schedule);
    assert!(!view.needs_manual_retry());
    let report = view.on_frame(&two_pages()).unwrap();
    assert!(report.outcome.is_ready());
    assert!(view.next_warmup_delay().is_none());
}

#[test]
fn test_color_and_cancel_shape_the_next_highlight() {
    let mut view = view();
    assert_eq!(view.pdf_id(), Some("doc-1"));
    assert_eq!(view.palette().selected(), Some(Tool::Highlight));
    assert_eq!(view.color(), ViewerConfig::default().default_color);

    select_text(&mut view, "dropped", 100.0);
    view.cancel_selection();
    assert!(view.pending().is_none());
    assert!(view.confirm_highlight().is_none());
    assert!(view.store().is_empty());

    view.set_color("#00ff00");
    select_text(&mut view, "green", 100.0);
    let save = view.confirm_highlight().unwrap();
    assert_eq!(save.highlight.color, "#00ff00");
    assert_eq!(save.highlight.text, "green");
}

#[test]
fn test_pages_ready_signal_ends_backoff() {
    let mut view = DocumentView::new(FakeHost::default(), &ViewerConfig::default());
    view.open("doc-1");
    assert!(view.next_warmup_delay().is_some());

    assert_eq!(view.on_pages_ready(), FrameRequest::Merged);
    assert!(view.next_warmup_delay().is_none());
    assert!(!view.needs_manual_retry());
    assert!(view.on_frame(&two_pages()).unwrap().outcome.is_ready());
}
