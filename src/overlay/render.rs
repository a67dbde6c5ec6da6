//! Drawing highlight marks into the overlay panels

use crate::highlights::Highlight;

use super::positioner::{OverlayHost, OverlayPositioner};

/// Opacity of a drawn highlight rectangle
pub const MARK_OPACITY: f64 = 0.5;
/// Tooltip shown on a drawn highlight
pub const MARK_TITLE: &str = "Click to delete highlight";
/// Question asked before a clicked highlight is deleted
pub const DELETE_PROMPT: &str = "Do you want to delete this highlight?";

/// One drawn highlight rectangle, positioned inside its page panel.
///
/// Marks are the only overlay nodes that take pointer events; a click
/// carries `highlight` (the highlight's timestamp) back to the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub highlight: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub opacity: f64,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    pub drawn: usize,
    /// Rects whose page has no panel right now
    pub skipped: usize,
}

impl<H: OverlayHost> OverlayPositioner<H> {
    /// Redraw every highlight from scratch, clearing all panels first
    pub fn render<'a, I>(&mut self, highlights: I) -> RenderReport
    where
        I: IntoIterator<Item = &'a Highlight>,
    {
        let Self { host, panels } = self;
        for panel in panels.values() {
            host.clear_marks(&panel.handle);
        }

        let mut report = RenderReport::default();
        for highlight in highlights {
            for rect in &highlight.rects {
                let Some(panel) = panels.get(&rect.page_index) else {
                    report.skipped += 1;
                    continue;
                };

                let mark = Mark {
                    highlight: highlight.timestamp.clone(),
                    left: rect.left,
                    top: rect.top,
                    width: rect.width,
                    height: rect.height,
                    color: highlight.color.clone(),
                    opacity: MARK_OPACITY,
                    title: MARK_TITLE,
                };
                host.append_mark(&panel.handle, &mark);
                report.drawn += 1;
            }
        }

        if report.skipped > 0 {
            tracing::trace!(skipped = report.skipped, "highlight rects without a panel");
        }
        report
    }
}
