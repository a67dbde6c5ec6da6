//! Overlay panel positioning
//!
//! Keeps exactly one overlay panel per rendered page, pinned to the page's
//! content box. Panels are created lazily, repositioned in place on later
//! syncs, and pruned once their page is no longer rendered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use crate::layout::{LayerTier, PageBox, PageBoxSource};

use super::render::Mark;

/// Stacking order of overlay panels, level with the text layer
pub const PANEL_Z_INDEX: i32 = 2;

/// Where a panel sits relative to its page element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelPlacement {
    /// Sibling of the page layer, at the layer's offset and measured size
    Over {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    /// Child of the page container, covering it entirely
    Fill,
}

impl PanelPlacement {
    pub fn for_page(page: &PageBox) -> Self {
        if page.tier.nests_panel() {
            PanelPlacement::Fill
        } else {
            PanelPlacement::Over {
                left: page.offset.x,
                top: page.offset.y,
                width: page.bounds.width,
                height: page.bounds.height,
            }
        }
    }
}

/// The presentation layer the panels live in.
///
/// Implementations own the actual nodes. Panels must be absolutely
/// positioned at [`PANEL_Z_INDEX`] with pointer events disabled, so only
/// the marks inside them can receive clicks. The viewer's own elements are
/// never restructured: panels are inserted next to (or, for page
/// containers, appended into) the page element.
pub trait OverlayHost {
    type Panel: Clone + Debug;

    fn create_panel(&mut self, page: &PageBox) -> Self::Panel;
    fn place_panel(&mut self, panel: &Self::Panel, placement: PanelPlacement);
    fn remove_panel(&mut self, panel: &Self::Panel);
    fn clear_marks(&mut self, panel: &Self::Panel);
    fn append_mark(&mut self, panel: &Self::Panel, mark: &Mark);
}

#[derive(Debug)]
pub(super) struct OwnedPanel<P> {
    pub(super) handle: P,
    tier: LayerTier,
    placement: PanelPlacement,
}

/// Result of one [`OverlayPositioner::sync_overlays`] pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No page geometry yet; nothing was touched
    NotReady,
    Synced(SyncReport),
}

impl SyncOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub pages: usize,
    pub created: usize,
    pub moved: usize,
    pub pruned: usize,
}

impl SyncReport {
    /// Whether the set of panels changed (marks must be redrawn)
    pub fn changed_panels(&self) -> bool {
        self.created > 0 || self.pruned > 0
    }
}

/// Owns the overlay panels, keyed by page index
pub struct OverlayPositioner<H: OverlayHost> {
    pub(super) host: H,
    pub(super) panels: BTreeMap<usize, OwnedPanel<H::Panel>>,
}

impl<H: OverlayHost> OverlayPositioner<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            panels: BTreeMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel(&self, page_index: usize) -> Option<&H::Panel> {
        self.panels.get(&page_index).map(|p| &p.handle)
    }

    pub fn placement(&self, page_index: usize) -> Option<PanelPlacement> {
        self.panels.get(&page_index).map(|p| p.placement)
    }

    /// Bring the panels in line with the currently rendered pages.
    ///
    /// Idempotent; a no-op returning [`SyncOutcome::NotReady`] while the
    /// viewer has not produced any page geometry.
    pub fn sync_overlays<S: PageBoxSource + ?Sized>(&mut self, source: &S) -> SyncOutcome {
        let pages = source.page_boxes();
        if pages.is_empty() {
            tracing::debug!("no rendered pages found, overlay sync deferred");
            return SyncOutcome::NotReady;
        }

        let mut report = SyncReport {
            pages: pages.len(),
            ..Default::default()
        };

        // A page that moved to another tier is a different element now
        let live: BTreeMap<usize, LayerTier> = pages.iter().map(|p| (p.index, p.tier)).collect();
        let stale: BTreeSet<usize> = self
            .panels
            .iter()
            .filter(|(index, panel)| live.get(*index) != Some(&panel.tier))
            .map(|(index, _)| *index)
            .collect();
        for index in stale {
            if let Some(panel) = self.panels.remove(&index) {
                self.host.remove_panel(&panel.handle);
                report.pruned += 1;
            }
        }

        for page in &pages {
            let placement = PanelPlacement::for_page(page);
            match self.panels.get_mut(&page.index) {
                Some(panel) => {
                    if panel.placement != placement {
                        self.host.place_panel(&panel.handle, placement);
                        panel.placement = placement;
                        report.moved += 1;
                    }
                }
                None => {
                    let handle = self.host.create_panel(page);
                    self.host.place_panel(&handle, placement);
                    self.panels.insert(
                        page.index,
                        OwnedPanel {
                            handle,
                            tier: page.tier,
                            placement,
                        },
                    );
                    report.created += 1;
                }
            }
        }

        if report.changed_panels() {
            tracing::debug!(
                pages = report.pages,
                created = report.created,
                pruned = report.pruned,
                "overlay panels updated"
            );
        }

        SyncOutcome::Synced(report)
    }

    /// Remove every owned panel
    pub fn teardown(&mut self) {
        for (_, panel) in std::mem::take(&mut self.panels) {
            self.host.remove_panel(&panel.handle);
        }
    }
}
