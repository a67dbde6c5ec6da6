//! Page layout discovery
//!
//! The embedded viewer owns the page DOM. We only measure it, through the
//! narrow [`LayoutTree`] capability, and reduce it to a list of [`PageBox`]es
//! ordered like the logical pages.

use crate::geometry::{Point, Rect};

/// CSS class of the per-page text layer
pub const TEXT_LAYER_CLASS: &str = "rpv-core__text-layer";
/// CSS class of the per-page canvas layer
pub const CANVAS_LAYER_CLASS: &str = "rpv-core__canvas-layer";
/// CSS class of the page container element
pub const VIEWER_PAGE_CLASS: &str = "rpv-core__viewer-page";

/// Family of page elements used to locate pages, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerTier {
    TextLayer,
    CanvasLayer,
    ViewerPage,
}

impl LayerTier {
    /// Tiers in the order they are tried
    pub const LADDER: [LayerTier; 3] = [
        LayerTier::TextLayer,
        LayerTier::CanvasLayer,
        LayerTier::ViewerPage,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            LayerTier::TextLayer => TEXT_LAYER_CLASS,
            LayerTier::CanvasLayer => CANVAS_LAYER_CLASS,
            LayerTier::ViewerPage => VIEWER_PAGE_CLASS,
        }
    }

    /// Page containers get their panel nested inside, filling the page.
    /// Layer tiers get a sibling panel placed over the layer.
    pub fn nests_panel(self) -> bool {
        matches!(self, LayerTier::ViewerPage)
    }
}

/// Measured geometry of one rendered page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Zero-based page index (document order)
    pub index: usize,
    /// Tier the page element was found in
    pub tier: LayerTier,
    /// Bounding box in viewport coordinates
    pub bounds: Rect,
    /// Offset of the element within its offset parent
    pub offset: Point,
}

/// Viewing container geometry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerBox {
    /// Bounding box in viewport coordinates
    pub bounds: Rect,
    /// Current scroll offset
    pub scroll: Point,
}

/// Read-only access to the viewer's element tree
pub trait LayoutTree {
    type Node;

    /// The scrolling container, if mounted
    fn container(&self) -> Option<ContainerBox>;

    /// Elements under the container carrying `class_name`, in document order
    fn query_class(&self, class_name: &str) -> Vec<Self::Node>;

    /// Viewport bounding box of an element
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Offset of an element within its offset parent
    fn offset_in_parent(&self, node: &Self::Node) -> Point;
}

/// Capability the overlay engine depends on: current page geometry
pub trait PageBoxSource {
    fn container(&self) -> Option<ContainerBox>;

    /// Rendered pages in page order; empty while the viewer is not ready
    fn page_boxes(&self) -> Vec<PageBox>;
}

/// [`PageBoxSource`] over a [`LayoutTree`], walking the tier ladder
pub struct TieredPageSource<T> {
    tree: T,
}

impl<T: LayoutTree> TieredPageSource<T> {
    pub fn new(tree: T) -> Self {
        Self { tree }
    }
}

impl<T: LayoutTree> PageBoxSource for TieredPageSource<T> {
    fn container(&self) -> Option<ContainerBox> {
        self.tree.container()
    }

    fn page_boxes(&self) -> Vec<PageBox> {
        if self.tree.container().is_none() {
            return Vec::new();
        }

        for tier in LayerTier::LADDER {
            let nodes = self.tree.query_class(tier.class_name());
            if nodes.is_empty() {
                continue;
            }

            tracing::trace!(?tier, count = nodes.len(), "found page elements");
            return nodes
                .iter()
                .enumerate()
                .map(|(index, node)| PageBox {
                    index,
                    tier,
                    bounds: self.tree.bounding_rect(node),
                    offset: self.tree.offset_in_parent(node),
                })
                .collect();
        }

        Vec::new()
    }
}

/// A pushed measurement of the layout, for hosts that measure on their side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSnapshot {
    pub container: Option<ContainerBox>,
    pub pages: Vec<PageBox>,
}

impl PageBoxSource for LayoutSnapshot {
    fn container(&self) -> Option<ContainerBox> {
        self.container
    }

    fn page_boxes(&self) -> Vec<PageBox> {
        self.pages.clone()
    }
}
