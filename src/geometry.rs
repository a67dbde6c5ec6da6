//! Viewport-to-page geometry
//!
//! Maps rectangles reported by the browser selection API (viewport
//! coordinates) onto the rendered page they belong to. Resolution never
//! fails while a container exists: ambiguous or missing page geometry
//! degrades to a best-effort placement instead of dropping the rectangle.

use serde::{Deserialize, Serialize};

use crate::layout::{ContainerBox, PageBox, PageBoxSource};

/// Axis-aligned rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether `other` lies entirely inside this rectangle (edges inclusive)
    pub fn contains(&self, other: &Rect) -> bool {
        other.top >= self.top
            && other.bottom() <= self.bottom()
            && other.left >= self.left
            && other.right() <= self.right()
    }

    /// Whether the two rectangles share a non-empty area
    pub fn intersects(&self, other: &Rect) -> bool {
        other.left < self.right()
            && other.right() > self.left
            && other.top < self.bottom()
            && other.bottom() > self.top
    }

    /// Midpoint of the bottom edge
    pub fn bottom_center(&self) -> Point {
        Point {
            x: self.left + self.width / 2.0,
            y: self.bottom(),
        }
    }
}

/// A point in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle relative to one rendered page's content box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRect {
    /// Zero-based index into the rendered page list
    #[serde(default)]
    pub page_index: usize,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Portion of the highlight text covered by this rectangle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PageRect {
    fn translated(rect: &Rect, page_index: usize, origin: Point) -> Self {
        Self {
            page_index,
            left: rect.left - origin.x,
            top: rect.top - origin.y,
            width: rect.width,
            height: rect.height,
            text: None,
        }
    }
}

/// Resolve a viewport rectangle against measured page geometry.
///
/// Ladder:
/// 1. first page (in page order) that fully contains the rectangle
/// 2. first page with a non-empty intersection
/// 3. container-relative coordinates (scroll included) on page 0
///
/// Returns `None` only when there is no container at all.
pub fn resolve(rect: &Rect, pages: &[PageBox], container: Option<&ContainerBox>) -> Option<PageRect> {
    if let Some(page) = pages.iter().find(|p| p.bounds.contains(rect)) {
        return Some(PageRect::translated(rect, page.index, origin_of(&page.bounds)));
    }

    if let Some(page) = pages.iter().find(|p| p.bounds.intersects(rect)) {
        tracing::trace!(page = page.index, "rect straddles page edge, using first intersecting page");
        return Some(PageRect::translated(rect, page.index, origin_of(&page.bounds)));
    }

    let container = container?;
    tracing::debug!(pages = pages.len(), "no page geometry for rect, falling back to container");
    Some(PageRect {
        page_index: 0,
        left: rect.left - container.bounds.left + container.scroll.x,
        top: rect.top - container.bounds.top + container.scroll.y,
        width: rect.width,
        height: rect.height,
        text: None,
    })
}

/// Resolve a viewport rectangle using the current state of a page source
pub fn resolve_with<S: PageBoxSource + ?Sized>(source: &S, rect: &Rect) -> Option<PageRect> {
    let container = source.container();
    let pages = source.page_boxes();
    resolve(rect, &pages, container.as_ref())
}

fn origin_of(bounds: &Rect) -> Point {
    Point::new(bounds.left, bounds.top)
}
