//! FILENAME: band-engine/src/view.rs
//! Rendered View - the positioned output of the engine.
//!
//! This is what generators consume: pages of absolutely positioned
//! elements. Coordinates are page points with the origin at the top-left
//! corner of the page; writers whose backends measure differently (PDF is
//! bottom-left) convert on their side.

use model::style::{Color, ElementStyle, LineStyle};
use serde::{Deserialize, Serialize};

/// A fully rendered report: ordered pages of positioned elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub title: String,
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    pub pages: Vec<RenderedPage>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// One output page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-based page number.
    pub number: usize,
    pub elements: Vec<RenderedElement>,
}

impl RenderedPage {
    /// The text elements on this page, in placement order.
    pub fn texts(&self) -> impl Iterator<Item = &RenderedText> {
        self.elements.iter().filter_map(|element| match element {
            RenderedElement::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderedElement {
    Text(RenderedText),
    Line(RenderedLine),
    Rect(RenderedRect),
}

/// A run of text anchored at the top-left of its box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedText {
    pub x: f64,
    pub y: f64,
    /// Box width, used for center/right alignment.
    pub width: f64,
    pub text: String,
    pub style: ElementStyle,
    /// True while the text still contains a `{page_count}` marker; the
    /// engine substitutes it once the total is known.
    pub needs_page_count: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stroke: Option<LineStyle>,
    pub fill: Option<Color>,
}
