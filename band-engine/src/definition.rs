//! FILENAME: band-engine/src/definition.rs
//! Report Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a report.
//! These structures are designed to be:
//! - Serializable (for saving/loading report definitions)
//! - Immutable during rendering
//! - Built fluently in code via `with_*` methods
//!
//! What a report IS lives here; HOW it is rendered lives in `engine`.

use crate::element::{BandElement, ValueGetter};
use crate::engine::{render_report, RenderError};
use crate::view::RenderedDocument;
use model::style::{ElementStyle, LineStyle};
use model::unit::{CM, MM};
use model::value::Value;
use model::Record;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// Paper size of the generated pages, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0 * MM, 297.0 * MM),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Page margins in points. The printable area is the page minus these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins::uniform(1.0 * CM)
    }
}

impl Margins {
    pub fn uniform(size: f64) -> Self {
        Margins {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }
}

// ============================================================================
// BANDS
// ============================================================================

/// Optional border strokes drawn on a band's edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandBorders {
    pub top: Option<LineStyle>,
    pub right: Option<LineStyle>,
    pub bottom: Option<LineStyle>,
    pub left: Option<LineStyle>,
}

impl BandBorders {
    /// The same stroke on all four edges.
    pub fn all(style: LineStyle) -> Self {
        BandBorders {
            top: Some(style.clone()),
            right: Some(style.clone()),
            bottom: Some(style.clone()),
            left: Some(style),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

/// A horizontal strip of the page holding positioned elements.
///
/// Element coordinates are relative to the band's top-left corner. Child
/// bands render immediately below their parent and the whole family is
/// paginated as one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportBand {
    /// Band height in points.
    pub height: f64,
    pub elements: Vec<BandElement>,
    pub borders: BandBorders,
    pub child_bands: Vec<ReportBand>,
    /// Start a fresh page before this band (no-op on a still-empty page).
    pub force_new_page: bool,
}

impl ReportBand {
    pub fn new(height: f64) -> Self {
        ReportBand {
            height,
            ..ReportBand::default()
        }
    }

    pub fn with_element(mut self, element: impl Into<BandElement>) -> Self {
        self.elements.push(element.into());
        self
    }

    pub fn with_elements(mut self, elements: Vec<BandElement>) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn with_borders(mut self, borders: BandBorders) -> Self {
        self.borders = borders;
        self
    }

    pub fn with_child_band(mut self, band: ReportBand) -> Self {
        self.child_bands.push(band);
        self
    }

    pub fn with_force_new_page(mut self, force: bool) -> Self {
        self.force_new_page = force;
        self
    }

    /// Height of the band including all child bands, recursively.
    pub fn total_height(&self) -> f64 {
        self.height
            + self
                .child_bands
                .iter()
                .map(|b| b.total_height())
                .sum::<f64>()
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// One level of grouping over the record sequence.
///
/// Records are expected pre-sorted by all group keys, outermost first.
/// Grouping is a control break: a partition ends where the key value
/// changes, so unsorted input yields one partition per run rather than
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportGroup {
    /// Record attribute whose value is the grouping key.
    pub attribute_name: String,
    /// Programmatic key, taking precedence over `attribute_name`.
    #[serde(skip)]
    pub key_getter: Option<ValueGetter>,
    /// Rendered at the start of each partition.
    pub band_header: Option<ReportBand>,
    /// Rendered at the end of each partition.
    pub band_footer: Option<ReportBand>,
}

impl ReportGroup {
    pub fn new(attribute_name: impl Into<String>) -> Self {
        ReportGroup {
            attribute_name: attribute_name.into(),
            key_getter: None,
            band_header: None,
            band_footer: None,
        }
    }

    pub fn with_key_getter(mut self, getter: ValueGetter) -> Self {
        self.key_getter = Some(getter);
        self
    }

    pub fn with_header(mut self, band: ReportBand) -> Self {
        self.band_header = Some(band);
        self
    }

    pub fn with_footer(mut self, band: ReportBand) -> Self {
        self.band_footer = Some(band);
        self
    }

    /// The grouping key for one record.
    pub fn key_for(&self, record: &Record) -> Value {
        match &self.key_getter {
            Some(getter) => getter.call(record),
            None => record.value(&self.attribute_name),
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// A complete report definition.
///
/// Deserialization fills omitted fields from defaults, so a JSON
/// definition only needs to spell out what it uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub title: String,
    pub author: String,
    pub page_size: PageSize,
    pub margins: Margins,

    /// First band on every page.
    pub band_page_header: Option<ReportBand>,
    /// Last band on every page, anchored to the bottom margin.
    pub band_page_footer: Option<ReportBand>,
    /// Rendered once, before anything else on the first page.
    pub band_begin: Option<ReportBand>,
    /// Rendered once, after everything else on the last page.
    pub band_summary: Option<ReportBand>,
    /// Rendered once per record.
    pub band_detail: Option<ReportBand>,

    /// Grouping levels, outermost first.
    pub groups: Vec<ReportGroup>,

    /// Style applied to text elements that carry none of their own.
    pub default_style: ElementStyle,

    /// Render a (record-free) document even when the record slice is empty.
    pub print_if_empty: bool,
}

impl Default for Report {
    fn default() -> Self {
        Report::new("")
    }
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Report {
            title: title.into(),
            author: String::new(),
            page_size: PageSize::A4,
            margins: Margins::default(),
            band_page_header: None,
            band_page_footer: None,
            band_begin: None,
            band_summary: None,
            band_detail: None,
            groups: Vec::new(),
            default_style: ElementStyle::default(),
            print_if_empty: false,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_page_header(mut self, band: ReportBand) -> Self {
        self.band_page_header = Some(band);
        self
    }

    pub fn with_page_footer(mut self, band: ReportBand) -> Self {
        self.band_page_footer = Some(band);
        self
    }

    pub fn with_begin(mut self, band: ReportBand) -> Self {
        self.band_begin = Some(band);
        self
    }

    pub fn with_summary(mut self, band: ReportBand) -> Self {
        self.band_summary = Some(band);
        self
    }

    pub fn with_detail(mut self, band: ReportBand) -> Self {
        self.band_detail = Some(band);
        self
    }

    /// Append a grouping level (outermost first).
    pub fn with_group(mut self, group: ReportGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_default_style(mut self, style: ElementStyle) -> Self {
        self.default_style = style;
        self
    }

    pub fn with_print_if_empty(mut self, print_if_empty: bool) -> Self {
        self.print_if_empty = print_if_empty;
        self
    }

    /// Width of the printable area in points.
    pub fn printable_width(&self) -> f64 {
        let (width, _) = self.page_size.dimensions();
        width - self.margins.left - self.margins.right
    }

    /// Height of the printable area in points.
    pub fn printable_height(&self) -> f64 {
        let (_, height) = self.page_size.dimensions();
        height - self.margins.top - self.margins.bottom
    }

    /// Printable height left for body bands once page bands are placed.
    pub fn body_height(&self) -> f64 {
        let page_bands = self.page_band_height(&self.band_page_header)
            + self.page_band_height(&self.band_page_footer);
        self.printable_height() - page_bands
    }

    fn page_band_height(&self, band: &Option<ReportBand>) -> f64 {
        band.as_ref().map(|b| b.total_height()).unwrap_or(0.0)
    }

    /// Check the definition for geometry that can never render.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let (width, height) = self.page_size.dimensions();
        if self.printable_width() <= 0.0 || self.printable_height() <= 0.0 {
            return Err(DefinitionError::EmptyPrintableArea { width, height });
        }

        let available = self.body_height();
        if available <= 0.0 {
            return Err(DefinitionError::PageBandsFillPage {
                printable: self.printable_height(),
            });
        }

        self.check_band_fits("begin", &self.band_begin, available)?;
        self.check_band_fits("summary", &self.band_summary, available)?;
        self.check_band_fits("detail", &self.band_detail, available)?;
        for (depth, group) in self.groups.iter().enumerate() {
            let name = format!("group[{}] '{}'", depth, group.attribute_name);
            self.check_band_fits(&format!("{} header", name), &group.band_header, available)?;
            self.check_band_fits(&format!("{} footer", name), &group.band_footer, available)?;
        }
        Ok(())
    }

    fn check_band_fits(
        &self,
        name: &str,
        band: &Option<ReportBand>,
        available: f64,
    ) -> Result<(), DefinitionError> {
        if let Some(band) = band {
            let height = band.total_height();
            if height > available {
                return Err(DefinitionError::BandTooTall {
                    band: name.to_string(),
                    height,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Render this report over `records`. Convenience for
    /// [`render_report`](crate::engine::render_report).
    pub fn render(&self, records: &[Record]) -> Result<RenderedDocument, RenderError> {
        render_report(self, records)
    }
}

/// Errors found by [`Report::validate`].
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("printable area is empty on a {width:.0}x{height:.0}pt page")]
    EmptyPrintableArea { width: f64, height: f64 },

    #[error("page header and footer leave no room on a {printable:.0}pt printable page")]
    PageBandsFillPage { printable: f64 },

    #[error("band {band} is {height:.1}pt tall but only {available:.1}pt fit on a page")]
    BandTooTall {
        band: String,
        height: f64,
        available: f64,
    },
}
