//! FILENAME: band-engine/src/engine.rs
//! Report Renderer - grouping, band layout and pagination.
//!
//! Rendering runs in distinct steps:
//! 1. Validate the definition (geometry that can never render fails fast).
//! 2. Compute each record's group key path.
//! 3. Flatten the report into band instances in document order: begin,
//!    then a control-break walk over the groups (headers on the way in,
//!    details at the deepest level, footers on the way out), then summary.
//! 4. Paginate: each page opens with the page header and closes with the
//!    page footer; a body band that does not fit moves to a fresh page and
//!    is never split.
//! 5. Substitute `{page_count}` once the total is known.
//!
//! Elements resolve against a context carrying the current record, the
//! band's record scope and the page number. Aggregates over a scope are
//! accumulated once per attribute and memoized.

use crate::aggregate::{Accumulator, FieldAction};
use crate::definition::{BandBorders, DefinitionError, Report, ReportBand};
use crate::element::{BandElement, ObjectValue, DEFAULT_ELEMENT_WIDTH};
use crate::view::{
    RenderedDocument, RenderedElement, RenderedLine, RenderedPage, RenderedRect, RenderedText,
};
use chrono::NaiveDateTime;
use model::format::format_value;
use model::value::Value;
use model::Record;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Vertical slack when testing whether a band fits, so accumulated float
/// drift cannot force a spurious page break.
const FIT_EPSILON: f64 = 0.01;

/// Expansion applied to a bare `{now}` placeholder.
const DEFAULT_NOW_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors surfaced by [`render_report`].
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid report definition: {0}")]
    Definition(#[from] DefinitionError),

    #[error("no records to render and print_if_empty is not set")]
    NothingToRender,
}

/// Render `report` over pre-sorted `records` into positioned pages.
pub fn render_report(report: &Report, records: &[Record]) -> Result<RenderedDocument, RenderError> {
    ReportRenderer::new(report, records).render()
}

/// One record's group key values, outermost group first.
type KeyPath = SmallVec<[Value; 4]>;

/// Which slot a flattened band instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BandKind {
    Begin,
    GroupHeader(usize),
    Detail,
    GroupFooter(usize),
    Summary,
}

/// One band occurrence in document order, before pagination.
struct FlatBand<'a> {
    band: &'a ReportBand,
    kind: BandKind,
    /// The current record, for detail bands.
    record_index: Option<usize>,
    /// Half-open record range this instance aggregates over.
    scope: (usize, usize),
}

impl FlatBand<'_> {
    /// Record standing in as "current" for bands that have none of their
    /// own: the first of the scope on the way into a group, the last on
    /// the way out.
    fn fallback_record(&self) -> Option<usize> {
        let (start, end) = self.scope;
        if start >= end {
            return None;
        }
        match self.kind {
            BandKind::GroupFooter(_) | BandKind::Summary => Some(end - 1),
            _ => Some(start),
        }
    }
}

/// Resolution context for the elements of one band instance.
struct ElementContext<'r> {
    record: Option<&'r Record>,
    scope: (usize, usize),
    page_number: usize,
}

/// Page geometry shared by every page of a document.
struct PageGeometry {
    left: f64,
    top: f64,
    body_top: f64,
    body_bottom: f64,
}

/// A page being assembled.
struct PageInProgress {
    number: usize,
    elements: Vec<RenderedElement>,
    cursor: f64,
    has_body: bool,
    /// Most recent record seen on this page, for the page footer.
    last_record: Option<usize>,
}

enum SystemToken {
    Text(String),
    PageCount,
    Unknown,
}

pub struct ReportRenderer<'a> {
    report: &'a Report,
    records: &'a [Record],
    /// Wall clock fixed once, so every `{now}` in the document agrees.
    now: NaiveDateTime,
    /// Accumulators memoized by (scope start, scope end, attribute).
    aggregates: FxHashMap<(usize, usize, String), Accumulator>,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(report: &'a Report, records: &'a [Record]) -> Self {
        ReportRenderer {
            report,
            records,
            now: chrono::Local::now().naive_local(),
            aggregates: FxHashMap::default(),
        }
    }

    pub fn render(&mut self) -> Result<RenderedDocument, RenderError> {
        let report = self.report;

        // Step 1: Validate the definition
        report.validate()?;

        if self.records.is_empty() && !report.print_if_empty {
            return Err(RenderError::NothingToRender);
        }

        // Step 2: Compute each record's group key path
        let key_paths = self.build_key_paths();

        // Step 3: Flatten into band instances in document order
        let full_scope = (0, self.records.len());
        let mut flat = Vec::new();
        if let Some(band) = &report.band_begin {
            flat.push(FlatBand {
                band,
                kind: BandKind::Begin,
                record_index: None,
                scope: full_scope,
            });
        }
        self.flatten_scope(0, self.records.len(), 0, &key_paths, &mut flat);
        if let Some(band) = &report.band_summary {
            flat.push(FlatBand {
                band,
                kind: BandKind::Summary,
                record_index: None,
                scope: full_scope,
            });
        }
        log::debug!(
            "flattened {} band instances over {} records",
            flat.len(),
            self.records.len()
        );

        // Step 4: Paginate
        let pages = self.paginate(&flat);

        // Step 5: Resolve page totals unknown during layout
        let (page_width, page_height) = report.page_size.dimensions();
        let mut document = RenderedDocument {
            title: report.title.clone(),
            page_width,
            page_height,
            pages,
        };
        finalize_page_counts(&mut document);

        log::debug!("rendered {} pages", document.pages.len());
        Ok(document)
    }

    // ========================================================================
    // GROUPING
    // ========================================================================

    fn build_key_paths(&self) -> Vec<KeyPath> {
        let report = self.report;
        self.records
            .iter()
            .map(|record| {
                report
                    .groups
                    .iter()
                    .map(|group| group.key_for(record))
                    .collect()
            })
            .collect()
    }

    /// Control-break walk over one partition at `depth`. Emits group
    /// headers on the way in, details at the deepest level and footers on
    /// the way out, so nesting order falls out of the recursion.
    fn flatten_scope(
        &self,
        start: usize,
        end: usize,
        depth: usize,
        key_paths: &[KeyPath],
        out: &mut Vec<FlatBand<'a>>,
    ) {
        let report = self.report;

        if depth == report.groups.len() {
            if let Some(band) = &report.band_detail {
                for index in start..end {
                    out.push(FlatBand {
                        band,
                        kind: BandKind::Detail,
                        record_index: Some(index),
                        scope: (start, end),
                    });
                }
            }
            return;
        }

        let group = &report.groups[depth];
        let mut run_start = start;
        while run_start < end {
            let mut run_end = run_start + 1;
            while run_end < end && key_paths[run_end][depth] == key_paths[run_start][depth] {
                run_end += 1;
            }

            if let Some(band) = &group.band_header {
                out.push(FlatBand {
                    band,
                    kind: BandKind::GroupHeader(depth),
                    record_index: None,
                    scope: (run_start, run_end),
                });
            }
            self.flatten_scope(run_start, run_end, depth + 1, key_paths, out);
            if let Some(band) = &group.band_footer {
                out.push(FlatBand {
                    band,
                    kind: BandKind::GroupFooter(depth),
                    record_index: None,
                    scope: (run_start, run_end),
                });
            }

            run_start = run_end;
        }
    }

    // ========================================================================
    // PAGINATION
    // ========================================================================

    fn paginate(&mut self, flat: &[FlatBand<'a>]) -> Vec<RenderedPage> {
        let report = self.report;
        let records = self.records;
        let (_, page_height) = report.page_size.dimensions();
        let header_height = band_height(&report.band_page_header);
        let footer_height = band_height(&report.band_page_footer);
        let geometry = PageGeometry {
            left: report.margins.left,
            top: report.margins.top,
            body_top: report.margins.top + header_height,
            body_bottom: page_height - report.margins.bottom - footer_height,
        };

        let mut pages: Vec<RenderedPage> = Vec::new();
        let mut current: Option<PageInProgress> = None;

        for flat_band in flat {
            let height = flat_band.band.total_height();
            let current_record = flat_band.record_index.or_else(|| flat_band.fallback_record());

            let mut page = match current.take() {
                Some(page) => {
                    let overflow = page.cursor + height > geometry.body_bottom + FIT_EPSILON;
                    let forced = flat_band.band.force_new_page && page.has_body;
                    if (overflow && page.has_body) || forced {
                        pages.push(self.finish_page(page, &geometry));
                        self.start_page(pages.len() + 1, current_record, &geometry)
                    } else {
                        page
                    }
                }
                None => self.start_page(1, current_record, &geometry),
            };

            log::trace!(
                "placing {:?} on page {} at y {:.1}",
                flat_band.kind,
                page.number,
                page.cursor
            );

            let ctx = ElementContext {
                record: current_record.map(|index| &records[index]),
                scope: flat_band.scope,
                page_number: page.number,
            };
            page.cursor =
                self.place_band(flat_band.band, geometry.left, page.cursor, &ctx, &mut page.elements);
            page.has_body = true;
            page.last_record = current_record.or(page.last_record);
            current = Some(page);
        }

        // A record-free rendition still produces one page of page bands
        let last = match current.take() {
            Some(page) => page,
            None => self.start_page(1, None, &geometry),
        };
        pages.push(self.finish_page(last, &geometry));
        pages
    }

    fn start_page(
        &mut self,
        number: usize,
        current_record: Option<usize>,
        geometry: &PageGeometry,
    ) -> PageInProgress {
        let report = self.report;
        let records = self.records;
        let mut page = PageInProgress {
            number,
            elements: Vec::new(),
            cursor: geometry.body_top,
            has_body: false,
            last_record: current_record,
        };

        if let Some(band) = &report.band_page_header {
            let record_index = current_record.or(first_index(records));
            let ctx = ElementContext {
                record: record_index.map(|index| &records[index]),
                scope: (0, records.len()),
                page_number: number,
            };
            self.place_band(band, geometry.left, geometry.top, &ctx, &mut page.elements);
        }
        page
    }

    fn finish_page(&mut self, mut page: PageInProgress, geometry: &PageGeometry) -> RenderedPage {
        let report = self.report;
        let records = self.records;

        if let Some(band) = &report.band_page_footer {
            let record_index = page.last_record.or(first_index(records));
            let ctx = ElementContext {
                record: record_index.map(|index| &records[index]),
                scope: (0, records.len()),
                page_number: page.number,
            };
            self.place_band(
                band,
                geometry.left,
                geometry.body_bottom,
                &ctx,
                &mut page.elements,
            );
        }

        RenderedPage {
            number: page.number,
            elements: page.elements,
        }
    }

    // ========================================================================
    // BAND PLACEMENT
    // ========================================================================

    /// Place one band at (x, y), then its child bands below it.
    /// Returns the y coordinate just under the placed family.
    fn place_band(
        &mut self,
        band: &ReportBand,
        x: f64,
        y: f64,
        ctx: &ElementContext<'_>,
        out: &mut Vec<RenderedElement>,
    ) -> f64 {
        let report = self.report;
        let band_width = report.printable_width();

        for element in &band.elements {
            match element {
                BandElement::Label(label) => {
                    out.push(RenderedElement::Text(RenderedText {
                        x: x + label.left,
                        y: y + label.top,
                        width: label.width.unwrap_or(DEFAULT_ELEMENT_WIDTH),
                        text: label.text.clone(),
                        style: label
                            .style
                            .clone()
                            .unwrap_or_else(|| report.default_style.clone()),
                        needs_page_count: false,
                    }));
                }
                BandElement::Value(value) => {
                    let text = self.resolve_object_value(value, ctx);
                    out.push(RenderedElement::Text(RenderedText {
                        x: x + value.left,
                        y: y + value.top,
                        width: value.width.unwrap_or(DEFAULT_ELEMENT_WIDTH),
                        text,
                        style: value
                            .style
                            .clone()
                            .unwrap_or_else(|| report.default_style.clone()),
                        needs_page_count: false,
                    }));
                }
                BandElement::SystemField(field) => {
                    let (text, needs_page_count) =
                        self.expand_system_text(&field.expression, ctx);
                    out.push(RenderedElement::Text(RenderedText {
                        x: x + field.left,
                        y: y + field.top,
                        width: field.width.unwrap_or(DEFAULT_ELEMENT_WIDTH),
                        text,
                        style: field
                            .style
                            .clone()
                            .unwrap_or_else(|| report.default_style.clone()),
                        needs_page_count,
                    }));
                }
                BandElement::Line(line) => {
                    out.push(RenderedElement::Line(RenderedLine {
                        x1: x + line.x1,
                        y1: y + line.y1,
                        x2: x + line.x2,
                        y2: y + line.y2,
                        style: line.style.clone(),
                    }));
                }
                BandElement::Rect(rect) => {
                    out.push(RenderedElement::Rect(RenderedRect {
                        x: x + rect.left,
                        y: y + rect.top,
                        width: rect.width,
                        height: rect.height,
                        stroke: rect.stroke.clone(),
                        fill: rect.fill,
                    }));
                }
            }
        }

        place_borders(&band.borders, x, y, band_width, band.height, out);

        let mut next_y = y + band.height;
        for child in &band.child_bands {
            next_y = self.place_band(child, x, next_y, ctx, out);
        }
        next_y
    }

    // ========================================================================
    // ELEMENT RESOLUTION
    // ========================================================================

    fn resolve_object_value(&mut self, element: &ObjectValue, ctx: &ElementContext<'_>) -> String {
        let value = match element.action {
            Some(action) => self.aggregate_value(element, action, ctx.scope),
            None => match (&element.getter, ctx.record) {
                (Some(getter), Some(record)) => getter.call(record),
                (None, Some(record)) => record.value(&element.attribute_name),
                (_, None) => Value::Empty,
            },
        };

        let formatted = match &element.number_format {
            Some(format) => format_value(&value, format),
            None => value.display(),
        };

        match &element.display_format {
            Some(template) => template.replacen("{}", &formatted, 1),
            None => formatted,
        }
    }

    fn aggregate_value(
        &mut self,
        element: &ObjectValue,
        action: FieldAction,
        scope: (usize, usize),
    ) -> Value {
        let records = self.records;
        let (start, end) = scope;

        if let Some(getter) = &element.getter {
            // Closure identity cannot key the memo; accumulate directly.
            let mut acc = Accumulator::new();
            for record in &records[start..end] {
                acc.add(&getter.call(record));
            }
            return acc.compute(action);
        }

        let key = (start, end, element.attribute_name.clone());
        let acc = self.aggregates.entry(key).or_insert_with(|| {
            let mut acc = Accumulator::new();
            for record in &records[start..end] {
                acc.add(&record.value(&element.attribute_name));
            }
            acc
        });
        acc.compute(action)
    }

    /// Expand `{placeholder}` tokens. Returns the text and whether it still
    /// carries a `{page_count}` marker for the finalize pass.
    fn expand_system_text(&self, expression: &str, ctx: &ElementContext<'_>) -> (String, bool) {
        let mut out = String::with_capacity(expression.len());
        let mut needs_page_count = false;
        let mut rest = expression;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let end = match tail.find('}') {
                Some(end) => end,
                None => {
                    // Unterminated brace: keep the remainder verbatim
                    out.push_str(tail);
                    return (out, needs_page_count);
                }
            };

            let token = &tail[1..end];
            match self.resolve_system_token(token, ctx) {
                SystemToken::Text(text) => out.push_str(&text),
                SystemToken::PageCount => {
                    needs_page_count = true;
                    out.push('{');
                    out.push_str(token);
                    out.push('}');
                }
                SystemToken::Unknown => {
                    out.push('{');
                    out.push_str(token);
                    out.push('}');
                }
            }
            rest = &tail[end + 1..];
        }

        out.push_str(rest);
        (out, needs_page_count)
    }

    fn resolve_system_token(&self, token: &str, ctx: &ElementContext<'_>) -> SystemToken {
        match token {
            "report_title" => SystemToken::Text(self.report.title.clone()),
            "report_author" => SystemToken::Text(self.report.author.clone()),
            "page_number" => SystemToken::Text(ctx.page_number.to_string()),
            "page_count" => SystemToken::PageCount,
            "now" => SystemToken::Text(self.now.format(DEFAULT_NOW_FORMAT).to_string()),
            _ => match token.strip_prefix("now:") {
                Some(pattern) => match self.format_now(pattern) {
                    Some(text) => SystemToken::Text(text),
                    None => SystemToken::Unknown,
                },
                None => SystemToken::Unknown,
            },
        }
    }

    /// Format the render timestamp with a user-supplied chrono pattern,
    /// refusing invalid patterns instead of panicking mid-render.
    fn format_now(&self, pattern: &str) -> Option<String> {
        use chrono::format::{Item, StrftimeItems};
        use std::fmt::Write;

        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        // Timezone fields (%Z, %z, %+) parse without error but a naive
        // timestamp cannot print them; the failure only shows at format time.
        let mut formatted = String::new();
        write!(formatted, "{}", self.now.format_with_items(items.iter())).ok()?;
        Some(formatted)
    }
}

fn band_height(band: &Option<ReportBand>) -> f64 {
    band.as_ref().map(|b| b.total_height()).unwrap_or(0.0)
}

fn first_index(records: &[Record]) -> Option<usize> {
    if records.is_empty() {
        None
    } else {
        Some(0)
    }
}

fn place_borders(
    borders: &BandBorders,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    out: &mut Vec<RenderedElement>,
) {
    if borders.is_empty() {
        return;
    }
    if let Some(style) = &borders.top {
        out.push(RenderedElement::Line(RenderedLine {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y,
            style: style.clone(),
        }));
    }
    if let Some(style) = &borders.bottom {
        out.push(RenderedElement::Line(RenderedLine {
            x1: x,
            y1: y + height,
            x2: x + width,
            y2: y + height,
            style: style.clone(),
        }));
    }
    if let Some(style) = &borders.left {
        out.push(RenderedElement::Line(RenderedLine {
            x1: x,
            y1: y,
            x2: x,
            y2: y + height,
            style: style.clone(),
        }));
    }
    if let Some(style) = &borders.right {
        out.push(RenderedElement::Line(RenderedLine {
            x1: x + width,
            y1: y,
            x2: x + width,
            y2: y + height,
            style: style.clone(),
        }));
    }
}

fn finalize_page_counts(document: &mut RenderedDocument) {
    let total = document.pages.len().to_string();
    for page in &mut document.pages {
        for element in &mut page.elements {
            if let RenderedElement::Text(text) = element {
                if text.needs_page_count {
                    text.text = text.text.replace("{page_count}", &total);
                    text.needs_page_count = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Margins, PageSize, ReportGroup};
    use crate::element::{Label, SystemField, ValueGetter};
    use chrono::Datelike;
    use model::style::LineStyle;

    fn create_test_records() -> Vec<Record> {
        vec![
            Record::new()
                .with("category", "Furniture")
                .with("name", "Chair")
                .with("price", 30.0),
            Record::new()
                .with("category", "Furniture")
                .with("name", "Desk")
                .with("price", 100.0),
            Record::new()
                .with("category", "Stationery")
                .with("name", "Pen")
                .with("price", 2.0),
            Record::new()
                .with("category", "Stationery")
                .with("name", "Paper")
                .with("price", 5.0),
            Record::new()
                .with("category", "Stationery")
                .with("name", "Pencil")
                .with("price", 1.0),
        ]
    }

    /// Small page that fits two 30pt detail bands per page:
    /// printable body runs from y=10 to y=90.
    fn create_small_page_report() -> Report {
        Report::new("Small")
            .with_page_size(PageSize::Custom {
                width: 200.0,
                height: 100.0,
            })
            .with_margins(Margins::uniform(10.0))
    }

    fn page_texts(page: &RenderedPage) -> Vec<String> {
        page.texts().map(|t| t.text.clone()).collect()
    }

    fn line_count(page: &RenderedPage) -> usize {
        page.elements
            .iter()
            .filter(|e| matches!(e, RenderedElement::Line(_)))
            .count()
    }

    #[test]
    fn test_details_render_in_input_order() {
        let report = Report::new("Products")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "name")));
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(document.page_count(), 1);
        assert_eq!(
            page_texts(&document.pages[0]),
            vec!["Chair", "Desk", "Pen", "Paper", "Pencil"]
        );
    }

    #[test]
    fn test_group_header_and_footer_wrap_details() {
        let report = Report::new("Products")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(10.0, 0.0, "name")))
            .with_group(
                ReportGroup::new("category")
                    .with_header(
                        ReportBand::new(20.0).with_element(ObjectValue::new(0.0, 0.0, "category")),
                    )
                    .with_footer(ReportBand::new(14.0).with_element(Label::new(0.0, 0.0, "end"))),
            );
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(
            page_texts(&document.pages[0]),
            vec![
                "Furniture",
                "Chair",
                "Desk",
                "end",
                "Stationery",
                "Pen",
                "Paper",
                "Pencil",
                "end"
            ]
        );
    }

    #[test]
    fn test_nested_groups_open_outer_first_close_inner_first() {
        let records = vec![
            Record::new().with("region", "North").with("cat", "A").with("item", "i1"),
            Record::new().with("region", "North").with("cat", "B").with("item", "i2"),
            Record::new().with("region", "South").with("cat", "A").with("item", "i3"),
        ];
        let report = Report::new("Nested")
            .with_detail(ReportBand::new(12.0).with_element(ObjectValue::new(0.0, 0.0, "item")))
            .with_group(
                ReportGroup::new("region")
                    .with_header(
                        ReportBand::new(12.0).with_element(ObjectValue::new(0.0, 0.0, "region")),
                    )
                    .with_footer(
                        ReportBand::new(12.0).with_element(Label::new(0.0, 0.0, "end-region")),
                    ),
            )
            .with_group(
                ReportGroup::new("cat")
                    .with_header(
                        ReportBand::new(12.0).with_element(ObjectValue::new(0.0, 0.0, "cat")),
                    )
                    .with_footer(
                        ReportBand::new(12.0).with_element(Label::new(0.0, 0.0, "end-cat")),
                    ),
            );
        let document = report.render(&records).unwrap();

        assert_eq!(
            page_texts(&document.pages[0]),
            vec![
                "North", "A", "i1", "end-cat", "B", "i2", "end-cat", "end-region", "South", "A",
                "i3", "end-cat", "end-region"
            ]
        );
    }

    #[test]
    fn test_aggregates_scope_to_partition() {
        let report = Report::new("Products")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(10.0, 0.0, "name")))
            .with_group(
                ReportGroup::new("category").with_footer(
                    ReportBand::new(14.0).with_element(
                        ObjectValue::new(0.0, 0.0, "price")
                            .with_action(FieldAction::Sum)
                            .with_display_format("Total: {}"),
                    ),
                ),
            )
            .with_summary(
                ReportBand::new(14.0).with_element(
                    ObjectValue::new(0.0, 0.0, "name")
                        .with_action(FieldAction::Count)
                        .with_display_format("{} products"),
                ),
            );
        let document = report.render(&create_test_records()).unwrap();
        let texts = page_texts(&document.pages[0]);

        assert!(texts.contains(&"Total: 130".to_string()));
        assert!(texts.contains(&"Total: 8".to_string()));
        assert!(texts.contains(&"5 products".to_string()));
    }

    #[test]
    fn test_aggregate_in_group_header_sees_whole_partition() {
        let report = Report::new("Products")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(10.0, 0.0, "name")))
            .with_group(
                ReportGroup::new("category").with_header(
                    ReportBand::new(14.0).with_element(
                        ObjectValue::new(0.0, 0.0, "name")
                            .with_action(FieldAction::Count)
                            .with_display_format("{} items"),
                    ),
                ),
            );
        let document = report.render(&create_test_records()).unwrap();
        let texts = page_texts(&document.pages[0]);

        assert_eq!(texts[0], "2 items");
        assert_eq!(texts[3], "3 items");
    }

    #[test]
    fn test_getter_backed_aggregate() {
        let report = Report::new("Products").with_summary(
            ReportBand::new(14.0).with_element(
                ObjectValue::new(0.0, 0.0, "unused")
                    .with_getter(ValueGetter::new(|record| {
                        Value::Number(record.value("price").as_number().unwrap_or(0.0) * 2.0)
                    }))
                    .with_action(FieldAction::Sum),
            ),
        );
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(page_texts(&document.pages[0]), vec!["276"]);
    }

    #[test]
    fn test_pagination_fills_pages_without_splitting_bands() {
        let report = create_small_page_report()
            .with_detail(ReportBand::new(30.0).with_element(ObjectValue::new(0.0, 0.0, "name")));
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(document.page_count(), 3);
        let per_page: Vec<usize> = document
            .pages
            .iter()
            .map(|p| page_texts(p).len())
            .collect();
        assert_eq!(per_page, vec![2, 2, 1]);
        assert_eq!(page_texts(&document.pages[2]), vec!["Pencil"]);
    }

    #[test]
    fn test_page_number_and_page_count_fields() {
        let report = create_small_page_report()
            .with_page_header(
                ReportBand::new(10.0)
                    .with_element(SystemField::new(0.0, 0.0, "Page {page_number} of {page_count}")),
            )
            .with_detail(ReportBand::new(30.0).with_element(ObjectValue::new(0.0, 0.0, "name")));
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(document.page_count(), 3);
        for (i, page) in document.pages.iter().enumerate() {
            let texts = page_texts(page);
            assert_eq!(texts[0], format!("Page {} of 3", i + 1));
        }
    }

    #[test]
    fn test_begin_on_first_page_summary_on_last() {
        let report = create_small_page_report()
            .with_begin(ReportBand::new(30.0).with_element(Label::new(0.0, 0.0, "B")))
            .with_summary(ReportBand::new(30.0).with_element(Label::new(0.0, 0.0, "S")))
            .with_detail(ReportBand::new(30.0).with_element(ObjectValue::new(0.0, 0.0, "name")));
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(document.page_count(), 4);
        assert_eq!(page_texts(&document.pages[0])[0], "B");
        let last = page_texts(&document.pages[3]);
        assert_eq!(last[last.len() - 1], "S");
        for page in &document.pages[1..3] {
            let texts = page_texts(page);
            assert!(!texts.contains(&"B".to_string()));
            assert!(!texts.contains(&"S".to_string()));
        }
    }

    #[test]
    fn test_page_header_and_footer_on_every_page() {
        let report = create_small_page_report()
            .with_page_header(ReportBand::new(10.0).with_element(Label::new(0.0, 0.0, "head")))
            .with_page_footer(ReportBand::new(10.0).with_element(Label::new(0.0, 0.0, "foot")))
            .with_detail(ReportBand::new(30.0).with_element(ObjectValue::new(0.0, 0.0, "name")));
        let document = report.render(&create_test_records()).unwrap();

        assert!(document.page_count() > 1);
        for page in &document.pages {
            let texts = page_texts(page);
            assert_eq!(texts.first().map(String::as_str), Some("head"));
            assert_eq!(texts.last().map(String::as_str), Some("foot"));
        }
    }

    #[test]
    fn test_force_new_page_starts_groups_on_fresh_pages() {
        let report = Report::new("Products")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "name")))
            .with_group(
                ReportGroup::new("category").with_header(
                    ReportBand::new(14.0)
                        .with_element(ObjectValue::new(0.0, 0.0, "category"))
                        .with_force_new_page(true),
                ),
            );
        let document = report.render(&create_test_records()).unwrap();

        // The first header lands on the still-empty page 1; only the
        // second group forces a break.
        assert_eq!(document.page_count(), 2);
        assert_eq!(page_texts(&document.pages[0])[0], "Furniture");
        assert_eq!(page_texts(&document.pages[1])[0], "Stationery");
    }

    #[test]
    fn test_empty_records_need_print_if_empty() {
        let report = Report::new("Empty")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "name")));
        assert!(matches!(
            report.render(&[]),
            Err(RenderError::NothingToRender)
        ));
    }

    #[test]
    fn test_print_if_empty_renders_one_page() {
        let report = Report::new("Empty")
            .with_print_if_empty(true)
            .with_page_header(ReportBand::new(14.0).with_element(Label::new(0.0, 0.0, "head")))
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "name")))
            .with_summary(
                ReportBand::new(14.0).with_element(
                    ObjectValue::new(0.0, 0.0, "name").with_action(FieldAction::Count),
                ),
            );
        let document = report.render(&[]).unwrap();

        assert_eq!(document.page_count(), 1);
        assert_eq!(page_texts(&document.pages[0]), vec!["head", "0"]);
    }

    #[test]
    fn test_groups_without_detail_band() {
        let report = Report::new("Summary only")
            .with_group(
                ReportGroup::new("category")
                    .with_header(
                        ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "category")),
                    )
                    .with_footer(ReportBand::new(14.0).with_element(Label::new(0.0, 0.0, "end"))),
            );
        let document = report.render(&create_test_records()).unwrap();

        assert_eq!(
            page_texts(&document.pages[0]),
            vec!["Furniture", "end", "Stationery", "end"]
        );
    }

    #[test]
    fn test_unsorted_input_opens_partition_per_run() {
        let records = vec![
            Record::new().with("category", "A").with("name", "1"),
            Record::new().with("category", "B").with("name", "2"),
            Record::new().with("category", "A").with("name", "3"),
        ];
        let report = Report::new("Runs")
            .with_detail(ReportBand::new(12.0).with_element(ObjectValue::new(0.0, 0.0, "name")))
            .with_group(
                ReportGroup::new("category").with_header(
                    ReportBand::new(12.0).with_element(ObjectValue::new(0.0, 0.0, "category")),
                ),
            );
        let document = report.render(&records).unwrap();

        assert_eq!(
            page_texts(&document.pages[0]),
            vec!["A", "1", "B", "2", "A", "3"]
        );
    }

    #[test]
    fn test_missing_attribute_renders_empty_text() {
        let report = Report::new("Lenient")
            .with_detail(ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "nope")));
        let document = report.render(&create_test_records()[..1].to_vec()).unwrap();

        assert_eq!(page_texts(&document.pages[0]), vec![""]);
    }

    #[test]
    fn test_child_bands_stack_below_parent() {
        let report = Report::new("Children")
            .with_page_size(PageSize::Custom {
                width: 300.0,
                height: 200.0,
            })
            .with_margins(Margins::uniform(10.0))
            .with_detail(
                ReportBand::new(20.0)
                    .with_element(ObjectValue::new(0.0, 0.0, "name"))
                    .with_child_band(
                        ReportBand::new(10.0).with_element(ObjectValue::new(5.0, 0.0, "price")),
                    ),
            );
        let records = create_test_records()[..2].to_vec();
        let document = report.render(&records).unwrap();

        let ys: Vec<f64> = document.pages[0].texts().map(|t| t.y).collect();
        assert_eq!(ys, vec![10.0, 30.0, 40.0, 60.0]);
    }

    #[test]
    fn test_band_borders_become_lines() {
        let report = Report::new("Borders")
            .with_page_size(PageSize::Custom {
                width: 200.0,
                height: 100.0,
            })
            .with_margins(Margins::uniform(10.0))
            .with_detail(
                ReportBand::new(20.0)
                    .with_element(ObjectValue::new(0.0, 0.0, "name"))
                    .with_borders(crate::definition::BandBorders::all(LineStyle::new(1.0))),
            );
        let records = create_test_records()[..1].to_vec();
        let document = report.render(&records).unwrap();
        let page = &document.pages[0];

        assert_eq!(line_count(page), 4);
        let lines: Vec<&RenderedLine> = page
            .elements
            .iter()
            .filter_map(|e| match e {
                RenderedElement::Line(line) => Some(line),
                _ => None,
            })
            .collect();
        // Top edge spans the printable width at the band's top
        assert_eq!((lines[0].x1, lines[0].y1, lines[0].x2), (10.0, 10.0, 190.0));
        // Bottom edge sits at band top + band height
        assert_eq!(lines[1].y1, 30.0);
    }

    #[test]
    fn test_system_field_now_and_unknown_tokens() {
        let report = Report::new("Tokens")
            .with_author("An author")
            .with_begin(
                ReportBand::new(14.0).with_element(SystemField::new(
                    0.0,
                    0.0,
                    "{bogus} {report_author} {now:%Y}",
                )),
            )
            .with_print_if_empty(true);
        let document = report.render(&[]).unwrap();

        let year = chrono::Local::now().year().to_string();
        assert_eq!(
            page_texts(&document.pages[0]),
            vec![format!("{{bogus}} An author {}", year)]
        );
    }

    #[test]
    fn test_invalid_now_pattern_passes_through() {
        let report = Report::new("Tokens")
            .with_begin(ReportBand::new(14.0).with_element(SystemField::new(
                0.0,
                0.0,
                "{now:%Q}",
            )))
            .with_print_if_empty(true);
        let document = report.render(&[]).unwrap();

        assert_eq!(page_texts(&document.pages[0]), vec!["{now:%Q}"]);
    }

    #[test]
    fn test_timezone_now_patterns_pass_through() {
        let report = Report::new("Tokens")
            .with_begin(ReportBand::new(14.0).with_element(SystemField::new(
                0.0,
                0.0,
                "{now:%Z} {now:%+}",
            )))
            .with_print_if_empty(true);
        let document = report.render(&[]).unwrap();

        assert_eq!(page_texts(&document.pages[0]), vec!["{now:%Z} {now:%+}"]);
    }

    #[test]
    fn test_page_count_in_label_is_left_alone() {
        let report = Report::new("Literal")
            .with_begin(
                ReportBand::new(14.0).with_element(Label::new(0.0, 0.0, "{page_count}")),
            )
            .with_print_if_empty(true);
        let document = report.render(&[]).unwrap();

        assert_eq!(page_texts(&document.pages[0]), vec!["{page_count}"]);
    }

    #[test]
    fn test_band_taller_than_page_is_rejected() {
        let report = create_small_page_report().with_detail(ReportBand::new(500.0));
        assert!(matches!(
            report.render(&create_test_records()),
            Err(RenderError::Definition(DefinitionError::BandTooTall { .. }))
        ));
    }
}
