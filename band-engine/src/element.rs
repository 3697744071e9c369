//! FILENAME: band-engine/src/element.rs
//! Band Elements - the positioned content of a band.
//!
//! Coordinates are in points, relative to the owning band's top-left
//! corner. An element with no style of its own falls back to the report's
//! `default_style` at render time.

use crate::aggregate::FieldAction;
use model::format::NumberFormat;
use model::style::{Color, ElementStyle, LineStyle};
use model::unit::CM;
use model::value::Value;
use model::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Width assumed for a text element that declares none.
pub const DEFAULT_ELEMENT_WIDTH: f64 = 5.0 * CM;

// ============================================================================
// PROGRAMMATIC VALUES
// ============================================================================

/// A computed value: a closure from record to value.
///
/// This is the programmatic escape hatch for anything an attribute lookup
/// cannot express (derived columns, conditional text). Getters are opaque
/// code, so they are skipped by serialization; definitions loaded from a
/// file fall back to `attribute_name` resolution.
#[derive(Clone)]
pub struct ValueGetter(Arc<dyn Fn(&Record) -> Value + Send + Sync>);

impl ValueGetter {
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        ValueGetter(Arc::new(getter))
    }

    pub fn call(&self, record: &Record) -> Value {
        (self.0)(record)
    }
}

impl fmt::Debug for ValueGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueGetter(<closure>)")
    }
}

// ============================================================================
// TEXT ELEMENTS
// ============================================================================

/// Fixed text at a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub left: f64,
    pub top: f64,
    pub width: Option<f64>,
    pub text: String,
    pub style: Option<ElementStyle>,
}

impl Label {
    pub fn new(left: f64, top: f64, text: impl Into<String>) -> Self {
        Label {
            left,
            top,
            width: None,
            text: text.into(),
            style: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// A value taken from the current record, or aggregated over the band's
/// record scope when an `action` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectValue {
    pub left: f64,
    pub top: f64,
    pub width: Option<f64>,
    /// Attribute resolved against the record when no getter is set.
    pub attribute_name: String,
    /// Programmatic resolution, taking precedence over `attribute_name`.
    #[serde(skip)]
    pub getter: Option<ValueGetter>,
    /// When set, the element shows an aggregate over the band's scope
    /// instead of a single record's value.
    pub action: Option<FieldAction>,
    pub number_format: Option<NumberFormat>,
    /// Template applied to the formatted value; `{}` receives it.
    /// `"{} products"` turns `12` into `12 products`.
    pub display_format: Option<String>,
    pub style: Option<ElementStyle>,
}

impl ObjectValue {
    pub fn new(left: f64, top: f64, attribute_name: impl Into<String>) -> Self {
        ObjectValue {
            left,
            top,
            width: None,
            attribute_name: attribute_name.into(),
            getter: None,
            action: None,
            number_format: None,
            display_format: None,
            style: None,
        }
    }

    pub fn with_getter(mut self, getter: ValueGetter) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_action(mut self, action: FieldAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = Some(format);
        self
    }

    pub fn with_display_format(mut self, template: impl Into<String>) -> Self {
        self.display_format = Some(template.into());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// Text with `{placeholder}` expansion against report and page state.
///
/// Recognized placeholders: `{report_title}`, `{report_author}`,
/// `{page_number}`, `{page_count}`, `{now}` and `{now:<chrono pattern>}`.
/// Unknown placeholders pass through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemField {
    pub left: f64,
    pub top: f64,
    pub width: Option<f64>,
    pub expression: String,
    pub style: Option<ElementStyle>,
}

impl SystemField {
    pub fn new(left: f64, top: f64, expression: impl Into<String>) -> Self {
        SystemField {
            left,
            top,
            width: None,
            expression: expression.into(),
            style: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }
}

// ============================================================================
// GRAPHIC ELEMENTS
// ============================================================================

/// A straight line between two points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineElement {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub style: LineStyle,
}

impl LineElement {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        LineElement {
            x1,
            y1,
            x2,
            y2,
            style: LineStyle::default(),
        }
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }
}

/// A rectangle, stroked by default, optionally filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectElement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_rect_stroke")]
    pub stroke: Option<LineStyle>,
    pub fill: Option<Color>,
}

fn default_rect_stroke() -> Option<LineStyle> {
    Some(LineStyle::default())
}

impl RectElement {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        RectElement {
            left,
            top,
            width,
            height,
            stroke: Some(LineStyle::default()),
            fill: None,
        }
    }

    pub fn with_stroke(mut self, style: LineStyle) -> Self {
        self.stroke = Some(style);
        self
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }
}

// ============================================================================
// THE ELEMENT ENUM
// ============================================================================

/// Anything a band can contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BandElement {
    Label(Label),
    Value(ObjectValue),
    SystemField(SystemField),
    Line(LineElement),
    Rect(RectElement),
}

impl From<Label> for BandElement {
    fn from(element: Label) -> Self {
        BandElement::Label(element)
    }
}

impl From<ObjectValue> for BandElement {
    fn from(element: ObjectValue) -> Self {
        BandElement::Value(element)
    }
}

impl From<SystemField> for BandElement {
    fn from(element: SystemField) -> Self {
        BandElement::SystemField(element)
    }
}

impl From<LineElement> for BandElement {
    fn from(element: LineElement) -> Self {
        BandElement::Line(element)
    }
}

impl From<RectElement> for BandElement {
    fn from(element: RectElement) -> Self {
        BandElement::Rect(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_calls_closure() {
        let getter = ValueGetter::new(|record: &Record| {
            Value::Number(record.value("price").as_number().unwrap_or(0.0) * 2.0)
        });
        let record = Record::new().with("price", 21.0);
        assert_eq!(getter.call(&record), Value::Number(42.0));
    }

    #[test]
    fn test_getter_skipped_by_serialization() {
        let element = ObjectValue::new(0.0, 0.0, "price")
            .with_getter(ValueGetter::new(|_| Value::Empty));
        let json = serde_json::to_string(&element).unwrap();
        assert!(!json.contains("getter"));

        let back: ObjectValue = serde_json::from_str(&json).unwrap();
        assert!(back.getter.is_none());
        assert_eq!(back.attribute_name, "price");
    }

    #[test]
    fn test_element_conversions() {
        let band_element: BandElement = Label::new(0.0, 0.0, "title").into();
        assert!(matches!(band_element, BandElement::Label(_)));

        let band_element: BandElement = LineElement::new(0.0, 0.0, 10.0, 0.0).into();
        assert!(matches!(band_element, BandElement::Line(_)));
    }
}
