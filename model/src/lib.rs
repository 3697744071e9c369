//! FILENAME: model/src/lib.rs
//! Shared data model for the Reporta report engine.
//!
//! This crate holds the types every other layer speaks: dynamic values,
//! input records, styles, number formats and length units. It carries no
//! rendering logic; the band engine and the output writers both depend on
//! it and nothing here depends on them.

pub mod format;
pub mod record;
pub mod style;
pub mod unit;
pub mod value;

pub use format::{format_number, format_value, CurrencyPosition, NumberFormat};
pub use record::Record;
pub use style::{
    Color, DashPattern, ElementStyle, FontFamily, FontSpec, LineStyle, TextAlign,
};
pub use unit::{CM, INCH, MM, PT};
pub use value::Value;
