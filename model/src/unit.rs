//! FILENAME: model/src/unit.rs
//! PURPOSE: Length units for report geometry.
//! CONTEXT: All geometry is carried as plain f64 PostScript points. These
//! constants let definitions read `0.5 * CM` instead of magic point values.

/// One PostScript point, the base unit of report geometry.
pub const PT: f64 = 1.0;

/// One inch in points.
pub const INCH: f64 = 72.0;

/// One millimeter in points.
pub const MM: f64 = 72.0 / 25.4;

/// One centimeter in points.
pub const CM: f64 = 10.0 * MM;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ratios() {
        assert_eq!(INCH, 72.0 * PT);
        assert!((CM - 28.346456692913385).abs() < 1e-9);
        assert!((10.0 * MM - CM).abs() < 1e-12);
    }
}
