//! FILENAME: generators/examples/products_by_category.rs
//! Products-by-category listing, the smallest useful grouped report.
//!
//! Builds a one-group report over an in-memory product list and writes
//! `products_by_category.pdf` to the current directory. Run with:
//!
//! ```sh
//! cargo run --example products_by_category
//! ```

use std::path::Path;

use band_engine::{
    FieldAction, Label, ObjectValue, PageSize, Report, ReportBand, ReportGroup, SystemField,
};
use generators::{generate_by, PdfGenerator};
use model::style::{ElementStyle, TextAlign};
use model::unit::CM;
use model::Record;

fn product(category: &str, name: &str, price: f64) -> Record {
    Record::new()
        .with("category", category)
        .with("name", name)
        .with("price", price)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Records must arrive sorted by the grouping attribute.
    let records = vec![
        product("Furniture", "Chair", 49.5),
        product("Furniture", "Desk", 120.0),
        product("Furniture", "Shelf", 75.25),
        product("Stationery", "Notebook", 3.4),
        product("Stationery", "Pen", 1.2),
        product("Stationery", "Pencil", 0.8),
    ];

    let title_style = ElementStyle::new().with_size(14.0).with_bold(true);
    let header_style = ElementStyle::new().with_size(11.0).with_bold(true);
    let footer_style = ElementStyle::new().with_italic(true);

    let report = Report::new("Products by category")
        .with_author("Example Corp")
        .with_page_size(PageSize::A4)
        .with_page_header(
            ReportBand::new(1.3 * CM)
                .with_element(
                    SystemField::new(0.0, 0.1 * CM, "{report_title}")
                        .with_width(10.0 * CM)
                        .with_style(title_style),
                )
                .with_element(
                    SystemField::new(12.0 * CM, 0.2 * CM, "Page {page_number} of {page_count}")
                        .with_width(5.0 * CM)
                        .with_style(ElementStyle::new().with_align(TextAlign::Right)),
                ),
        )
        .with_page_footer(
            ReportBand::new(0.7 * CM)
                .with_element(SystemField::new(0.0, 0.1 * CM, "Generated at {now}")),
        )
        .with_group(
            ReportGroup::new("category")
                .with_header(
                    ReportBand::new(0.9 * CM).with_element(
                        ObjectValue::new(0.0, 0.2 * CM, "category")
                            .with_width(8.0 * CM)
                            .with_style(header_style),
                    ),
                )
                .with_footer(
                    ReportBand::new(0.6 * CM).with_element(
                        ObjectValue::new(0.5 * CM, 0.1 * CM, "name")
                            .with_action(FieldAction::Count)
                            .with_display_format("{} products")
                            .with_width(6.0 * CM)
                            .with_style(footer_style),
                    ),
                ),
        )
        .with_detail(
            ReportBand::new(0.55 * CM)
                .with_element(ObjectValue::new(0.5 * CM, 0.0, "name").with_width(8.0 * CM))
                .with_element(
                    ObjectValue::new(9.0 * CM, 0.0, "price")
                        .with_number_format(model::format::presets::currency_usd(2))
                        .with_width(3.0 * CM)
                        .with_style(ElementStyle::new().with_align(TextAlign::Right)),
                ),
        )
        .with_summary(
            ReportBand::new(0.8 * CM)
                .with_element(Label::new(0.0, 0.2 * CM, "Grand total:"))
                .with_element(
                    ObjectValue::new(9.0 * CM, 0.2 * CM, "price")
                        .with_action(FieldAction::Sum)
                        .with_number_format(model::format::presets::currency_usd(2))
                        .with_width(3.0 * CM)
                        .with_style(ElementStyle::new().with_bold(true).with_align(TextAlign::Right)),
                ),
        );

    let path = Path::new("products_by_category.pdf");
    generate_by(&report, &records, &PdfGenerator::new(), path)?;
    println!("wrote {}", path.display());
    Ok(())
}
