//! # TCO Report
//!
//! A paginated A4 report of one calculation, laid out in millimetres and
//! rendered as plain text. Fills become rules above and below the rows they
//! cover; text styles map to plain-text emphasis.
//!
//! ## Page Layout
//! ```text
//!   0 ┌──────────────────────────────────────────────┐
//!     │ COMPANY NAME                                 │  header band (30 mm)
//!     │ Total Cost of Ownership Calculator           │
//!  30 ├──────────────────────────────────────────────┤
//!  45 │ CUSTOMER INFORMATION                         │
//!     │ CALCULATION PARAMETERS                       │
//!     │ ┌──────────────────────────────────────────┐ │
//!     │ │ TOTAL COST OF OWNERSHIP   $4,050,000     │ │  highlighted total
//!     │ └──────────────────────────────────────────┘ │
//!     │ KEY METRICS     (x = 20)      (x = 110)      │  two columns
//!     │ ANNUAL COST BREAKDOWN                        │
//!     │ Category        Annual cost     Share        │
//!     │ ...9 rows...                                 │
//!     │ TOTAL ANNUAL    $810,000        100.0%       │
//! 267 │ - - - - - - - - - - - - - - - - - - - - - - -│  rows never start below here
//! 282 │ footer                                       │
//! 297 └──────────────────────────────────────────────┘
//! ```
//!
//! ## Pagination
//! Before each table line (column header, category row, totals row) the
//! cursor is checked against `page height − 30 mm`. Past it, a new page
//! starts at 30 mm and the column header is repeated. Every page gets the
//! footer.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tco_core::format::{format_currency_with, format_number, format_percentage};
use tco_core::{InputRecord, TcoResult, TruckType};
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::filename::{export_filename_at, write_file};

// =============================================================================
// Layout Constants (millimetres)
// =============================================================================

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

const HEADER_BAND_HEIGHT: f64 = 30.0;
const MARGIN_LEFT: f64 = 20.0;
const CONTENT_TOP: f64 = 45.0;
const CONTINUATION_TOP: f64 = 30.0;
/// Distance from the page bottom below which no table line starts.
const TABLE_BOTTOM_MARGIN: f64 = 30.0;

const SECOND_COLUMN: f64 = 110.0;
const TABLE_LEFT: f64 = 20.0;
const TABLE_WIDTH: f64 = 150.0;
const COL_CATEGORY: f64 = 25.0;
const COL_AMOUNT: f64 = 85.0;
const COL_SHARE: f64 = 135.0;
const TABLE_ROW_HEIGHT: f64 = 6.0;
const TABLE_HEADER_HEIGHT: f64 = 8.0;

const FOOTER_FIRST_LINE: f64 = 15.0;
const FOOTER_SECOND_LINE: f64 = 10.0;

/// Plain-text rendering: one character column per this many millimetres.
const MM_PER_COLUMN: f64 = 2.0;

// =============================================================================
// Document Model
// =============================================================================

/// Visual role of a text item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Subtitle,
    Heading,
    Body,
    /// The highlighted total amount.
    Total,
    Note,
    TableHeader,
    TableRow,
    TableTotal,
    Footer,
}

impl TextStyle {
    /// Plain-text emphasis of the style.
    fn emphasise(self, text: &str) -> String {
        match self {
            TextStyle::Title
            | TextStyle::Heading
            | TextStyle::TableHeader
            | TextStyle::TableTotal => text.to_uppercase(),
            TextStyle::Total => format!("*{text}*"),
            TextStyle::Note => format!("_{text}_"),
            TextStyle::Subtitle | TextStyle::Body | TextStyle::TableRow | TextStyle::Footer => {
                text.to_string()
            }
        }
    }
}

/// Background fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Brand band: page header and totals row.
    Brand,
    /// Panel behind the highlighted total.
    Panel,
    /// Table column header.
    TableHeader,
}

impl Fill {
    /// Character of the rules framing the filled rows.
    pub const fn rule(self) -> char {
        match self {
            Fill::Brand => '=',
            Fill::Panel => '~',
            Fill::TableHeader => '-',
        }
    }
}

/// A piece of text placed at `(x, y)` millimetres from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x_mm: f64,
    pub y_mm: f64,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRect {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub fill: Fill,
}

impl FillRect {
    fn covers(&self, y_mm: f64) -> bool {
        y_mm >= self.y_mm - 1e-9 && y_mm <= self.y_mm + self.height_mm + 1e-9
    }

    fn rule(&self) -> String {
        let start = column(self.x_mm);
        let end = column(self.x_mm + self.width_mm);
        let rule: String = std::iter::repeat(self.fill.rule())
            .take(end.saturating_sub(start))
            .collect();
        format!("{}{rule}", " ".repeat(start))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub texts: Vec<TextItem>,
    pub fills: Vec<FillRect>,
}

impl Page {
    fn new(number: usize) -> Self {
        Page {
            number,
            texts: Vec::new(),
            fills: Vec::new(),
        }
    }

    /// Texts of one style, in insertion order.
    pub fn texts_with(&self, style: TextStyle) -> impl Iterator<Item = &TextItem> {
        self.texts.iter().filter(move |t| t.style == style)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }
}

/// Branding and page settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub company_name: String,
    pub subtitle: String,
    pub currency_symbol: String,
    pub generated_at: DateTime<Utc>,
    pub page_height_mm: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            company_name: "FLEET TCO".to_string(),
            subtitle: "Total Cost of Ownership Calculator".to_string(),
            currency_symbol: tco_core::format::DEFAULT_CURRENCY_SYMBOL.to_string(),
            generated_at: Utc::now(),
            page_height_mm: A4_HEIGHT_MM,
        }
    }
}

/// A laid-out report, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub customer_name: String,
    pub generated_at: DateTime<Utc>,
    pub page_height_mm: f64,
    pub pages: Vec<Page>,
}

// =============================================================================
// Building
// =============================================================================

/// Cursor over the pages being filled.
struct Layout {
    page_height: f64,
    y: f64,
    pages: Vec<Page>,
}

impl Layout {
    fn new(page_height: f64) -> Self {
        Layout {
            page_height,
            y: CONTENT_TOP,
            pages: vec![Page::new(1)],
        }
    }

    fn page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Places text at the cursor plus `dy`.
    fn text(&mut self, x: f64, dy: f64, text: impl Into<String>, style: TextStyle) {
        let y = self.y + dy;
        self.page().texts.push(TextItem {
            x_mm: x,
            y_mm: y,
            text: text.into(),
            style,
        });
    }

    fn fill(&mut self, x: f64, dy: f64, width: f64, height: f64, fill: Fill) {
        let y = self.y + dy;
        self.page().fills.push(FillRect {
            x_mm: x,
            y_mm: y,
            width_mm: width,
            height_mm: height,
            fill,
        });
    }

    fn advance(&mut self, dy: f64) {
        self.y += dy;
    }

    fn past_table_limit(&self) -> bool {
        self.y > self.page_height - TABLE_BOTTOM_MARGIN
    }

    fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page::new(number));
        self.y = CONTINUATION_TOP;
    }
}

impl ReportDocument {
    /// Lays out the report of one calculation.
    pub fn build(input: &InputRecord, result: &TcoResult, options: &ReportOptions) -> Self {
        let currency = |amount: f64| format_currency_with(amount, &options.currency_symbol);
        let years = input.operation_years.unwrap_or_default();
        let mut layout = Layout::new(options.page_height_mm);

        // Header band
        layout.page().fills.push(FillRect {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: A4_WIDTH_MM,
            height_mm: HEADER_BAND_HEIGHT,
            fill: Fill::Brand,
        });
        layout.page().texts.push(TextItem {
            x_mm: MARGIN_LEFT,
            y_mm: 15.0,
            text: options.company_name.clone(),
            style: TextStyle::Title,
        });
        layout.page().texts.push(TextItem {
            x_mm: MARGIN_LEFT,
            y_mm: 25.0,
            text: options.subtitle.clone(),
            style: TextStyle::Subtitle,
        });

        // Customer block
        layout.text(MARGIN_LEFT, 0.0, "CUSTOMER INFORMATION", TextStyle::Heading);
        layout.advance(8.0);
        layout.text(
            MARGIN_LEFT,
            0.0,
            format!("Customer: {}", input.customer_name.trim()),
            TextStyle::Body,
        );
        layout.advance(6.0);
        layout.text(
            MARGIN_LEFT,
            0.0,
            format!("Date: {}", options.generated_at.format("%Y-%m-%d")),
            TextStyle::Body,
        );
        layout.advance(6.0);
        layout.text(
            MARGIN_LEFT,
            0.0,
            format!("Truck type: {}", truck_name(input, result)),
            TextStyle::Body,
        );
        layout.advance(10.0);

        // Parameters block
        layout.text(MARGIN_LEFT, 0.0, "CALCULATION PARAMETERS", TextStyle::Heading);
        layout.advance(8.0);
        let parameters = [
            format!("Truck value: {}", currency(result.initial_investment)),
            format!(
                "Annual distance: {} km",
                format_number(input.annual_distance.unwrap_or_default(), 0)
            ),
            format!("Operation years: {years} years"),
            format!(
                "Fuel price: {} per litre",
                currency(input.fuel_price.unwrap_or_default())
            ),
            format!("Fuel efficiency: {} km/L", format_number(result.fuel_efficiency_used, 1)),
        ];
        for (i, line) in parameters.into_iter().enumerate() {
            if i > 0 {
                layout.advance(6.0);
            }
            layout.text(MARGIN_LEFT, 0.0, line, TextStyle::Body);
        }
        layout.advance(15.0);

        // Highlighted total
        layout.fill(15.0, -5.0, A4_WIDTH_MM - 30.0, 25.0, Fill::Panel);
        layout.text(MARGIN_LEFT, 5.0, "TOTAL COST OF OWNERSHIP", TextStyle::Heading);
        layout.text(MARGIN_LEFT, 15.0, currency(result.total_period_cost), TextStyle::Total);
        layout.text(MARGIN_LEFT, 20.0, format!("({years} years of operation)"), TextStyle::Note);
        layout.advance(35.0);

        // Key metrics, two columns
        layout.text(MARGIN_LEFT, 0.0, "KEY METRICS", TextStyle::Heading);
        layout.advance(8.0);
        layout.text(
            MARGIN_LEFT,
            0.0,
            format!("Annual cost: {}", currency(result.total_annual_cost)),
            TextStyle::Body,
        );
        layout.text(
            SECOND_COLUMN,
            0.0,
            format!("Cost per km: {}", currency(result.cost_per_distance)),
            TextStyle::Body,
        );
        layout.advance(6.0);
        layout.text(
            MARGIN_LEFT,
            0.0,
            format!("Cost per day: {}", currency(result.cost_per_day)),
            TextStyle::Body,
        );
        layout.text(
            SECOND_COLUMN,
            0.0,
            format!("Total distance: {} km", format_number(result.total_distance, 0)),
            TextStyle::Body,
        );
        layout.advance(15.0);

        // Breakdown table
        layout.text(MARGIN_LEFT, 0.0, "ANNUAL COST BREAKDOWN", TextStyle::Heading);
        layout.advance(8.0);
        table_header(&mut layout);

        for entry in &result.cost_breakdown {
            if layout.past_table_limit() {
                debug!(page = layout.pages.len() + 1, "Breakdown table continues on a new page");
                layout.new_page();
                table_header(&mut layout);
            }
            layout.text(COL_CATEGORY, 3.0, entry.category.label(), TextStyle::TableRow);
            layout.text(COL_AMOUNT, 3.0, currency(entry.amount), TextStyle::TableRow);
            layout.text(
                COL_SHARE,
                3.0,
                format_percentage(entry.percentage_of_annual_total, 1),
                TextStyle::TableRow,
            );
            layout.advance(TABLE_ROW_HEIGHT);
        }

        layout.advance(10.0);
        if layout.past_table_limit() {
            layout.new_page();
        }
        layout.fill(TABLE_LEFT, -2.0, TABLE_WIDTH, TABLE_HEADER_HEIGHT, Fill::Brand);
        layout.text(COL_CATEGORY, 3.0, "TOTAL ANNUAL", TextStyle::TableTotal);
        layout.text(COL_AMOUNT, 3.0, currency(result.total_annual_cost), TextStyle::TableTotal);
        layout.text(COL_SHARE, 3.0, "100.0%", TextStyle::TableTotal);

        let mut pages = layout.pages;
        add_footers(&mut pages, options);

        ReportDocument {
            customer_name: input.customer_name.trim().to_string(),
            generated_at: options.generated_at,
            page_height_mm: options.page_height_mm,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// `TCO_<customer>_<millis>.txt`
    pub fn file_name(&self) -> String {
        export_filename_at(&self.customer_name, self.generated_at, "txt")
    }

    /// Renders every page as text; pages are separated by a form feed.
    pub fn render_text(&self) -> ReportResult<String> {
        if self.pages.is_empty() {
            return Err(ReportError::EmptyDocument);
        }
        let pages: Vec<String> = self.pages.iter().map(render_page).collect();
        Ok(pages.join("\u{c}"))
    }

    /// Renders the report into `dir` and returns the file path.
    pub fn write_to(&self, dir: &Path) -> ReportResult<PathBuf> {
        let path = write_file(dir, &self.file_name(), &self.render_text()?)?;
        info!(path = %path.display(), pages = self.page_count(), "Wrote report");
        Ok(path)
    }
}

fn truck_name(input: &InputRecord, result: &TcoResult) -> &'static str {
    input
        .truck_type
        .parse::<TruckType>()
        .unwrap_or(result.truck_profile_used.truck_type)
        .display_name()
}

fn table_header(layout: &mut Layout) {
    layout.fill(TABLE_LEFT, -2.0, TABLE_WIDTH, TABLE_HEADER_HEIGHT, Fill::TableHeader);
    layout.text(COL_CATEGORY, 3.0, "Category", TextStyle::TableHeader);
    layout.text(COL_AMOUNT, 3.0, "Annual cost", TextStyle::TableHeader);
    layout.text(COL_SHARE, 3.0, "Share", TextStyle::TableHeader);
    layout.advance(TABLE_HEADER_HEIGHT);
}

fn add_footers(pages: &mut [Page], options: &ReportOptions) {
    let total = pages.len();
    let first = options.page_height_mm - FOOTER_FIRST_LINE;
    let second = options.page_height_mm - FOOTER_SECOND_LINE;
    let generated = options.generated_at.format("%Y-%m-%d %H:%M UTC").to_string();

    for page in pages.iter_mut() {
        let footer = [
            (MARGIN_LEFT, first, format!("{} - TCO Calculator", options.company_name)),
            (MARGIN_LEFT, second, format!("Generated {generated}")),
            (COL_SHARE + 15.0, second, format!("Page {} of {total}", page.number)),
        ];
        for (x_mm, y_mm, text) in footer {
            page.texts.push(TextItem {
                x_mm,
                y_mm,
                text,
                style: TextStyle::Footer,
            });
        }
    }
}

// =============================================================================
// Text Rendering
// =============================================================================

fn render_page(page: &Page) -> String {
    let mut items: Vec<&TextItem> = page.texts.iter().collect();
    items.sort_by(|a, b| {
        a.y_mm
            .partial_cmp(&b.y_mm)
            .unwrap_or(Ordering::Equal)
            .then(a.x_mm.partial_cmp(&b.x_mm).unwrap_or(Ordering::Equal))
    });

    let mut rows: Vec<&[&TextItem]> = Vec::new();
    let mut index = 0;
    while index < items.len() {
        let y = items[index].y_mm;
        let row_end = items[index..]
            .iter()
            .position(|t| (t.y_mm - y).abs() > f64::EPSILON)
            .map_or(items.len(), |offset| index + offset);
        rows.push(&items[index..row_end]);
        index = row_end;
    }

    // (first row, last row, fill) for every fill that covers text.
    let spans: Vec<(usize, usize, &FillRect)> = page
        .fills
        .iter()
        .filter_map(|fill| {
            let first = rows.iter().position(|row| fill.covers(row[0].y_mm))?;
            let last = rows.iter().rposition(|row| fill.covers(row[0].y_mm))?;
            Some((first, last, fill))
        })
        .collect();

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let framed = spans.iter().any(|(first, last, _)| *first < i && i <= *last);
        if i > 0 && !framed && row[0].y_mm - rows[i - 1][0].y_mm >= 10.0 {
            out.push('\n');
        }
        for (_, _, fill) in spans.iter().filter(|(first, _, _)| *first == i) {
            out.push_str(&fill.rule());
            out.push('\n');
        }

        let mut line = String::new();
        for item in row.iter() {
            let col = column(item.x_mm);
            let len = line.chars().count();
            if len < col {
                line.push_str(&" ".repeat(col - len));
            } else if len > 0 {
                line.push(' ');
            }
            line.push_str(&item.style.emphasise(&item.text));
        }
        out.push_str(line.trim_end());
        out.push('\n');

        for (_, _, fill) in spans.iter().filter(|(_, last, _)| *last == i) {
            out.push_str(&fill.rule());
            out.push('\n');
        }
    }

    out
}

fn column(x_mm: f64) -> usize {
    (x_mm / MM_PER_COLUMN).round().max(0.0) as usize
}

// =============================================================================
// Unit Tests
// =============================================================================
