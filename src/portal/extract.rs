//! Extraction of development applications from search-result HTML.
//!
//! Each application is rendered as a heading followed by one or more detail
//! blocks:
//!
//! ```html
//! <h4 class="non_table_headers"><a href="...">12 Smith St, TOWN</a></h4>
//! <div>
//!   <p class="rowDataOnly"><span class="key">Application No.</span><span class="inputField">DA/123/2023</span></p>
//!   <p class="rowDataOnly"><span class="key">Type of Work</span><span class="inputField">Carport</span></p>
//! </div>
//! ```
//!
//! The heading text is the address. Rows are matched by label; anything the
//! portal adds beyond the labels we know about is ignored.

use chrono::NaiveDate;
use html_scraper::html::Select;
use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::trace;

use crate::normalize::normalize_whitespace;
use crate::portal::models::{ApplicationBuilder, DevelopmentApplication};

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.non_table_headers").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.rowDataOnly").unwrap());
static KEY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.key").unwrap());
static VALUE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.inputField").unwrap());

/// Single-pass iterator over the applications in a parsed results page.
///
/// Yields one record per heading, complete or not; deciding what is worth
/// persisting is up to the caller. Once exhausted it stays exhausted, so a
/// second pass means calling [`extract_applications`] again.
pub struct Applications<'a> {
    headings: Select<'a, 'static>,
    info_url: &'a str,
    scrape_date: NaiveDate,
}

/// Walk `html` for application headings.
pub fn extract_applications<'a>(
    html: &'a Html,
    info_url: &'a str,
    scrape_date: NaiveDate,
) -> Applications<'a> {
    Applications {
        headings: html.select(&HEADING_SEL),
        info_url,
        scrape_date,
    }
}

impl Iterator for Applications<'_> {
    type Item = DevelopmentApplication;

    fn next(&mut self) -> Option<Self::Item> {
        let heading = self.headings.next()?;
        Some(read_application(heading).build(self.info_url, self.scrape_date))
    }
}

fn read_application(heading: ElementRef<'_>) -> ApplicationBuilder {
    let address = normalize_whitespace(&heading.text().collect::<String>());
    let mut builder = ApplicationBuilder::new(address);

    for block in detail_blocks(heading) {
        for row in block.select(&ROW_SEL) {
            let Some((label, value)) = read_row(row) else {
                continue;
            };
            if !builder.apply(&label, &value) {
                trace!(label, "Ignoring unknown detail label");
            }
        }
    }

    builder
}

/// The `<div>` elements directly following a heading, up to the next
/// non-`<div>` element.
fn detail_blocks<'a>(heading: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.value().name() == "div")
}

fn read_row(row: ElementRef<'_>) -> Option<(String, String)> {
    let key = row.select(&KEY_SEL).next()?;
    let value = row.select(&VALUE_SEL).next()?;
    Some((
        normalize_whitespace(&key.text().collect::<String>()),
        normalize_whitespace(&value.text().collect::<String>()),
    ))
}
