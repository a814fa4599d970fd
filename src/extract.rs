//! Field extraction from item detail pages.
//!
//! Given the detail container element of a parsed page, [`extract`] produces
//! one flat [`Design`] record. Extraction is tolerant by construction:
//! every field comes from a fixed selector, a selector that matches nothing
//! yields an empty string, and nothing here returns an error.
//!
//! The variable attribute block (`div.meta-attributes`) is handled by a
//! label-keyed row scan: each table row's first cell is matched exactly
//! against a lookup table of known labels, and a match applies that label's
//! setter. Unrecognized labels are ignored, so extra rows, missing rows,
//! and arbitrary row ordering all extract cleanly.
//!
//! Values are opaque strings; prices, dates, and tag lists are not parsed
//! or normalized here.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::warn;

use crate::models::Design;

/// Root node identifying a successfully rendered item detail page. A page
/// without it produces no record.
pub(crate) static DETAIL_CONTAINER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.page").unwrap());

static PREVIEW: Lazy<Selector> = Lazy::new(|| Selector::parse("a.btn-icon.live-preview").unwrap());
static NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.item-header h1.t-heading.is-hidden-phone").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.item-preview a img").unwrap());
static PRICE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.item-header__price b.t-currency span.js-item-header__price").unwrap()
});
static SALES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.sidebar-stats__item div.box > strong.sidebar-stats__number").unwrap()
});
static COMMENTS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.sidebar-stats__item div.box a.t-link strong.sidebar-stats__number").unwrap()
});
static SELLER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div.media__body h2 a.t-link[rel="author"]"#).unwrap());
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("div.user-html").unwrap());

static META_ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("div.meta-attributes tr").unwrap());
static LABEL_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td:first-child").unwrap());
static VALUE_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td:nth-child(2)").unwrap());
static VALUE_SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("td:nth-child(2) span").unwrap());
static VALUE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("td:nth-child(2) a").unwrap());
static UPDATED_TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time.updated").unwrap());

/// Text content of the first match under `el`, trimmed; empty on no match.
fn child_text(el: ElementRef<'_>, selector: &Selector) -> String {
    el.select(selector)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Named attribute of the first match under `el`; empty on no match.
fn child_attr(el: ElementRef<'_>, selector: &Selector, name: &str) -> String {
    el.select(selector)
        .next()
        .and_then(|node| node.value().attr(name))
        .unwrap_or_default()
        .to_string()
}

type Setter = for<'a> fn(&mut Design, ElementRef<'a>);

fn set_last_updated(design: &mut Design, row: ElementRef<'_>) {
    design.last_updated = child_attr(row, &UPDATED_TIME, "datetime");
}
fn set_created(design: &mut Design, row: ElementRef<'_>) {
    design.created = child_text(row, &VALUE_SPAN);
}
fn set_high_resolution(design: &mut Design, row: ElementRef<'_>) {
    design.high_resolution = child_text(row, &VALUE_LINK);
}
fn set_compatible_browser(design: &mut Design, row: ElementRef<'_>) {
    design.compatible_browser = child_text(row, &VALUE_CELL);
}
fn set_compatible_with(design: &mut Design, row: ElementRef<'_>) {
    design.compatible_with = child_text(row, &VALUE_CELL);
}
fn set_included(design: &mut Design, row: ElementRef<'_>) {
    design.included = child_text(row, &VALUE_CELL);
}
fn set_column(design: &mut Design, row: ElementRef<'_>) {
    design.column = child_text(row, &VALUE_CELL);
}
fn set_documentation(design: &mut Design, row: ElementRef<'_>) {
    design.documentation = child_text(row, &VALUE_CELL);
}
fn set_layout(design: &mut Design, row: ElementRef<'_>) {
    design.layout = child_text(row, &VALUE_CELL);
}
fn set_tags(design: &mut Design, row: ElementRef<'_>) {
    design.tags = child_text(row, &VALUE_CELL);
}

/// Attribute-row labels and their setters. Matching is exact: anything not
/// listed here is skipped.
static LABELED_FIELDS: &[(&str, Setter)] = &[
    ("Last Update", set_last_updated),
    ("Created", set_created),
    ("High Resolution", set_high_resolution),
    ("Compatible Browsers", set_compatible_browser),
    ("Compatible With", set_compatible_with),
    ("ThemeForest Files Included", set_included),
    ("Columns", set_column),
    ("Documentation", set_documentation),
    ("Layout", set_layout),
    ("Tags", set_tags),
];

/// Extract one [`Design`] from a detail container element.
///
/// `url` is the detail page's own URL and `category_name` the category whose
/// listing linked to it; both are carried into the record verbatim. The
/// description keeps its raw inner markup so downstream consumers retain
/// formatting; its absence is the one condition worth a warning log.
pub fn extract(container: ElementRef<'_>, url: &str, category_name: &str) -> Design {
    let mut design = Design {
        url: url.to_string(),
        cat_name: category_name.to_string(),
        ..Design::default()
    };

    design.preview_url = child_attr(container, &PREVIEW, "href");
    design.name = child_text(container, &NAME);
    design.image = child_attr(container, &IMAGE, "src");
    design.price = child_text(container, &PRICE);
    design.sales = child_text(container, &SALES);
    design.comments = child_text(container, &COMMENTS);
    design.seller_name = child_text(container, &SELLER);
    design.seller_url = child_attr(container, &SELLER, "href");

    match container.select(&DESCRIPTION).next() {
        Some(node) => design.description = node.inner_html(),
        None => warn!(%url, "No description container on detail page"),
    }

    for row in container.select(&META_ROWS) {
        let label = child_text(row, &LABEL_CELL);
        if let Some((_, set)) = LABELED_FIELDS.iter().find(|(known, _)| *known == label) {
            set(&mut design, row);
        }
    }

    design
}
