//! Listing-page traversal for one category.
//!
//! Two pagination policies are supported, both present in this tool's
//! history and selected by [`PaginationPolicy`]:
//!
//! - **Recursive**: each listing page yields both its item links and its
//!   "next page" navigation links in a single fetch; navigation links whose
//!   target starts with the category's own listing path are followed
//!   recursively on the same listing session, whose visited-URL dedup
//!   terminates the walk.
//! - **Enumerated**: the listing root is fetched once to read the last page
//!   number out of the pagination nav; one traversal per page index
//!   `1..=N` is then dispatched by substituting a `page=` query parameter
//!   into the listing URL. A missing or non-numeric last-page element means
//!   zero pages, silently.
//!
//! In sharded output mode each page's detail fetches join into a page-scoped
//! collector that flushes its own `design-<category>-<page>-<runId>.json`;
//! in single mode all pages append to the run-scoped collector passed down
//! from the category walker.

use futures::future;
use futures::future::LocalBoxFuture;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, error, info};
use url::Url;

use crate::collector::DesignCollector;
use crate::config::{CrawlConfig, PaginationPolicy};
use crate::fetch::{Fetch, FetchError};
use crate::models::Category;
use crate::outputs::Sink;
use crate::walkers::detail;

/// Item cards on a listing page. The class is the site's generated one.
static ITEM_CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("._2Pk9X").unwrap());
static NAV_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"nav[role="navigation"] li a[href]"#).unwrap());
/// The pagination nav's last page-number cell (the final `li` is the
/// "next" arrow).
static LAST_PAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"nav[role="navigation"] li:nth-last-child(2) a"#).unwrap());

/// Walk one category's listing pages, dispatching detail visits per item.
///
/// Derives a listing session and a detail session from `fetcher` so each
/// sub-tier dedups its own visits. With `run_collector` set (single output
/// mode) every extracted design lands in that shared collector; without it
/// (sharded mode) each page flushes its own shard through `sink`.
pub async fn walk_listing<F: Fetch>(
    fetcher: &F,
    config: &CrawlConfig,
    sink: &Sink,
    category: &Category,
    run_collector: Option<&DesignCollector>,
) {
    let base = match Url::parse(&config.base_url) {
        Ok(base) => base,
        Err(e) => {
            error!(base_url = %config.base_url, error = %e, "Invalid base URL");
            return;
        }
    };
    let listing_url = match base.join(&category.url) {
        Ok(url) => url,
        Err(e) => {
            error!(category = %category.name, url = %category.url, error = %e, "Invalid category URL");
            return;
        }
    };

    let listing_session = fetcher.derive();
    let detail_session = fetcher.derive();

    match config.pagination {
        PaginationPolicy::Recursive => {
            walk_recursive(
                &listing_session,
                &detail_session,
                config,
                sink,
                category,
                run_collector,
                &base,
                listing_url,
            )
            .await;
        }
        PaginationPolicy::Enumerated => {
            walk_enumerated(
                &listing_session,
                &detail_session,
                config,
                sink,
                category,
                run_collector,
                &base,
                listing_url,
            )
            .await;
        }
    }
}

/// Recursive policy: one fetch per page yields items and next-page links.
#[allow(clippy::too_many_arguments)]
fn walk_recursive<'a, F: Fetch>(
    listing: &'a F,
    details: &'a F,
    config: &'a CrawlConfig,
    sink: &'a Sink,
    category: &'a Category,
    run_collector: Option<&'a DesignCollector>,
    base: &'a Url,
    url: Url,
) -> LocalBoxFuture<'a, ()> {
    Box::pin(async move {
        info!(url = %url, category = %category.name, "Visiting listing page");
        let body = match listing.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(FetchError::AlreadyVisited(_)) => {
                debug!(url = %url, "Listing page already visited; stopping this branch");
                return;
            }
            Err(e) => {
                error!(url = %url, error = %e, "Listing fetch failed");
                return;
            }
        };

        let (items, next_pages) = {
            let doc = Html::parse_document(&body);
            (
                item_links(&doc, base),
                next_page_links(&doc, base, &category.url),
            )
        };

        process_page(details, config, sink, category, run_collector, items, page_index(&url)).await;

        future::join_all(next_pages.into_iter().map(|next| {
            walk_recursive(listing, details, config, sink, category, run_collector, base, next)
        }))
        .await;
    })
}

/// Enumerated policy: read the page count once, then dispatch `1..=N`.
#[allow(clippy::too_many_arguments)]
async fn walk_enumerated<F: Fetch>(
    listing: &F,
    details: &F,
    config: &CrawlConfig,
    sink: &Sink,
    category: &Category,
    run_collector: Option<&DesignCollector>,
    base: &Url,
    listing_url: Url,
) {
    info!(url = %listing_url, category = %category.name, "Visiting listing root");
    let body = match listing.fetch(listing_url.as_str()).await {
        Ok(body) => body,
        Err(e) => {
            error!(url = %listing_url, error = %e, "Listing root fetch failed");
            return;
        }
    };

    let last_page = {
        let doc = Html::parse_document(&body);
        last_page_number(&doc)
    };
    if last_page == 0 {
        info!(category = %category.name, "No pages to enumerate");
        return;
    }
    info!(category = %category.name, pages = last_page, "Enumerating listing pages");

    stream::iter(1..=last_page)
        .for_each_concurrent(config.concurrency, |page| {
            let page_url = with_page_param(&listing_url, page);
            async move {
                info!(url = %page_url, "Visiting listing page");
                let body = match listing.fetch(page_url.as_str()).await {
                    Ok(body) => body,
                    Err(e) => {
                        error!(url = %page_url, error = %e, "Listing page fetch failed");
                        return;
                    }
                };
                let items = {
                    let doc = Html::parse_document(&body);
                    item_links(&doc, base)
                };
                process_page(details, config, sink, category, run_collector, items, page).await;
            }
        })
        .await;
}

/// Dispatch the detail visits for one page's items and join them; in
/// sharded mode, flush the page's collector as its own shard afterwards.
async fn process_page<F: Fetch>(
    details: &F,
    config: &CrawlConfig,
    sink: &Sink,
    category: &Category,
    run_collector: Option<&DesignCollector>,
    items: Vec<Url>,
    page: u32,
) {
    let (collector, page_scoped) = match run_collector {
        Some(shared) => (shared.clone(), false),
        None => (DesignCollector::new(), true),
    };

    debug!(category = %category.name, page, items = items.len(), "Dispatching detail visits");
    stream::iter(items)
        .for_each_concurrent(config.concurrency, |item| {
            let collector = collector.clone();
            async move {
                detail::visit_detail(details, item.as_str(), &category.name, &collector).await;
            }
        })
        .await;

    if page_scoped {
        let designs = collector.drain().await;
        if let Err(e) = sink.write_shard(&category.name, page, &designs).await {
            error!(category = %category.name, page, error = %e, "Failed to write design shard");
        }
    }
}

/// Unique item links on a listing page, resolved against the site base.
fn item_links(doc: &Html, base: &Url) -> Vec<Url> {
    doc.select(&ITEM_CARD)
        .filter_map(|el| el.value().attr("href"))
        .unique()
        .filter_map(|href| base.join(href).ok())
        .collect()
}

/// Navigation links scoped to this category's own listing path.
fn next_page_links(doc: &Html, base: &Url, category_path: &str) -> Vec<Url> {
    doc.select(&NAV_LINKS)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.starts_with(category_path))
        .unique()
        .filter_map(|href| base.join(href).ok())
        .collect()
}

/// Parse the last page number from the pagination nav. Missing element or
/// non-numeric content both mean zero pages.
fn last_page_number(doc: &Html) -> u32 {
    doc.select(&LAST_PAGE)
        .next()
        .map(|el| el.text().collect::<String>().trim().parse().unwrap_or(0))
        .unwrap_or(0)
}

/// Substitute `page=<page>` into the listing URL, replacing any existing
/// `page` parameter and keeping the rest of the query intact.
fn with_page_param(url: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut out = url.clone();
    {
        let mut pairs = out.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        pairs.append_pair("page", &page.to_string());
    }
    out
}

/// Page index of a listing URL, from its `page` query parameter. A listing
/// URL without one is page 1.
fn page_index(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(1)
}
