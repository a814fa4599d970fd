//! Catalog-root traversal: category discovery and per-category dispatch.

use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{error, info, instrument};

use crate::collector::DesignCollector;
use crate::config::{CrawlConfig, OutputMode};
use crate::fetch::Fetch;
use crate::models::Category;
use crate::outputs::Sink;
use crate::walkers::listing;

static MENU: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"ul[data-test-selector="category-filter"] li"#).unwrap());
static MENU_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Visit the catalog root, discover its categories, and walk each one.
///
/// The root is fetched exactly once; menu entries whose href starts with a
/// configured skip prefix (site search, the root listing itself) are
/// dropped. Per-category dispatch depends on the output mode:
///
/// - single: all categories walk concurrently into one run-scoped
///   collector, flushed to `designs.json` after the tier join
/// - sharded: categories walk serially, each page flushing its own shard
///   before the next category starts
///
/// Returns the retained categories. A root fetch failure logs and returns
/// an empty collection; it never fails the run.
#[instrument(level = "info", skip_all)]
pub async fn walk_categories<F: Fetch>(
    fetcher: &F,
    config: &CrawlConfig,
    sink: &Sink,
) -> Vec<Category> {
    let root_url = config.root_url();
    info!(url = %root_url, "Visiting catalog root");

    let session = fetcher.derive();
    let body = match session.fetch(&root_url).await {
        Ok(body) => body,
        Err(e) => {
            error!(url = %root_url, error = %e, "Catalog root fetch failed");
            return Vec::new();
        }
    };

    let categories = {
        let doc = Html::parse_document(&body);
        menu_entries(&doc, &config.skip_prefixes)
    };
    info!(count = categories.len(), "Discovered categories");

    match config.output {
        OutputMode::Single => {
            let collector = DesignCollector::new();
            stream::iter(&categories)
                .for_each_concurrent(config.concurrency, |category| {
                    let tier = fetcher.derive();
                    let collector = collector.clone();
                    async move {
                        listing::walk_listing(&tier, config, sink, category, Some(&collector)).await;
                    }
                })
                .await;

            let designs = collector.drain().await;
            info!(count = designs.len(), "Collected designs across all categories");
            if let Err(e) = sink.write_designs(&designs).await {
                error!(error = %e, "Failed to write designs artifact");
            }
        }
        OutputMode::Sharded => {
            for category in &categories {
                let tier = fetcher.derive();
                listing::walk_listing(&tier, config, sink, category, None).await;
            }
        }
    }

    categories
}

/// Category menu entries, minus the noise prefixes.
fn menu_entries(doc: &Html, skip_prefixes: &[String]) -> Vec<Category> {
    doc.select(&MENU)
        .filter_map(|li| li.select(&MENU_LINK).next())
        .filter_map(|link| link.value().attr("href").map(|href| (href, link)))
        .filter(|(href, _)| !skip_prefixes.iter().any(|prefix| href.starts_with(prefix.as_str())))
        .map(|(href, link)| Category::new(href, link.text().collect::<String>().trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationPolicy;
    use crate::fetch::testing::StaticFetcher;
    use crate::models::Design;

    const BASE: &str = "https://x.test";

    fn menu_doc(entries: &[(&str, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(href, name)| format!(r#"<li><a href="{href}">{name}</a></li>"#))
            .collect();
        format!(
            r#"<html><body><ul data-test-selector="category-filter">{items}</ul></body></html>"#
        )
    }

    fn detail_page(name: &str) -> String {
        format!(
            r#"<html><body><div class="page">
              <div class="item-header"><h1 class="t-heading is-hidden-phone">{name}</h1></div>
              <div class="user-html"><p>{name}</p></div>
            </div></body></html>"#
        )
    }

    fn listing_with_item(item_path: &str) -> String {
        format!(r#"<html><body><a class="_2Pk9X" href="{item_path}">item</a></body></html>"#)
    }

    #[test]
    fn test_menu_entries_filters_noise_prefixes() {
        let doc = Html::parse_document(&menu_doc(&[
            ("/search?sort=x", "Search"),
            ("/category/wordpress?sort=date", "All WordPress"),
            ("/category/wordpress/blog", "Blog / Magazine"),
        ]));
        let skip = vec![
            "/search?sort".to_string(),
            "/category/wordpress?sort".to_string(),
        ];

        let categories = menu_entries(&doc, &skip);

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].url, "/category/wordpress/blog");
        assert_eq!(categories[0].name, "Blog / Magazine");
        assert!(categories[0].children.is_empty());
    }

    #[test]
    fn test_menu_entries_without_skip_list_keeps_everything() {
        let doc = Html::parse_document(&menu_doc(&[
            ("/search?sort=x", "Search"),
            ("/category/wordpress/blog", "Blog"),
        ]));
        assert_eq!(menu_entries(&doc, &[]).len(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_single_mode() {
        let config = CrawlConfig {
            base_url: BASE.to_string(),
            start_path: "/category/wordpress?sort=date".to_string(),
            pagination: PaginationPolicy::Recursive,
            output: OutputMode::Single,
            concurrency: 4,
            ..CrawlConfig::default()
        };

        let fetcher = StaticFetcher::new([
            (
                config.root_url(),
                menu_doc(&[
                    ("/search?sort=x", "Search"),
                    ("/category/wordpress/blog", "Blog"),
                    ("/category/wordpress/creative", "Creative"),
                ]),
            ),
            (
                format!("{BASE}/category/wordpress/blog"),
                listing_with_item("/item/alpha/1"),
            ),
            (
                format!("{BASE}/category/wordpress/creative"),
                listing_with_item("/item/beta/2"),
            ),
            (format!("{BASE}/item/alpha/1"), detail_page("Alpha")),
            (format!("{BASE}/item/beta/2"), detail_page("Beta")),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(dir.path(), "run");

        let categories = walk_categories(&fetcher, &config, &sink).await;
        sink.write_categories(&categories).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("categories.json")).unwrap();
        let written: Vec<Category> = serde_json::from_str(&raw).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].name, "Blog");
        assert_eq!(written[1].name, "Creative");

        let raw = std::fs::read_to_string(dir.path().join("designs.json")).unwrap();
        let designs: Vec<Design> = serde_json::from_str(&raw).unwrap();
        assert_eq!(designs.len(), 2);
        let mut urls: Vec<&str> = designs.iter().map(|d| d.url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, vec!["https://x.test/item/alpha/1", "https://x.test/item/beta/2"]);
        assert!(designs.iter().any(|d| d.cat_name == "Blog"));
        assert!(designs.iter().any(|d| d.cat_name == "Creative"));
    }

    #[tokio::test]
    async fn test_root_fetch_failure_yields_empty_collection() {
        let fetcher = StaticFetcher::default();
        let config = CrawlConfig {
            base_url: BASE.to_string(),
            ..CrawlConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(dir.path(), "run");

        let categories = walk_categories(&fetcher, &config, &sink).await;
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_sharded_mode() {
        let config = CrawlConfig {
            base_url: BASE.to_string(),
            start_path: "/category/wordpress?sort=date".to_string(),
            pagination: PaginationPolicy::Enumerated,
            output: OutputMode::Sharded,
            concurrency: 4,
            ..CrawlConfig::default()
        };

        let nav = r#"<html><body><nav role="navigation"><ul>
          <li><a href="/category/wordpress/blog?page=1">1</a></li>
          <li><a href="/category/wordpress/blog?page=1">Next</a></li>
        </ul></nav></body></html>"#;

        let fetcher = StaticFetcher::new([
            (
                config.root_url(),
                menu_doc(&[("/category/wordpress/blog", "Blog")]),
            ),
            (format!("{BASE}/category/wordpress/blog"), nav.to_string()),
            (
                format!("{BASE}/category/wordpress/blog?page=1"),
                listing_with_item("/item/alpha/1"),
            ),
            (format!("{BASE}/item/alpha/1"), detail_page("Alpha")),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(dir.path(), "runid");

        let categories = walk_categories(&fetcher, &config, &sink).await;
        assert_eq!(categories.len(), 1);

        let raw = std::fs::read_to_string(dir.path().join("design-blog-1-runid.json")).unwrap();
        let designs: Vec<Design> = serde_json::from_str(&raw).unwrap();
        assert_eq!(designs.len(), 1);
        assert_eq!(designs[0].name, "Alpha");
        // single-mode artifact must not exist in sharded mode
        assert!(!dir.path().join("designs.json").exists());
    }
}
