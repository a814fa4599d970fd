//! Detail-page visits: fetch, extract, append.

use scraper::Html;
use tracing::{debug, error, info};

use crate::collector::DesignCollector;
use crate::extract::{self, DETAIL_CONTAINER};
use crate::fetch::{Fetch, FetchError};

/// Visit one item detail page and append its extracted record.
///
/// A fetch failure is logged and swallowed so a single bad detail page never
/// aborts the tier. A page without the detail container is treated as
/// nothing to extract, not as an error.
pub async fn visit_detail<F: Fetch>(
    fetcher: &F,
    url: &str,
    category_name: &str,
    collector: &DesignCollector,
) {
    info!(%url, "Visiting detail page");
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(FetchError::AlreadyVisited(_)) => {
            debug!(%url, "Detail page already visited on this session");
            return;
        }
        Err(e) => {
            error!(%url, error = %e, "Detail fetch failed");
            return;
        }
    };

    // Parse and extract inside one scope: the parsed document must not live
    // across the append's await point.
    let design = {
        let doc = Html::parse_document(&body);
        doc.select(&DETAIL_CONTAINER)
            .next()
            .map(|container| extract::extract(container, url, category_name))
    };

    match design {
        Some(design) => {
            debug!(%url, name = %design.name, "Extracted design");
            collector.push(design).await;
        }
        None => debug!(%url, "No detail container on page; nothing to extract"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    const DETAIL_URL: &str = "https://x.test/item/porto/1";

    const DETAIL_PAGE: &str = r#"<html><body><div class="page">
      <div class="item-header"><h1 class="t-heading is-hidden-phone">Porto</h1></div>
      <div class="user-html"><p>desc</p></div>
    </div></body></html>"#;

    #[tokio::test]
    async fn test_detail_visit_appends_one_record() {
        let fetcher = StaticFetcher::new([(DETAIL_URL, DETAIL_PAGE)]);
        let collector = DesignCollector::new();

        visit_detail(&fetcher, DETAIL_URL, "Corporate", &collector).await;

        let designs = collector.drain().await;
        assert_eq!(designs.len(), 1);
        assert_eq!(designs[0].url, DETAIL_URL);
        assert_eq!(designs[0].cat_name, "Corporate");
        assert_eq!(designs[0].name, "Porto");
    }

    #[tokio::test]
    async fn test_shape_mismatch_produces_no_record() {
        let fetcher = StaticFetcher::new([(DETAIL_URL, "<html><body><p>not a detail page</p></body></html>")]);
        let collector = DesignCollector::new();

        visit_detail(&fetcher, DETAIL_URL, "Corporate", &collector).await;

        assert_eq!(collector.len().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let fetcher = StaticFetcher::default();
        let collector = DesignCollector::new();

        visit_detail(&fetcher, DETAIL_URL, "Corporate", &collector).await;

        assert_eq!(collector.len().await, 0);
    }
}
