//! Page scraper
//!
//! Fetches a page and pulls out a title and poster image for one of the known
//! site profiles. Scraping never fails past this boundary: any fetch error is
//! logged and yields empty metadata.

mod extract;
mod fetch;

pub use extract::{fsmirror_metadata, netflix_metadata, PageMetadata};
pub use fetch::{HttpFetcher, PageFetcher};

use tracing::{info, instrument};

use crate::error::ResultExt;

/// Which extraction rules apply to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteProfile {
    Netflix,
    FsMirror,
}

impl SiteProfile {
    pub fn extract(self, body: &str) -> PageMetadata {
        match self {
            Self::Netflix => netflix_metadata(body),
            Self::FsMirror => fsmirror_metadata(body),
        }
    }
}

/// Fetch `url` and extract metadata with `profile`.
///
/// Returns empty metadata when the page cannot be fetched.
#[instrument(skip(fetcher))]
pub fn scrape(fetcher: &dyn PageFetcher, profile: SiteProfile, url: &str) -> PageMetadata {
    let Some(body) = fetcher.fetch_text(url).warn_on_err() else {
        return PageMetadata::default();
    };

    let meta = profile.extract(&body);
    info!(
        event_type = "scrape",
        found_title = meta.title.is_some(),
        found_image = meta.image.is_some(),
        "Scraped page metadata"
    );
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BridgeError, Result};

    struct Unreachable;

    impl PageFetcher for Unreachable {
        fn fetch_text(&self, url: &str) -> Result<String> {
            Err(BridgeError::Http {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }

        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.fetch_text(url).map(String::into_bytes)
        }
    }

    struct Canned(&'static str);

    impl PageFetcher for Canned {
        fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_scrape_failure_yields_absent_title_and_image() {
        for profile in [SiteProfile::Netflix, SiteProfile::FsMirror] {
            let meta = scrape(&Unreachable, profile, "http://127.0.0.1:9/");
            assert_eq!(meta, PageMetadata::default());
        }
    }

    #[test]
    fn test_scrape_dispatches_on_profile() {
        let page = Canned("<title>Page</title>\n{\"name\": \"Show\", \"image\": \"https://i/s.jpg\"}");

        let netflix = scrape(&page, SiteProfile::Netflix, "https://www.netflix.com/title/1");
        assert_eq!(netflix.title.as_deref(), Some("Show"));

        let fsmirror = scrape(&page, SiteProfile::FsMirror, "https://fsmirror/x");
        assert_eq!(fsmirror.title.as_deref(), Some("Page"));
        assert_eq!(fsmirror.image, None);
    }

    #[test]
    fn test_http_fetcher_unreachable_url_is_swallowed() {
        // Port 9 (discard) on loopback is closed on CI machines
        let fetcher = HttpFetcher::new("Mozilla/5.0");
        let meta = scrape(&fetcher, SiteProfile::FsMirror, "http://127.0.0.1:9/");
        assert!(meta.is_empty());
    }
}
