//! Pattern-based metadata extraction
//!
//! Pure functions over page source. Each profile tries its patterns in
//! sequence and the first match wins.

use regex::Regex;
use std::sync::LazyLock;

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Invalid regex"));

static DVD_POSTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class="dvd-container"[^>]*onclick="showDvdPoster\(\)"[^>]*>.*?<img[^>]*src=["']([^"']+)["']"#,
    )
    .expect("Invalid regex")
});

static CSS_BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image:\s*url\(["']([^"']+)["']\)"#).expect("Invalid regex")
});

static JSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""name"\s*:\s*"([^"\r\n]+)""#).expect("Invalid regex"));

static JSON_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""image"\s*:\s*"([^"\r\n]+)""#).expect("Invalid regex"));

/// Title and image pulled from a page. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub image: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.image.is_none()
    }
}

fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str().to_string())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Text of the first `<title>` element, trimmed
pub fn html_title(html: &str) -> Option<String> {
    first_capture(&TITLE_TAG, html).and_then(|t| non_empty(t.trim().to_string()))
}

/// FSMirror pages: DVD poster first, CSS background image second
pub fn fsmirror_metadata(html: &str) -> PageMetadata {
    let image = first_capture(&DVD_POSTER, html).or_else(|| first_capture(&CSS_BACKGROUND, html));
    PageMetadata {
        title: html_title(html),
        image,
    }
}

/// Netflix title pages embed JSON-LD. Scan line by line and keep the first
/// `"name"` and `"image"` values; stop once both are found.
pub fn netflix_metadata(html: &str) -> PageMetadata {
    let mut meta = PageMetadata::default();
    for line in html.lines() {
        if meta.title.is_none() && line.contains("\"name\"") {
            meta.title = first_capture(&JSON_NAME, line);
        }
        if meta.image.is_none() && line.contains("\"image\"") {
            meta.image = first_capture(&JSON_IMAGE, line);
        }
        if meta.title.is_some() && meta.image.is_some() {
            break;
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_title_is_case_insensitive_and_multiline() {
        let html = "<html><HEAD><TITLE>\n  Dark - Staffel 1\n</TITLE></HEAD></html>";
        assert_eq!(html_title(html).as_deref(), Some("Dark - Staffel 1"));
        assert_eq!(html_title("<title>   </title>"), None);
        assert_eq!(html_title("<p>no title</p>"), None);
    }

    #[test]
    fn test_fsmirror_prefers_dvd_poster() {
        let html = r#"
            <title>Film A</title>
            <div style="background-image: url('https://cdn/bg.jpg')"></div>
            <div class="dvd-container" id="x" onclick="showDvdPoster()" role="button">
                <span>cover</span>
                <img class="poster" src="https://cdn/poster.jpg" alt="">
            </div>"#;
        let meta = fsmirror_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("Film A"));
        assert_eq!(meta.image.as_deref(), Some("https://cdn/poster.jpg"));
    }

    #[test]
    fn test_fsmirror_falls_back_to_css_background() {
        let html = r#"<title>Film B</title><div style="background-image: url(&quot;x&quot;); background-image:url("https://cdn/bg.jpg")"></div>"#;
        let meta = fsmirror_metadata(html);
        assert_eq!(meta.image.as_deref(), Some("https://cdn/bg.jpg"));
    }

    #[test]
    fn test_fsmirror_without_matches_is_empty() {
        let meta = fsmirror_metadata("<html><body>nothing</body></html>");
        assert!(meta.is_empty());
    }

    #[test]
    fn test_netflix_takes_first_name_and_image() {
        let html = concat!(
            "<script type=\"application/ld+json\">\n",
            "{\"@type\":\"TVSeries\",\"name\": \"Dark\",\n",
            "\"image\" : \"https://occ.nflxso.net/dark.jpg\"}\n",
            "{\"name\":\"Later Name\",\"image\":\"https://later.jpg\"}\n",
            "</script>"
        );
        let meta = netflix_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("Dark"));
        assert_eq!(meta.image.as_deref(), Some("https://occ.nflxso.net/dark.jpg"));
    }

    #[test]
    fn test_netflix_name_and_image_on_same_line() {
        let html = r#"{"name":"Squid Game","image":"https://img/sg.jpg"}"#;
        let meta = netflix_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("Squid Game"));
        assert_eq!(meta.image.as_deref(), Some("https://img/sg.jpg"));
    }

    #[test]
    fn test_netflix_partial_match() {
        let meta = netflix_metadata("{\"name\": \"Only Name\"}");
        assert_eq!(meta.title.as_deref(), Some("Only Name"));
        assert_eq!(meta.image, None);
    }
}
