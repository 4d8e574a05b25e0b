// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Best-effort extraction of a direct media URL and a page title from an
//! HTML page, for locators that point at a page instead of a file. Scanning
//! is regex based; pages that need scripting to reveal their media are out
//! of reach and simply yield `None`.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static VIDEO_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<video[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).unwrap());
static SOURCE_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<source[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).unwrap());
static OG_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]*?property\s*=\s*["']og:title["'][^>]*?content\s*=\s*["']([^"']*)["']"#)
        .unwrap()
});
static OG_TITLE_REVERSED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]*?content\s*=\s*["']([^"']*)["'][^>]*?property\s*=\s*["']og:title["']"#)
        .unwrap()
});
static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

/// Fetches page bodies. `None` covers every failure mode, network or HTTP;
/// extraction degrades to "nothing found" either way.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Option<String>;
}

pub struct PageExtractor {
    fetcher: Arc<dyn HtmlFetcher>,
}

impl PageExtractor {
    pub fn new(fetcher: Arc<dyn HtmlFetcher>) -> Self {
        PageExtractor { fetcher }
    }

    /// Returns the first `<video src>` or `<source src>` found on the page,
    /// resolved against the page URL and with any fragment dropped.
    pub async fn extract_media_url(&self, page_url: &Url) -> Option<Url> {
        let html = self.fetcher.fetch(page_url).await?;
        let raw = first_capture(&VIDEO_SRC, &html).or_else(|| first_capture(&SOURCE_SRC, &html))?;
        let mut resolved = resolve_against(page_url, &raw)?;
        resolved.set_fragment(None);
        Some(resolved)
    }

    /// Returns the page title, preferring `og:title` over `<title>`.
    pub async fn extract_title(&self, page_url: &Url) -> Option<String> {
        let html = self.fetcher.fetch(page_url).await?;
        let raw = first_capture(&OG_TITLE, &html)
            .or_else(|| first_capture(&OG_TITLE_REVERSED, &html))
            .or_else(|| first_capture(&TITLE_TAG, &html))?;
        let title = decode_entities(raw.trim());
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }
}

fn first_capture(regex: &Regex, html: &str) -> Option<String> {
    regex.captures(html).map(|c| c[1].to_string())
}

fn resolve_against(page_url: &Url, raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        // Relative reference, or something like a protocol-relative path.
        _ => page_url.join(raw).ok(),
    }
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last, so "&amp;lt;" decodes to "&lt;" and stops there.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPage(Option<&'static str>);

    #[async_trait]
    impl HtmlFetcher for FixedPage {
        async fn fetch(&self, _url: &Url) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn extractor(html: &'static str) -> PageExtractor {
        PageExtractor::new(Arc::new(FixedPage(Some(html))))
    }

    fn page_url() -> Url {
        Url::parse("https://example.com/watch/clip").unwrap()
    }

    #[tokio::test]
    async fn finds_video_src() {
        let extractor =
            extractor(r#"<html><video controls src="https://cdn.example.com/a.mp4"></video>"#);
        let url = extractor.extract_media_url(&page_url()).await.unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/a.mp4");
    }

    #[tokio::test]
    async fn falls_back_to_source_tag() {
        let extractor = extractor(
            r#"<video controls><source src="/media/a.mp4" type="video/mp4"></video>"#,
        );
        let url = extractor.extract_media_url(&page_url()).await.unwrap();
        assert_eq!(url.as_str(), "https://example.com/media/a.mp4");
    }

    #[tokio::test]
    async fn resolves_relative_and_drops_fragments() {
        let extractor = extractor(r#"<video src="clips/a.mp4#t=5"></video>"#);
        let url = extractor.extract_media_url(&page_url()).await.unwrap();
        assert_eq!(url.as_str(), "https://example.com/watch/clips/a.mp4");
    }

    #[tokio::test]
    async fn page_without_media_yields_none() {
        let extractor = extractor("<html><body>plain page</body></html>");
        assert!(extractor.extract_media_url(&page_url()).await.is_none());
    }

    #[tokio::test]
    async fn fetch_failure_yields_none() {
        let extractor = PageExtractor::new(Arc::new(FixedPage(None)));
        assert!(extractor.extract_media_url(&page_url()).await.is_none());
        assert!(extractor.extract_title(&page_url()).await.is_none());
    }

    #[tokio::test]
    async fn prefers_og_title_over_title_tag() {
        let extractor = extractor(
            r#"<head><title>Fallback</title>
               <meta property="og:title" content="The Clip" /></head>"#,
        );
        assert_eq!(extractor.extract_title(&page_url()).await.unwrap(), "The Clip");
    }

    #[tokio::test]
    async fn accepts_reversed_meta_attribute_order() {
        let extractor =
            extractor(r#"<meta content="Reversed" property="og:title" /><title>No</title>"#);
        assert_eq!(extractor.extract_title(&page_url()).await.unwrap(), "Reversed");
    }

    #[tokio::test]
    async fn title_tag_fallback_decodes_entities() {
        let extractor = extractor("<title> Tom &amp; Jerry &#39;24 </title>");
        assert_eq!(extractor.extract_title(&page_url()).await.unwrap(), "Tom & Jerry '24");
    }

    #[tokio::test]
    async fn blank_title_yields_none() {
        let extractor = extractor("<title>   </title>");
        assert!(extractor.extract_title(&page_url()).await.is_none());
    }
}
