//! Static HTML extractor.
//!
//! Fetches the page with reqwest and applies the source's selectors with the
//! `scraper` crate. There is no JavaScript execution; sources that render
//! their items client-side need a browser-backed [`Extractor`].

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ExtractError, ExtractResult};
use crate::traits::Extractor;
use crate::types::record::{Field, Record};
use crate::types::source::{FieldKind, Source};

/// Value used for `url` fields whose element has no `href`.
pub const MISSING_LINK: &str = "No link found!";

/// Column that `list` entries after the first are indented to.
const LIST_INDENT: usize = 15;

/// Separator between `list-inline` entries.
const INLINE_SEPARATOR: &str = "  ";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extractor that fetches plain HTML over HTTP.
pub struct HtmlExtractor {
    client: reqwest::Client,
}

impl HtmlExtractor {
    /// Create an extractor with a 30 second request timeout.
    pub fn new() -> ExtractResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ExtractError::Http(Box::new(e)))?;

        Ok(Self { client })
    }

    /// Use a custom HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_html(&self, url: &Url) -> ExtractResult<String> {
        debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ExtractError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Http(
                format!("HTTP {} for {}", status, url).into(),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ExtractError::Http(Box::new(e)))
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    async fn extract(&self, source: &Source) -> ExtractResult<Vec<Record>> {
        let page_url = Url::parse(&source.url).map_err(|_| ExtractError::InvalidUrl {
            url: source.url.clone(),
        })?;

        let html = self.fetch_html(&page_url).await?;
        let records = extract_records(&html, source, &page_url)?;

        debug!(
            source = %source.name,
            bytes = html.len(),
            records = records.len(),
            "Extracted records"
        );

        Ok(records)
    }

    fn name(&self) -> &str {
        "html"
    }
}

/// Selectors for one source, parsed once per extraction.
struct CompiledSource {
    item: Selector,
    title: Selector,
    footer: Option<Selector>,
    fields: Vec<(String, FieldKind, Selector)>,
}

impl CompiledSource {
    fn compile(source: &Source) -> ExtractResult<Self> {
        let footer = if source.footer_path.is_empty() {
            None
        } else {
            Some(parse_selector(&source.footer_path)?)
        };

        let fields = source
            .contents
            .iter()
            .map(|spec| Ok((spec.name.clone(), spec.kind, parse_selector(&spec.path)?)))
            .collect::<ExtractResult<Vec<_>>>()?;

        Ok(Self {
            item: parse_selector(&source.item_path)?,
            title: parse_selector(&source.title_path)?,
            footer,
            fields,
        })
    }
}

fn parse_selector(selector: &str) -> ExtractResult<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Apply a source's selectors to an HTML document.
///
/// One record per element matching `item_path`; items with an empty title
/// are skipped.
pub fn extract_records(html: &str, source: &Source, page_url: &Url) -> ExtractResult<Vec<Record>> {
    let compiled = CompiledSource::compile(source)?;
    let document = Html::parse_document(html);

    if let Some(footer) = &compiled.footer {
        if document.select(footer).next().is_none() {
            warn!(
                source = %source.name,
                footer = %source.footer_path,
                "Footer marker not found, page may be incompletely rendered"
            );
        }
    }

    let records = document
        .select(&compiled.item)
        .filter_map(|item| {
            let title = trimmed_text(item, &compiled.title);
            if title.is_empty() {
                return None;
            }

            let fields = compiled
                .fields
                .iter()
                .map(|(name, kind, selector)| {
                    Field::new(name.clone(), field_value(item, *kind, selector, page_url))
                })
                .collect();

            Some(Record {
                title,
                source: source.name.clone(),
                fields,
            })
        })
        .collect();

    Ok(records)
}

fn field_value(item: ElementRef<'_>, kind: FieldKind, selector: &Selector, page_url: &Url) -> String {
    match kind {
        FieldKind::Text => trimmed_text(item, selector),
        FieldKind::Url => {
            let href = item
                .select(selector)
                .next()
                .and_then(|el| el.value().attr("href"));
            match href {
                Some(href) => resolve_root_relative(href, page_url),
                None => MISSING_LINK.to_string(),
            }
        }
        FieldKind::List => {
            let separator = format!("\n{:width$}", "", width = LIST_INDENT);
            list_entries(item, selector).join(&separator)
        }
        FieldKind::ListInline => list_entries(item, selector).join(INLINE_SEPARATOR),
    }
}

/// Text of every match, concatenated, with surrounding whitespace removed.
fn trimmed_text(item: ElementRef<'_>, selector: &Selector) -> String {
    item.select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
        .to_string()
}

/// First-child data of every match: text for a text node, the tag name for
/// an element node, empty otherwise.
fn list_entries(item: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    item.select(selector)
        .map(|el| match el.first_child().map(|child| child.value()) {
            Some(Node::Text(text)) => (**text).to_owned(),
            Some(Node::Element(element)) => element.name().to_string(),
            _ => String::new(),
        })
        .collect()
}

/// Prefix root-relative paths with the page's scheme and host.
fn resolve_root_relative(href: &str, page_url: &Url) -> String {
    if !href.starts_with('/') {
        return href.to_string();
    }

    let host = page_url.host_str().unwrap_or_default();
    match page_url.port() {
        Some(port) => format!("{}://{}:{}{}", page_url.scheme(), host, port, href),
        None => format!("{}://{}{}", page_url.scheme(), host, href),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::source::FieldSpec;

    const PAGE: &str = r#"
        <html><body>
          <div class="post">
            <h2>  First post
            </h2>
            <p class="body">Hello world</p>
            <a class="link" href="/posts/1?utm=x">read</a>
            <ul><li class="tag">rust</li><li class="tag">async</li></ul>
            <span class="author">ann</span><span class="author">bob</span><span class="author">cy</span>
          </div>
          <div class="post">
            <h2></h2>
            <p class="body">no title here</p>
          </div>
          <div class="post">
            <h2>Second post</h2>
            <a class="link" href="https://elsewhere.example/x">out</a>
            <span class="author"><b>bold</b></span>
          </div>
          <footer>end</footer>
        </body></html>
    "#;

    fn blog() -> Source {
        Source::new("Blog", "https://blog.example:8443/index", ".post", "h2")
            .with_footer("footer")
            .with_field(FieldSpec::new("body", ".body", FieldKind::Text))
            .with_field(FieldSpec::new("link", "a.link", FieldKind::Url))
            .with_field(FieldSpec::new("tags", ".tag", FieldKind::ListInline))
            .with_field(FieldSpec::new("authors", ".author", FieldKind::List))
    }

    fn extract(source: &Source) -> Vec<Record> {
        let url = Url::parse(&source.url).unwrap();
        extract_records(PAGE, source, &url).unwrap()
    }

    #[test]
    fn test_items_without_title_are_skipped() {
        let records = extract(&blog());
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First post", "Second post"]);
        assert!(records.iter().all(|r| r.source == "Blog"));
    }

    #[test]
    fn test_fields_follow_configuration_order() {
        let records = extract(&blog());
        let names: Vec<_> = records[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["body", "link", "tags", "authors"]);
    }

    #[test]
    fn test_text_field() {
        let records = extract(&blog());
        assert_eq!(records[0].field("body"), Some("Hello world"));
        assert_eq!(records[1].field("body"), Some(""));
    }

    #[test]
    fn test_url_field_resolution() {
        let records = extract(&blog());
        assert_eq!(
            records[0].field("link"),
            Some("https://blog.example:8443/posts/1?utm=x")
        );
        assert_eq!(records[1].field("link"), Some("https://elsewhere.example/x"));
    }

    #[test]
    fn test_url_field_missing_href() {
        let source = Source::new("S", "https://e.example/", ".post", "h2")
            .with_field(FieldSpec::new("link", "p.body", FieldKind::Url));
        let records = extract(&source);
        assert_eq!(records[0].field("link"), Some(MISSING_LINK));
    }

    #[test]
    fn test_list_inline_field() {
        let records = extract(&blog());
        assert_eq!(records[0].field("tags"), Some("rust  async"));
        assert_eq!(records[1].field("tags"), Some(""));
    }

    #[test]
    fn test_list_field_indents_following_entries() {
        let records = extract(&blog());
        let expected = format!("ann\n{0}bob\n{0}cy", " ".repeat(15));
        assert_eq!(records[0].field("authors"), Some(expected.as_str()));
    }

    #[test]
    fn test_list_entry_uses_first_child_data() {
        let records = extract(&blog());
        assert_eq!(records[1].field("authors"), Some("b"));
    }

    #[test]
    fn test_missing_footer_is_not_fatal() {
        let source = blog().with_footer("#does-not-exist");
        assert_eq!(extract(&source).len(), 2);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let source = Source::new("S", "https://e.example/", "div[", "h2");
        let url = Url::parse(&source.url).unwrap();
        let err = extract_records(PAGE, &source, &url).unwrap_err();
        assert!(matches!(err, ExtractError::Selector { selector, .. } if selector == "div["));
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(resolve_root_relative("/x", &url), "http://example.com/x");
        assert_eq!(resolve_root_relative("x", &url), "x");
        assert_eq!(
            resolve_root_relative("https://o.example/", &url),
            "https://o.example/"
        );
    }

    #[tokio::test]
    async fn test_invalid_page_url() {
        let extractor = HtmlExtractor::new().unwrap();
        let source = Source::new("S", "not a url", "li", "a");
        let err = extractor.extract(&source).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl { .. }));
    }
}
