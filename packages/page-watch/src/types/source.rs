//! Source types - a monitored page and the selectors that describe its items.

use serde::{Deserialize, Serialize};

/// How a field value is pulled out of the matched elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Trimmed text content
    Text,
    /// Link target, root-relative paths resolved against the page URL
    Url,
    /// One entry per matched element, stacked vertically
    List,
    /// One entry per matched element, on a single line
    ListInline,
}

/// Where one named field lives inside an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    /// CSS selector, relative to the item container
    pub path: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }
}

/// One monitored page with its extraction schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Unique identifier, also the key in the dedup store
    pub name: String,

    /// Inactive sources are skipped entirely
    #[serde(default)]
    pub active: bool,

    /// Page address
    pub url: String,

    /// Selector for each item container
    pub item_path: String,

    /// Selector for the title, relative to the container
    pub title_path: String,

    /// Marker near the end of the page, used to force lazy content to render
    #[serde(default)]
    pub footer_path: String,

    /// Ordered field descriptors
    #[serde(default)]
    pub contents: Vec<FieldSpec>,
}

impl Source {
    /// Create an active source with no fields.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        item_path: impl Into<String>,
        title_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            active: true,
            url: url.into(),
            item_path: item_path.into(),
            title_path: title_path.into(),
            footer_path: String::new(),
            contents: Vec::new(),
        }
    }

    pub fn with_footer(mut self, footer_path: impl Into<String>) -> Self {
        self.footer_path = footer_path.into();
        self
    }

    pub fn with_field(mut self, spec: FieldSpec) -> Self {
        self.contents.push(spec);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config_shape() {
        let json = r#"{
            "name": "Blog",
            "active": true,
            "url": "https://example.com/blog",
            "itemPath": ".post",
            "titlePath": "h2",
            "footerPath": "footer",
            "contents": [
                { "name": "link", "path": "a", "type": "url" },
                { "name": "tags", "path": ".tag", "type": "list-inline" },
                { "name": "authors", "path": ".author", "type": "list" },
                { "name": "body", "path": "p", "type": "text" }
            ]
        }"#;

        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.name, "Blog");
        assert!(source.active);
        assert_eq!(source.item_path, ".post");
        assert_eq!(source.footer_path, "footer");
        let kinds: Vec<_> = source.contents.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Url,
                FieldKind::ListInline,
                FieldKind::List,
                FieldKind::Text
            ]
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{ "name": "x", "path": "a", "type": "image" }"#;
        assert!(serde_json::from_str::<FieldSpec>(json).is_err());
    }

    #[test]
    fn test_missing_active_defaults_to_inactive() {
        let json = r#"{ "name": "x", "url": "https://e.com", "itemPath": "li", "titlePath": "a" }"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert!(!source.active);
        assert!(source.contents.is_empty());
    }
}
