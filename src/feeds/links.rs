use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{FetchError, LinkParseError};
use crate::i18n::FALLBACK_LANGUAGE;

const MARKDOWN_LINK: &str = r"\[(.*?)\]\((.*?)\)";
const DEFAULT_TITLE: &str = "Link";

/// Wire format of the links feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinksSchema {
    /// `{success, data: [{"[title](url)": icon, ...}, ...]}` from the sheets API
    SheetsMarkdown,
    /// `[{name: {lang: title}, url, icon?}, ...]`
    #[default]
    LocalizedJson,
}

impl FromStr for LinksSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sheets_markdown" => Ok(LinksSchema::SheetsMarkdown),
            "localized_json" => Ok(LinksSchema::LocalizedJson),
            other => Err(format!("unknown links schema: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub title_by_language: BTreeMap<String, String>,
    pub url: String,
    pub icon_url: Option<String>,
}

impl LinkEntry {
    /// Title in `language`, else English, else a generic label.
    pub fn title(&self, language: &str) -> &str {
        self.title_by_language
            .get(language)
            .or_else(|| self.title_by_language.get(FALLBACK_LANGUAGE))
            .map_or(DEFAULT_TITLE, String::as_str)
    }
}

/// Links in display order.
pub type LinksSnapshot = Vec<LinkEntry>;

impl LinksSchema {
    /// Adapts a feed body into links. Relative link URLs are resolved
    /// against `base`, the feed's own URL. Bad entries are logged and
    /// skipped; only a body that cannot be read at all is an error.
    pub fn parse(self, body: &Value, base: &Url) -> Result<LinksSnapshot, FetchError> {
        let (links, skipped) = match self {
            LinksSchema::SheetsMarkdown => parse_sheets_markdown(body, base)?,
            LinksSchema::LocalizedJson => parse_localized_json(body, base)?,
        };

        for error in &skipped {
            tracing::warn!("Skipping link entry: {}", error);
        }

        Ok(links)
    }
}

type Parsed = (LinksSnapshot, Vec<LinkParseError>);

#[allow(clippy::expect_used)]
fn markdown_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(MARKDOWN_LINK).expect("markdown link pattern is valid"))
}

/// Splits `[title](url)` into its parts.
pub fn parse_markdown_link(markup: &str) -> Result<(String, String), LinkParseError> {
    let captures = markdown_link_pattern()
        .captures(markup)
        .ok_or_else(|| LinkParseError::InvalidMarkup(markup.to_string()))?;

    let title = captures.get(1).map_or("", |m| m.as_str()).trim();
    let url = captures.get(2).map_or("", |m| m.as_str()).trim();
    if url.is_empty() {
        return Err(LinkParseError::InvalidMarkup(markup.to_string()));
    }

    Ok((title.to_string(), url.to_string()))
}

fn resolve_url(base: &Url, url: &str) -> Result<String, LinkParseError> {
    base.join(url)
        .map(String::from)
        .map_err(|e| LinkParseError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Unwraps `{success, data}` if present.
fn rows(body: &Value) -> Result<&[Value], FetchError> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Object(map) => {
            if map.get("success").and_then(Value::as_bool) != Some(true) {
                return Err(FetchError::NoData);
            }
            map.get("data")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .ok_or_else(|| FetchError::Malformed("links response has no data array".into()))
        }
        other => Err(FetchError::Malformed(format!(
            "expected links array or object, got {other}"
        ))),
    }
}

fn parse_sheets_markdown(body: &Value, base: &Url) -> Result<Parsed, FetchError> {
    let mut links = Vec::new();
    let mut skipped = Vec::new();

    for row in rows(body)? {
        let Some(cells) = row.as_object() else {
            skipped.push(LinkParseError::InvalidEntry(row.to_string()));
            continue;
        };

        for (markup, icon) in cells {
            let entry = parse_markdown_link(markup).and_then(|(title, url)| {
                let url = resolve_url(base, &url)?;
                let mut title_by_language = BTreeMap::new();
                if !title.is_empty() {
                    title_by_language.insert(FALLBACK_LANGUAGE.to_string(), title);
                }
                Ok(LinkEntry {
                    title_by_language,
                    url,
                    icon_url: non_empty(icon.as_str()),
                })
            });

            match entry {
                Ok(entry) => links.push(entry),
                Err(e) => skipped.push(e),
            }
        }
    }

    Ok((links, skipped))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTitle {
    Localized(BTreeMap<String, String>),
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct RawLink {
    name: RawTitle,
    url: String,
    #[serde(default)]
    icon: Option<String>,
}

fn parse_localized_json(body: &Value, base: &Url) -> Result<Parsed, FetchError> {
    let mut links = Vec::new();
    let mut skipped = Vec::new();

    for row in rows(body)? {
        let raw = match RawLink::deserialize(row) {
            Ok(raw) => raw,
            Err(e) => {
                skipped.push(LinkParseError::InvalidEntry(format!("{e}: {row}")));
                continue;
            }
        };

        let link = raw.url.trim();
        if link.is_empty() {
            skipped.push(LinkParseError::InvalidEntry(format!("missing url: {row}")));
            continue;
        }
        let url = match resolve_url(base, link) {
            Ok(url) => url,
            Err(e) => {
                skipped.push(e);
                continue;
            }
        };

        let title_by_language = match raw.name {
            RawTitle::Localized(titles) => titles
                .into_iter()
                .filter(|(_, title)| !title.trim().is_empty())
                .collect(),
            RawTitle::Plain(title) if title.trim().is_empty() => BTreeMap::new(),
            RawTitle::Plain(title) => BTreeMap::from([(FALLBACK_LANGUAGE.to_string(), title)]),
        };

        links.push(LinkEntry {
            title_by_language,
            url,
            icon_url: non_empty(raw.icon.as_deref()),
        });
    }

    Ok((links, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed_url() -> Url {
        Url::parse("https://sheets.example/api/links").unwrap()
    }

    #[test]
    fn test_parse_markdown_link() {
        assert_eq!(
            parse_markdown_link("[GitHub](https://github.com/gtnntg)").unwrap(),
            ("GitHub".to_string(), "https://github.com/gtnntg".to_string())
        );
        assert!(matches!(
            parse_markdown_link("GitHub https://github.com"),
            Err(LinkParseError::InvalidMarkup(_))
        ));
        assert!(parse_markdown_link("[Empty]()").is_err());
    }

    #[test]
    fn test_sheets_markdown_keeps_order_and_skips_bad_keys() {
        let body = json!({
            "success": true,
            "data": [
                {"[GitHub](https://github.com/gtnntg)": "https://example.com/gh.png"},
                {"not a link": "x.png", "[Telegram](https://t.me/gtnntg)": ""},
                {"[Site](https://example.com)": "https://example.com/site.png"}
            ]
        });

        let links = LinksSchema::SheetsMarkdown.parse(&body, &feed_url()).unwrap();
        let titles: Vec<_> = links.iter().map(|l| l.title("ru")).collect();
        assert_eq!(titles, ["GitHub", "Telegram", "Site"]);
        assert_eq!(links[1].icon_url, None);
        assert_eq!(links[0].icon_url.as_deref(), Some("https://example.com/gh.png"));
    }

    #[test]
    fn test_sheets_markdown_unsuccessful_is_no_data() {
        let body = json!({"success": false, "data": []});
        assert!(matches!(
            LinksSchema::SheetsMarkdown.parse(&body, &feed_url()),
            Err(FetchError::NoData)
        ));
    }

    #[test]
    fn test_localized_json() {
        let body = json!([
            {"name": {"en": "GitHub", "ru": "ГитХаб"}, "url": "https://github.com/gtnntg", "icon": "gh.png"},
            {"name": "Plain", "url": "https://example.com"},
            {"name": {"en": "Blank"}, "url": "  "},
            {"url": "https://missing-name.example"}
        ]);

        let links = LinksSchema::LocalizedJson.parse(&body, &feed_url()).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title("ru"), "ГитХаб");
        assert_eq!(links[0].title("en"), "GitHub");
        assert_eq!(links[1].title("ru"), "Plain");
        assert_eq!(links[1].icon_url, None);
    }

    #[test]
    fn test_relative_links_resolve_against_feed() {
        let body = json!({
            "success": true,
            "data": [{
                "[Hub](../index.html)": "hub.png",
                "[GitHub](https://github.com/x)": "gh.png"
            }]
        });
        let links = LinksSchema::SheetsMarkdown.parse(&body, &feed_url()).unwrap();
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, ["https://sheets.example/index.html", "https://github.com/x"]);

        let body = json!([{"name": "Hub", "url": "/hub"}]);
        let links = LinksSchema::LocalizedJson.parse(&body, &feed_url()).unwrap();
        assert_eq!(links[0].url, "https://sheets.example/hub");
    }

    #[test]
    fn test_localized_json_rejects_scalars() {
        assert!(matches!(
            LinksSchema::LocalizedJson.parse(&json!("nope"), &feed_url()),
            Err(FetchError::Malformed(_))
        ));
        assert_eq!(LinksSchema::LocalizedJson.parse(&json!([]), &feed_url()).unwrap(), vec![]);
    }

    #[test]
    fn test_title_fallback() {
        let entry = LinkEntry {
            title_by_language: BTreeMap::from([("en".to_string(), "A".to_string())]),
            url: "https://example.com".to_string(),
            icon_url: None,
        };
        assert_eq!(entry.title("ru"), "A");

        let untitled = LinkEntry {
            title_by_language: BTreeMap::new(),
            ..entry
        };
        assert_eq!(untitled.title("ru"), "Link");
    }

    #[test]
    fn test_schema_from_str() {
        assert_eq!(
            "sheets_markdown".parse::<LinksSchema>().unwrap(),
            LinksSchema::SheetsMarkdown
        );
        assert!("xml".parse::<LinksSchema>().is_err());
    }
}
