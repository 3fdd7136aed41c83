//! Headless document the renderer writes into.
//!
//! Mirrors the fixed insertion points of the card page: every [`Slot`] owns a
//! single element whose contents are replaced on render. The root element
//! carries the active theme class.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Named insertion points of the card page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Username,
    Status,
    OnlineStatus,
    StatusIndicator,
    StatusSection,
    Avatar,
    LinksContainer,
    CurrentLanguage,
    LanguageDropdown,
    CurrentTheme,
    ThemeIcon,
    ThemeDropdown,
    StatusTitle,
    LinksTitle,
    LoadingStatus,
    BackToHub,
}

impl Slot {
    pub const ALL: [Slot; 16] = [
        Slot::Username,
        Slot::Status,
        Slot::OnlineStatus,
        Slot::StatusIndicator,
        Slot::StatusSection,
        Slot::Avatar,
        Slot::LinksContainer,
        Slot::CurrentLanguage,
        Slot::LanguageDropdown,
        Slot::CurrentTheme,
        Slot::ThemeIcon,
        Slot::ThemeDropdown,
        Slot::StatusTitle,
        Slot::LinksTitle,
        Slot::LoadingStatus,
        Slot::BackToHub,
    ];

    /// Element id of the slot in the page markup.
    pub fn id(self) -> &'static str {
        match self {
            Slot::Username => "username",
            Slot::Status => "status",
            Slot::OnlineStatus => "onlinestatus",
            Slot::StatusIndicator => "status-indicator",
            Slot::StatusSection => "status-section",
            Slot::Avatar => "avatar",
            Slot::LinksContainer => "links-container",
            Slot::CurrentLanguage => "currentLanguage",
            Slot::LanguageDropdown => "languageDropdown",
            Slot::CurrentTheme => "currentTheme",
            Slot::ThemeIcon => "themeIcon",
            Slot::ThemeDropdown => "themeDropdown",
            Slot::StatusTitle => "statusTitle",
            Slot::LinksTitle => "linksTitle",
            Slot::LoadingStatus => "loadingStatus",
            Slot::BackToHub => "backToHubText",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Slot::StatusIndicator | Slot::StatusSection | Slot::Avatar => "div",
            Slot::LinksContainer | Slot::LanguageDropdown | Slot::ThemeDropdown => "div",
            Slot::ThemeIcon => "i",
            Slot::StatusTitle | Slot::LinksTitle => "h2",
            _ => "span",
        }
    }

    fn initial_classes(self) -> &'static [&'static str] {
        match self {
            Slot::StatusIndicator => &["online-indicator"],
            Slot::StatusSection => &["status-section"],
            Slot::LinksContainer => &["links"],
            Slot::LanguageDropdown | Slot::ThemeDropdown => &["dropdown"],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    pub hidden: bool,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Adds every whitespace-separated class in `classes`.
    pub fn with_classes(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Adds `class` unless already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Replaces the element's children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        self.text = Some(text.to_string());
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Drops text and children, keeping tag, classes and attributes.
    pub fn clear(&mut self) {
        self.text = None;
        self.children.clear();
    }

    /// Text of this element and all descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    pub fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if self.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        if !is_void(&self.tag) {
            let _ = write!(out, "</{}>", self.tag);
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

static DETACHED: Element = Element {
    tag: String::new(),
    classes: Vec::new(),
    attributes: BTreeMap::new(),
    text: None,
    hidden: false,
    children: Vec::new(),
};

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "input" | "meta" | "link")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The page: a root element plus one element per [`Slot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
    slots: BTreeMap<Slot, Element>,
}

impl Document {
    pub fn new() -> Self {
        let slots = Slot::ALL
            .iter()
            .map(|slot| {
                let mut element = Element::new(slot.tag()).with_attr("id", slot.id());
                for class in slot.initial_classes() {
                    element.add_class(class);
                }
                (*slot, element)
            })
            .collect();

        Self {
            root: Element::new("body"),
            slots,
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn slot(&self, slot: Slot) -> &Element {
        // Every slot is inserted in `new`
        self.slots.get(&slot).unwrap_or(&DETACHED)
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Element {
        self.slots
            .entry(slot)
            .or_insert_with(|| Element::new(slot.tag()).with_attr("id", slot.id()))
    }

    /// Serializes the root with every slot as a direct child, in slot order.
    pub fn to_html(&self) -> String {
        let mut root = self.root.clone();
        root.clear();
        for element in self.slots.values() {
            root.append(element.clone());
        }
        root.to_html()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_a_set() {
        let mut el = Element::new("div").with_class("a");
        el.add_class("a");
        el.add_class("b");
        assert_eq!(el.classes(), ["a", "b"]);
        el.remove_class("a");
        assert!(!el.has_class("a"));
        assert!(el.has_class("b"));
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut el = Element::new("div").with_child(Element::new("img"));
        el.set_text("hello");
        assert!(el.children().is_empty());
        assert_eq!(el.text_content(), "hello");
    }

    #[test]
    fn test_html_is_escaped() {
        let el = Element::new("a")
            .with_attr("href", "https://example.com/?a=1&b=\"2\"")
            .with_text("<b>bold</b>");
        assert_eq!(
            el.to_html(),
            "<a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">&lt;b&gt;bold&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn test_void_and_hidden_elements() {
        let mut section =
            Element::new("div").with_child(Element::new("img").with_attr("src", "x.png"));
        section.hidden = true;
        assert_eq!(section.to_html(), "<div hidden><img src=\"x.png\"></div>");
    }

    #[test]
    fn test_document_has_every_slot() {
        let doc = Document::new();
        for slot in Slot::ALL {
            assert_eq!(doc.slot(slot).attr("id"), Some(slot.id()));
        }
        assert!(doc.slot(Slot::StatusIndicator).has_class("online-indicator"));
        let html = doc.to_html();
        assert!(html.starts_with("<body>"));
        assert!(html.contains("id=\"links-container\""));
    }
}
