use crate::dom::{Document, Element, Slot};
use crate::i18n::TranslationTable;

pub const DEFAULT_THEME: &str = "dark";

/// Display metadata for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeInfo {
    pub id: &'static str,
    /// Translation key of the display name
    pub name_key: &'static str,
    pub class_name: &'static str,
    pub icon: &'static str,
}

const THEMES: &[ThemeInfo] = &[
    ThemeInfo {
        id: "dark",
        name_key: "themeDark",
        class_name: "theme-dark",
        icon: "fas fa-moon",
    },
    ThemeInfo {
        id: "light",
        name_key: "themeLight",
        class_name: "theme-light",
        icon: "fas fa-sun",
    },
];

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<ThemeInfo>,
}

impl ThemeRegistry {
    pub fn new(themes: Vec<ThemeInfo>) -> Self {
        Self { themes }
    }

    pub fn builtin() -> Self {
        Self::new(THEMES.to_vec())
    }

    pub fn get(&self, id: &str) -> Option<&ThemeInfo> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn is_supported(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn themes(&self) -> &[ThemeInfo] {
        &self.themes
    }

    /// Makes `id` the single active theme class on the document root and
    /// refreshes the theme indicator. Returns false for an unknown theme,
    /// leaving the document untouched.
    pub fn apply(
        &self,
        doc: &mut Document,
        id: &str,
        translations: &TranslationTable,
        language: &str,
    ) -> bool {
        let Some(theme) = self.get(id) else {
            tracing::warn!("Unknown theme: {}", id);
            return false;
        };

        let root = doc.root_mut();
        for known in &self.themes {
            root.remove_class(known.class_name);
        }
        root.add_class(theme.class_name);

        doc.slot_mut(Slot::CurrentTheme)
            .set_text(translations.get(language, theme.name_key));

        let icon = doc.slot_mut(Slot::ThemeIcon);
        for known in &self.themes {
            for class in known.icon.split_whitespace() {
                icon.remove_class(class);
            }
        }
        for class in theme.icon.split_whitespace() {
            icon.add_class(class);
        }

        let dropdown = doc.slot_mut(Slot::ThemeDropdown);
        dropdown.clear();
        for known in &self.themes {
            let mut option = Element::new("div")
                .with_class("dropdown-item")
                .with_attr("data-theme", known.id)
                .with_child(Element::new("i").with_classes(known.icon))
                .with_child(
                    Element::new("span").with_text(translations.get(language, known.name_key)),
                );
            if known.id == theme.id {
                option.add_class("active");
            }
            dropdown.append(option);
        }

        tracing::debug!("Applied theme {}", theme.id);
        true
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
