//! Static translation table for the card's display strings.

use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_LANGUAGE: &str = "ru";
/// Language used when a link has no title in the current language.
pub const FALLBACK_LANGUAGE: &str = "en";

const RU: &[(&str, &str)] = &[
    ("statusTitle", "Статус"),
    ("linksTitle", "Ссылки"),
    ("loadingStatus", "Загрузка статуса..."),
    ("loadingLinks", "Загрузка ссылок..."),
    ("backToHub", "Назад к хабу"),
    ("online", "Онлайн"),
    ("offline", "Оффлайн"),
    ("checkingStatus", "Проверка статуса..."),
    ("statusNotFound", "Статус не найден."),
    ("userNotFound", "Пользователь не найден."),
    ("errorLoadingStatus", "Ошибка загрузки статуса."),
    ("errorLoadingLinks", "Ошибка загрузки ссылок."),
    ("linksNotFound", "Ссылки не найдены."),
    ("themeDark", "Темная"),
    ("themeLight", "Светлая"),
];

const EN: &[(&str, &str)] = &[
    ("statusTitle", "Status"),
    ("linksTitle", "Links"),
    ("loadingStatus", "Loading status..."),
    ("loadingLinks", "Loading links..."),
    ("backToHub", "Back to Hub"),
    ("online", "Online"),
    ("offline", "Offline"),
    ("checkingStatus", "Checking status..."),
    ("statusNotFound", "Status not found."),
    ("userNotFound", "User not found."),
    ("errorLoadingStatus", "Error loading status."),
    ("errorLoadingLinks", "Error loading links."),
    ("linksNotFound", "Links not found."),
    ("themeDark", "Dark"),
    ("themeLight", "Light"),
];

/// Display strings for one language.
#[derive(Debug, Clone)]
pub struct LanguagePack {
    pub code: String,
    /// Native name shown in the language picker
    pub name: String,
    strings: HashMap<String, String>,
}

impl LanguagePack {
    pub fn new(code: &str, name: &str, strings: &[(&str, &str)]) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            strings: strings
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }
}

/// Language code to display strings. Built once at startup and shared by
/// reference with the renderer.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    languages: BTreeMap<String, LanguagePack>,
}

impl TranslationTable {
    pub fn new(packs: impl IntoIterator<Item = LanguagePack>) -> Self {
        Self {
            languages: packs.into_iter().map(|p| (p.code.clone(), p)).collect(),
        }
    }

    /// Russian and English, the two languages the card ships with.
    pub fn builtin() -> Self {
        Self::new([
            LanguagePack::new("ru", "Русский", RU),
            LanguagePack::new("en", "English", EN),
        ])
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    /// Returns the translation of `key`, or `key` itself when the language or
    /// the key is unknown.
    pub fn get<'a>(&'a self, code: &str, key: &'a str) -> &'a str {
        self.languages
            .get(code)
            .and_then(|pack| pack.get(key))
            .unwrap_or(key)
    }

    /// Like [`get`](Self::get) but reports whether a translation exists.
    pub fn lookup(&self, code: &str, key: &str) -> Option<&str> {
        self.languages.get(code).and_then(|pack| pack.get(key))
    }

    pub fn name<'a>(&'a self, code: &'a str) -> &'a str {
        self.languages
            .get(code)
            .map_or(code, |pack| pack.name.as_str())
    }

    pub fn languages(&self) -> impl Iterator<Item = &LanguagePack> {
        self.languages.values()
    }
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::builtin()
    }
}
