//! User preferences (language and theme) persisted across sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::SettingsError;
use crate::i18n::{TranslationTable, DEFAULT_LANGUAGE};
use crate::themes::{ThemeRegistry, DEFAULT_THEME};

const PREFERENCES_FILE: &str = "preferences.json";

pub const LANGUAGE_KEY: &str = "preferredLanguage";
pub const THEME_KEY: &str = "preferredTheme";

/// Durable string key-value storage for preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Preferences stored as a flat JSON object in the app data directory.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Opens `preferences.json` inside `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, SettingsError> {
        fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(PREFERENCES_FILE);
        let values = load_values(&path);

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_values(path: &Path) -> BTreeMap<String, String> {
    tracing::debug!("Loading preferences from {}", path.display());

    if !path.exists() {
        return BTreeMap::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read preferences file, using defaults: {}", e);
            return BTreeMap::new();
        }
    };

    if contents.trim().is_empty() {
        tracing::warn!("Preferences file is empty, using defaults");
        return BTreeMap::new();
    }

    match serde_json::from_str(&contents) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("Failed to parse preferences file, using defaults: {}", e);
            BTreeMap::new()
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        tracing::debug!("Saving preference {}={}", key, value);
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());

        let contents = serde_json::to_string_pretty(&*values)?;
        fs::write(&self.path, contents).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Non-durable store, used when no data directory is available and in tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The user's current selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub language: String,
    pub theme: String,
}

impl Preferences {
    /// Reads saved selections, ignoring values that are no longer supported.
    /// An unsupported default is replaced by the built-in one.
    pub fn load(
        store: &dyn PreferenceStore,
        translations: &TranslationTable,
        themes: &ThemeRegistry,
        default_language: &str,
        default_theme: &str,
    ) -> Self {
        let default_language = if translations.is_supported(default_language) {
            default_language
        } else {
            tracing::warn!(
                "Unsupported default language {}, using {}",
                default_language,
                DEFAULT_LANGUAGE
            );
            DEFAULT_LANGUAGE
        };
        let default_theme = if themes.is_supported(default_theme) {
            default_theme
        } else {
            tracing::warn!(
                "Unsupported default theme {}, using {}",
                default_theme,
                DEFAULT_THEME
            );
            DEFAULT_THEME
        };

        let language = match store.get(LANGUAGE_KEY) {
            Some(saved) if translations.is_supported(&saved) => saved,
            Some(saved) => {
                tracing::warn!("Ignoring unsupported saved language: {}", saved);
                default_language.to_string()
            }
            None => default_language.to_string(),
        };

        let theme = match store.get(THEME_KEY) {
            Some(saved) if themes.is_supported(&saved) => saved,
            Some(saved) => {
                tracing::warn!("Ignoring unsupported saved theme: {}", saved);
                default_theme.to_string()
            }
            None => default_theme.to_string(),
        };

        Self { language, theme }
    }

    /// Switches language. Returns false, changing nothing, when `code` is
    /// not in the table.
    pub fn set_language(
        &mut self,
        code: &str,
        translations: &TranslationTable,
        store: &dyn PreferenceStore,
    ) -> bool {
        if !translations.is_supported(code) {
            tracing::warn!("Unsupported language: {}", code);
            return false;
        }
        self.language = code.to_string();
        persist(store, LANGUAGE_KEY, code);
        true
    }

    /// Switches theme. Returns false, changing nothing, when `id` is unknown.
    pub fn set_theme(
        &mut self,
        id: &str,
        themes: &ThemeRegistry,
        store: &dyn PreferenceStore,
    ) -> bool {
        if !themes.is_supported(id) {
            tracing::warn!("Unsupported theme: {}", id);
            return false;
        }
        self.theme = id.to_string();
        persist(store, THEME_KEY, id);
        true
    }
}

// The selection still applies for this session when the write fails.
fn persist(store: &dyn PreferenceStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!("Failed to save preference {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(store: &dyn PreferenceStore) -> Preferences {
        Preferences::load(
            store,
            &TranslationTable::builtin(),
            &ThemeRegistry::builtin(),
            "ru",
            "dark",
        )
    }

    #[test]
    fn test_defaults_when_nothing_saved() {
        let store = MemoryPreferenceStore::new();
        let prefs = load(&store);
        assert_eq!(prefs.language, "ru");
        assert_eq!(prefs.theme, "dark");
    }

    #[test]
    fn test_unsupported_saved_values_are_ignored() {
        let store = MemoryPreferenceStore::new();
        store.set(LANGUAGE_KEY, "xx").unwrap();
        store.set(THEME_KEY, "light").unwrap();
        let prefs = load(&store);
        assert_eq!(prefs.language, "ru");
        assert_eq!(prefs.theme, "light");
    }

    #[test]
    fn test_unsupported_defaults_fall_back_to_builtin() {
        let store = MemoryPreferenceStore::new();
        let prefs = Preferences::load(
            &store,
            &TranslationTable::builtin(),
            &ThemeRegistry::builtin(),
            "de",
            "neon",
        );
        assert_eq!(prefs.language, DEFAULT_LANGUAGE);
        assert_eq!(prefs.theme, DEFAULT_THEME);
    }

    #[test]
    fn test_unsupported_language_changes_nothing() {
        let store = MemoryPreferenceStore::new();
        store.set(LANGUAGE_KEY, "en").unwrap();
        let mut prefs = load(&store);

        assert!(!prefs.set_language("xx", &TranslationTable::builtin(), &store));
        assert_eq!(prefs.language, "en");
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("en"));
    }

    #[test]
    fn test_selection_is_persisted() {
        let store = MemoryPreferenceStore::new();
        let mut prefs = load(&store);

        assert!(prefs.set_language("en", &TranslationTable::builtin(), &store));
        assert!(prefs.set_theme("light", &ThemeRegistry::builtin(), &store));
        assert!(!prefs.set_theme("neon", &ThemeRegistry::builtin(), &store));

        assert_eq!(load(&store), prefs);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FilePreferenceStore::open(dir.path()).unwrap();
            store.set(LANGUAGE_KEY, "en").unwrap();
            store.set(THEME_KEY, "light").unwrap();
        }

        let store = FilePreferenceStore::open(dir.path()).unwrap();
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("en"));
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), "{not json").unwrap();

        let store = FilePreferenceStore::open(dir.path()).unwrap();
        assert_eq!(store.get(LANGUAGE_KEY), None);

        store.set(LANGUAGE_KEY, "en").unwrap();
        let reopened = FilePreferenceStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get(LANGUAGE_KEY).as_deref(), Some("en"));
    }
}
