//! The card's shared state: feed caches, preferences and the rendered
//! document. Constructed once at startup and shared with the poller.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::dom::Document;
use crate::error::FetchError;
use crate::feeds::{FeedKind, LinksSnapshot, ProfileSnapshot, Resource, Snapshot};
use crate::i18n::TranslationTable;
use crate::render::Renderer;
use crate::settings::{PreferenceStore, Preferences};
use crate::themes::ThemeRegistry;

/// Called with the document after every render, while the card is locked.
/// Must not call back into the card.
pub type RenderHook = Box<dyn Fn(&Document) + Send + Sync>;

/// What applying one fetch result did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Payload equal to the cached one; nothing rendered
    Unchanged,
    /// New or different payload cached and rendered
    Updated,
    /// Fetch failed after a previous success; cache cleared and rendered
    Cleared,
    /// Fetch failed with nothing cached; nothing rendered
    Failed,
    /// Completed after a newer fetch for the same feed was applied
    Stale,
    /// Completed after teardown
    Inactive,
}

impl PollOutcome {
    pub fn rendered(self) -> bool {
        matches!(self, PollOutcome::Updated | PollOutcome::Cleared)
    }
}

#[derive(Debug)]
struct FeedState<T> {
    kind: FeedKind,
    cache: Resource<Snapshot<T>>,
    applied_seq: u64,
    renders: u64,
}

impl<T: PartialEq> FeedState<T> {
    fn new(kind: FeedKind) -> Self {
        Self {
            kind,
            cache: Resource::Pending,
            applied_seq: 0,
            renders: 0,
        }
    }

    fn data(&self) -> Resource<&T> {
        match &self.cache {
            Resource::Pending => Resource::Pending,
            Resource::Unavailable => Resource::Unavailable,
            Resource::Ready(snapshot) => Resource::Ready(&snapshot.data),
        }
    }

    fn apply(&mut self, seq: u64, result: Result<Snapshot<T>, FetchError>) -> PollOutcome {
        let name = self.kind.name();
        if seq <= self.applied_seq {
            tracing::debug!(
                "Discarding stale {} fetch #{} (applied #{})",
                name,
                seq,
                self.applied_seq
            );
            return PollOutcome::Stale;
        }
        self.applied_seq = seq;

        match result {
            Ok(snapshot) => {
                if let Resource::Ready(previous) = &self.cache {
                    if previous.same_content(&snapshot) {
                        tracing::debug!("{} data unchanged", name);
                        return PollOutcome::Unchanged;
                    }
                }
                tracing::info!("{} data updated at {}", name, snapshot.fetched_at);
                self.cache = Resource::Ready(snapshot);
                PollOutcome::Updated
            }
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", name, e);
                if matches!(self.cache, Resource::Ready(_)) {
                    tracing::info!("{} data no longer available", name);
                    self.cache = Resource::Unavailable;
                    PollOutcome::Cleared
                } else {
                    PollOutcome::Failed
                }
            }
        }
    }
}

struct View {
    preferences: Preferences,
    profile: FeedState<ProfileSnapshot>,
    links: FeedState<LinksSnapshot>,
    document: Document,
}

pub struct Card {
    translations: TranslationTable,
    themes: ThemeRegistry,
    store: Arc<dyn PreferenceStore>,
    view: Mutex<View>,
    on_render: Option<RenderHook>,
}

impl Card {
    /// Restores saved preferences (falling back to `defaults`), applies the
    /// theme and renders the initial loading state.
    pub fn new(
        translations: TranslationTable,
        themes: ThemeRegistry,
        store: Arc<dyn PreferenceStore>,
        defaults: &Preferences,
    ) -> Self {
        let preferences = Preferences::load(
            store.as_ref(),
            &translations,
            &themes,
            &defaults.language,
            &defaults.theme,
        );
        tracing::info!(
            "Preferences: language={}, theme={}",
            preferences.language,
            preferences.theme
        );

        let card = Self {
            translations,
            themes,
            store,
            view: Mutex::new(View {
                preferences,
                profile: FeedState::new(FeedKind::Profile),
                links: FeedState::new(FeedKind::Links),
                document: Document::new(),
            }),
            on_render: None,
        };
        card.render_all();
        card
    }

    pub fn with_render_hook(mut self, hook: RenderHook) -> Self {
        self.on_render = Some(hook);
        self
    }

    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    pub fn language(&self) -> String {
        self.view.lock().preferences.language.clone()
    }

    pub fn theme(&self) -> String {
        self.view.lock().preferences.theme.clone()
    }

    pub fn document(&self) -> Document {
        self.view.lock().document.clone()
    }

    /// Number of times the given feed's section has been rendered.
    pub fn render_count(&self, kind: FeedKind) -> u64 {
        let view = self.view.lock();
        match kind {
            FeedKind::Profile => view.profile.renders,
            FeedKind::Links => view.links.renders,
        }
    }

    pub fn profile(&self) -> Resource<ProfileSnapshot> {
        let view = self.view.lock();
        clone_data(view.profile.data())
    }

    pub fn links(&self) -> Resource<LinksSnapshot> {
        let view = self.view.lock();
        clone_data(view.links.data())
    }

    /// Applies the result of profile fetch number `seq`, rendering the
    /// profile section only if the cache changed.
    pub fn apply_profile(
        &self,
        seq: u64,
        result: Result<Snapshot<ProfileSnapshot>, FetchError>,
    ) -> PollOutcome {
        let mut view = self.view.lock();
        let outcome = view.profile.apply(seq, result);
        if outcome.rendered() {
            self.render_profile(&mut view);
            self.notify(&view);
        }
        outcome
    }

    /// Applies the result of links fetch number `seq`, rendering the links
    /// section only if the cache changed.
    pub fn apply_links(
        &self,
        seq: u64,
        result: Result<Snapshot<LinksSnapshot>, FetchError>,
    ) -> PollOutcome {
        let mut view = self.view.lock();
        let outcome = view.links.apply(seq, result);
        if outcome.rendered() {
            self.render_links(&mut view);
            self.notify(&view);
        }
        outcome
    }

    /// Switches language and re-renders the whole card. Returns false,
    /// changing nothing, for an unsupported code.
    pub fn change_language(&self, code: &str) -> bool {
        let mut view = self.view.lock();
        if !view
            .preferences
            .set_language(code, &self.translations, self.store.as_ref())
        {
            return false;
        }
        tracing::info!("Language changed to {}", code);
        self.render_view(&mut view);
        self.notify(&view);
        true
    }

    /// Switches and applies a theme. Returns false, changing nothing, for an
    /// unknown theme.
    pub fn change_theme(&self, id: &str) -> bool {
        let mut view = self.view.lock();
        if !view
            .preferences
            .set_theme(id, &self.themes, self.store.as_ref())
        {
            return false;
        }
        tracing::info!("Theme changed to {}", id);
        let View {
            preferences,
            document,
            ..
        } = &mut *view;
        self.themes
            .apply(document, id, &self.translations, &preferences.language);
        self.notify(&view);
        true
    }

    /// Re-renders everything from the current caches and preferences.
    pub fn render_all(&self) {
        let mut view = self.view.lock();
        self.render_view(&mut view);
        self.notify(&view);
    }

    fn render_view(&self, view: &mut View) {
        let View {
            preferences,
            document,
            ..
        } = &mut *view;
        self.themes.apply(
            document,
            &preferences.theme,
            &self.translations,
            &preferences.language,
        );
        Renderer::new(&self.translations).render_labels(document, &preferences.language);
        self.render_profile(view);
        self.render_links(view);
    }

    fn render_profile(&self, view: &mut View) {
        let View {
            preferences,
            profile,
            document,
            ..
        } = &mut *view;
        Renderer::new(&self.translations).render_profile(
            document,
            profile.data(),
            &preferences.language,
        );
        profile.renders = profile.renders.saturating_add(1);
    }

    fn render_links(&self, view: &mut View) {
        let View {
            preferences,
            links,
            document,
            ..
        } = &mut *view;
        Renderer::new(&self.translations).render_links(
            document,
            links.data(),
            &preferences.language,
        );
        links.renders = links.renders.saturating_add(1);
    }

    fn notify(&self, view: &View) {
        if let Some(hook) = &self.on_render {
            hook(&view.document);
        }
    }
}

fn clone_data<T: Clone>(resource: Resource<&T>) -> Resource<T> {
    match resource {
        Resource::Pending => Resource::Pending,
        Resource::Unavailable => Resource::Unavailable,
        Resource::Ready(data) => Resource::Ready(data.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::dom::Slot;
    use crate::feeds::{parse_profile, LinksSchema};
    use crate::settings::{MemoryPreferenceStore, LANGUAGE_KEY};

    fn card_with(store: Arc<dyn PreferenceStore>) -> Card {
        Card::new(
            TranslationTable::builtin(),
            ThemeRegistry::builtin(),
            store,
            &Preferences {
                language: "en".to_string(),
                theme: "dark".to_string(),
            },
        )
    }

    fn card() -> Card {
        card_with(Arc::new(MemoryPreferenceStore::new()))
    }

    fn profile(online: &str) -> Snapshot<ProfileSnapshot> {
        let body = json!({
            "success": true,
            "data": [{"username": "gtnntg", "status": "hi", "onlinestatus": online}]
        });
        let (record, data) = parse_profile(&body).unwrap();
        Snapshot::new(record, data)
    }

    #[test]
    fn test_initial_render_is_loading_state() {
        let card = card();
        let doc = card.document();
        assert_eq!(doc.slot(Slot::Status).text(), Some("Loading status..."));
        assert!(doc.root().has_class("theme-dark"));
        assert!(card.profile().is_pending());
    }

    #[test]
    fn test_equal_payload_does_not_render() {
        let card = card();
        let before = card.render_count(FeedKind::Profile);

        assert_eq!(card.apply_profile(1, Ok(profile("Online"))), PollOutcome::Updated);
        assert_eq!(card.apply_profile(2, Ok(profile("Online"))), PollOutcome::Unchanged);
        assert_eq!(card.render_count(FeedKind::Profile), before + 1);

        assert_eq!(card.apply_profile(3, Ok(profile("Idle"))), PollOutcome::Updated);
        assert_eq!(card.render_count(FeedKind::Profile), before + 2);
        assert_eq!(card.render_count(FeedKind::Links), 1);
    }

    fn profile_record(record: serde_json::Value) -> Snapshot<ProfileSnapshot> {
        let (record, data) = parse_profile(&json!({"success": true, "data": [record]})).unwrap();
        Snapshot::new(record, data)
    }

    fn links(body: serde_json::Value) -> Snapshot<LinksSnapshot> {
        let base = url::Url::parse("https://sheets.example/links").unwrap();
        let data = LinksSchema::SheetsMarkdown.parse(&body, &base).unwrap();
        Snapshot::new(body, data)
    }

    #[test]
    fn test_null_differs_from_missing_key() {
        let card = card();
        let with_null = json!({"username": "gtnntg", "status": "hi", "avatar": null});
        let without = json!({"username": "gtnntg", "status": "hi"});

        assert_eq!(card.apply_profile(1, Ok(profile_record(with_null))), PollOutcome::Updated);
        assert_eq!(card.apply_profile(2, Ok(profile_record(without))), PollOutcome::Updated);
    }

    #[test]
    fn test_key_order_is_ignored_for_profile() {
        let card = card();
        let first = json!({"username": "gtnntg", "status": "hi", "onlinestatus": "Online"});
        let reordered = json!({"onlinestatus": "Online", "status": "hi", "username": "gtnntg"});

        assert_eq!(card.apply_profile(1, Ok(profile_record(first))), PollOutcome::Updated);
        assert_eq!(card.apply_profile(2, Ok(profile_record(reordered))), PollOutcome::Unchanged);
    }

    #[test]
    fn test_reordered_links_render() {
        let card = card();
        let first = json!({"success": true, "data": [{
            "[A](https://a.example)": "",
            "[B](https://b.example)": ""
        }]});
        let swapped = json!({"success": true, "data": [{
            "[B](https://b.example)": "",
            "[A](https://a.example)": ""
        }]});

        assert_eq!(card.apply_links(1, Ok(links(first))), PollOutcome::Updated);
        assert_eq!(card.apply_links(2, Ok(links(swapped.clone()))), PollOutcome::Updated);
        assert_eq!(card.apply_links(3, Ok(links(swapped))), PollOutcome::Unchanged);
        assert_eq!(card.document().slot(Slot::LinksContainer).text_content(), "BA");
    }

    #[test]
    fn test_failure_after_success_clears_cache() {
        let card = card();
        card.apply_profile(1, Ok(profile("Online")));

        assert_eq!(card.apply_profile(2, Err(FetchError::Status(503))), PollOutcome::Cleared);
        assert!(matches!(card.profile(), Resource::Unavailable));

        let doc = card.document();
        assert_eq!(doc.slot(Slot::Status).text(), Some("Error loading status."));
        assert!(doc.slot(Slot::StatusIndicator).has_class("status-offline"));
        assert!(!doc.slot(Slot::StatusIndicator).has_class("status-online"));

        let renders = card.render_count(FeedKind::Profile);
        assert_eq!(card.apply_profile(3, Err(FetchError::NoData)), PollOutcome::Failed);
        assert_eq!(card.render_count(FeedKind::Profile), renders);
    }

    #[test]
    fn test_failure_before_first_load_keeps_pending() {
        let card = card();
        let renders = card.render_count(FeedKind::Links);
        let outcome = card.apply_links(1, Err(FetchError::Malformed("eof".to_string())));

        assert_eq!(outcome, PollOutcome::Failed);
        assert!(card.links().is_pending());
        assert_eq!(card.render_count(FeedKind::Links), renders);
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let card = card();
        assert_eq!(card.apply_profile(5, Ok(profile("Online"))), PollOutcome::Updated);
        assert_eq!(card.apply_profile(4, Ok(profile("Idle"))), PollOutcome::Stale);
        assert_eq!(
            card.profile().as_ready().map(|p| p.online_status.clone()),
            Some("Online".to_string())
        );
    }

    #[test]
    fn test_change_language() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let card = card_with(Arc::clone(&store) as Arc<dyn PreferenceStore>);

        assert!(!card.change_language("xx"));
        assert_eq!(card.language(), "en");
        assert_eq!(store.get(LANGUAGE_KEY), None);

        assert!(card.change_language("ru"));
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("ru"));
        let doc = card.document();
        assert_eq!(doc.slot(Slot::Status).text(), Some("Загрузка статуса..."));
        assert_eq!(doc.slot(Slot::CurrentTheme).text(), Some("Темная"));
    }

    #[test]
    fn test_change_theme() {
        let card = card();
        assert!(card.change_theme("light"));
        assert!(!card.change_theme("neon"));
        assert_eq!(card.theme(), "light");

        let doc = card.document();
        assert!(doc.root().has_class("theme-light"));
        assert!(!doc.root().has_class("theme-dark"));
    }

    #[test]
    fn test_render_hook_sees_every_render() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let card = card().with_render_hook(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        card.apply_profile(1, Ok(profile("Online")));
        card.apply_profile(2, Ok(profile("Online")));
        card.change_theme("light");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
