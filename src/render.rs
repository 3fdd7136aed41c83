//! Pure rendering of the card from (profile, links, language).
//!
//! Every function rebuilds its slots from scratch, so rendering the same
//! inputs twice yields the same document.

use crate::dom::{Document, Element, Slot};
use crate::feeds::{LinksSnapshot, ProfileSnapshot, Resource};
use crate::i18n::TranslationTable;
use crate::presence::{resolve_presence, PresenceClass};

const USER_GLYPH: &str = "fas fa-user";
const LINK_GLYPH: &str = "fas fa-external-link-alt";

pub struct Renderer<'a> {
    translations: &'a TranslationTable,
}

impl<'a> Renderer<'a> {
    pub fn new(translations: &'a TranslationTable) -> Self {
        Self { translations }
    }

    fn t(&self, language: &str, key: &'static str) -> &'a str {
        self.translations.get(language, key)
    }

    /// Static labels plus the language indicator and picker.
    pub fn render_labels(&self, doc: &mut Document, language: &str) {
        for (slot, key) in [
            (Slot::StatusTitle, "statusTitle"),
            (Slot::LinksTitle, "linksTitle"),
            (Slot::LoadingStatus, "loadingStatus"),
            (Slot::BackToHub, "backToHub"),
        ] {
            doc.slot_mut(slot).set_text(self.t(language, key));
        }

        doc.slot_mut(Slot::CurrentLanguage)
            .set_text(self.translations.name(language));

        let dropdown = doc.slot_mut(Slot::LanguageDropdown);
        dropdown.clear();
        for pack in self.translations.languages() {
            let mut option = Element::new("div")
                .with_class("dropdown-item")
                .with_attr("data-lang", &pack.code)
                .with_text(&pack.name);
            if pack.code == language {
                option.add_class("active");
            }
            dropdown.append(option);
        }
    }

    pub fn render_profile(
        &self,
        doc: &mut Document,
        profile: Resource<&ProfileSnapshot>,
        language: &str,
    ) {
        match profile {
            Resource::Ready(profile) => self.render_profile_ready(doc, profile, language),
            Resource::Unavailable => {
                let error = self.t(language, "errorLoadingStatus");
                self.render_profile_placeholder(doc, error, language);
            }
            Resource::Pending => {
                let loading = self.t(language, "loadingStatus");
                self.render_profile_placeholder(doc, loading, language);
            }
        }
    }

    fn render_profile_ready(&self, doc: &mut Document, profile: &ProfileSnapshot, language: &str) {
        let username = non_empty_or(&profile.username, self.t(language, "userNotFound"));
        doc.slot_mut(Slot::Username).set_text(username);

        let status = non_empty_or(&profile.status, self.t(language, "statusNotFound"));
        doc.slot_mut(Slot::Status).set_text(status);
        doc.slot_mut(Slot::StatusSection).hidden = profile.status_hidden();

        let online_status = self.online_status_text(&profile.online_status, language);
        doc.slot_mut(Slot::OnlineStatus).set_text(online_status);

        set_presence(doc, resolve_presence(&profile.online_status));

        let avatar = doc.slot_mut(Slot::Avatar);
        avatar.clear();
        match &profile.avatar_url {
            Some(url) => {
                let alt = format!("Avatar of {}", non_empty_or(&profile.username, "User"));
                avatar.append(
                    Element::new("img")
                        .with_class("avatar-image")
                        .with_attr("src", url)
                        .with_attr("alt", &alt),
                );
            }
            None => avatar.append(Element::new("i").with_classes(USER_GLYPH)),
        }
    }

    /// Error and loading states: message in the name and status fields,
    /// section forced visible, offline indicator, placeholder avatar.
    fn render_profile_placeholder(&self, doc: &mut Document, message: &str, language: &str) {
        doc.slot_mut(Slot::Username).set_text(message);
        doc.slot_mut(Slot::Status).set_text(message);
        doc.slot_mut(Slot::StatusSection).hidden = false;
        doc.slot_mut(Slot::OnlineStatus)
            .set_text(self.t(language, "checkingStatus"));

        set_presence(doc, PresenceClass::Offline);

        let avatar = doc.slot_mut(Slot::Avatar);
        avatar.clear();
        avatar.append(Element::new("i").with_classes(USER_GLYPH));
    }

    /// Translated label when the raw status is a known key, else the raw
    /// text.
    fn online_status_text<'s>(&'s self, online_status: &'s str, language: &str) -> &'s str {
        let trimmed = online_status.trim();
        if trimmed.is_empty() {
            return self.t(language, "checkingStatus");
        }
        self.translations.lookup(language, trimmed).unwrap_or(trimmed)
    }

    pub fn render_links(
        &self,
        doc: &mut Document,
        links: Resource<&LinksSnapshot>,
        language: &str,
    ) {
        let container = doc.slot_mut(Slot::LinksContainer);
        container.clear();

        let (state, key) = match links {
            Resource::Ready(links) if !links.is_empty() => {
                for link in links {
                    let title = link.title(language);
                    let icon = match &link.icon_url {
                        Some(src) => Element::new("img")
                            .with_attr("src", src)
                            .with_attr("alt", &format!("Logo of {title}")),
                        None => Element::new("i").with_classes(LINK_GLYPH),
                    };

                    container.append(
                        Element::new("a")
                            .with_class("link-card")
                            .with_attr("href", &link.url)
                            .with_attr("target", "_blank")
                            .with_child(
                                Element::new("div").with_class("link-icon").with_child(icon),
                            )
                            .with_child(
                                Element::new("div").with_class("link-text").with_text(title),
                            ),
                    );
                }
                return;
            }
            Resource::Ready(_) => ("empty", "linksNotFound"),
            Resource::Unavailable => ("error", "errorLoadingLinks"),
            Resource::Pending => ("loading", "loadingLinks"),
        };

        container.append(
            Element::new("div")
                .with_class("links-placeholder")
                .with_attr("data-state", state)
                .with_text(self.t(language, key)),
        );
    }
}

fn non_empty_or<'s>(value: &'s str, fallback: &'s str) -> &'s str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Exactly one presence class on the indicator.
fn set_presence(doc: &mut Document, presence: PresenceClass) {
    let indicator = doc.slot_mut(Slot::StatusIndicator);
    for class in PresenceClass::ALL {
        indicator.remove_class(class.css_class());
    }
    indicator.add_class(presence.css_class());
}
