//! Online-status classification driving the presence indicator colour.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresenceClass {
    Online,
    Idle,
    DoNotDisturb,
    #[default]
    Offline,
    Invisible,
}

impl PresenceClass {
    pub const ALL: [PresenceClass; 5] = [
        PresenceClass::Online,
        PresenceClass::Idle,
        PresenceClass::DoNotDisturb,
        PresenceClass::Offline,
        PresenceClass::Invisible,
    ];

    /// Style class applied to the presence indicator.
    pub fn css_class(self) -> &'static str {
        match self {
            PresenceClass::Online => "status-online",
            PresenceClass::Idle => "status-idle",
            PresenceClass::DoNotDisturb => "status-dnd",
            PresenceClass::Offline => "status-offline",
            PresenceClass::Invisible => "status-invisible",
        }
    }
}

/// Exact status labels as written in the spreadsheet, in both languages.
const STATUS_CLASSES: &[(&str, PresenceClass)] = &[
    ("в Сети", PresenceClass::Online),
    ("Не активен", PresenceClass::Idle),
    ("Не беспокоить", PresenceClass::DoNotDisturb),
    ("Оффлайн", PresenceClass::Offline),
    ("Невидимый", PresenceClass::Invisible),
    ("Online", PresenceClass::Online),
    ("Idle", PresenceClass::Idle),
    ("Do Not Disturb", PresenceClass::DoNotDisturb),
    ("Offline", PresenceClass::Offline),
    ("Invisible", PresenceClass::Invisible),
];

/// Lowercase keywords tried in order when no exact label matches.
const STATUS_KEYWORDS: &[(&[&str], PresenceClass)] = &[
    (&["в сети", "online"], PresenceClass::Online),
    (&["не активен", "idle"], PresenceClass::Idle),
    (
        &["не беспокоить", "do not disturb", "dnd"],
        PresenceClass::DoNotDisturb,
    ),
    (&["оффлайн", "offline"], PresenceClass::Offline),
    (&["невидимый", "invisible"], PresenceClass::Invisible),
];

/// Classifies a free-form online status. Exact labels win, then keyword
/// containment (case-insensitive), then [`PresenceClass::Offline`].
pub fn resolve_presence(status: &str) -> PresenceClass {
    let trimmed = status.trim();
    if trimmed.is_empty() {
        return PresenceClass::Offline;
    }

    if let Some((_, class)) = STATUS_CLASSES.iter().find(|(label, _)| *label == trimmed) {
        return *class;
    }

    let lower = trimmed.to_lowercase();
    STATUS_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(PresenceClass::Offline, |(_, class)| *class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels() {
        assert_eq!(resolve_presence("Online"), PresenceClass::Online);
        assert_eq!(resolve_presence("в Сети"), PresenceClass::Online);
        assert_eq!(resolve_presence("Do Not Disturb"), PresenceClass::DoNotDisturb);
        assert_eq!(resolve_presence("  Невидимый "), PresenceClass::Invisible);
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(resolve_presence("не активен"), PresenceClass::Idle);
        assert_eq!(resolve_presence("НЕ БЕСПОКОИТЬ"), PresenceClass::DoNotDisturb);
        assert_eq!(resolve_presence("currently ONLINE"), PresenceClass::Online);
        assert_eq!(resolve_presence("dnd until 5pm"), PresenceClass::DoNotDisturb);
    }

    #[test]
    fn test_unknown_is_offline() {
        assert_eq!(resolve_presence("garbage"), PresenceClass::Offline);
        assert_eq!(resolve_presence(""), PresenceClass::Offline);
        assert_eq!(resolve_presence("none"), PresenceClass::Offline);
    }

    #[test]
    fn test_css_classes_are_distinct() {
        let mut classes: Vec<_> = PresenceClass::ALL.iter().map(|c| c.css_class()).collect();
        classes.sort_unstable();
        classes.dedup();
        assert_eq!(classes.len(), PresenceClass::ALL.len());
    }
}
