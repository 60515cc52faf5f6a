//! Turning loose requests into concrete catalog keys.
//!
//! Interface lookups satisfy a minimum version declared by an AI and prefer
//! the closest installed version at or above it. AI lookups come from users
//! and prefer the newest installed version when none is pinned.
use std::cmp::Ordering;

use crate::plugin_system::key::{InterfaceKey, SkirmishAiKey};
use crate::plugin_system::version::compare_versions;

/// Finds the interface named `short_name` whose version is closest to, and not
/// older than, `min_version`. Returns an unspecified key if none qualifies.
pub fn find_fitting_interface<'a, I>(short_name: &str, min_version: &str, keys: I) -> InterfaceKey
where
    I: IntoIterator<Item = &'a InterfaceKey>,
{
    let mut fitting: Option<&InterfaceKey> = None;

    for key in keys {
        if key.short_name() != short_name {
            continue;
        }
        if compare_versions(key.version(), min_version) == Ordering::Less {
            continue;
        }
        let closer = match fitting {
            Some(best) => compare_versions(key.version(), best.version()) == Ordering::Less,
            None => true,
        };
        if closer {
            fitting = Some(key);
        }
    }

    fitting.cloned().unwrap_or_default()
}

/// All keys matching a loose request.
///
/// The name must match; version, interface name and interface version must
/// match too when the request pins them (non-empty). An unspecified request
/// matches nothing.
pub fn fitting_skirmish_ai_keys<'a, I>(request: &SkirmishAiKey, keys: I) -> Vec<SkirmishAiKey>
where
    I: IntoIterator<Item = &'a SkirmishAiKey>,
{
    if request.is_unspecified() {
        return Vec::new();
    }

    let pinned = |wanted: &str, actual: &str| wanted.is_empty() || wanted == actual;

    keys.into_iter()
        .filter(|key| key.short_name() == request.short_name())
        .filter(|key| pinned(request.version(), key.version()))
        .filter(|key| pinned(request.interface().short_name(), key.interface().short_name()))
        .filter(|key| pinned(request.interface().version(), key.interface().version()))
        .cloned()
        .collect()
}

/// Resolves a loose request to the newest matching key, first match winning
/// ties. Returns an unspecified key if nothing matches.
pub fn resolve_skirmish_ai<'a, I>(request: &SkirmishAiKey, keys: I) -> SkirmishAiKey
where
    I: IntoIterator<Item = &'a SkirmishAiKey>,
{
    let mut best: Option<SkirmishAiKey> = None;

    for key in fitting_skirmish_ai_keys(request, keys) {
        let newer = match &best {
            Some(current) => compare_versions(key.version(), current.version()) == Ordering::Greater,
            None => true,
        };
        if newer {
            best = Some(key);
        }
    }

    best.unwrap_or_default()
}
