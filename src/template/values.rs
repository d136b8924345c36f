use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::core::{Rgba8, Side};
use crate::template::model::Template;

/// Reserved key for the per-side global text color override.
pub const TEXT_COLOR_KEY: &str = "textColor";

/// Reserved key holding the user-supplied background image reference for a
/// side, when the template allows one.
pub fn custom_background_key(side: Side) -> &'static str {
    match side {
        Side::Front => "customBackgroundFront",
        Side::Back => "customBackgroundBack",
    }
}

/// The mutable store of user-entered values, owned by the editing session.
///
/// Renderers never see this type; they receive a [`ValueSnapshot`] taken at
/// call time, so mid-render keystrokes cannot tear an in-flight render.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ValueStore {
    map: BTreeMap<String, String>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every field's `defaultValue` that doesn't already have an entry.
    /// Called once when the session loads the template.
    pub fn seed_defaults(&mut self, template: &Template) {
        for side in [Side::Front, Side::Back] {
            for field in template.fields(side) {
                if let Some(default) = &field.default_value
                    && !self.map.contains_key(&field.key)
                {
                    self.map.insert(field.key.clone(), default.clone());
                }
            }
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Immutable copy-on-read view for one render call.
    pub fn snapshot(&self) -> ValueSnapshot {
        ValueSnapshot {
            map: Arc::new(self.map.clone()),
        }
    }
}

impl FromIterator<(String, String)> for ValueStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// A frozen view of the value store. Cheap to clone, never mutated.
#[derive(Clone, Debug, Default)]
pub struct ValueSnapshot {
    map: Arc<BTreeMap<String, String>>,
}

impl ValueSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats the empty string as absent (the
    /// skip rule for fields and slots).
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Global color override applied to every field and slot of a side.
    /// An unparseable value is ignored rather than failing the render.
    pub fn color_override(&self) -> Option<Rgba8> {
        let raw = self.non_empty(TEXT_COLOR_KEY)?;
        match Rgba8::parse(raw) {
            Ok(color) => Some(color),
            Err(err) => {
                tracing::warn!(%raw, %err, "ignoring unparseable text color override");
                None
            }
        }
    }

    pub fn custom_background(&self, side: Side) -> Option<&str> {
        self.non_empty(custom_background_key(side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_with_default() -> Template {
        serde_json::from_str(
            r#"{
                "id": "t",
                "size": {"w": 100, "h": 100},
                "frontFields": [
                    {"key": "venue", "defaultValue": "גן האירועים"},
                    {"key": "city"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_seed_only_missing_keys() {
        let mut values = ValueStore::new();
        values.set("venue", "אולם אחר");
        values.seed_defaults(&template_with_default());
        assert_eq!(values.get("venue"), Some("אולם אחר"));
        assert_eq!(values.get("city"), None);

        let mut fresh = ValueStore::new();
        fresh.seed_defaults(&template_with_default());
        assert_eq!(fresh.get("venue"), Some("גן האירועים"));
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut values = ValueStore::new();
        values.set("names", "דנה ויואב");
        let snap = values.snapshot();
        values.set("names", "changed");
        values.set("extra", "new");
        assert_eq!(snap.get("names"), Some("דנה ויואב"));
        assert_eq!(snap.get("extra"), None);
    }

    #[test]
    fn non_empty_filters_empty_strings() {
        let mut values = ValueStore::new();
        values.set("quote", "");
        let snap = values.snapshot();
        assert_eq!(snap.get("quote"), Some(""));
        assert_eq!(snap.non_empty("quote"), None);
    }

    #[test]
    fn color_override_parses_or_is_ignored() {
        let mut values = ValueStore::new();
        values.set(TEXT_COLOR_KEY, "#ff0000");
        assert_eq!(
            values.snapshot().color_override(),
            Some(Rgba8::new(255, 0, 0, 255))
        );

        values.set(TEXT_COLOR_KEY, "not-a-color");
        assert_eq!(values.snapshot().color_override(), None);
    }

    #[test]
    fn custom_background_keys_are_per_side() {
        let mut values = ValueStore::new();
        values.set(custom_background_key(Side::Front), "uploads/me.png");
        let snap = values.snapshot();
        assert_eq!(snap.custom_background(Side::Front), Some("uploads/me.png"));
        assert_eq!(snap.custom_background(Side::Back), None);
    }
}
