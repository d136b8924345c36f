use std::collections::HashSet;

use crate::foundation::{
    core::{Align, BoxRect, CanvasSize, LayerPosition, Rgba8, Side},
    error::{InvitraError, InvitraResult},
};
use crate::text::fit::FIT_FLOOR;

/// A catalog document: one manifest per event type, several templates each.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub templates: Vec<Template>,
}

impl Manifest {
    pub fn template(&self, id: &str) -> InvitraResult<&Template> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| InvitraError::validation(format!("unknown template id '{id}'")))
    }

    pub fn validate(&self) -> InvitraResult<()> {
        let mut seen = HashSet::new();
        for t in &self.templates {
            if !seen.insert(t.id.as_str()) {
                return Err(InvitraError::validation(format!(
                    "duplicate template id '{}'",
                    t.id
                )));
            }
            t.validate()?;
        }
        Ok(())
    }
}

/// Immutable descriptor for one invitation design. Rendering never mutates it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub size: CanvasSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_bg: Option<String>,
    #[serde(default)]
    pub allow_custom_background: bool,
    #[serde(default)]
    pub front_fields: Vec<Field>,
    #[serde(default)]
    pub back_fields: Vec<Field>,
    #[serde(default)]
    pub front_slots: Vec<Slot>,
    #[serde(default)]
    pub back_slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mockup_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mockup_layout: Option<MockupLayout>,
}

impl Template {
    pub fn fields(&self, side: Side) -> &[Field] {
        match side {
            Side::Front => &self.front_fields,
            Side::Back => &self.back_fields,
        }
    }

    pub fn slots(&self, side: Side) -> &[Slot] {
        match side {
            Side::Front => &self.front_slots,
            Side::Back => &self.back_slots,
        }
    }

    pub fn background(&self, side: Side) -> Option<&str> {
        match side {
            Side::Front => self.front_bg.as_deref(),
            Side::Back => self.back_bg.as_deref(),
        }
    }

    /// A template with nothing on its back face is rendered and exported from
    /// the front surface alone; the back editing phase is skipped entirely.
    pub fn is_single_sided(&self) -> bool {
        self.back_bg.is_none() && self.back_fields.is_empty() && self.back_slots.is_empty()
    }

    pub fn validate(&self) -> InvitraResult<()> {
        if self.size.w == 0 || self.size.h == 0 {
            return Err(InvitraError::validation(format!(
                "template '{}' canvas size must be > 0",
                self.id
            )));
        }

        for side in [Side::Front, Side::Back] {
            let fields = self.fields(side);
            let slots = self.slots(side);

            let mut keys = HashSet::new();
            for key in fields
                .iter()
                .map(|f| f.key.as_str())
                .chain(slots.iter().map(|s| s.key.as_str()))
            {
                if !keys.insert(key) {
                    return Err(InvitraError::validation(format!(
                        "template '{}' has duplicate {side} key '{key}'",
                        self.id
                    )));
                }
            }

            for field in fields {
                field.validate(&self.id, side, fields)?;
            }
            for slot in slots {
                if slot.max_size < FIT_FLOOR {
                    return Err(InvitraError::validation(format!(
                        "template '{}' slot '{}' maxSize {} is below the fit floor {}",
                        self.id, slot.key, slot.max_size, FIT_FLOOR
                    )));
                }
            }
        }

        if self.mockup_bg.is_some() != self.mockup_layout.is_some() {
            return Err(InvitraError::validation(format!(
                "template '{}' must declare mockupBg and mockupLayout together",
                self.id
            )));
        }

        Ok(())
    }
}

/// Literal decoration wrapped around a non-empty field value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrapper {
    #[default]
    None,
    Parentheses,
    Quotes,
}

/// One placed text element with a fixed font size at a fixed anchor point.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_color")]
    pub color: Rgba8,
    #[serde(default)]
    pub align: Align,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default)]
    pub wrapper: Wrapper,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_text: Option<String>,
    #[serde(default)]
    pub is_input: bool,
    #[serde(default)]
    pub is_combined: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combine_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine_separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

fn default_font_family() -> String {
    "serif".to_string()
}

fn default_font_weight() -> u16 {
    400
}

fn default_font_size() -> f64 {
    24.0
}

fn default_color() -> Rgba8 {
    Rgba8::BLACK
}

/// How a field's display text is resolved, dispatched once per field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind<'a> {
    /// Constant text baked into the template.
    Static(&'a str),
    /// Concatenation of other input fields' decorated values.
    Combined {
        keys: &'a [String],
        separator: &'a str,
    },
    /// Plain lookup of `values[key]`.
    Simple(&'a str),
}

impl Field {
    pub fn kind(&self) -> FieldKind<'_> {
        if let Some(text) = self.static_text.as_deref() {
            FieldKind::Static(text)
        } else if self.is_combined {
            FieldKind::Combined {
                keys: &self.combine_fields,
                separator: self.combine_separator.as_deref().unwrap_or(" "),
            }
        } else {
            FieldKind::Simple(&self.key)
        }
    }

    fn validate(&self, template_id: &str, side: Side, siblings: &[Field]) -> InvitraResult<()> {
        if self.key.trim().is_empty() {
            return Err(InvitraError::validation(format!(
                "template '{template_id}' has a {side} field with an empty key"
            )));
        }
        if self.is_combined && self.is_input {
            return Err(InvitraError::validation(format!(
                "field '{}' cannot be both combined and input-only",
                self.key
            )));
        }
        if self.is_combined {
            if self.combine_fields.is_empty() {
                return Err(InvitraError::validation(format!(
                    "combined field '{}' lists no combineFields",
                    self.key
                )));
            }
            for key in &self.combine_fields {
                if !siblings.iter().any(|f| &f.key == key) {
                    return Err(InvitraError::validation(format!(
                        "combined field '{}' references unknown {side} key '{key}'",
                        self.key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A text element that auto-fits inside a rectangle instead of using a fixed
/// font size.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "box")]
    pub bounds: BoxRect,
    pub family: String,
    #[serde(default = "default_font_weight")]
    pub weight: u16,
    pub max_size: f64,
    #[serde(default = "default_color")]
    pub color: Rgba8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_text: Option<String>,
}

/// Placement of the two rendered sides on the mockup backdrop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupLayout {
    pub front_position: LayerPosition,
    pub back_position: LayerPosition,
}
