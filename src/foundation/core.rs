use crate::foundation::error::{InvitraError, InvitraResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// One face of an invitation. Single-sided templates only ever use `Front`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = InvitraError;

    fn from_str(s: &str) -> InvitraResult<Self> {
        match s {
            "front" => Ok(Side::Front),
            "back" => Ok(Side::Back),
            other => Err(InvitraError::validation(format!(
                "side must be 'front' or 'back', got '{other}'"
            ))),
        }
    }
}

/// Template canvas dimensions in pixels. Field names match the manifest wire
/// format (`{"w": 1080, "h": 1350}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub w: u32,
    pub h: u32,
}

/// Axis-aligned slot rectangle in template pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoxRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoxRect {
    pub fn center(self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Horizontal anchoring of a point-placed field around its `x` coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Straight-alpha RGBA color. Serialized as a CSS-style string, the form the
/// template catalog uses (`"#1a2b3c"`, `"rgba(0, 0, 0, 0.3)"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn parse(s: &str) -> InvitraResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex)
                .ok_or_else(|| InvitraError::validation(format!("invalid hex color '{s}'")));
        }
        if let Some(body) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_rgb_args(body)
                .ok_or_else(|| InvitraError::validation(format!("invalid rgb() color '{s}'")));
        }
        Err(InvitraError::validation(format!(
            "unsupported color '{s}' (expected #hex or rgb()/rgba())"
        )))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        fn nib(b: u8) -> Option<u8> {
            match b {
                b'0'..=b'9' => Some(b - b'0'),
                b'a'..=b'f' => Some(b - b'a' + 10),
                b'A'..=b'F' => Some(b - b'A' + 10),
                _ => None,
            }
        }

        let b = hex.as_bytes();
        match b.len() {
            3 => {
                let r = nib(b[0])?;
                let g = nib(b[1])?;
                let bl = nib(b[2])?;
                Some(Self::new(r << 4 | r, g << 4 | g, bl << 4 | bl, 255))
            }
            6 | 8 => {
                let mut c = [0u8; 4];
                c[3] = 255;
                for (i, pair) in b.chunks(2).enumerate() {
                    c[i] = nib(pair[0])? << 4 | nib(pair[1])?;
                }
                Some(Self::new(c[0], c[1], c[2], c[3]))
            }
            _ => None,
        }
    }

    fn parse_rgb_args(body: &str) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let r = parts[0].parse::<u8>().ok()?;
        let g = parts[1].parse::<u8>().ok()?;
        let b = parts[2].parse::<u8>().ok()?;
        let a = if parts.len() == 4 {
            let a = parts[3].parse::<f64>().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            (a * 255.0).round() as u8
        } else {
            255
        };
        Some(Self::new(r, g, b, a))
    }

    pub fn to_css_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::Deserialize as _;
        let s = String::deserialize(deserializer)?;
        Rgba8::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Placement of one rendered side on the mockup backdrop.
///
/// `rotation` is in degrees, `scale` is uniform. The transform order is fixed:
/// translate to `(x, y)`, rotate about that point, then scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for LayerPosition {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl LayerPosition {
    pub fn to_affine(self) -> Affine {
        // Canonical order: T(x,y) * R(rotation) * S(scale)
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale(self.scale)
    }
}
