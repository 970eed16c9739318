use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit channels and a unit alpha.
///
/// Serializes as `[r, g, b, a]`. Deserializes from that array form (alpha
/// optional) or from a CSS-style string (`rgba(...)`, `rgb(...)`, `#rrggbb`,
/// or one of a few named colors).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl std::fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid color: {}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Lowercase `#rrggbb`; alpha is dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn parse(s: &str) -> Result<Self, ParseColorError> {
        let t = s.trim().to_ascii_lowercase();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }

        let args = t
            .strip_prefix("rgba(")
            .or_else(|| t.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(args) = args {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(err());
            }
            let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
            let a = match parts.get(3) {
                Some(p) => p.parse::<f32>().map_err(|_| err())?,
                None => 1.0,
            };
            if !(0.0..=1.0).contains(&a) {
                return Err(err());
            }
            return Ok(Color::rgba(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
                a,
            ));
        }

        match t.as_str() {
            "white" => Ok(Color::WHITE),
            "black" => Ok(Color::BLACK),
            "gray" | "grey" => Ok(Color::rgb(128, 128, 128)),
            "transparent" => Ok(Color::rgba(0, 0, 0, 0.0)),
            _ => Err(err()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        3 => {
            let nib = |i: usize| {
                let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
                Some(v * 17)
            };
            Some(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        _ => None,
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.r, self.g, self.b, self.a).serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Rgba(u8, u8, u8, f32),
    Rgb(u8, u8, u8),
    Css(String),
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ColorRepr::deserialize(deserializer)? {
            ColorRepr::Rgba(r, g, b, a) => Ok(Color::rgba(r, g, b, a)),
            ColorRepr::Rgb(r, g, b) => Ok(Color::rgb(r, g, b)),
            ColorRepr::Css(s) => Color::parse(&s).map_err(de::Error::custom),
        }
    }
}
