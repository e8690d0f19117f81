//! Gradient symbology for normalized indicator attributes.
//!
//! Maps a feature's indicator value in `[0, 1]` to a discrete color bucket.
//! The quantization is the service's historical formula, kept bit-for-bit:
//! `round(value / (1/len)) - 1`, clamped into the ramp. Values outside
//! `[0, 1]` clamp rather than fail.

use serde::{Deserialize, Serialize};

use crate::error::{PlaceError, PlaceResult};

/// An RGB color with `#rrggbb` wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> PlaceResult<Self> {
        let digits = hex.strip_prefix('#').ok_or_else(|| {
            PlaceError::InvalidArgument(format!("color '{}' missing '#' prefix", hex))
        })?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PlaceError::InvalidArgument(format!(
                "color '{}' is not #rrggbb",
                hex
            )));
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
        Ok(Self {
            r: channel(0),
            g: channel(2),
            b: channel(4),
        })
    }

    /// Format as a `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = PlaceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_hex()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An ordered, non-empty sequence of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRamp {
    colors: Vec<Color>,
}

impl ColorRamp {
    /// Create a ramp; an empty color list is rejected.
    pub fn new(colors: Vec<Color>) -> PlaceResult<Self> {
        if colors.is_empty() {
            return Err(PlaceError::InvalidArgument(
                "color ramp must contain at least one color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Parse a ramp from `#rrggbb` strings.
    pub fn from_hex(hex: &[&str]) -> PlaceResult<Self> {
        let colors = hex
            .iter()
            .map(|h| Color::from_hex(h))
            .collect::<PlaceResult<Vec<_>>>()?;
        Self::new(colors)
    }

    /// The red-to-green diverging ramp used for analysis-cell indicators.
    pub fn indicator_default() -> Self {
        Self::from_hex(&["#d7191c", "#fdae61", "#ffffbf", "#a6d96a", "#1a9641"])
            .expect("default ramp is valid")
    }

    #[allow(clippy::len_without_is_empty)] // never empty by construction
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

/// Resolve a normalized indicator value to a color bucket.
///
/// Bucket index is `round(value / (1 / len)) - 1`, clamped into
/// `[0, len - 1]`. Out-of-range values clamp to the end buckets.
pub fn resolve_color(value: f64, ramp: &ColorRamp) -> Color {
    let len = ramp.len();
    let step = 1.0 / len as f64;
    let index = ((value / step).round() as i64 - 1).clamp(0, len as i64 - 1);
    ramp.colors()[index as usize]
}

/// Derive the indicator property name for a product code.
///
/// Analysis cells carry one normalized indicator per product, stored as
/// `shop_<code>_indice`.
pub fn indicator_field(product_code: &str) -> String {
    format!("shop_{}_indice", product_code.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp5() -> ColorRamp {
        ColorRamp::indicator_default()
    }

    #[test]
    fn test_hex_roundtrip() {
        let c = Color::from_hex("#d7191c").unwrap();
        assert_eq!(c, Color::new(0xd7, 0x19, 0x1c));
        assert_eq!(c.to_hex(), "#d7191c");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Color::from_hex("d7191c").is_err());
        assert!(Color::from_hex("#d7191").is_err());
        assert!(Color::from_hex("#d7191g").is_err());
    }

    #[test]
    fn test_empty_ramp_rejected() {
        assert!(matches!(
            ColorRamp::new(vec![]),
            Err(PlaceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resolve_low_clamps_to_first_bucket() {
        // 0.0 / 0.2 rounds to 0, minus 1 is -1, clamped up to bucket 0.
        let ramp = ramp5();
        assert_eq!(resolve_color(0.0, &ramp), ramp.colors()[0]);
        assert_eq!(resolve_color(0.05, &ramp), ramp.colors()[0]);
    }

    #[test]
    fn test_resolve_full_scale() {
        let ramp = ramp5();
        assert_eq!(resolve_color(1.0, &ramp), ramp.colors()[4]);
        assert_eq!(resolve_color(0.3, &ramp), ramp.colors()[1]);
        // 0.5 / 0.2 rounds half away from zero: bucket 2, not 1.
        assert_eq!(resolve_color(0.5, &ramp), ramp.colors()[2]);
        assert_eq!(resolve_color(0.65, &ramp), ramp.colors()[2]);
    }

    #[test]
    fn test_resolve_out_of_range_clamps() {
        let ramp = ramp5();
        assert_eq!(resolve_color(1.5, &ramp), ramp.colors()[4]);
        assert_eq!(resolve_color(-0.3, &ramp), ramp.colors()[0]);
    }

    #[test]
    fn test_single_color_ramp() {
        let ramp = ColorRamp::from_hex(&["#ffffff"]).unwrap();
        assert_eq!(resolve_color(0.0, &ramp), ramp.colors()[0]);
        assert_eq!(resolve_color(1.0, &ramp), ramp.colors()[0]);
    }

    #[test]
    fn test_indicator_field() {
        assert_eq!(indicator_field("NB_B202"), "shop_nb_b202_indice");
    }
}
