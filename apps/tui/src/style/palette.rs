use ratatui::style::Color;
use std::fmt;

/// Opaque sRGB color used by every paint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`. The leading `#` is optional.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    /// Linear blend toward `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| {
            let value = (f64::from(b) - f64::from(a)).mul_add(t, f64::from(a));
            value.round().clamp(0.0, 255.0) as u8
        };
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Terminal cells have no alpha channel, so opacity is flattened against
    /// the map background.
    pub fn with_opacity(self, opacity: f64) -> Self {
        MAP_BACKGROUND.lerp(self, opacity)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Self::Rgb(value.r, value.g, value.b)
    }
}

pub const EHV_ORANGE: Rgb = Rgb::new(0xf9, 0x73, 0x16);
pub const HV_HIGH_BLUE: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
pub const HV_GREEN: Rgb = Rgb::new(0x22, 0xc5, 0x5e);
pub const OTHER_GRAY: Rgb = Rgb::new(0x94, 0xa3, 0xb8);
pub const CAPACITY_LOW_BLUE: Rgb = Rgb::new(0x1e, 0x40, 0xaf);
pub const DRAWN_PURPLE: Rgb = Rgb::new(0xa8, 0x55, 0xf7);
pub const DRAWN_SELECTED_PURPLE: Rgb = Rgb::new(0xc0, 0x84, 0xfc);
pub const CLUSTER_FILL: Rgb = Rgb::new(0x33, 0x41, 0x55);
pub const LABEL_TEXT: Rgb = Rgb::new(0xf1, 0xf5, 0xf9);
pub const MAP_BACKGROUND: Rgb = Rgb::new(0x0a, 0x0e, 0x1a);
pub const BASEMAP_LAND: Rgb = Rgb::new(0x2b, 0x33, 0x45);
