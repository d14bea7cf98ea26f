use serde::{Deserialize, Serialize};

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = (h * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

/// Hue for the n-th member of a collection, spread by the golden ratio so
/// neighbours never share a colour and rebuilds stay reproducible.
pub fn golden_hue(index: u32) -> f32 {
    (index as f32 * 0.618033988749895) % 1.0
}

/// Linear RGB colour with components in `[0, 1]`.
///
/// Serialized as a `#rrggbb` string so presets stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        Self::from(hsv_to_rgb(h, s, v))
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// Clamp every channel into `[0, 1]`, mapping NaN to 0
    pub fn saturate(self) -> Self {
        let fix = |c: f32| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        Self::new(fix(self.r), fix(self.g), fix(self.b))
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        format!("#{:06x}", c.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&text).ok_or_else(|| format!("`{text}` is not a #rrggbb colour"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb_red() {
        let rgb = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((rgb[0] - 1.0).abs() < 0.01);
        assert!(rgb[1].abs() < 0.01);
        assert!(rgb[2].abs() < 0.01);
    }

    #[test]
    fn test_hsv_to_rgb_white() {
        let rgb = hsv_to_rgb(0.0, 0.0, 1.0);
        assert!((rgb[0] - 1.0).abs() < 0.01);
        assert!((rgb[1] - 1.0).abs() < 0.01);
        assert!((rgb[2] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_hex_conversion() {
        let petal = Rgb::from_hex(0xf0f700);
        assert_eq!(petal.to_hex(), 0xf0f700);
        assert_eq!(String::from(petal), "#f0f700");
        assert_eq!(Rgb::parse_hex("#A760FA").map(|c| c.to_hex()), Some(0xa760fa));
        assert_eq!(Rgb::parse_hex("nope"), None);
    }

    #[test]
    fn test_golden_hue_distinct_neighbours() {
        let hues: Vec<f32> = (0..5).map(golden_hue).collect();
        for pair in hues.windows(2) {
            assert!((pair[0] - pair[1]).abs() > 0.1);
        }
        assert!(hues.iter().all(|h| (0.0..1.0).contains(h)));
    }

    #[test]
    fn test_saturate_handles_nan() {
        let c = Rgb::new(f32::NAN, 2.0, -1.0).saturate();
        assert_eq!(c, Rgb::new(0.0, 1.0, 0.0));
    }
}
