//! Continuous intensity to RGB: green -> yellow -> red

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGB triple, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb { red: 0, green: 255, blue: 0 };
    pub const YELLOW: Rgb = Rgb { red: 255, green: 255, blue: 0 };
    pub const RED: Rgb = Rgb { red: 255, green: 0, blue: 0 };

    /// Uppercase `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Total over all inputs: values outside [0, 1] clamp, NaN reads as 0.
pub fn interpolate(intensity: f64) -> Rgb {
    let t = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };

    if t <= 0.5 {
        Rgb { red: channel(255.0 * (t / 0.5)), green: 255, blue: 0 }
    } else {
        Rgb { red: 255, green: channel(255.0 * (1.0 - (t - 0.5) / 0.5)), blue: 0 }
    }
}

pub fn intensity_to_hex(intensity: f64) -> String {
    interpolate(intensity).to_hex()
}
