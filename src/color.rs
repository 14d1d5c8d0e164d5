use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Stable colour per category value, so a product line keeps its colour
/// while filters change which bars are shown.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the distinct values of a column.
    pub fn new(values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(values.len());
        ColorMap {
            mapping: values.iter().cloned().zip(palette).collect(),
        }
    }

    /// Look up the colour for a value; unknown values are grey.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colors() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        let unique: BTreeSet<[u8; 4]> = p.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 6);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_value_falls_back_to_grey() {
        let values: BTreeSet<String> = ["Health and beauty", "Sports and travel"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = ColorMap::new(&values);
        assert_ne!(map.color_for("Health and beauty"), map.color_for("Sports and travel"));
        assert_eq!(map.color_for("Toys"), Color32::GRAY);
    }
}
