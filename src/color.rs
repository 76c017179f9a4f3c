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
            let hsl = Hsl::new(hue, 0.75, 0.55);
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

/// Maps the distinct values of a text column to distinct colours, used
/// to colour bar-chart bars by category.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Assign one palette colour per distinct value, in sorted order.
    pub fn new(unique_values: &BTreeSet<String>) -> Self {
        let mapping = unique_values
            .iter()
            .zip(generate_palette(unique_values.len()))
            .map(|(v, c)| (v.clone(), c))
            .collect();
        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_get_distinct_colors() {
        let unique: BTreeSet<String> = ["fruit", "vegetable", "dairy"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let colors = CategoryColors::new(&unique);
        assert_ne!(colors.color_for("fruit"), colors.color_for("vegetable"));
        assert_ne!(colors.color_for("fruit"), colors.color_for("dairy"));
    }

    #[test]
    fn unknown_value_gets_the_fallback() {
        let colors = CategoryColors::new(&BTreeSet::new());
        assert_eq!(colors.color_for("anything"), Color32::GRAY);
    }
}
