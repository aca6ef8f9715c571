use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Continent;

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
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps series labels to distinct colours. Continents always get the same
/// colour, whatever subset of them a chart shows.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Continent colours plus one colour per extra label (e.g. years).
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping: BTreeMap<String, Color32> = Continent::ALL
            .iter()
            .zip(generate_palette(Continent::ALL.len()))
            .map(|(c, color)| (c.name().to_string(), color))
            .collect();

        let extra: Vec<&str> = labels
            .into_iter()
            .filter(|l| !mapping.contains_key(*l))
            .collect();
        for (label, color) in extra.iter().zip(generate_palette(extra.len())) {
            mapping.insert(label.to_string(), color);
        }

        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a series label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}
