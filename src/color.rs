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
// Color mapping: series name → Color32
// ---------------------------------------------------------------------------

/// Current and voltage keep their conventional chart colours.
const FIXED: [(&str, Color32); 2] = [
    ("current", Color32::from_rgb(31, 119, 180)),
    ("voltage", Color32::from_rgb(214, 39, 40)),
];

/// Maps series names to distinct colours so a name looks the same on every
/// figure.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(names: &BTreeSet<String>) -> Self {
        let free: Vec<&String> = names
            .iter()
            .filter(|n| !FIXED.iter().any(|(f, _)| *f == n.as_str()))
            .collect();
        let palette = generate_palette(free.len());
        let mut mapping: BTreeMap<String, Color32> = free
            .into_iter()
            .zip(palette)
            .map(|(n, c)| (n.clone(), c))
            .collect();
        for (name, color) in FIXED {
            if names.contains(name) {
                mapping.insert(name.to_string(), color);
            }
        }

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping
            .get(name)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }

    #[test]
    fn fixed_names_keep_their_colour() {
        let names: BTreeSet<String> = ["current", "tc1", "tc2"].map(String::from).into();
        let map = ColorMap::new(&names);
        assert_eq!(map.color_for("current"), FIXED[0].1);
        assert_ne!(map.color_for("tc1"), map.color_for("tc2"));
        assert_eq!(map.color_for("missing"), Color32::GRAY);
    }
}
