use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sequential heat scale
// ---------------------------------------------------------------------------

/// Map a value in `[0, 1]` to a cold-to-hot colour, for heatmap cells and
/// severity markers. Out-of-range input is clamped.
pub fn heat_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    // Sweep hue from deep blue (240°) down to red (0°), brightening slightly.
    let hue = 240.0 * (1.0 - t);
    hsl_to_color32(Hsl::new(hue, 0.80, 0.45 + 0.15 * t))
}

/// Map a correlation coefficient in `[-1, 1]` to a diverging colour.
/// NaN (undefined correlation) renders as neutral gray.
pub fn correlation_color(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::GRAY;
    }
    heat_color(((r + 1.0) / 2.0) as f32)
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}
