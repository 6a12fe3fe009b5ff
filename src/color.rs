use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

/// Normal rows in the anomaly projection.
pub const NORMAL_COLOR: Color32 = Color32::from_rgb(59, 76, 192);
/// Flagged rows in the anomaly projection.
pub const ANOMALY_COLOR: Color32 = Color32::from_rgb(180, 4, 38);

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used to give each numeric column its own series colour.
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
// Diverging colormap for the correlation heatmap
// ---------------------------------------------------------------------------

/// Map a coefficient in [-1, 1] onto a blue–white–red diverging scale.
/// NaN (undefined correlation) renders gray.
pub fn diverging(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::GRAY;
    }
    let t = t.clamp(-1.0, 1.0) as f32;

    let cold: LinSrgb = Srgb::new(0.23, 0.30, 0.75).into_linear();
    let warm: LinSrgb = Srgb::new(0.71, 0.02, 0.15).into_linear();
    let neutral: LinSrgb = Srgb::new(0.95, 0.95, 0.95).into_linear();

    let mixed = if t < 0.0 {
        neutral.mix(cold, -t)
    } else {
        neutral.mix(warm, t)
    };
    let rgb: Srgb = Srgb::from_linear(mixed);
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Annotation colour readable against the cell behind it.
pub fn heatmap_text_color(t: f64) -> Color32 {
    if t.is_nan() || t.abs() < 0.6 {
        Color32::DARK_GRAY
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length_and_distinct_colors() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        assert_ne!(colors[0], colors[3]);
    }

    #[test]
    fn diverging_endpoints() {
        assert_eq!(diverging(f64::NAN), Color32::GRAY);
        let cold = diverging(-1.0);
        let warm = diverging(1.0);
        let mid = diverging(0.0);
        // Blue end, red end, light middle.
        assert!(cold.b() > cold.r());
        assert!(warm.r() > warm.b());
        assert!(mid.r() > 200 && mid.g() > 200 && mid.b() > 200);
    }
}
