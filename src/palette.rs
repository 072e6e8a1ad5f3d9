// Dataset colours shared by the chart configuration and the renderer

use plotters::style::RGBColor;

/// (r, g, b, alpha) entries, cycled for multi-slice charts
pub const PALETTE: [(u8, u8, u8, f64); 5] = [
    (37, 99, 235, 0.7),
    (245, 158, 11, 0.7),
    (16, 185, 129, 0.7),
    (239, 68, 68, 0.7),
    (139, 92, 246, 0.7),
];

pub const BORDER: (u8, u8, u8, f64) = (37, 99, 235, 1.0);

fn entry(index: usize) -> (u8, u8, u8, f64) {
    PALETTE[index % PALETTE.len()]
}

/// CSS `rgba(...)` string for a palette slot
pub fn css_rgba(index: usize) -> String {
    let (r, g, b, a) = entry(index);
    format_rgba(r, g, b, a)
}

pub fn border_css() -> String {
    let (r, g, b, a) = BORDER;
    format_rgba(r, g, b, a)
}

fn format_rgba(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({}, {}, {}, {})", r, g, b, a)
}

/// Opaque colour plus alpha for drawing a palette slot
pub fn rgb(index: usize) -> (RGBColor, f64) {
    let (r, g, b, a) = entry(index);
    (RGBColor(r, g, b), a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_strings() {
        assert_eq!(css_rgba(0), "rgba(37, 99, 235, 0.7)");
        assert_eq!(css_rgba(4), "rgba(139, 92, 246, 0.7)");
        assert_eq!(border_css(), "rgba(37, 99, 235, 1)");
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(css_rgba(5), css_rgba(0));
        assert_eq!(rgb(6).0, RGBColor(245, 158, 11));
    }
}
