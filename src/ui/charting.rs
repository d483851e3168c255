use ratatui::style::Color;

/// X (rounds) and Y (milliseconds) upper bounds for the reaction chart
pub fn compute_chart_params(series: &[&[(f64, f64)]], rounds_played: u32) -> (f64, f64) {
    let points = || series.iter().flat_map(|s| s.iter());
    let slowest = points().map(|&(_, ms)| ms).fold(0.0, f64::max);
    let last_round = points().map(|&(round, _)| round).fold(0.0, f64::max);

    let overall = last_round.max(f64::from(rounds_played)).max(2.0);
    // headroom so the slowest point is not drawn on the frame
    let ceiling = ((slowest * 1.1) / 100.0).ceil() * 100.0;
    (overall, ceiling.max(100.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// Parse a `#rrggbb` colour hint, falling back to gray
pub fn hint_color(hint: &str) -> Color {
    let rgb = hint
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok());
    match rgb {
        Some(v) => Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8),
        None => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[], 0);
        assert_eq!(x, 2.0);
        assert_eq!(y, 100.0);
    }

    #[test]
    fn test_compute_chart_params_uses_slowest_point() {
        let correct = [(1.0, 180.0), (2.0, 420.0)];
        let wrong = [(3.0, 90.0)];
        let (x, y) = compute_chart_params(&[&correct, &wrong], 5);
        assert_eq!(x, 5.0);
        assert_eq!(y, 500.0);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }

    #[test]
    fn test_hint_color() {
        assert_eq!(hint_color("#22c55e"), Color::Rgb(0x22, 0xc5, 0x5e));
        assert_eq!(hint_color("22c55e"), Color::Gray);
        assert_eq!(hint_color("#zzzzzz"), Color::Gray);
    }
}
