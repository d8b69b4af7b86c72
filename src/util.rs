use eframe::egui::Color32;

/// Parses `#rgb` or `#rrggbb`, with or without the leading hash.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 => {
            let mut channels = hex.chars().filter_map(|ch| ch.to_digit(16));
            let mut next = || channels.next().map(|digit| (digit * 17) as u8);
            Some(Color32::from_rgb(next()?, next()?, next()?))
        }
        6 => {
            let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
            Some(Color32::from_rgb(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
            ))
        }
        _ => None,
    }
}

pub fn format_alpha(alpha: f32) -> String {
    if alpha < 0.01 {
        format!("{alpha:.4}")
    } else {
        format!("{alpha:.2}")
    }
}
