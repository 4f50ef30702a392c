use crate::models::Color;

/// Convert a normalized RGB color to a lowercase `#rrggbb` string.
///
/// Alpha is ignored. Channels are expected in `[0, 1]`; callers pass colors
/// taken from `SOLID` paints only.
pub fn to_hex(color: Option<&Color>) -> Option<String> {
    let color = color?;
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        channel(color.r),
        channel(color.g),
        channel(color.b)
    ))
}

fn channel(value: f64) -> u8 {
    round_half_up(value * 255.0) as u8
}

/// Round halves towards positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
