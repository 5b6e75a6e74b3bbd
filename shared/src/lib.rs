pub mod grid;
pub mod protocol;
pub mod saves;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Total clamp for a color channel. Out-of-range values are folded into
/// [0, 255] rather than rejected; this leniency applies at every trust
/// boundary (input boxes, inbound messages, loaded snapshots).
pub fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Integer-prefix parse of free text into a channel value. Unparsable input
/// yields 0, everything else is clamped. Never errors.
pub fn parse_channel(text: &str) -> u8 {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let prefix: &str = {
        let end = digits
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(digits.len(), |(index, _)| index);
        &digits[..end]
    };
    if prefix.is_empty() {
        return 0;
    }
    match prefix.parse::<i64>() {
        Ok(value) => clamp_channel(if negative { -value } else { value }),
        // Longer than an i64 means far out of range either way.
        Err(_) => {
            if negative {
                0
            } else {
                255
            }
        }
    }
}
