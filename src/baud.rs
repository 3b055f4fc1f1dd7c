//! Baud rate presets and classification of what the user typed at the baud
//! prompt. Pure functions, so the menu-key-versus-raw-rate precedence rule
//! can be pinned down in tests.

/// Common baud rates for Arduino/ESP32 boards, keyed by menu entry.
pub const BAUD_PRESETS: [(u8, u32); 7] = [
    (1, 9_600),
    (2, 19_200),
    (3, 57_600),
    (4, 115_200),
    (5, 230_400),
    (6, 460_800),
    (7, 921_600),
];

pub const BAUD_MIN: u32 = 300;
pub const BAUD_MAX: u32 = 2_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BaudInput {
    /// Input matched a preset menu key; carries the preset's rate.
    Preset(u32),
    /// A raw rate inside the accepted range. Needs explicit confirmation
    /// before use.
    Custom(u32),
    OutOfRange(u32),
    Invalid,
}

pub fn preset(key: u8) -> Option<u32> {
    BAUD_PRESETS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, rate)| *rate)
}

/// Classifies one line of baud-prompt input.
///
/// A short all-digit entry that matches a menu key is always the preset,
/// never a literal rate: "4" means 115200 baud, not 4 baud. Only inputs of
/// more than two digits (or non-key short ones) are read as raw rates.
pub fn classify(input: &str) -> BaudInput {
    let input = input.trim();

    if input.len() <= 2 && input.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(key) = input.parse::<u8>() {
            if let Some(rate) = preset(key) {
                return BaudInput::Preset(rate);
            }
        }
    }

    match input.parse::<u32>() {
        Ok(rate) if (BAUD_MIN..=BAUD_MAX).contains(&rate) => BaudInput::Custom(rate),
        Ok(rate) => BaudInput::OutOfRange(rate),
        Err(_) => BaudInput::Invalid,
    }
}
