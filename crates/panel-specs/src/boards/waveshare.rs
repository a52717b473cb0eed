//! Waveshare LCD HAT presets
//!
//! Pin assignments from the Waveshare wiki and board schematic.

use super::BoardPreset;

/// Waveshare 1.44" LCD HAT (ST7735S, 128×128 glass)
///
/// The glass starts 2 columns and 3 rows into controller RAM. Both adjusts
/// are in native panel axes; a driver that rotates with MADCTL's row/column
/// exchange (90°, 270°) has to swap them.
///
/// | Signal | BCM |
/// |--------|-----|
/// | DC     | 25  |
/// | RST    | 27  |
/// | BL     | 24  |
/// | CS     | CE0 |
pub const WAVESHARE_1IN44_LCD_HAT: BoardPreset = BoardPreset {
    name: "waveshare144",
    aliases: &["waveshare-1.44", "waveshare"],
    description: "Waveshare 1.44\" LCD HAT (ST7735S, 128x128)",
    settings: &[
        ("LCD_PORT", "0"),
        ("LCD_CS", "0"),
        ("LCD_DC", "25"),
        ("LCD_BL", "24"),
        ("LCD_RST", "27"),
        ("LCD_ROT", "90"),
        ("LCD_WIDTH", "128"),
        ("LCD_HEIGHT", "128"),
        ("LCD_OX", "2"),
        ("LCD_OY", "3"),
    ],
};
