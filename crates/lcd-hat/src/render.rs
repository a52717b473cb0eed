//! Frame rendering helpers
//!
//! Builds whole [`Frame`]s for the CLI: best-fit centred text in two themes
//! a colour-bar test pattern and the frames of the link check. Text uses the built-in `embedded-graphics`
//! mono fonts, largest first.

use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X9, FONT_7X13, FONT_8X13, FONT_9X15,
    FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use platform::Frame;

/// Longer messages are cut to this many characters.
pub const MAX_MESSAGE_CHARS: usize = 256;

/// Horizontal and vertical space kept free around fitted text, in total.
pub const MARGIN: u32 = 8;

/// Padding of the backing box drawn behind [`TextTheme::Server`] text.
const BACKING_PADDING: u32 = 2;

/// Candidate fonts, largest first.
pub const FONTS: [&MonoFont<'static>; 9] = [
    &FONT_10X20,
    &FONT_9X18_BOLD,
    &FONT_9X15,
    &FONT_8X13,
    &FONT_7X13,
    &FONT_6X10,
    &FONT_6X9,
    &FONT_5X8,
    &FONT_4X6,
];

/// Colour scheme for [`centered_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextTheme {
    /// Black on white
    #[default]
    Hello,
    /// Yellow on black with a black backing box
    Server,
}

impl TextTheme {
    /// Look a theme up by name (`hello`, `server`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hello" => Some(Self::Hello),
            "server" => Some(Self::Server),
            _ => None,
        }
    }

    /// `(background, foreground)`
    pub fn colors(self) -> (Rgb888, Rgb888) {
        match self {
            Self::Hello => (Rgb888::WHITE, Rgb888::BLACK),
            Self::Server => (Rgb888::BLACK, Rgb888::YELLOW),
        }
    }
}

/// Cut `message` to at most [`MAX_MESSAGE_CHARS`] characters.
pub fn truncate(message: &str) -> &str {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((end, _)) => message.get(..end).unwrap_or(message),
        None => message,
    }
}

/// Bounding box of `chars` characters on one line.
pub fn text_size(font: &MonoFont<'_>, chars: usize) -> Size {
    let height = font.character_size.height;
    let n = u32::try_from(chars).unwrap_or(u32::MAX);
    if n == 0 {
        return Size::new(0, height);
    }
    let width = n
        .saturating_mul(font.character_size.width)
        .saturating_add((n - 1).saturating_mul(font.character_spacing));
    Size::new(width, height)
}

/// Largest font that fits `message` inside `size` minus [`MARGIN`].
///
/// Falls back to the smallest font; the text is then clipped.
pub fn best_font(message: &str, size: Size) -> &'static MonoFont<'static> {
    let room = Size::new(
        size.width.saturating_sub(MARGIN),
        size.height.saturating_sub(MARGIN),
    );
    let chars = message.chars().count();
    FONTS
        .into_iter()
        .find(|font| {
            let text = text_size(font, chars);
            text.width <= room.width && text.height <= room.height
        })
        .unwrap_or(&FONT_4X6)
}

/// `message` centred on a full frame in `theme`'s colours.
pub fn centered_text(size: Size, message: &str, theme: TextTheme) -> Frame {
    let message = truncate(message);
    let (background, foreground) = theme.colors();
    let mut frame = Frame::filled(size, background);

    let font = best_font(message, size);
    let text = text_size(font, message.chars().count());
    let origin = Point::new(
        to_coord(size.width.saturating_sub(text.width) / 2),
        to_coord(size.height.saturating_sub(text.height) / 2),
    );

    if theme == TextTheme::Server {
        let pad = to_coord(BACKING_PADDING);
        let backing = Rectangle::new(
            origin - Point::new(pad, pad),
            text + Size::new(2 * BACKING_PADDING, 2 * BACKING_PADDING),
        )
        .into_styled(PrimitiveStyle::with_fill(Rgb888::BLACK));
        paint(&mut frame, &backing);
    }

    let style = MonoTextStyle::new(font, foreground);
    paint(
        &mut frame,
        &Text::with_baseline(message, origin, style, Baseline::Top),
    );
    frame
}

/// Six colour bars, a green border and a `TEST` label.
pub fn test_pattern(size: Size) -> Frame {
    const BARS: [Rgb888; 6] = [
        Rgb888::RED,
        Rgb888::GREEN,
        Rgb888::BLUE,
        Rgb888::YELLOW,
        Rgb888::CYAN,
        Rgb888::MAGENTA,
    ];

    let mut frame = Frame::new(size);
    let bar_width = (size.width / 6).max(1);
    let mut x = 0;
    for color in BARS {
        let bar = Rectangle::new(
            Point::new(to_coord(x), 0),
            Size::new(bar_width, size.height),
        )
        .into_styled(PrimitiveStyle::with_fill(color));
        paint(&mut frame, &bar);
        x = x.saturating_add(bar_width);
    }

    let border = Rectangle::new(Point::zero(), size)
        .into_styled(PrimitiveStyle::with_stroke(Rgb888::GREEN, 1));
    paint(&mut frame, &border);

    let label = MonoTextStyle::new(&FONT_6X10, Rgb888::BLACK);
    paint(
        &mut frame,
        &Text::with_baseline("TEST", Point::new(2, 2), label, Baseline::Top),
    );
    frame
}

/// Colours cycled by the link check, in order.
pub const PING_COLORS: [(&str, Rgb888); 5] = [
    ("black", Rgb888::BLACK),
    ("white", Rgb888::WHITE),
    ("red", Rgb888::RED),
    ("green", Rgb888::GREEN),
    ("blue", Rgb888::BLUE),
];

/// Black frame with a 1 px green outline. Shows at a glance whether the
/// window offset is right: every edge must be visible.
pub fn border(size: Size) -> Frame {
    let mut frame = Frame::new(size);
    let outline = Rectangle::new(Point::zero(), size)
        .into_styled(PrimitiveStyle::with_stroke(Rgb888::GREEN, 1));
    paint(&mut frame, &outline);
    frame
}

/// Solid frame, e.g. for blanking.
pub fn solid(size: Size, color: Rgb888) -> Frame {
    Frame::filled(size, color)
}

fn to_coord(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn paint<D>(frame: &mut Frame, item: &D)
where
    D: Drawable<Color = Rgb888>,
{
    if let Err(never) = item.draw(frame) {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAT: Size = Size::new(128, 128);

    #[test]
    fn short_text_gets_largest_font() {
        let font = best_font("Hej Pi!", HAT);
        assert_eq!(font.character_size, FONT_10X20.character_size);
    }

    #[test]
    fn long_text_steps_down() {
        let message = "123 kr and more words";
        let font = best_font(message, HAT);
        let text = text_size(font, message.chars().count());
        assert!(text.width <= HAT.width - MARGIN);
        assert!(font.character_size.width < FONT_10X20.character_size.width);
    }

    #[test]
    fn text_size_counts_spacing() {
        assert_eq!(text_size(&FONT_6X10, 0), Size::new(0, 10));
        assert_eq!(text_size(&FONT_6X10, 4), Size::new(24, 10));
    }

    #[test]
    fn truncates_by_characters() {
        let long = "é".repeat(300);
        assert_eq!(truncate(&long).chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn hello_theme_is_black_on_white_and_centred() {
        let frame = centered_text(HAT, "Hi", TextTheme::Hello);
        assert_eq!(frame.size(), HAT);
        assert_eq!(frame.pixel(Point::new(0, 0)), Some(Rgb888::WHITE));
        assert_eq!(frame.pixel(Point::new(127, 127)), Some(Rgb888::WHITE));

        let ink: Vec<Point> = (0..128)
            .flat_map(|y| (0..128).map(move |x| Point::new(x, y)))
            .filter(|&p| frame.pixel(p) == Some(Rgb888::BLACK))
            .collect();
        assert!(!ink.is_empty());
        let min_x = ink.iter().map(|p| p.x).min().unwrap();
        let max_x = ink.iter().map(|p| p.x).max().unwrap();
        // Text box is 2 * 10 + 0 spacing = 20 px wide, starting at 54.
        assert!(min_x >= 54 && max_x < 74, "{min_x}..{max_x}");
    }

    #[test]
    fn server_theme_is_yellow_on_black() {
        let frame = centered_text(HAT, "OK", TextTheme::Server);
        assert_eq!(frame.pixel(Point::new(0, 0)), Some(Rgb888::BLACK));
        assert!(frame.pixels().contains(&Rgb888::YELLOW));
        assert!(!frame.pixels().contains(&Rgb888::WHITE));
    }

    #[test]
    fn theme_names() {
        assert_eq!(TextTheme::from_name("Server"), Some(TextTheme::Server));
        assert_eq!(TextTheme::from_name("hello"), Some(TextTheme::Hello));
        assert_eq!(TextTheme::from_name("neon"), None);
    }

    #[test]
    fn test_pattern_has_bars_and_border() {
        let frame = test_pattern(HAT);
        assert_eq!(frame.pixel(Point::new(0, 64)), Some(Rgb888::GREEN), "border");
        assert_eq!(frame.pixel(Point::new(10, 64)), Some(Rgb888::RED));
        assert_eq!(frame.pixel(Point::new(30, 64)), Some(Rgb888::GREEN));
        assert_eq!(frame.pixel(Point::new(50, 64)), Some(Rgb888::BLUE));
        assert_eq!(frame.pixel(Point::new(70, 64)), Some(Rgb888::YELLOW));
        assert_eq!(frame.pixel(Point::new(90, 64)), Some(Rgb888::CYAN));
        assert_eq!(frame.pixel(Point::new(110, 64)), Some(Rgb888::MAGENTA));
        // 6 * 21 = 126; the last two columns are the black background and border.
        assert_eq!(frame.pixel(Point::new(126, 64)), Some(Rgb888::BLACK));
        assert_eq!(frame.pixel(Point::new(127, 64)), Some(Rgb888::GREEN));
        assert!(frame.pixels().contains(&Rgb888::BLACK), "label ink");
    }

    #[test]
    fn border_outlines_every_edge() {
        let frame = border(Size::new(128, 160));
        for corner in [(0, 0), (127, 0), (0, 159), (127, 159)] {
            assert_eq!(frame.pixel(Point::new(corner.0, corner.1)), Some(Rgb888::GREEN));
        }
        assert_eq!(frame.pixel(Point::new(64, 159)), Some(Rgb888::GREEN));
        assert_eq!(frame.pixel(Point::new(1, 1)), Some(Rgb888::BLACK));
        assert_eq!(frame.pixel(Point::new(64, 80)), Some(Rgb888::BLACK));
    }
}
