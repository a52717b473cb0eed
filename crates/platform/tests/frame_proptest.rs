//! Property-based tests for frame drawing and panel geometry.
//! Verifies invariants hold for ALL inputs, not just fixed examples.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use platform::{Frame, Rotation};
use proptest::prelude::*;

const SIDE: u32 = 128;

proptest! {
    /// Drawing a rectangle anywhere only touches the overlapping pixels.
    #[test]
    fn rectangle_fill_is_clipped_to_frame(
        x in -200i32..200,
        y in -200i32..200,
        w in 0u32..300,
        h in 0u32..300,
    ) {
        let mut frame = Frame::new(Size::new(SIDE, SIDE));
        Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut frame)
            .unwrap();

        let side = SIDE as i32;
        let overlap_w = (x + w as i32).min(side) - x.max(0);
        let overlap_h = (y + h as i32).min(side) - y.max(0);
        let expected = (overlap_w.max(0) * overlap_h.max(0)) as usize;

        let white = frame.pixels().iter().filter(|&&p| p == Rgb888::WHITE).count();
        prop_assert_eq!(frame.pixels().len(), (SIDE * SIDE) as usize);
        prop_assert_eq!(white, expected);
    }

    /// Rotation never changes the pixel count of the visible window.
    #[test]
    fn rotation_preserves_area(
        degrees in prop_oneof![Just(0u16), Just(90), Just(180), Just(270)],
        w in 1u32..500,
        h in 1u32..500,
    ) {
        let rotation = Rotation::from_degrees(degrees).unwrap();
        let size = rotation.visible_size(w, h);
        prop_assert_eq!(size.width * size.height, w * h);
        if rotation.swaps_dimensions() {
            prop_assert_eq!((size.width, size.height), (h, w));
        } else {
            prop_assert_eq!((size.width, size.height), (w, h));
        }
    }
}
