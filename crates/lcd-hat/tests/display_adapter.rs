//! Display bring-up from resolved settings to pixels, against the mock
//! panel backend.
//!
//! Run with: cargo test -p lcd-hat --test display_adapter

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use lcd_hat::config::{Config, DisplayConfig, Resolver};
use lcd_hat::display::{self, Tier};
use lcd_hat::error::DisplayError;
use lcd_hat::render::{centered_text, test_pattern, TextTheme};
use panel_specs::DriverCapabilities;
use platform::mocks::{Construction, MockPanelBackend};
use platform::{Frame, PanelError, PinState};

fn resolve(pairs: &[(&str, &str)]) -> DisplayConfig {
    let resolver = pairs
        .iter()
        .fold(Resolver::new(), |resolver, (key, value)| resolver.set(*key, *value));
    Config::from_settings(&resolver.resolve().unwrap())
        .unwrap()
        .display
}

#[test]
fn waveshare_preset_on_current_driver_uses_extended_tier() {
    let config = resolve(&[("LCD_PRESET", "waveshare144")]);
    let mut backend = MockPanelBackend::new("st7735", "0.1.0");

    let caps = display::probe(&backend);
    assert_eq!(caps, DriverCapabilities::ALL);

    let mut handle = display::init(&mut backend, &config, caps).unwrap();
    assert_eq!(handle.tier(), Tier::Extended);
    assert_eq!(handle.window(), Size::new(128, 128));
    assert_eq!(handle.panel().offset(), (2, 3));
    assert_eq!(handle.backlight(), Some(true));

    let constructions = backend.constructions();
    assert_eq!(constructions.len(), 1);
    let Construction::Extended(params) = &constructions[0] else {
        panic!("expected the extended constructor, got {constructions:?}");
    };
    assert_eq!(params.base.dc, 25);
    assert_eq!(params.base.reset, Some(27));
    assert_eq!(params.base.backlight, Some(24));
    assert_eq!(params.offset, Some((2, 3)));

    let frame = centered_text(handle.window(), "Hej Pi!", TextTheme::Hello);
    handle.draw_frame(&frame).unwrap();
    assert_eq!(handle.panel().last_frame(), Some(&frame));
}

#[test]
fn older_driver_loses_offset_but_keeps_inversion() {
    let config = resolve(&[("LCD_PRESET", "waveshare144"), ("LCD_INVERT", "1")]);
    let mut backend = MockPanelBackend::new("st7735-lcd", "0.7.2").with_runtime_setters(false, true);

    let caps = display::probe(&backend);
    let handle = display::init(&mut backend, &config, caps).unwrap();

    assert_eq!(handle.tier(), Tier::Extended);
    assert!(!handle.applied().offset_window);
    assert!(handle.applied().invert);
    assert!(handle.applied().backlight_polarity, "set at runtime");
    assert_eq!(handle.panel().offset(), (0, 0));
    assert!(handle.panel().inverted());
}

#[test]
fn unknown_driver_falls_back_to_minimal_and_still_shows_frames() {
    let config = resolve(&[("LCD_BL_ACTIVE", "0")]);
    let mut backend = MockPanelBackend::new("fbtft", "5.10").with_runtime_setters(false, false);

    let caps = display::probe(&backend);
    assert!(caps.is_empty());

    let mut handle = display::init(&mut backend, &config, caps).unwrap();
    assert_eq!(handle.tier(), Tier::Minimal);
    assert!(matches!(
        backend.constructions().as_slice(),
        [Construction::Minimal(_)]
    ));

    // Active-low backlight handled by the adapter: on drives the pin low.
    assert_eq!(handle.panel().backlight_level(), Some(PinState::Low));

    let frame = test_pattern(handle.window());
    handle.draw_frame(&frame).unwrap();
    assert_eq!(handle.panel().frames().len(), 1);

    handle.clear().unwrap();
    assert_eq!(handle.panel().backlight_level(), Some(PinState::High));
    assert!(handle
        .panel()
        .last_frame()
        .is_some_and(|f| f.is_filled_with(Rgb888::BLACK)));
}

#[test]
fn missing_identity_probes_as_no_features() {
    let config = resolve(&[]);
    let mut backend = MockPanelBackend::new("st7735", "0.1.0").without_identity();

    let caps = display::probe(&backend);
    assert_eq!(caps, DriverCapabilities::NONE);
    let handle = display::init(&mut backend, &config, caps).unwrap();
    assert_eq!(handle.tier(), Tier::Minimal);
}

#[test]
fn minimal_failure_after_rejected_extended_is_fatal() {
    let config = resolve(&[("LCD_PRESET", "waveshare144")]);
    let mut backend = MockPanelBackend::new("st7735", "0.1.0")
        .rejecting_extended()
        .failing_minimal();

    let caps = display::probe(&backend);
    let err = display::init(&mut backend, &config, caps).unwrap_err();

    assert!(matches!(err.cause(), PanelError::Device { context, .. } if context.contains("spidev0.0")));
    assert!(matches!(
        backend.constructions().as_slice(),
        [Construction::Extended(_), Construction::Minimal(_)]
    ));
}

#[test]
fn rotated_window_dictates_frame_size() {
    let config = resolve(&[("LCD_WIDTH", "160"), ("LCD_HEIGHT", "128"), ("LCD_ROT", "90")]);
    let mut backend = MockPanelBackend::new("st7735", "0.1.0");
    let caps = display::probe(&backend);
    let mut handle = display::init(&mut backend, &config, caps).unwrap();

    assert_eq!(handle.window(), Size::new(128, 160));
    handle
        .draw_frame(&centered_text(handle.window(), "123 kr", TextTheme::Server))
        .unwrap();

    let err = handle.draw_frame(&Frame::new(Size::new(160, 128))).unwrap_err();
    assert!(matches!(
        err,
        DisplayError::FrameSize {
            width: 128,
            height: 160,
            ..
        }
    ));
}
