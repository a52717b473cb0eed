//! Link check: a fixed frame sequence that shows whether SPI, wiring and
//! window offset are right.
//!
//! A black frame with a green outline comes first, then `cycles` rounds of
//! solid [`PING_COLORS`]. Every frame goes through
//! [`PanelHandle::draw_frame`], so a wrong window size fails the same way it
//! would for any other caller.

use core::time::Duration;

use platform::Panel;
use tracing::{debug, info};

use super::PanelHandle;
use crate::config::PingConfig;
use crate::error::DisplayError;
use crate::render::{border, solid, PING_COLORS};

/// Shortest pause after the border frame.
pub const MIN_BORDER_PAUSE: Duration = Duration::from_millis(50);

/// Shortest pause after a colour frame.
pub const MIN_COLOR_PAUSE: Duration = Duration::from_millis(10);

/// Push the link-check sequence to `panel`, calling `pause` after every
/// frame. Returns the number of frames shown.
///
/// Stops at the first failed frame.
pub fn run<P: Panel>(
    panel: &mut PanelHandle<P>,
    config: &PingConfig,
    mut pause: impl FnMut(Duration),
) -> Result<usize, DisplayError> {
    let size = panel.window();
    let delay = config.delay();

    panel.draw_frame(&border(size))?;
    info!(width = size.width, height = size.height, "border frame displayed");
    pause(delay.max(MIN_BORDER_PAUSE));
    let mut shown = 1;

    for cycle in 1..=config.cycles {
        for (index, (name, color)) in PING_COLORS.iter().enumerate() {
            panel.draw_frame(&solid(size, *color))?;
            shown += 1;
            info!(
                "frame {cycle}.{}/{}.{} displayed",
                index + 1,
                config.cycles,
                PING_COLORS.len()
            );
            debug!(color = *name, "solid frame");
            pause(delay.max(MIN_COLOR_PAUSE));
        }
    }
    Ok(shown)
}
