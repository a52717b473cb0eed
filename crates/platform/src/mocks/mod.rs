//! Mock implementations for testing
//!
//! This module provides mock implementations of the GPIO and panel traits
//! for use in unit and integration tests. Both mocks are cheap to clone and
//! share their state, so a test can keep a handle for scripting and
//! inspection after the original has been moved into the code under test.

#![cfg(any(test, feature = "mocks"))]

mod gpio;
mod panel;

pub use gpio::{MockGpio, MockGpioError, MockPin};
pub use panel::{Construction, MockPanel, MockPanelBackend};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mock's shared state, recovering from poisoning left by a
/// panicking test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
