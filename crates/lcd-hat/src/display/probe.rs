//! Display capability probe.

use panel_specs::{capabilities_for, DriverCapabilities, DriverVersion};
use platform::{CapabilityProbeError, PanelBackend};
use tracing::{debug, warn};

/// Look up which optional features `backend`'s driver honours.
///
/// Never fails: an unreadable identity, a malformed version or a driver the
/// capability table does not list all yield [`DriverCapabilities::NONE`],
/// which sends the adapter straight to the minimal constructor. Calling it
/// twice gives the same answer.
pub fn probe<B: PanelBackend>(backend: &B) -> DriverCapabilities {
    let identity = match backend.identity() {
        Ok(identity) => identity,
        Err(error) => {
            warn!(%error, "driver identity unavailable, assuming no optional features");
            return DriverCapabilities::NONE;
        }
    };

    let Some(version) = DriverVersion::parse(&identity.version) else {
        let error = CapabilityProbeError::MalformedVersion(identity.version.clone());
        warn!(driver = %identity.name, %error, "assuming no optional features");
        return DriverCapabilities::NONE;
    };

    match capabilities_for(&identity.name, version) {
        Some(capabilities) => {
            debug!(driver = %identity.name, %version, %capabilities, "driver capabilities");
            capabilities
        }
        None => {
            warn!(
                driver = %identity.name,
                %version,
                "driver not in capability table, using minimal parameters"
            );
            DriverCapabilities::NONE
        }
    }
}
