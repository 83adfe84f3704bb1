use crate::wire::HealthRes;

/// Static liveness check for the triage gateway.
///
/// The gateway never depends on network services to answer, so it always reports itself as
/// offline-capable.
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is alive and works offline.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            offline: true,
            message: "Triage gateway is alive".into(),
        }
    }
}
