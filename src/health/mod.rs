/// Periodic out-of-band health probing, decoupled from request traffic.
///
/// Each registered service gets its own cancellable probe task. Status
/// changes are broadcast as events; an attached circuit breaker registry
/// is tripped when a service turns unhealthy, so the proactive signal and
/// the reactive request-driven breaker share one availability verdict.
pub mod prober;

pub use prober::{HealthEvent, HealthProber, HealthThresholds, ServiceHealth};
