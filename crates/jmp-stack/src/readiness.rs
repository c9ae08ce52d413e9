//! Bounded readiness polling.
//!
//! The XMPP server is considered ready once its container is running and its
//! recent log output shows a component activation. Polling uses a fixed
//! interval with both an attempt cap and a wall-clock deadline, and reports
//! one of three outcomes instead of a bare boolean.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::StackError;
use crate::runtime::{ComposeProject, ContainerRuntime};

/// Log fragment prosody prints when a component comes up.
pub const ACTIVATION_MARKER: &str = "Activated service";

const LOG_TAIL: usize = 200;

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub attempts: u32,
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_secs(2),
            deadline: Duration::from_secs(120),
        }
    }
}

/// Outcome of [`wait_for_ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready { attempts: u32 },
    TimedOut { attempts: u32 },
    /// The final probe failed to run at all.
    Error(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

/// A single readiness check.
pub trait ReadinessProbe {
    fn check(&self) -> Result<bool, StackError>;
}

/// Probe a compose service: running, and its logs contain [`ACTIVATION_MARKER`].
pub struct ServiceProbe<'a> {
    runtime: &'a dyn ContainerRuntime,
    project: &'a ComposeProject,
    service: &'a str,
}

impl<'a> ServiceProbe<'a> {
    pub fn new(runtime: &'a dyn ContainerRuntime, project: &'a ComposeProject, service: &'a str) -> Self {
        Self {
            runtime,
            project,
            service,
        }
    }
}

impl ReadinessProbe for ServiceProbe<'_> {
    fn check(&self) -> Result<bool, StackError> {
        if !self.runtime.service_running(self.project, self.service)? {
            return Ok(false);
        }
        let logs = self.runtime.service_logs(self.project, self.service, LOG_TAIL)?;
        Ok(logs.contains(ACTIVATION_MARKER))
    }
}

/// Poll `probe` until it reports ready, the attempts run out, or the deadline
/// passes. Blocks the calling thread between attempts.
pub fn wait_for_ready(probe: &dyn ReadinessProbe, policy: &ReadinessPolicy) -> Readiness {
    let started = Instant::now();
    let mut last_error = None;
    let mut attempts = 0;

    while attempts < policy.attempts {
        attempts += 1;
        match probe.check() {
            Ok(true) => {
                tracing::info!(attempts, "service ready");
                return Readiness::Ready { attempts };
            }
            Ok(false) => {
                last_error = None;
                tracing::debug!(attempts, "service not ready yet");
            }
            Err(e) => {
                tracing::debug!(attempts, error = %e, "readiness probe failed");
                last_error = Some(e.to_string());
            }
        }

        if attempts == policy.attempts || started.elapsed() + policy.interval > policy.deadline {
            break;
        }
        thread::sleep(policy.interval);
    }

    match last_error {
        Some(message) => Readiness::Error(message),
        None => Readiness::TimedOut { attempts },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRuntime;
    use std::cell::Cell;

    struct CountingProbe {
        calls: Cell<u32>,
        ready_on: Option<u32>,
        fail: bool,
    }

    impl CountingProbe {
        fn new(ready_on: Option<u32>) -> Self {
            Self {
                calls: Cell::new(0),
                ready_on,
                fail: false,
            }
        }
    }

    impl ReadinessProbe for CountingProbe {
        fn check(&self) -> Result<bool, StackError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(StackError::ComposeUnavailable);
            }
            Ok(self.ready_on.is_some_and(|n| self.calls.get() >= n))
        }
    }

    fn quick(attempts: u32) -> ReadinessPolicy {
        ReadinessPolicy {
            attempts,
            interval: Duration::ZERO,
            deadline: Duration::from_secs(60),
        }
    }

    #[test]
    fn ready_after_some_attempts() {
        let probe = CountingProbe::new(Some(3));
        assert_eq!(wait_for_ready(&probe, &quick(10)), Readiness::Ready { attempts: 3 });
    }

    #[test]
    fn times_out_at_attempt_cap() {
        let probe = CountingProbe::new(None);
        assert_eq!(wait_for_ready(&probe, &quick(4)), Readiness::TimedOut { attempts: 4 });
        assert_eq!(probe.calls.get(), 4);
    }

    #[test]
    fn deadline_stops_polling_early() {
        let probe = CountingProbe::new(None);
        let policy = ReadinessPolicy {
            attempts: 100,
            interval: Duration::from_secs(5),
            deadline: Duration::from_secs(1),
        };
        assert_eq!(wait_for_ready(&probe, &policy), Readiness::TimedOut { attempts: 1 });
    }

    #[test]
    fn probe_errors_surface_as_error() {
        let mut probe = CountingProbe::new(None);
        probe.fail = true;
        assert!(matches!(wait_for_ready(&probe, &quick(2)), Readiness::Error(_)));
    }

    #[test]
    fn service_probe_needs_running_and_marker() {
        let project = ComposeProject::new("/opt/jm", "docker-compose.yml", "jitsi");
        let runtime = FakeRuntime::new().ready_after(2);
        runtime.start(&project).unwrap();

        let probe = ServiceProbe::new(&runtime, &project, "prosody");
        assert_eq!(wait_for_ready(&probe, &quick(5)), Readiness::Ready { attempts: 3 });
    }

    #[test]
    fn stopped_service_is_not_ready() {
        let project = ComposeProject::new("/opt/jm", "docker-compose.yml", "jitsi");
        let runtime = FakeRuntime::new();
        let probe = ServiceProbe::new(&runtime, &project, "prosody");
        assert_eq!(wait_for_ready(&probe, &quick(2)), Readiness::TimedOut { attempts: 2 });
    }
}
