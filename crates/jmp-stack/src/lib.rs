//! # jmp-stack
//!
//! The container side of a Jitsi Meet installation: rendering the compose
//! stack definition, installing and driving the container runtime, and
//! waiting for the XMPP server to come up.
//!
//! External tools sit behind two seams. [`CommandRunner`] executes host
//! commands ([`SystemRunner`] for real, [`MockRunner`] in tests), and
//! [`ContainerRuntime`] is the lifecycle capability set consumed by the
//! reconciler ([`DockerRuntime`] for real, [`fake::FakeRuntime`] in tests).
//!
//! ## Key components
//!
//! - [`ComposeFile`] — typed stack definition, serialised to YAML
//! - [`write_stack`] — archive the previous definition and write a new one
//! - [`DockerRuntime`] — `docker` / `docker compose` backed runtime
//! - [`PackageManager`] — vendor repository install plans per host
//! - [`wait_for_ready`] — bounded, fixed-interval readiness polling

pub mod compose;
pub mod docker;
pub mod error;
pub mod fake;
pub mod host;
pub mod packages;
pub mod privilege;
pub mod readiness;
pub mod runner;
pub mod runtime;
pub mod writer;

pub use compose::{ComposeFile, ServiceSpec};
pub use docker::{ComposeFlavor, DockerRuntime};
pub use error::StackError;
pub use host::{HostOps, SystemHost, RECORDER_SOUND_MODULE};
pub use packages::{docker_install_plan, OsRelease, PackageManager};
pub use privilege::{detect_elevation, Elevation};
pub use readiness::{wait_for_ready, Readiness, ReadinessPolicy, ReadinessProbe, ServiceProbe, ACTIVATION_MARKER};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, MockRunner, SystemRunner};
pub use runtime::{ComposeProject, ContainerRuntime, RuntimeStatus};
pub use writer::{prepare_config_dirs, write_stack, StackWrite};
