//! Register a control script as a startup service.
//!
//! Picks systemd, a legacy init.d flavor or launchd for the host, writes the
//! matching descriptor and runs the registration commands.

pub mod cli;
pub mod cmd;
pub mod error;
pub mod host;
pub mod init;
pub mod install;
pub mod manifest;

pub use error::BootError;
pub use host::{Host, Platform, SystemHost};
pub use init::InitKind;
pub use install::{Registrar, ServiceConfig};
pub use manifest::ServiceOptions;
