//! Ambient lookups the registrar depends on.
//!
//! Privilege, home directory, tool probing, command execution and the
//! filesystem root all go through [`Host`], so install/uninstall can be
//! exercised against a scratch directory without running as root.

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};

use crate::cmd;

/// Operating system family the registrar knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other(String),
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "darwin",
            Platform::Other(os) => os,
        }
    }
}

pub trait Host {
    fn platform(&self) -> Platform;

    /// Effective uid is root; gates both install and uninstall
    fn is_privileged(&self) -> bool;

    /// Real uid is root; picks LaunchDaemons over LaunchAgents on macOS
    fn is_superuser(&self) -> bool;

    fn home_dir(&self) -> Option<PathBuf>;

    /// Environment variable, if set and valid unicode
    fn env_var(&self, key: &str) -> Option<String>;

    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Whether `program` can be found on the PATH
    fn has_command(&self, program: &str) -> bool;

    fn run(&self, program: &str, args: &[&str]) -> Result<()>;

    /// Directory that absolute descriptor paths are resolved against
    fn root(&self) -> &Path;

    /// Map an absolute descriptor path onto this host's filesystem root
    fn resolve(&self, path: &Path) -> PathBuf {
        match path.strip_prefix("/") {
            Ok(relative) => self.root().join(relative),
            Err(_) => self.root().join(path),
        }
    }
}

/// The machine we are running on
#[derive(Debug, Clone)]
pub struct SystemHost {
    root: PathBuf,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/"),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SystemHost {
    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn is_privileged(&self) -> bool {
        nix::unistd::Uid::effective().is_root()
    }

    fn is_superuser(&self) -> bool {
        nix::unistd::Uid::current().is_root()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn has_command(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        cmd::run(program, args)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
