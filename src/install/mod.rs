pub mod config;

pub use config::ServiceConfig;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BootError;
use crate::host::{Host, Platform};
use crate::init::{self, launchd, systemd, sysvinit, InitKind};
use crate::manifest::ServiceOptions;

/// Result of a successful install
#[derive(Debug, Clone, PartialEq)]
pub struct Installed {
    pub init: InitKind,
    pub service_name: String,
    pub descriptor: PathBuf,
}

/// Result of a successful uninstall
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub service_name: String,
    pub descriptor: PathBuf,
}

/// Registers and deregisters startup services on a host
pub struct Registrar<'a> {
    host: &'a dyn Host,
}

impl<'a> Registrar<'a> {
    pub fn new(host: &'a dyn Host) -> Self {
        Self { host }
    }

    /// Write the service descriptor for the detected init system and register it
    pub fn install(&self, options: ServiceOptions) -> Result<Installed, BootError> {
        self.require_root("register")?;
        let config = self.resolve(options)?;

        let kind = init::detect(self.host)?;
        let init = kind.create();
        tracing::info!(
            "Installing {} as {} service",
            config.service_name,
            init.name()
        );

        let descriptor = init.create_service(self.host, &config)?;
        init.enable_service(self.host, &config)?;

        Ok(Installed {
            init: kind,
            service_name: config.service_name,
            descriptor,
        })
    }

    /// Deregister the service and delete whichever descriptor it has
    pub fn uninstall(&self, options: ServiceOptions) -> Result<Removed, BootError> {
        self.require_root("deregister")?;
        let config = self.resolve(options)?;

        let descriptor = match self.host.platform() {
            Platform::Linux => self.uninstall_linux(&config)?,
            Platform::MacOs => self.uninstall_darwin(&config)?,
            other => return Err(BootError::UnsupportedPlatform(other.name().to_string())),
        };

        Ok(Removed {
            service_name: config.service_name,
            descriptor,
        })
    }

    fn require_root(&self, action: &'static str) -> Result<(), BootError> {
        if !self.host.is_privileged() {
            return Err(BootError::Privilege { action });
        }
        Ok(())
    }

    fn resolve(&self, options: ServiceOptions) -> Result<ServiceConfig, BootError> {
        let cwd = self.host.current_dir().unwrap_or_else(|e| {
            tracing::warn!("Cannot read working directory ({}), resolving script from /", e);
            PathBuf::from("/")
        });
        ServiceConfig::resolve(options, &cwd)
    }

    fn uninstall_linux(&self, config: &ServiceConfig) -> Result<PathBuf, BootError> {
        let service = config.service_name.as_str();

        let unit = systemd::unit_path(service);
        if self.host.resolve(&unit).exists() {
            self.host
                .run("systemctl", &["disable", systemd::unit_name(service).as_str()])
                .map_err(|e| BootError::deregistration(service, e))?;
            remove_descriptor(self.host, &unit)?;
            return Ok(unit);
        }

        // chkconfig may not exist or may not know the service
        if let Err(e) = self.host.run("chkconfig", &[service, "off"]) {
            tracing::debug!("Ignoring chkconfig failure: {}", e);
        }

        let links = sysvinit::remove_runlevel_links(self.host, service);
        tracing::debug!("Removed {} runlevel links for {}", links, service);

        let script = sysvinit::script_path(service);
        remove_descriptor(self.host, &script)?;
        Ok(script)
    }

    fn uninstall_darwin(&self, config: &ServiceConfig) -> Result<PathBuf, BootError> {
        let plist = launchd::plist_path(self.host, config)?;
        remove_descriptor(self.host, &plist)?;
        Ok(plist)
    }
}

fn remove_descriptor(host: &dyn Host, path: &Path) -> Result<(), BootError> {
    fs::remove_file(host.resolve(path)).map_err(|source| BootError::FileRemove {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Removed {}", path.display());
    Ok(())
}
