pub mod launchd;
pub mod systemd;
pub mod sysvinit;

pub use launchd::Launchd;
pub use systemd::Systemd;
pub use sysvinit::SysVinit;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::BootError;
use crate::host::{Host, Platform};
use crate::install::ServiceConfig;

/// Trait for init system implementations (systemd, init.d, launchd)
pub trait InitSystem {
    /// Name of the init system
    fn name(&self) -> &str;

    /// Absolute path of the service descriptor
    fn descriptor_path(&self, host: &dyn Host, config: &ServiceConfig)
        -> Result<PathBuf, BootError>;

    /// Descriptor file content
    fn render(&self, config: &ServiceConfig) -> String;

    /// Permission bits for the descriptor
    fn mode(&self) -> u32;

    /// Register an already written descriptor so the service starts at boot
    fn enable_service(&self, host: &dyn Host, config: &ServiceConfig) -> Result<(), BootError>;

    /// Write the descriptor, replacing any previous one
    fn create_service(
        &self,
        host: &dyn Host,
        config: &ServiceConfig,
    ) -> Result<PathBuf, BootError> {
        let path = self.descriptor_path(host, config)?;
        write_descriptor(host, &path, &self.render(config), self.mode())?;
        Ok(path)
    }
}

/// Init system selected for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitKind {
    /// systemd (systemctl)
    Systemd,
    /// Legacy RedHat init.d (chkconfig)
    Chkconfig,
    /// Legacy Debian init.d (update-rc.d)
    UpdateRc,
    /// macOS launchd
    Launchd,
}

impl InitKind {
    pub fn create(self) -> Box<dyn InitSystem> {
        match self {
            InitKind::Systemd => Box::new(Systemd),
            InitKind::Chkconfig => Box::new(SysVinit::redhat()),
            InitKind::UpdateRc => Box::new(SysVinit::debian()),
            InitKind::Launchd => Box::new(Launchd),
        }
    }
}

/// Linux tools probed in order; the first one on the PATH wins
pub const LINUX_PROBES: &[(&str, InitKind)] = &[
    ("systemctl", InitKind::Systemd),
    ("chkconfig", InitKind::Chkconfig),
    ("update-rc.d", InitKind::UpdateRc),
];

/// First Linux init system whose control tool is present
pub fn probe_linux(host: &dyn Host) -> Option<InitKind> {
    LINUX_PROBES
        .iter()
        .find(|(program, _)| host.has_command(program))
        .map(|(_, kind)| *kind)
}

/// Pick the init system for the host platform
pub fn detect(host: &dyn Host) -> Result<InitKind, BootError> {
    match host.platform() {
        Platform::Linux => probe_linux(host).ok_or_else(|| {
            BootError::UnsupportedPlatform(
                "No systemctl, chkconfig nor update-rc.d found.".into(),
            )
        }),
        Platform::MacOs => Ok(InitKind::Launchd),
        other => Err(BootError::UnsupportedPlatform(other.name().to_string())),
    }
}

/// Write `contents` to `path` on the host and set its mode
pub(crate) fn write_descriptor(
    host: &dyn Host,
    path: &Path,
    contents: &str,
    mode: u32,
) -> Result<(), BootError> {
    let target = host.resolve(path);
    let wrap = |source| BootError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(&target, contents).map_err(wrap)?;
    // fs::write keeps the old mode when overwriting
    fs::set_permissions(&target, fs::Permissions::from_mode(mode)).map_err(wrap)?;

    tracing::info!("Wrote {} ({:o})", path.display(), mode);
    Ok(())
}
