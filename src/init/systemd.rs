use super::InitSystem;
use std::path::PathBuf;

use crate::error::BootError;
use crate::host::Host;
use crate::install::ServiceConfig;

pub const UNIT_DIR: &str = "/etc/systemd/system";

/// Path of the unit file for a service
pub fn unit_path(service_name: &str) -> PathBuf {
    PathBuf::from(UNIT_DIR).join(unit_name(service_name))
}

pub fn unit_name(service_name: &str) -> String {
    format!("{}.service", service_name)
}

/// systemd, driven through systemctl
#[derive(Debug, Clone, Copy, Default)]
pub struct Systemd;

impl InitSystem for Systemd {
    fn name(&self) -> &str {
        "systemd"
    }

    fn descriptor_path(
        &self,
        _host: &dyn Host,
        config: &ServiceConfig,
    ) -> Result<PathBuf, BootError> {
        Ok(unit_path(&config.service_name))
    }

    fn render(&self, config: &ServiceConfig) -> String {
        format!(
            "[Unit]\n\
             Description={desc}\n\
             After={after}\n\
             \n\
             [Service]\n\
             Type={kind}\n\
             ExecStart={script} start\n\
             ExecStop={script} stop\n\
             \n\
             [Install]\n\
             WantedBy={wanted_by}\n",
            desc = config.description(),
            after = config.linux_after,
            kind = config.linux_type,
            script = config.script.display(),
            wanted_by = config.linux_wanted_by,
        )
    }

    fn mode(&self) -> u32 {
        0o644
    }

    fn enable_service(&self, host: &dyn Host, config: &ServiceConfig) -> Result<(), BootError> {
        let service = &config.service_name;
        host.run("systemctl", &["daemon-reload"])
            .map_err(|e| BootError::registration(service, e))?;
        host.run("systemctl", &["enable", unit_name(service).as_str()])
            .map_err(|e| BootError::registration(service, e))
    }
}
