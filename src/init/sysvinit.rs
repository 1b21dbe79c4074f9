use super::InitSystem;
use std::fs;
use std::path::PathBuf;

use crate::error::BootError;
use crate::host::Host;
use crate::install::{config, ServiceConfig};

pub const SERVICE_DIR: &str = "/etc/init.d";

/// Path of the init script for a service
pub fn script_path(service_name: &str) -> PathBuf {
    PathBuf::from(SERVICE_DIR).join(service_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    RedHat,
    Debian,
}

/// Legacy init.d scripts, registered with chkconfig or update-rc.d
#[derive(Debug, Clone, Copy)]
pub struct SysVinit {
    flavor: Flavor,
}

impl SysVinit {
    /// chkconfig-managed scripts (RHEL, CentOS, Fedora)
    pub fn redhat() -> Self {
        Self {
            flavor: Flavor::RedHat,
        }
    }

    /// update-rc.d-managed scripts (Debian, Ubuntu)
    pub fn debian() -> Self {
        Self {
            flavor: Flavor::Debian,
        }
    }

    fn generate_service_script(&self, svc: &ServiceConfig) -> String {
        let header = match self.flavor {
            Flavor::RedHat => format!(
                "#!/bin/sh\n\
                 #\n\
                 # init.d script for {name}\n\
                 #\n\
                 # chkconfig: {levels} {start} {stop}\n\
                 # description: {desc}\n",
                name = svc.name,
                levels = config::digits(&svc.linux_runlevels),
                start = config::zero_pad(&svc.redhat_start_priority, 2),
                stop = config::zero_pad(&svc.redhat_stop_priority, 2),
                desc = svc.description(),
            ),
            Flavor::Debian => {
                let requires = config::facilities(&svc.debian_requires);
                format!(
                    "#!/bin/sh\n\
                     \n\
                     ### BEGIN INIT INFO\n\
                     # Provides:          {provides}\n\
                     # Required-Start:    {requires}\n\
                     # Required-Stop:     {requires}\n\
                     # Default-Start:     {start}\n\
                     # Default-Stop:      {stop}\n\
                     # X-Interactive:     true\n\
                     # Short-Description: Start/stop {desc}\n\
                     ### END INIT INFO\n",
                    provides = svc.service_name,
                    requires = requires,
                    start = config::spaced_digits(&svc.linux_runlevels),
                    stop = config::spaced_digits(&svc.debian_stoplevels),
                    desc = svc.description(),
                )
            }
        };

        format!("{}\n{} $1\n", header, svc.script.display())
    }
}

impl InitSystem for SysVinit {
    fn name(&self) -> &str {
        match self.flavor {
            Flavor::RedHat => "init.d (chkconfig)",
            Flavor::Debian => "init.d (update-rc.d)",
        }
    }

    fn descriptor_path(
        &self,
        _host: &dyn Host,
        config: &ServiceConfig,
    ) -> Result<PathBuf, BootError> {
        Ok(script_path(&config.service_name))
    }

    fn render(&self, config: &ServiceConfig) -> String {
        self.generate_service_script(config)
    }

    fn mode(&self) -> u32 {
        0o755
    }

    fn enable_service(&self, host: &dyn Host, config: &ServiceConfig) -> Result<(), BootError> {
        let service = config.service_name.as_str();
        let result = match self.flavor {
            Flavor::RedHat => host.run("chkconfig", &[service, "on"]),
            Flavor::Debian => host.run("update-rc.d", &[service, "defaults"]),
        };
        result.map_err(|e| BootError::registration(service, e))
    }
}

/// Remove every `/etc/rc*.d/` entry whose name ends with `service`.
///
/// Best effort: unreadable directories and failed removals are logged and
/// skipped. Returns the number of links removed.
pub fn remove_runlevel_links(host: &dyn Host, service: &str) -> usize {
    let etc = host.resolve(std::path::Path::new("/etc"));
    let Ok(entries) = fs::read_dir(&etc) else {
        return 0;
    };

    let mut removed = 0;
    for dir in entries.flatten() {
        let is_runlevel_dir = dir
            .file_name()
            .to_str()
            .map(|n| n.starts_with("rc") && n.ends_with(".d"))
            .unwrap_or(false);
        if !is_runlevel_dir {
            continue;
        }

        let Ok(links) = fs::read_dir(dir.path()) else {
            continue;
        };
        for link in links.flatten() {
            let matches = link
                .file_name()
                .to_str()
                .map(|n| n.ends_with(service))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            match fs::remove_file(link.path()) {
                Ok(()) => removed += 1,
                Err(e) => tracing::debug!("Failed to remove {}: {}", link.path().display(), e),
            }
        }
    }

    removed
}
