use super::InitSystem;
use std::path::PathBuf;

use crate::error::BootError;
use crate::host::Host;
use crate::install::ServiceConfig;

pub const DAEMON_DIR: &str = "/Library/LaunchDaemons";
pub const AGENT_DIR: &str = "Library/LaunchAgents";

/// LaunchDaemon path when the real user is root, otherwise the caller's LaunchAgent path
pub fn plist_path(host: &dyn Host, config: &ServiceConfig) -> Result<PathBuf, BootError> {
    let file = format!("{}.plist", config.label());
    if host.is_superuser() {
        return Ok(PathBuf::from(DAEMON_DIR).join(file));
    }
    let home = host.home_dir().ok_or(BootError::MissingHome)?;
    Ok(home.join(AGENT_DIR).join(file))
}

/// macOS launchd; placing the plist is all the registration there is
#[derive(Debug, Clone, Copy, Default)]
pub struct Launchd;

impl InitSystem for Launchd {
    fn name(&self) -> &str {
        "launchd"
    }

    fn descriptor_path(&self, host: &dyn Host, config: &ServiceConfig) -> Result<PathBuf, BootError> {
        plist_path(host, config)
    }

    fn render(&self, config: &ServiceConfig) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\">\n\
             <dict>\n\
             \t<key>Label</key>\n\
             \t<string>{label}</string>\n\
             \t<key>ProgramArguments</key>\n\
             \t<array>\n\
             \t\t<string>{script}</string>\n\
             \t\t<string>start</string>\n\
             \t</array>\n\
             \t<key>RunAtLoad</key>\n\
             \t<true/>\n\
             \t<key>KeepAlive</key>\n\
             \t<false/>\n\
             </dict>\n\
             </plist>\n",
            label = xml_escape(&config.label()),
            script = xml_escape(&config.script.to_string_lossy()),
        )
    }

    fn mode(&self) -> u32 {
        0o644
    }

    fn enable_service(&self, _host: &dyn Host, config: &ServiceConfig) -> Result<(), BootError> {
        tracing::debug!("launchd picks up {} at next load", config.label());
        Ok(())
    }
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
