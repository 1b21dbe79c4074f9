use std::io;
use std::path::PathBuf;
use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal outcome of a failed install or uninstall
#[derive(Debug, Error)]
pub enum BootError {
    #[error("Must be root to {action} a startup service.")]
    Privilege { action: &'static str },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid {field}: {value:?} has no word characters left after normalization")]
    InvalidName { field: &'static str, value: String },

    #[error("Cannot locate a home directory for the LaunchAgent plist")]
    MissingHome,

    #[error("Failed to write file: {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove file: {}: {source}", .path.display())]
    FileRemove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to activate service: {service}: {source}")]
    Registration {
        service: String,
        #[source]
        source: Cause,
    },

    #[error("Failed to deactivate service: {service}: {source}")]
    Deregistration {
        service: String,
        #[source]
        source: Cause,
    },
}

impl BootError {
    pub(crate) fn registration(service: &str, source: anyhow::Error) -> Self {
        Self::Registration {
            service: service.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn deregistration(service: &str, source: anyhow::Error) -> Self {
        Self::Deregistration {
            service: service.to_string(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_message_names_action() {
        let err = BootError::Privilege { action: "register" };
        assert_eq!(
            err.to_string(),
            "Must be root to register a startup service."
        );
    }

    #[test]
    fn file_write_message_includes_path() {
        let err = BootError::FileWrite {
            path: PathBuf::from("/etc/init.d/myapp"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write file: /etc/init.d/myapp: denied"
        );
    }

    #[test]
    fn registration_keeps_command_detail() {
        let err = BootError::registration("myapp", anyhow::anyhow!("chkconfig exited with 1"));
        assert_eq!(
            err.to_string(),
            "Failed to activate service: myapp: chkconfig exited with 1"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
