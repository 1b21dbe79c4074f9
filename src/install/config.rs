use std::path::{Component, Path, PathBuf};

use crate::error::BootError;
use crate::manifest::{ServiceOptions, DEFAULTS};

/// Fully resolved service configuration for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub name: String,
    pub company: String,
    /// Absolute path of the control script
    pub script: PathBuf,
    pub linux_type: String,
    pub linux_after: String,
    pub linux_wanted_by: String,
    pub linux_runlevels: String,
    pub redhat_start_priority: String,
    pub redhat_stop_priority: String,
    pub debian_requires: String,
    pub debian_stoplevels: String,
    /// `name` normalized; identifies the service and keys its descriptor path
    pub service_name: String,
    /// `company` normalized; used in the launchd label
    pub company_name: String,
}

impl ServiceConfig {
    /// Merge `options` over the defaults and derive the normalized names.
    /// A relative script is resolved against `cwd`.
    pub fn resolve(options: ServiceOptions, cwd: &Path) -> Result<Self, BootError> {
        let o = options.or(&DEFAULTS);
        let take = |v: Option<String>| v.unwrap_or_default();

        let name = take(o.name);
        let company = take(o.company);

        let service_name = normalize(&name);
        if service_name.is_empty() {
            return Err(BootError::InvalidName {
                field: "name",
                value: name,
            });
        }
        let company_name = normalize(&company);
        if company_name.is_empty() {
            return Err(BootError::InvalidName {
                field: "company",
                value: company,
            });
        }

        Ok(Self {
            script: absolutize(cwd, Path::new(&take(o.script))),
            linux_type: take(o.linux_type),
            linux_after: take(o.linux_after),
            linux_wanted_by: take(o.linux_wanted_by),
            linux_runlevels: take(o.linux_runlevels),
            redhat_start_priority: take(o.redhat_start_priority),
            redhat_stop_priority: take(o.redhat_stop_priority),
            debian_requires: take(o.debian_requires),
            debian_stoplevels: take(o.debian_stoplevels),
            name,
            company,
            service_name,
            company_name,
        })
    }

    /// "<company> <name>", used in descriptions
    pub fn description(&self) -> String {
        format!("{} {}", self.company, self.name)
    }

    /// launchd label: com.<company_name>.<service_name>
    pub fn label(&self) -> String {
        format!("com.{}.{}", self.company_name, self.service_name)
    }
}

/// Lowercase and drop everything outside `[a-z0-9_]`
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Left-pad with zeros, then keep the last `len` characters.
///
/// Values longer than `len` are truncated from the left: `zero_pad("100", 2) == "00"`.
pub fn zero_pad(value: &str, len: usize) -> String {
    let padded: Vec<char> = format!("0000000000{}", value).chars().collect();
    padded[padded.len().saturating_sub(len)..].iter().collect()
}

/// Keep only the ASCII digits: "3,4,5" -> "345"
pub fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digits separated by single spaces: "0,1,6" -> "0 1 6"
pub fn spaced_digits(value: &str) -> String {
    digits(value)
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

/// LSB facility list: "local_fs remote_fs" -> "$local_fs $remote_fs"
pub fn facilities(value: &str) -> String {
    value
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(|token| format!("${}", token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lexically resolve `path` against `base`, folding `.` and `..`
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::from("/");
    for component in joined.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(name: &str, company: &str, script: &str) -> ServiceOptions {
        ServiceOptions {
            name: Some(name.into()),
            company: Some(company.into()),
            script: Some(script.into()),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_strips_and_lowercases() {
        assert_eq!(normalize("MyApp"), "myapp");
        assert_eq!(normalize("Acme, Inc."), "acmeinc");
        assert_eq!(normalize("my-app_2 (beta)"), "myapp_2beta");
        assert_eq!(normalize("Ünïcödé"), "ncd");
    }

    #[test]
    fn normalize_is_idempotent_and_word_only() {
        for input in ["Hello World!", "A.B.C", "__X__", "Caf\u{e9} 42", "~!@#"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
            assert!(once
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }

    #[test]
    fn zero_pad_semantics() {
        assert_eq!(zero_pad("5", 2), "05");
        assert_eq!(zero_pad("99", 2), "99");
        assert_eq!(zero_pad("01", 2), "01");
        assert_eq!(zero_pad("100", 2), "00");
        assert_eq!(zero_pad("", 2), "00");
    }

    #[test]
    fn runlevel_helpers() {
        assert_eq!(digits("3,4,5"), "345");
        assert_eq!(spaced_digits("0,1,6"), "0 1 6");
        assert_eq!(spaced_digits("2345"), "2 3 4 5");
        assert_eq!(spaced_digits(""), "");
    }

    #[test]
    fn facilities_prefix_each_token() {
        assert_eq!(
            facilities("local_fs remote_fs network syslog named"),
            "$local_fs $remote_fs $network $syslog $named"
        );
        assert_eq!(facilities(" network, syslog "), "$network $syslog");
    }

    #[test]
    fn absolutize_relative_and_absolute() {
        let cwd = Path::new("/opt/myapp");
        assert_eq!(
            absolutize(cwd, Path::new("bin/control.sh")),
            PathBuf::from("/opt/myapp/bin/control.sh")
        );
        assert_eq!(
            absolutize(cwd, Path::new("./bin/../sbin/ctl")),
            PathBuf::from("/opt/myapp/sbin/ctl")
        );
        assert_eq!(
            absolutize(cwd, Path::new("/usr/bin/myapp")),
            PathBuf::from("/usr/bin/myapp")
        );
    }

    #[test]
    fn resolve_applies_defaults() {
        let cfg = ServiceConfig::resolve(ServiceOptions::default(), Path::new("/srv/app")).unwrap();
        assert_eq!(cfg.name, "MyService");
        assert_eq!(cfg.service_name, "myservice");
        assert_eq!(cfg.company_name, "node");
        assert_eq!(cfg.script, PathBuf::from("/srv/app/bin/control.sh"));
        assert_eq!(cfg.linux_type, "forking");
        assert_eq!(cfg.redhat_stop_priority, "01");
    }

    #[test]
    fn resolve_derives_names() {
        let cfg =
            ServiceConfig::resolve(opts("MyApp", "Acme Corp.", "/usr/bin/myapp"), Path::new("/"))
                .unwrap();
        assert_eq!(cfg.service_name, "myapp");
        assert_eq!(cfg.company_name, "acmecorp");
        assert_eq!(cfg.description(), "Acme Corp. MyApp");
        assert_eq!(cfg.label(), "com.acmecorp.myapp");
    }

    #[test]
    fn resolve_rejects_empty_service_name() {
        let err = ServiceConfig::resolve(opts("!!!", "Acme", "/bin/x"), Path::new("/")).unwrap_err();
        assert!(matches!(err, BootError::InvalidName { field: "name", .. }));
    }

    #[test]
    fn resolve_rejects_empty_company_name() {
        let err = ServiceConfig::resolve(opts("MyApp", "--", "/bin/x"), Path::new("/")).unwrap_err();
        assert!(matches!(err, BootError::InvalidName { field: "company", .. }));
    }
}
