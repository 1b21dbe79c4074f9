use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Partial option set as supplied by flags, an options file or package.json.
///
/// Every field is optional; unset fields are filled from [`DEFAULTS`] when
/// the options are resolved into a `ServiceConfig`. Options files take the
/// same keys as the command line, dashed or underscored; anything else is
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceOptions {
    /// Display name; lowercased and stripped to form the service name
    #[serde(default, deserialize_with = "scalar")]
    pub name: Option<String>,

    /// Vendor string; forms the launchd label on macOS
    #[serde(default, deserialize_with = "scalar")]
    pub company: Option<String>,

    /// Control script accepting start/stop as its first argument
    #[serde(default, deserialize_with = "scalar")]
    pub script: Option<String>,

    /// systemd `Type=`
    #[serde(default, alias = "linux-type", deserialize_with = "scalar")]
    pub linux_type: Option<String>,

    /// systemd `After=`
    #[serde(default, alias = "linux-after", deserialize_with = "scalar")]
    pub linux_after: Option<String>,

    /// systemd `WantedBy=`
    #[serde(default, alias = "linux-wanted-by", deserialize_with = "scalar")]
    pub linux_wanted_by: Option<String>,

    /// init.d runlevels, e.g. "3,4,5"
    #[serde(default, alias = "linux-runlevels", deserialize_with = "scalar")]
    pub linux_runlevels: Option<String>,

    #[serde(default, alias = "redhat-start-priority", deserialize_with = "scalar")]
    pub redhat_start_priority: Option<String>,

    #[serde(default, alias = "redhat-stop-priority", deserialize_with = "scalar")]
    pub redhat_stop_priority: Option<String>,

    /// Services the Debian script depends on, without the `$` prefix
    #[serde(default, alias = "debian-requires", deserialize_with = "scalar")]
    pub debian_requires: Option<String>,

    #[serde(default, alias = "debian-stoplevels", deserialize_with = "scalar")]
    pub debian_stoplevels: Option<String>,
}

/// Built-in defaults, merged under every invocation's options
pub static DEFAULTS: Lazy<ServiceOptions> = Lazy::new(|| ServiceOptions {
    name: Some("MyService".into()),
    company: Some("Node".into()),
    script: Some("bin/control.sh".into()),

    // systemd (modern)
    linux_type: Some("forking".into()),
    linux_after: Some("network.target".into()),
    linux_wanted_by: Some("multi-user.target".into()),

    // init.d (legacy)
    linux_runlevels: Some("3,4,5".into()),
    redhat_start_priority: Some("99".into()),
    redhat_stop_priority: Some("01".into()),
    debian_requires: Some("local_fs remote_fs network syslog named".into()),
    debian_stoplevels: Some("0,1,6".into()),
});

impl ServiceOptions {
    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: &ServiceOptions) -> ServiceOptions {
        ServiceOptions {
            name: self.name.or_else(|| fallback.name.clone()),
            company: self.company.or_else(|| fallback.company.clone()),
            script: self.script.or_else(|| fallback.script.clone()),
            linux_type: self.linux_type.or_else(|| fallback.linux_type.clone()),
            linux_after: self.linux_after.or_else(|| fallback.linux_after.clone()),
            linux_wanted_by: self
                .linux_wanted_by
                .or_else(|| fallback.linux_wanted_by.clone()),
            linux_runlevels: self
                .linux_runlevels
                .or_else(|| fallback.linux_runlevels.clone()),
            redhat_start_priority: self
                .redhat_start_priority
                .or_else(|| fallback.redhat_start_priority.clone()),
            redhat_stop_priority: self
                .redhat_stop_priority
                .or_else(|| fallback.redhat_stop_priority.clone()),
            debian_requires: self
                .debian_requires
                .or_else(|| fallback.debian_requires.clone()),
            debian_stoplevels: self
                .debian_stoplevels
                .or_else(|| fallback.debian_stoplevels.clone()),
        }
    }

    /// Set a single option by name. Dashes are accepted in place of underscores.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key.replace('-', "_").as_str() {
            "name" => &mut self.name,
            "company" => &mut self.company,
            "script" => &mut self.script,
            "linux_type" => &mut self.linux_type,
            "linux_after" => &mut self.linux_after,
            "linux_wanted_by" => &mut self.linux_wanted_by,
            "linux_runlevels" => &mut self.linux_runlevels,
            "redhat_start_priority" => &mut self.redhat_start_priority,
            "redhat_stop_priority" => &mut self.redhat_stop_priority,
            "debian_requires" => &mut self.debian_requires,
            "debian_stoplevels" => &mut self.debian_stoplevels,
            _ => bail!("Unknown option: {}", key),
        };
        *slot = Some(value.to_string());
        Ok(())
    }
}

/// Accept numbers and booleans where a string is expected, so that
/// `redhat_start_priority: 99` works in YAML and TOML.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(s) => s,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

/// The subset of package.json used to default `name` and `script`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMeta {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub bin: Option<PackageBin>,
}

/// npm allows `bin` to be a single path or a map of command name to path
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PackageBin {
    Path(String),
    Map(HashMap<String, String>),
}

impl PackageMeta {
    /// Script for the package: the bare `bin` path, or the `bin` entry named after the package
    pub fn script(&self) -> Option<String> {
        match self.bin.as_ref()? {
            PackageBin::Path(path) => Some(path.clone()),
            PackageBin::Map(map) => map.get(self.name.as_ref()?).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTION_KEYS: &[&str] = &[
        "name",
        "company",
        "script",
        "linux_type",
        "linux_after",
        "linux_wanted_by",
        "linux_runlevels",
        "redhat_start_priority",
        "redhat_stop_priority",
        "debian_requires",
        "debian_stoplevels",
    ];

    #[test]
    fn defaults_cover_every_option() {
        let d = &*DEFAULTS;
        assert_eq!(d.name.as_deref(), Some("MyService"));
        assert_eq!(d.company.as_deref(), Some("Node"));
        assert_eq!(d.script.as_deref(), Some("bin/control.sh"));
        assert_eq!(d.linux_type.as_deref(), Some("forking"));
        assert_eq!(d.linux_after.as_deref(), Some("network.target"));
        assert_eq!(d.linux_wanted_by.as_deref(), Some("multi-user.target"));
        assert_eq!(d.linux_runlevels.as_deref(), Some("3,4,5"));
        assert_eq!(d.redhat_start_priority.as_deref(), Some("99"));
        assert_eq!(d.redhat_stop_priority.as_deref(), Some("01"));
        assert_eq!(
            d.debian_requires.as_deref(),
            Some("local_fs remote_fs network syslog named")
        );
        assert_eq!(d.debian_stoplevels.as_deref(), Some("0,1,6"));
    }

    #[test]
    fn or_keeps_explicit_values() {
        let opts = ServiceOptions {
            name: Some("MyApp".into()),
            linux_type: Some("simple".into()),
            ..Default::default()
        }
        .or(&DEFAULTS);

        assert_eq!(opts.name.as_deref(), Some("MyApp"));
        assert_eq!(opts.linux_type.as_deref(), Some("simple"));
        assert_eq!(opts.company.as_deref(), Some("Node"));
    }

    #[test]
    fn set_accepts_dashed_and_underscored_keys() {
        let mut opts = ServiceOptions::default();
        opts.set("linux-wanted-by", "graphical.target").unwrap();
        opts.set("redhat_stop_priority", "5").unwrap();
        assert_eq!(opts.linux_wanted_by.as_deref(), Some("graphical.target"));
        assert_eq!(opts.redhat_stop_priority.as_deref(), Some("5"));
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let mut opts = ServiceOptions::default();
        let err = opts.set("colour", "blue").unwrap_err();
        assert_eq!(err.to_string(), "Unknown option: colour");
    }

    #[test]
    fn every_listed_key_is_settable() {
        let mut opts = ServiceOptions::default();
        for key in OPTION_KEYS {
            opts.set(key, "x").unwrap();
        }
        assert_eq!(opts.clone().or(&DEFAULTS), opts);
    }

    #[test]
    fn file_keys_may_be_dashed() {
        let opts: ServiceOptions =
            serde_yaml::from_str("linux-type: simple\nlinux_after: network-online.target\n")
                .unwrap();
        assert_eq!(opts.linux_type.as_deref(), Some("simple"));
        assert_eq!(opts.linux_after.as_deref(), Some("network-online.target"));
    }

    #[test]
    fn file_rejects_unknown_keys() {
        let err = serde_yaml::from_str::<ServiceOptions>("name: MyApp\ncolour: blue\n")
            .unwrap_err();
        assert!(err.to_string().contains("unknown field `colour`"), "{}", err);
    }

    #[test]
    fn numeric_values_become_strings() {
        let opts: ServiceOptions =
            serde_json::from_str(r#"{"redhat_start_priority": 98, "name": "svc"}"#).unwrap();
        assert_eq!(opts.redhat_start_priority.as_deref(), Some("98"));
        assert_eq!(opts.name.as_deref(), Some("svc"));
        assert_eq!(opts.company, None);
    }

    #[test]
    fn package_bin_string() {
        let meta: PackageMeta =
            serde_json::from_str(r#"{"name": "myapp", "bin": "bin/control.sh"}"#).unwrap();
        assert_eq!(meta.script().as_deref(), Some("bin/control.sh"));
    }

    #[test]
    fn package_bin_map_uses_package_name() {
        let meta: PackageMeta = serde_json::from_str(
            r#"{"name": "myapp", "bin": {"other": "bin/other.js", "myapp": "bin/myapp.js"}}"#,
        )
        .unwrap();
        assert_eq!(meta.script().as_deref(), Some("bin/myapp.js"));
    }

    #[test]
    fn package_bin_map_without_matching_entry() {
        let meta: PackageMeta =
            serde_json::from_str(r#"{"name": "myapp", "bin": {"other": "bin/other.js"}}"#)
                .unwrap();
        assert_eq!(meta.script(), None);
    }
}
