mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Load an options file (YAML, JSON or TOML)
pub fn load(path: &Path) -> Result<ServiceOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match extension {
        "yaml" | "yml" => parse_yaml(&content),
        "json" => parse_json(&content),
        "toml" => parse_toml(&content),
        _ => parse_auto(&content),
    }
}

/// Options derived from `package.json` in `dir`.
///
/// Returns empty options when there is no package.json; a malformed one is an error.
pub fn package_defaults(dir: &Path) -> Result<ServiceOptions> {
    let path = dir.join("package.json");
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ServiceOptions::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let meta: PackageMeta = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(ServiceOptions {
        script: meta.script(),
        name: meta.name,
        ..Default::default()
    })
}

/// Parse YAML content
fn parse_yaml(content: &str) -> Result<ServiceOptions> {
    serde_yaml::from_str(content).context("Failed to parse YAML options")
}

/// Parse JSON content
fn parse_json(content: &str) -> Result<ServiceOptions> {
    serde_json::from_str(content).context("Failed to parse JSON options")
}

/// Parse TOML content
fn parse_toml(content: &str) -> Result<ServiceOptions> {
    toml::from_str(content).context("Failed to parse TOML options")
}

/// Auto-detect format and parse
fn parse_auto(content: &str) -> Result<ServiceOptions> {
    if content.trim().starts_with('{') {
        parse_json(content)
    } else {
        // YAML is a superset of JSON anyway
        parse_yaml(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_options() {
        let yaml = r#"
name: MyApp
company: Acme
script: /usr/bin/myapp
redhat_start_priority: 80
"#;
        let opts = parse_yaml(yaml).unwrap();
        assert_eq!(opts.name.as_deref(), Some("MyApp"));
        assert_eq!(opts.company.as_deref(), Some("Acme"));
        assert_eq!(opts.script.as_deref(), Some("/usr/bin/myapp"));
        assert_eq!(opts.redhat_start_priority.as_deref(), Some("80"));
        assert_eq!(opts.linux_type, None);
    }

    #[test]
    fn test_toml_options() {
        let toml = r#"
name = "MyApp"
linux_type = "simple"
redhat_stop_priority = 5
"#;
        let opts = parse_toml(toml).unwrap();
        assert_eq!(opts.name.as_deref(), Some("MyApp"));
        assert_eq!(opts.linux_type.as_deref(), Some("simple"));
        assert_eq!(opts.redhat_stop_priority.as_deref(), Some("5"));
    }

    #[test]
    fn test_auto_detect_json() {
        let opts = parse_auto(r#"{"name": "MyApp"}"#).unwrap();
        assert_eq!(opts.name.as_deref(), Some("MyApp"));
    }

    #[test]
    fn test_auto_detect_yaml() {
        let opts = parse_auto("name: MyApp\n").unwrap();
        assert_eq!(opts.name.as_deref(), Some("MyApp"));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");
        fs::write(&path, r#"{"company": "Acme"}"#).unwrap();

        let opts = load(&path).unwrap();
        assert_eq!(opts.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read options file"));
    }

    #[test]
    fn test_package_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "myapp", "version": "1.0.0", "bin": {"myapp": "bin/control.sh"}}"#,
        )
        .unwrap();

        let opts = package_defaults(dir.path()).unwrap();
        assert_eq!(opts.name.as_deref(), Some("myapp"));
        assert_eq!(opts.script.as_deref(), Some("bin/control.sh"));
        assert_eq!(opts.company, None);
    }

    #[test]
    fn test_package_defaults_without_package_json() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            package_defaults(dir.path()).unwrap(),
            ServiceOptions::default()
        );
    }

    #[test]
    fn test_package_defaults_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        assert!(package_defaults(dir.path()).is_err());
    }
}
