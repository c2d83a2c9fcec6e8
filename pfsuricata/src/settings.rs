use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Runtime settings, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Configuration document to reconcile.
    pub config_path: PathBuf,
    /// Parsed-config cache pfSense rebuilds after a write.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    /// User recorded in the revision block.
    pub revision_user: String,
    #[serde(default)]
    pub prune_unknown_fields: bool,
    pub shell: ShellSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellSettings {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_settings(&raw, path.display().to_string())
    }

    /// Load from `path` when given, otherwise use the embedded defaults.
    pub fn resolve(path: Option<&Path>) -> Result<(Self, String), SettingsError> {
        match path {
            Some(path) => Ok((Self::load(path)?, format!("file:{}", path.display()))),
            None => Ok((Self::embedded()?, "embedded".to_string())),
        }
    }

    /// Built-in defaults for running on the appliance.
    pub fn embedded() -> Result<Self, SettingsError> {
        let raw = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/settings/default.toml"
        ));
        parse_settings(raw, "embedded settings".to_string())
    }
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::{parse_settings, Settings, SettingsError, ShellSettings};
    use std::path::PathBuf;

    #[test]
    fn embedded_defaults_target_the_appliance() {
        let embedded = Settings::embedded().expect("embedded settings parse");
        assert_eq!(
            embedded,
            Settings {
                config_path: PathBuf::from("/cf/conf/config.xml"),
                cache_path: Some(PathBuf::from("/tmp/config.cache")),
                revision_user: "pfsuricata".to_string(),
                prune_unknown_fields: false,
                shell: ShellSettings {
                    program: "/usr/local/sbin/pfSsh.php".to_string(),
                    args: vec!["dummy".to_string()],
                },
            }
        );
    }

    #[test]
    fn cache_path_and_args_are_optional() {
        let settings = parse_settings(
            r#"
config_path = "config.xml"
revision_user = "lab"

[shell]
program = "cat"
"#,
            "inline".to_string(),
        )
        .expect("parse");
        assert_eq!(settings.config_path, PathBuf::from("config.xml"));
        assert_eq!(settings.cache_path, None);
        assert!(settings.shell.args.is_empty());
        assert!(!settings.prune_unknown_fields);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_settings(
            "config_path = \"a\"\nrevision_user = \"b\"\nbogus = 1\n[shell]\nprogram = \"c\"\n",
            "inline".to_string(),
        )
        .expect_err("bogus key");
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load(&PathBuf::from("/nonexistent/pfsuricata.toml"))
            .expect_err("missing");
        assert!(err.to_string().contains("/nonexistent/pfsuricata.toml"));
    }
}
