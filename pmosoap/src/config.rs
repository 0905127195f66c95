//! # Configuration du codec SOAP
//!
//! La configuration est construite en trois couches :
//! 1. la configuration par défaut intégrée (`pmosoap.yaml`)
//! 2. un fichier YAML optionnel, fusionné par-dessus
//! 3. les variables d'environnement `PMOSOAP__<SECTION>__<CLE>`
//!
//! ```no_run
//! use pmosoap::{SoapCodec, SoapConfig};
//!
//! let config = SoapConfig::load(Some(std::path::Path::new("soap.yaml")))?;
//! let codec = SoapCodec::from_config(&config)?;
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::errors::SoapError;
use crate::soap::constants::{DEFAULT_SOAP_PREFIX, DEFAULT_TARGET_PREFIX, XMLNS};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmosoap.yaml");

pub const ENV_PREFIX: &str = "PMOSOAP__";

const DEFAULT_INDENT_SIZE: usize = 2;

/// Options de présentation : n'affectent que les blancs et les préfixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub indent: bool,
    pub indent_size: usize,
    pub target_prefix: String,
    pub soap_prefix: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: false,
            indent_size: DEFAULT_INDENT_SIZE,
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            soap_prefix: DEFAULT_SOAP_PREFIX.to_string(),
        }
    }
}

impl FormatOptions {
    pub fn validate(&self) -> Result<(), SoapError> {
        for (label, prefix) in [
            ("target_prefix", &self.target_prefix),
            ("soap_prefix", &self.soap_prefix),
        ] {
            if prefix.is_empty() || prefix == XMLNS || prefix.contains(':') {
                return Err(SoapError::Config(format!(
                    "invalid {}: {:?}",
                    label, prefix
                )));
            }
        }
        if self.target_prefix == self.soap_prefix {
            return Err(SoapError::Config(format!(
                "target_prefix and soap_prefix are both {:?}",
                self.soap_prefix
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    pub target_namespace: Option<String>,
    pub format: FormatOptions,
}

impl SoapConfig {
    /// Charge la configuration par défaut, le fichier `path` s'il est fourni,
    /// puis les surcharges de l'environnement
    pub fn load(path: Option<&Path>) -> Result<Self, SoapError> {
        Self::load_with_overrides(path, env::vars())
    }

    /// Comme [`SoapConfig::load`], avec des surcharges explicites
    pub fn load_with_overrides<I>(path: Option<&Path>, vars: I) -> Result<Self, SoapError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Some(path) = path {
            let data = fs::read(path)?;
            info!(config_file = %path.display(), "Loaded SOAP codec config file");
            let external: Value = serde_yaml::from_slice(&data)?;
            merge_yaml(&mut config_value, &lower_keys_value(external));
        }

        apply_overrides(&mut config_value, vars);
        Self::from_value(config_value)
    }

    /// Configuration YAML fusionnée avec les valeurs par défaut
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SoapError> {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut config_value, &lower_keys_value(external));
        Self::from_value(config_value)
    }

    pub fn to_yaml(&self) -> Result<String, SoapError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn from_value(value: Value) -> Result<Self, SoapError> {
        let config: SoapConfig = serde_yaml::from_value(value)?;
        config.format.validate()?;
        Ok(config)
    }
}

fn apply_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(path) = key.strip_prefix(ENV_PREFIX) {
            let key_path = path
                .split("__")
                .map(str::to_lowercase)
                .collect::<Vec<_>>();
            debug!(key = %key, "Applying SOAP codec config override");
            set_value(config, &key_path, convert_env_value(&value));
        }
    }
}

fn set_value(data: &mut Value, path: &[String], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        *data = value;
        return;
    };
    if !data.is_mapping() {
        *data = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = data {
        let entry = map
            .entry(Value::String(key.clone()))
            .or_insert(Value::Mapping(Mapping::new()));
        set_value(entry, rest, value);
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lower_keys_value(v))
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // scalaires et séquences : remplacement
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = SoapConfig::load_with_overrides(None, Vec::new()).unwrap();

        assert_eq!(config, SoapConfig::default());
        assert_eq!(config.format.target_prefix, "tns");
        assert_eq!(config.format.soap_prefix, "soap");
        assert!(!config.format.indent);
    }

    #[test]
    fn test_yaml_merge_keeps_defaults() {
        let config = SoapConfig::from_yaml_str(
            "Target_Namespace: http://tempuri.org/\nformat:\n  indent: true\n",
        )
        .unwrap();

        assert_eq!(config.target_namespace.as_deref(), Some("http://tempuri.org/"));
        assert!(config.format.indent);
        assert_eq!(config.format.indent_size, 2);
        assert_eq!(config.format.soap_prefix, "soap");
    }

    #[test]
    fn test_env_overrides() {
        let config = SoapConfig::load_with_overrides(
            None,
            vars(&[
                ("PMOSOAP__FORMAT__INDENT", "true"),
                ("PMOSOAP__FORMAT__INDENT_SIZE", "4"),
                ("PMOSOAP__TARGET_NAMESPACE", "urn:music"),
                ("UNRELATED__FORMAT__INDENT", "false"),
            ]),
        )
        .unwrap();

        assert!(config.format.indent);
        assert_eq!(config.format.indent_size, 4);
        assert_eq!(config.target_namespace.as_deref(), Some("urn:music"));
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format:\n  soap_prefix: s\n  target_prefix: t").unwrap();

        let config = SoapConfig::load_with_overrides(
            Some(file.path()),
            vars(&[("PMOSOAP__FORMAT__TARGET_PREFIX", "u")]),
        )
        .unwrap();

        assert_eq!(config.format.soap_prefix, "s");
        assert_eq!(config.format.target_prefix, "u");
    }

    #[test]
    fn test_invalid_prefixes() {
        let err = SoapConfig::from_yaml_str("format:\n  soap_prefix: tns\n").unwrap_err();
        assert!(matches!(err, SoapError::Config(_)));

        let err = SoapConfig::from_yaml_str("format:\n  target_prefix: xmlns\n").unwrap_err();
        assert!(matches!(err, SoapError::Config(_)));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SoapConfig {
            target_namespace: Some("http://tempuri.org/".to_string()),
            format: FormatOptions {
                indent: true,
                ..FormatOptions::default()
            },
        };

        let yaml = config.to_yaml().unwrap();
        assert_eq!(SoapConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
