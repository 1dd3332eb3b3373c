//! Command-line flags and environment overrides.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{default_config_path, read_config, ConfigError};
use crate::config::schema::ServiceConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "cm2http")]
#[command(
    version,
    about = "Discover a Kubernetes ConfigMap and serve its data over HTTP",
    long_about = None
)]
pub struct Cli {
    /// Config file (default is $HOME/.cm2http.toml)
    #[arg(long, env = "CM2HTTP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name of the ConfigMap [default: kube-root-ca.crt]
    #[arg(long = "configmap-name", env = "CM2HTTP_CONFIGMAP_NAME")]
    pub configmap_name: Option<String>,

    /// Namespace where the ConfigMap is located [default: the client's namespace]
    #[arg(long = "configmap-namespace", env = "CM2HTTP_CONFIGMAP_NAMESPACE")]
    pub configmap_namespace: Option<String>,

    /// Serve only this key of the ConfigMap
    #[arg(long = "configmap-key", env = "CM2HTTP_CONFIGMAP_KEY")]
    pub configmap_key: Option<String>,

    /// Data served before the ConfigMap exists and after it is deleted, as KEY=VALUE
    #[arg(long = "default-value", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub default_values: Vec<(String, String)>,

    /// Kubeconfig file to use. Leave blank for default/in-cluster
    #[arg(long, env = "CM2HTTP_KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use. Leave blank for default
    #[arg(long, env = "CM2HTTP_CONTEXT")]
    pub context: Option<String>,

    /// Logging level: trace, debug, info, warn or error [default: info]
    #[arg(long = "log-level", env = "CM2HTTP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Address the HTTP server binds to [default: 0.0.0.0:5555]
    #[arg(long = "bind-address", env = "CM2HTTP_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Expose Prometheus metrics on this address
    #[arg(long = "metrics-address", env = "CM2HTTP_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// The config file to read: `--config` if given, else the home default if present.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }

    /// Build the effective configuration: defaults, then file, then flags.
    pub fn resolve(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match self.config_path() {
            Some(path) => read_config(&path)?,
            None => ServiceConfig::default(),
        };

        self.apply_overrides(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay every flag that was given onto `config`.
    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(name) = &self.configmap_name {
            config.target.name = name.clone();
        }
        if let Some(namespace) = &self.configmap_namespace {
            config.target.namespace = namespace.clone();
        }
        if let Some(key) = &self.configmap_key {
            config.target.key = Some(key.clone());
        }
        for (key, value) in &self.default_values {
            config.target.default_data.insert(key.clone(), value.clone());
        }
        if let Some(path) = &self.kubeconfig {
            config.kube.kubeconfig = Some(path.clone());
        }
        if let Some(context) = &self.context {
            config.kube.context = Some(context.clone());
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(addr) = &self.bind_address {
            config.listener.bind_address = addr.clone();
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.clone();
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "cm2http",
            "--configmap-name",
            "trust-bundle",
            "--configmap-namespace",
            "cert-manager",
            "--configmap-key",
            "ca.crt",
            "--default-value",
            "ca.crt=",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = ServiceConfig::default();
        config.target.namespace = "from-file".into();
        config.listener.bind_address = "127.0.0.1:8080".into();
        cli.apply_overrides(&mut config);

        assert_eq!(config.target.name, "trust-bundle");
        assert_eq!(config.target.namespace, "cert-manager");
        assert_eq!(config.target.selected_key(), Some("ca.crt"));
        assert_eq!(config.target.default_data.get("ca.crt").map(String::as_str), Some(""));
        assert_eq!(config.observability.log_level, "debug");
        // untouched by flags
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_resolve_validates_after_overrides() {
        use crate::config::validation::ValidationError;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[listener]\nbind_address = \"localhost\"\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["cm2http", "--config", path.as_str()]).unwrap();
        match cli.resolve() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::InvalidBindAddress("localhost".into())]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        // a flag can repair what the file got wrong
        let cli = Cli::try_parse_from([
            "cm2http",
            "--config",
            path.as_str(),
            "--bind-address",
            "127.0.0.1:5555",
        ])
        .unwrap();
        assert_eq!(cli.resolve().unwrap().listener.bind_address, "127.0.0.1:5555");
    }

    #[test]
    fn test_metrics_address_enables_metrics() {
        let cli = Cli::try_parse_from(["cm2http", "--metrics-address", "127.0.0.1:9102"]).unwrap();
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        assert!(config.observability.metrics_enabled);
        assert_eq!(config.observability.metrics_address, "127.0.0.1:9102");
    }

    #[test]
    fn test_default_value_requires_separator() {
        assert!(Cli::try_parse_from(["cm2http", "--default-value", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["cm2http", "--default-value", "=v"]).is_err());
        assert_eq!(parse_key_value("a=b=c"), Ok(("a".into(), "b=c".into())));
    }

    #[test]
    fn test_empty_key_flag_means_all_keys() {
        let cli = Cli::try_parse_from(["cm2http", "--configmap-key", ""]).unwrap();
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.target.selected_key(), None);
    }
}
