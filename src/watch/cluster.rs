//! Kubernetes client construction and the ConfigMap watch.
//!
//! # Responsibilities
//! - Build a client from an explicit kubeconfig, a named context, or inference
//!   (in-cluster service account / `$KUBECONFIG`)
//! - Resolve the namespace when none is configured
//! - Watch one ConfigMap by `metadata.name` field selector

use async_trait::async_trait;
use futures_util::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, WatchParams};
use kube::config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use thiserror::Error;

use crate::config::schema::{KubeConfig, TargetConfig};
use crate::watch::event::{RecordEvent, TargetRef};
use crate::watch::source::{ConfigSource, EventStream, SourceError};

/// Leave resourceVersion unset: each watch, reconnects included, starts with
/// a consistent read of the latest object, replayed as an Added event.
const WATCH_FROM_LATEST: &str = "";

/// Errors building the Kubernetes client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unable to load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("unable to infer cluster configuration: {0}")]
    Infer(#[from] InferConfigError),

    #[error("unable to build kubernetes client: {0}")]
    Build(#[from] kube::Error),
}

/// Create a client according to the `[kube]` settings.
pub async fn create_client(settings: &KubeConfig) -> Result<Client, ClientError> {
    let options = KubeConfigOptions {
        context: settings.context.clone().filter(|c| !c.is_empty()),
        ..Default::default()
    };

    let config = match settings.kubeconfig.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => {
            tracing::debug!(path = %path, context = ?options.context, "Loading kubeconfig file");
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        None if options.context.is_some() => {
            tracing::debug!(context = ?options.context, "Loading default kubeconfig");
            Config::from_kubeconfig(&options).await?
        }
        None => Config::infer().await?,
    };

    tracing::info!(
        cluster_url = %config.cluster_url,
        default_namespace = %config.default_namespace,
        "Kubernetes client configured"
    );

    Ok(Client::try_from(config)?)
}

/// The configured target, falling back to the client's namespace.
pub fn resolve_target(target: &TargetConfig, default_namespace: &str) -> TargetRef {
    let namespace = if target.namespace.is_empty() {
        default_namespace.to_string()
    } else {
        target.namespace.clone()
    };
    TargetRef::new(namespace, target.name.clone())
}

/// Watches one ConfigMap through the Kubernetes API.
#[derive(Clone)]
pub struct KubeSource {
    api: Api<ConfigMap>,
    target: TargetRef,
    timeout_secs: u32,
}

impl KubeSource {
    pub fn new(client: Client, target: TargetRef, timeout_secs: u32) -> Self {
        let api = Api::namespaced(client, &target.namespace);
        Self {
            api,
            target,
            timeout_secs,
        }
    }
}

fn watch_params(target: &TargetRef, timeout_secs: u32) -> WatchParams {
    WatchParams::default()
        .fields(&format!("metadata.name={}", target.name))
        .timeout(timeout_secs)
}

#[async_trait]
impl ConfigSource for KubeSource {
    fn target(&self) -> &TargetRef {
        &self.target
    }

    async fn subscribe(&self) -> Result<EventStream, SourceError> {
        let events = self
            .api
            .watch(&watch_params(&self.target, self.timeout_secs), WATCH_FROM_LATEST)
            .await
            .map_err(SourceError::subscribe)?;

        let target = self.target.clone();
        Ok(events
            .map(move |item| match item {
                Ok(event) => Ok(RecordEvent::from_watch(event, &target)),
                Err(err) => Err(SourceError::stream(err)),
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetRef {
        TargetRef::new("kube-system", "kube-root-ca.crt")
    }

    #[test]
    fn test_watch_params_select_one_object() {
        let params = watch_params(&target(), 290);
        assert_eq!(params.field_selector.as_deref(), Some("metadata.name=kube-root-ca.crt"));
        assert_eq!(params.timeout, Some(290));
    }

    #[test]
    fn test_watch_request_starts_from_latest() {
        let request = kube::core::Request::new("/api/v1/namespaces/kube-system/configmaps")
            .watch(&watch_params(&target(), 60), WATCH_FROM_LATEST)
            .unwrap();
        let query = request.uri().query().unwrap_or_default().to_string();

        assert!(query.contains("watch=true"), "{}", query);
        assert!(query.contains("timeoutSeconds=60"), "{}", query);
        assert!(query.contains("fieldSelector=metadata.name%3Dkube-root-ca.crt"), "{}", query);
        // an unset version reads the latest state, "0" may be served from a lagging cache
        assert!(!query.contains("resourceVersion=0"), "{}", query);
    }

    #[test]
    fn test_empty_namespace_uses_client_default() {
        let mut config = TargetConfig::default();
        assert_eq!(resolve_target(&config, "team-a"), TargetRef::new("team-a", "kube-root-ca.crt"));

        config.namespace = "kube-system".into();
        config.name = "trust-bundle".into();
        assert_eq!(
            resolve_target(&config, "team-a"),
            TargetRef::new("kube-system", "trust-bundle")
        );
    }
}
