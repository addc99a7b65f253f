use serde_json::{json, Value};

use crate::config;

/// Kinds of external resources a team account can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Chat,
    Tracker,
    Repo,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chat" => Some(ProviderKind::Chat),
            "tracker" => Some(ProviderKind::Tracker),
            "repo" => Some(ProviderKind::Repo),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Chat => "chat",
            ProviderKind::Tracker => "tracker",
            ProviderKind::Repo => "repo",
        }
    }
}

/// Everything this backend depends on from a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub ok: bool,
    pub detail: Option<String>,
}

/// Outbound provisioning clients for chat/tracker/repo accounts. Each call
/// builds its request from scratch; no request state is shared across
/// invocations.
pub struct ProviderRegistry {
    client: reqwest::Client,
}

impl ProviderRegistry {
    pub fn from_config() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(kind: ProviderKind) -> Option<String> {
        let cfg = &config::config().integrations;
        match kind {
            ProviderKind::Chat => cfg.chat_url.clone(),
            ProviderKind::Tracker => cfg.tracker_url.clone(),
            ProviderKind::Repo => cfg.repo_url.clone(),
        }
    }

    /// Ask the provider to create the external resource. An unconfigured
    /// provider is a no-op success so environments without integrations
    /// still work.
    pub async fn create(&self, kind: ProviderKind, name: &str, options: &Value) -> ProviderResult {
        let Some(url) = Self::endpoint(kind) else {
            tracing::debug!("no {} provider configured, skipping provisioning", kind.as_str());
            return ProviderResult { ok: true, detail: None };
        };

        let payload = json!({ "name": name, "options": options });
        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => ProviderResult { ok: true, detail: None },
            Ok(response) => {
                tracing::warn!(
                    "{} provider rejected '{}': {}",
                    kind.as_str(),
                    name,
                    response.status()
                );
                ProviderResult {
                    ok: false,
                    detail: Some(format!("provider returned {}", response.status())),
                }
            }
            Err(e) => {
                tracing::error!("{} provider unreachable: {}", kind.as_str(), e);
                ProviderResult {
                    ok: false,
                    detail: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_round_trips() {
        for kind in [ProviderKind::Chat, ProviderKind::Tracker, ProviderKind::Repo] {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("wiki"), None);
    }

    #[tokio::test]
    async fn unconfigured_provider_is_a_noop_success() {
        let registry = ProviderRegistry::from_config();
        let result = registry.create(ProviderKind::Chat, "ops-room", &json!({})).await;
        assert!(result.ok);
        assert!(result.detail.is_none());
    }
}
