use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use printdesk_core::{Notification, PushSubscription};

use crate::error::PushError;
use crate::gateway::PushGateway;
use crate::vapid::VapidConfig;

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_ttl() -> u32 {
    24 * 60 * 60
}

/// Configuration for [`HttpPushGateway`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpPushConfig {
    /// Bound on each delivery attempt. A hung endpoint fails with
    /// [`PushError::Timeout`] instead of stalling the caller.
    #[serde(default = "default_timeout", with = "humantime_serde_secs")]
    pub timeout: Duration,

    /// `TTL` header: how long the push service may hold an undelivered
    /// message, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u32,

    /// VAPID signing material. When absent, requests carry no
    /// `Authorization` header (local relays, test rigs).
    #[serde(default)]
    pub vapid: Option<VapidConfig>,
}

impl Default for HttpPushConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            ttl_seconds: default_ttl(),
            vapid: None,
        }
    }
}

/// Serialize the timeout as plain seconds in config files.
mod humantime_serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// Wire payload handed to the push service: the notification body plus the
/// subscription's key material, which the relay in front of the browser
/// push service uses to encrypt the message to this target.
#[derive(Serialize)]
struct PushRequest<'a> {
    #[serde(flatten)]
    notification: &'a Notification,
    keys: Keys<'a>,
}

#[derive(Serialize)]
struct Keys<'a> {
    p256dh: &'a str,
    auth: &'a str,
}

/// HTTP implementation of [`PushGateway`].
///
/// POSTs the JSON payload to the subscription endpoint with `TTL` and
/// `Urgency` headers and, when configured, a VAPID `Authorization`
/// header. Response mapping: 2xx success, 404/410 → [`PushError::Gone`],
/// 429 → [`PushError::RateLimited`], 401/403 → [`PushError::Auth`],
/// anything else → [`PushError::Http`].
pub struct HttpPushGateway {
    config: HttpPushConfig,
    client: Client,
}

impl HttpPushGateway {
    pub fn new(config: HttpPushConfig) -> Result<Self, PushError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PushError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Build a gateway over an existing client, e.g. to share a
    /// connection pool. The client's own timeout still applies.
    #[must_use]
    pub fn with_client(config: HttpPushConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    #[instrument(skip_all, fields(endpoint = %subscription.endpoint))]
    async fn send(
        &self,
        subscription: &PushSubscription,
        notification: &Notification,
    ) -> Result<(), PushError> {
        let body = PushRequest {
            notification,
            keys: Keys {
                p256dh: &subscription.keys.p256dh,
                auth: &subscription.keys.auth,
            },
        };

        let mut request = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", self.config.ttl_seconds)
            .header("Urgency", "normal")
            .json(&body);

        if let Some(vapid) = &self.config.vapid {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                vapid.authorization_for(&subscription.endpoint)?,
            );
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PushError::Timeout(self.config.timeout)
            } else {
                PushError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), "push gateway responded");

        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(PushError::Gone),
            StatusCode::TOO_MANY_REQUESTS => Err(PushError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PushError::Auth(format!("status {}", status.as_u16())))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(PushError::Http(format!("status {}: {body}", s.as_u16())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = HttpPushConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.ttl_seconds, 86_400);
        assert!(config.vapid.is_none());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config: HttpPushConfig = toml::from_str("timeout = 3\nttl_seconds = 60").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.ttl_seconds, 60);
    }

    #[test]
    fn request_payload_shape() {
        let notification = Notification::new("T", "B");
        let body = PushRequest {
            notification: &notification,
            keys: Keys {
                p256dh: "pk",
                auth: "ak",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "T",
                "body": "B",
                "url": "/dashboard",
                "keys": {"p256dh": "pk", "auth": "ak"}
            })
        );
    }
}
