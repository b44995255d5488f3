use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;

use crate::error::{Result, WebError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl WebConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WebError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| WebError::Config(format!("server.listen must be a valid SocketAddr: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Tags added to every meter the app registry creates.
    #[serde(default)]
    pub common_tags: BTreeMap<String, String>,

    /// Also add the app registry to the process-wide composite.
    #[serde(default = "default_publish_global")]
    pub publish_global: bool,

    /// Timer fed by the `timed` middleware.
    #[serde(default = "default_timed_metric")]
    pub timed_metric: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            common_tags: BTreeMap::new(),
            publish_global: default_publish_global(),
            timed_metric: default_timed_metric(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if self.common_tags.keys().any(|k| k.trim().is_empty()) {
            return Err(WebError::Config(
                "metrics.common_tags keys must not be empty".into(),
            ));
        }
        if self.timed_metric.trim().is_empty() {
            return Err(WebError::Config(
                "metrics.timed_metric must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_publish_global() -> bool {
    true
}
fn default_timed_metric() -> String {
    "test.timed.annotation.metric".into()
}
