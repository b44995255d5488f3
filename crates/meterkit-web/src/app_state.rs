//! Shared application state for the meterkit web demo.
//!
//! Owns the registry the handlers record into. Startup errors are returned,
//! not panicked on.

use std::sync::Arc;

use meterkit_core::{global, MeterId, MeterRegistry};

use crate::config::WebConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: WebConfig,
    registry: Arc<MeterRegistry>,
    timed_id: MeterId,
}

impl AppState {
    /// Build application state.
    pub fn new(cfg: WebConfig) -> Result<Self> {
        cfg.validate()?;

        let registry = Arc::new(MeterRegistry::with_common_tags(
            cfg.metrics
                .common_tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        ));

        if cfg.metrics.publish_global && global::add(Arc::clone(&registry)) {
            tracing::info!(
                members = global::registry().len(),
                "app registry published to global registry"
            );
        }

        let timed_id = MeterId::new(cfg.metrics.timed_metric.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                timed_id,
            }),
        })
    }

    pub fn cfg(&self) -> &WebConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<MeterRegistry> {
        Arc::clone(&self.inner.registry)
    }

    /// Base identity for the `timed` middleware's timer.
    pub fn timed_id(&self) -> &MeterId {
        &self.inner.timed_id
    }
}
