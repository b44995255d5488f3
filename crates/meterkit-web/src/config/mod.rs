//! Web demo config loader (strict parsing).

pub mod schema;

use std::fs;

use crate::error::{Result, WebError};

pub use schema::{MetricsSection, ServerSection, WebConfig};

pub fn load_from_file(path: &str) -> Result<WebConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WebError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<WebConfig> {
    let cfg: WebConfig = serde_yaml::from_str(s)
        .map_err(|e| WebError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
