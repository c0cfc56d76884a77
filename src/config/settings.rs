use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionSettings {
    /// Seconds a stored session lives on this machine, independent of the token's own `exp`
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputSettings {
    pub dir: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ttl_secs() -> i64 {
    3600
}
