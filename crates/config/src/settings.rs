use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub socket: SocketSettings,
    pub shell: ShellSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SocketSettings {
    pub url: String,
    pub reconnect_base_ms: u64,
    pub reconnect_max_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShellSettings {
    pub sidebar_open: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("CAMPAIGNER"),
            )
            .set_default("api.base_url", "http://localhost:5000/api")?
            .set_default("api.request_timeout_secs", 30)?
            .set_default("socket.url", "ws://localhost:5000/ws")?
            .set_default("socket.reconnect_base_ms", 1000)?
            .set_default("socket.reconnect_max_ms", 30000)?
            .set_default("shell.sidebar_open", true)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
