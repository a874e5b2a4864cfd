use serde::{Deserialize, Serialize};

/// Broker connection settings, persisted as part of the dashboard
/// config file. Credentials are the shared broker account; the operator
/// username only shapes the topic namespace, not authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Organisation segment of the topic base (`student/<org>/<user>`).
    pub org: String,
    pub keep_alive_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        MqttConfig {
            host: "localhost".to_string(),
            port: 1883,
            user: String::new(),
            password: String::new(),
            org: "CASA0014".to_string(),
            keep_alive_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}
