//! Server configuration, from code or from the environment.

use std::time::Duration;

use gambit_room::RoomConfig;

/// Port used when neither `GAMBIT_BIND` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Everything a [`GambitServer`](crate::GambitServer) needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Close a connection that sends nothing for this long. `None` keeps
    /// quiet connections open.
    pub idle_timeout: Option<Duration>,

    /// How long a new socket gets to finish its WebSocket upgrade.
    pub handshake_timeout: Duration,

    /// How often the reaper runs when `rooms.abandon_grace` is set.
    pub reap_interval: Duration,

    pub rooms: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            idle_timeout: None,
            handshake_timeout: Duration::from_secs(10),
            reap_interval: Duration::from_secs(30),
            rooms: RoomConfig::default(),
        }
    }
}

/// A configuration value that couldn't be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `GAMBIT_BIND` | full bind address, wins over `PORT` |
    /// | `PORT` | port on `0.0.0.0` (default 3000) |
    /// | `GAMBIT_IDLE_TIMEOUT_SECS` | idle timeout, `0` disables |
    /// | `GAMBIT_HANDSHAKE_TIMEOUT_SECS` | upgrade deadline (default 10) |
    /// | `GAMBIT_ABANDON_GRACE_SECS` | enables reaping of rooms empty this long |
    /// | `GAMBIT_REAP_INTERVAL_SECS` | reaper period (default 30) |
    /// | `GAMBIT_AUDIO_CAPACITY` | audio room size (default 2) |
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for values that don't parse or are
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = var("GAMBIT_BIND") {
            config.bind_addr = addr.trim().to_string();
        } else if let Some(port) = var("PORT") {
            let port: u16 = parse("PORT", &port, "not a port number")?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        if let Some(secs) = var("GAMBIT_IDLE_TIMEOUT_SECS") {
            let secs = seconds("GAMBIT_IDLE_TIMEOUT_SECS", &secs)?;
            config.idle_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(secs) = var("GAMBIT_HANDSHAKE_TIMEOUT_SECS") {
            let secs = seconds("GAMBIT_HANDSHAKE_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(invalid(
                    "GAMBIT_HANDSHAKE_TIMEOUT_SECS",
                    "0",
                    "must be at least 1",
                ));
            }
            config.handshake_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = var("GAMBIT_ABANDON_GRACE_SECS") {
            let secs = seconds("GAMBIT_ABANDON_GRACE_SECS", &secs)?;
            config.rooms.abandon_grace = Some(Duration::from_secs(secs));
        }

        if let Some(secs) = var("GAMBIT_REAP_INTERVAL_SECS") {
            let secs = seconds("GAMBIT_REAP_INTERVAL_SECS", &secs)?;
            if secs == 0 {
                return Err(invalid(
                    "GAMBIT_REAP_INTERVAL_SECS",
                    "0",
                    "must be at least 1",
                ));
            }
            config.reap_interval = Duration::from_secs(secs);
        }

        if let Some(capacity) = var("GAMBIT_AUDIO_CAPACITY") {
            let capacity: usize = parse("GAMBIT_AUDIO_CAPACITY", &capacity, "not a number")?;
            if capacity == 0 {
                return Err(invalid("GAMBIT_AUDIO_CAPACITY", "0", "must be at least 1"));
            }
            config.rooms.audio_capacity = capacity;
        }

        Ok(config)
    }

    /// Checks values that would make the server misbehave.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero reap interval, a zero
    /// handshake timeout or a zero audio capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handshake_timeout.is_zero() {
            return Err(invalid("handshake_timeout", "0s", "must be non-zero"));
        }
        if self.reap_interval.is_zero() {
            return Err(invalid("reap_interval", "0s", "must be non-zero"));
        }
        if self.rooms.audio_capacity == 0 {
            return Err(invalid("audio_capacity", "0", "must be at least 1"));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    value: &str,
    reason: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value, reason))
}

fn seconds(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    parse(key, value, "not a number of seconds")
}

fn invalid(key: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason,
    }
}
