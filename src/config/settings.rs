use crate::core::MAX_PAYLOAD_LEN;
use crate::error::{NodeError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_BIT_SHIFT: u8 = 20;
const DEFAULT_PAYLOAD: &str = "bitshift-chain block";
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5000;

const NODE_HOST_KEY: &str = "NODE_HOST";
const NODE_BIT_SHIFT_KEY: &str = "NODE_BIT_SHIFT";
const NODE_PAYLOAD_KEY: &str = "NODE_PAYLOAD";

/// Node settings. Sources are layered defaults < file < environment < command line.
#[derive(Debug, Clone)]
pub struct Config {
    host: String,
    port: u16,
    seed_peer: Option<String>,
    bit_shift: u8,
    payload: Vec<u8>,
    write_timeout: Duration,
}

/// Optional keys accepted in a TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    seed_peer: Option<String>,
    bit_shift: Option<u8>,
    payload: Option<String>,
    write_timeout_ms: Option<u64>,
}

impl Config {
    pub fn new(port: u16) -> Config {
        Config {
            host: String::from(DEFAULT_HOST),
            port,
            seed_peer: None,
            bit_shift: DEFAULT_BIT_SHIFT,
            payload: DEFAULT_PAYLOAD.as_bytes().to_vec(),
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(port: u16, config_file: Option<&Path>) -> Result<Config> {
        let mut config = Config::new(port);
        if let Some(path) = config_file {
            config.apply_file(path)?;
        }
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| {
            NodeError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let file: FileConfig = toml::from_str(&text)?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(seed) = file.seed_peer {
            self.seed_peer = Some(seed);
        }
        if let Some(bit_shift) = file.bit_shift {
            self.bit_shift = bit_shift;
        }
        if let Some(payload) = file.payload {
            self.set_payload(payload.into_bytes())?;
        }
        if let Some(ms) = file.write_timeout_ms {
            self.write_timeout = Duration::from_millis(ms);
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(NODE_HOST_KEY) {
            self.host = host;
        }
        if let Some(value) = lookup(NODE_BIT_SHIFT_KEY) {
            self.bit_shift = value.trim().parse().map_err(|e| {
                NodeError::Config(format!("{NODE_BIT_SHIFT_KEY}={value} is not in 0..=255: {e}"))
            })?;
        }
        if let Some(payload) = lookup(NODE_PAYLOAD_KEY) {
            self.set_payload(payload.into_bytes())?;
        }
        Ok(())
    }

    pub fn set_seed_peer(&mut self, seed_peer: String) {
        self.seed_peer = Some(seed_peer);
    }

    pub fn set_bit_shift(&mut self, bit_shift: u8) {
        self.bit_shift = bit_shift;
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<()> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(NodeError::PayloadTooLarge { len: payload.len() });
        }
        self.payload = payload;
        Ok(())
    }

    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = timeout;
    }

    pub fn get_listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn get_seed_peer(&self) -> Option<&str> {
        self.seed_peer.as_deref()
    }

    pub fn get_bit_shift(&self) -> u8 {
        self.bit_shift
    }

    pub fn get_payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn get_write_timeout(&self) -> Duration {
        self.write_timeout
    }
}
