//! Server settings read from the environment.
//!
//! Every setting has a default so the server starts without any
//! configuration. `RUST_LOG` is read by `env_logger` directly.

use log::warn;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Env: `FILMORATE_ADDR`, default `127.0.0.1:8080`.
    pub http_addr: SocketAddr,

    /// Env: `FILMORATE_WORKERS`, default: one per CPU core.
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            http_addr: ([127, 0, 0, 1], 8080).into(),
            workers: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Self {
        let mut config = Self::default();

        if let Some(addr) = var("FILMORATE_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => warn!("invalid FILMORATE_ADDR {:?}, using default", addr),
            }
        }

        if let Some(workers) = var("FILMORATE_WORKERS") {
            match workers.parse::<usize>() {
                Ok(n) if n > 0 => config.workers = Some(n),
                _ => warn!("invalid FILMORATE_WORKERS {:?}, using default", workers),
            }
        }

        config
    }
}
