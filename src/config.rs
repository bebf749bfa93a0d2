//! Server configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `FUNCTIONS_CUSTOMHANDLER_PORT` | `3000` | port the host forwards invocations to |
//! | `TANDEM_HOST` | `0.0.0.0` | interface to bind |
//! | `TANDEM_FUNCTION_NAME` | `default` | function name reported on each invocation |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{Error, Result};

pub const PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const HOST_VAR: &str = "TANDEM_HOST";
pub const FUNCTION_NAME_VAR: &str = "TANDEM_FUNCTION_NAME";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FUNCTION_NAME: &str = "default";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub function_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            function_name: DEFAULT_FUNCTION_NAME.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(port) = lookup(PORT_VAR) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("{PORT_VAR}={port:?}: {e}")))?;
            config.addr.set_port(port);
        }
        if let Some(host) = lookup(HOST_VAR) {
            let ip = host
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| Error::Config(format!("{HOST_VAR}={host:?}: {e}")))?;
            config.addr.set_ip(ip);
        }
        if let Some(name) = lookup(FUNCTION_NAME_VAR).filter(|n| !n.is_empty()) {
            config.function_name = name;
        }
        Ok(config)
    }
}
