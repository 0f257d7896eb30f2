use bacstack_datalink::DataLinkAddress;
use log::LevelFilter;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Settings for a [`BacnetClient`](crate::BacnetClient).
///
/// With the `serde` feature the config loads from JSON; `timeout` is written
/// as milliseconds:
///
/// ```json
/// { "port": 47808, "interface": "0.0.0.0", "timeout": 3000, "log_level": "INFO" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    pub port: u16,
    pub interface: IpAddr,
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub timeout: Duration,
    pub log_level: LevelFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DataLinkAddress::BACNET_IP_DEFAULT_PORT,
            interface: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            timeout: Duration::from_millis(3000),
            log_level: LevelFilter::Info,
        }
    }
}

impl ClientConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_interface(mut self, interface: IpAddr) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
        self.log_level = log_level;
        self
    }

    /// Local socket address the transport binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.port)
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
