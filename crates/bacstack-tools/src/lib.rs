use bacstack_client::{ClientConfig, ClientDataValue};
use bacstack_core::types::{ObjectType, PropertyId};
use clap::{Args, ValueEnum};
use log::LevelFilter;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// CLI-friendly enum for selecting BACnet object types.
///
/// Maps human-readable names to [`ObjectType`] variants for use with clap argument parsing.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ObjectTypeArg {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    Device,
    NotificationClass,
    MultiStateInput,
    MultiStateOutput,
    MultiStateValue,
}

impl ObjectTypeArg {
    /// Convert to the core [`ObjectType`] representation.
    pub const fn into_object_type(self) -> ObjectType {
        match self {
            Self::AnalogInput => ObjectType::AnalogInput,
            Self::AnalogOutput => ObjectType::AnalogOutput,
            Self::AnalogValue => ObjectType::AnalogValue,
            Self::BinaryInput => ObjectType::BinaryInput,
            Self::BinaryOutput => ObjectType::BinaryOutput,
            Self::BinaryValue => ObjectType::BinaryValue,
            Self::Device => ObjectType::Device,
            Self::NotificationClass => ObjectType::NotificationClass,
            Self::MultiStateInput => ObjectType::MultiStateInput,
            Self::MultiStateOutput => ObjectType::MultiStateOutput,
            Self::MultiStateValue => ObjectType::MultiStateValue,
        }
    }
}

/// Properties selectable by name; any other one is given with `--property-id`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PropertyArg {
    Description,
    EventState,
    ObjectList,
    ObjectName,
    PresentValue,
    StatusFlags,
    Units,
    VendorName,
}

impl PropertyArg {
    pub const fn into_property_id(self) -> PropertyId {
        match self {
            Self::Description => PropertyId::Description,
            Self::EventState => PropertyId::EventState,
            Self::ObjectList => PropertyId::ObjectList,
            Self::ObjectName => PropertyId::ObjectName,
            Self::PresentValue => PropertyId::PresentValue,
            Self::StatusFlags => PropertyId::StatusFlags,
            Self::Units => PropertyId::Units,
            Self::VendorName => PropertyId::VendorName,
        }
    }
}

/// `--property` by name, or `--property-id` by number; the number wins.
pub fn select_property(name: PropertyArg, raw: Option<u32>) -> PropertyId {
    raw.map_or_else(|| name.into_property_id(), PropertyId::from_u32)
}

/// Application types a value given on the command line can be written as.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ValueTypeArg {
    Null,
    Boolean,
    Unsigned,
    Signed,
    Real,
    Double,
    Enumerated,
    String,
}

/// Parses `text` as the given application type.
pub fn parse_value(kind: ValueTypeArg, text: &str) -> Result<ClientDataValue, String> {
    let bad = |e: &dyn std::fmt::Display| format!("invalid {kind:?} value {text:?}: {e}");
    Ok(match kind {
        ValueTypeArg::Null => ClientDataValue::Null,
        ValueTypeArg::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "active" => ClientDataValue::Boolean(true),
            "false" | "0" | "inactive" => ClientDataValue::Boolean(false),
            _ => return Err(bad(&"expected true or false")),
        },
        ValueTypeArg::Unsigned => ClientDataValue::Unsigned(text.parse().map_err(|e| bad(&e))?),
        ValueTypeArg::Signed => ClientDataValue::Signed(text.parse().map_err(|e| bad(&e))?),
        ValueTypeArg::Real => ClientDataValue::Real(text.parse().map_err(|e| bad(&e))?),
        ValueTypeArg::Double => ClientDataValue::Double(text.parse().map_err(|e| bad(&e))?),
        ValueTypeArg::Enumerated => {
            ClientDataValue::Enumerated(text.parse().map_err(|e| bad(&e))?)
        }
        ValueTypeArg::String => ClientDataValue::CharacterString(text.to_string()),
    })
}

/// Connection flags shared by every tool. Flags override values from
/// `--config`.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// JSON file holding a client configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Local UDP port.
    #[arg(long)]
    pub local_port: Option<u16>,
    /// Local interface to bind.
    #[arg(long)]
    pub interface: Option<IpAddr>,
    /// Confirmed request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// off, error, warn, info, debug or trace.
    #[arg(long)]
    pub log_level: Option<LevelFilter>,
}

impl ConfigArgs {
    /// Reads `--config` when given, then applies the flags.
    pub fn load(&self) -> Result<ClientConfig, Box<dyn std::error::Error>> {
        let base = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("reading {}: {e}", path.display()))?;
                serde_json::from_str(&text)
                    .map_err(|e| format!("parsing {}: {e}", path.display()))?
            }
            None => ClientConfig::default(),
        };
        Ok(self.apply(base))
    }

    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(port) = self.local_port {
            config = config.with_port(port);
        }
        if let Some(interface) = self.interface {
            config = config.with_interface(interface);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(level) = self.log_level {
            config = config.with_log_level(level);
        }
        config
    }
}

/// Starts `env_logger` at the configured level. `RUST_LOG` takes precedence.
pub fn init_logging(config: &ClientConfig) {
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();
}
