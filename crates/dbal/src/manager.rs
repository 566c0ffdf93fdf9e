//! Named connection registry and its configuration.

use crate::connection::Connection;
use crate::driver::{self, DriverConfig};
use crate::error::{DbalError, DbalResult};
use crate::types::{self, TypeAdapter};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Once};

/// Settings for one named connection.
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionParams {
    /// Driver selection and settings.
    pub driver: DriverConfig,
    /// Bind values through generated `:name` placeholders instead of `?`.
    #[serde(default)]
    pub use_named_parameters: bool,
    /// Emit a tracing event for every executed statement.
    #[serde(default)]
    pub log_sql: bool,
}

/// Manager configuration: the connection map and the default name.
#[derive(Clone, Debug, Deserialize)]
pub struct ManagerConfig {
    #[serde(default = "default_connection_name")]
    pub default_connection: String,
    #[serde(default)]
    pub connections: HashMap<String, ConnectionParams>,
}

fn default_connection_name() -> String {
    "default".to_string()
}

impl ManagerConfig {
    /// Parse a TOML configuration document.
    ///
    /// ```toml
    /// default_connection = "main"
    ///
    /// [connections.main]
    /// use_named_parameters = false
    /// log_sql = true
    ///
    /// [connections.main.driver]
    /// driver = "sqlite"
    /// path = "app.db"
    /// ```
    pub fn from_toml(input: &str) -> DbalResult<Self> {
        toml::from_str(input).map_err(|err| DbalError::Config(err.to_string()))
    }
}

/// Custom type adapters to install into the process-wide registry.
///
/// Adapters are code, not data, so registrations are assembled
/// programmatically rather than deserialized with the rest of the
/// configuration.
#[derive(Clone, Default)]
pub struct TypeRegistrations {
    /// New types; registering an already-known name is an error.
    pub add: Vec<(String, Arc<dyn TypeAdapter>)>,
    /// Replacements; overriding an unknown name is an error.
    pub overrides: Vec<(String, Arc<dyn TypeAdapter>)>,
}

static TYPES_LOADED: Once = Once::new();

/// Registry of named connections, built lazily from configuration.
///
/// The manager is single-threaded by construction; wrap it in a mutex to
/// share it across threads. Without that, concurrent first access to the
/// same name may open the underlying database more than once —
/// serializing access is the host's responsibility, not this layer's.
pub struct ConnectionManager {
    default_connection: String,
    connection_params: HashMap<String, ConnectionParams>,
    connections: HashMap<String, Connection>,
}

impl ConnectionManager {
    /// Build a manager from configuration, applying the type
    /// registrations at most once per process no matter how many
    /// managers are constructed.
    pub fn new(types: TypeRegistrations, config: ManagerConfig) -> DbalResult<Self> {
        let mut load_result = Ok(());
        TYPES_LOADED.call_once(|| {
            load_result = load_types(&types);
        });
        load_result?;

        Ok(Self {
            default_connection: config.default_connection,
            connection_params: config.connections,
            connections: HashMap::new(),
        })
    }

    /// The connection registered under `name`, opened on first access
    /// and cached after that. `None` selects the configured default.
    pub fn get_connection(&mut self, name: Option<&str>) -> DbalResult<&mut Connection> {
        let name = name.unwrap_or(&self.default_connection).to_string();
        if !self.connections.contains_key(&name) {
            let connection = self.make_connection(&name)?;
            self.connections.insert(name.clone(), connection);
        }
        Ok(self.connections.get_mut(&name).expect("inserted above"))
    }

    /// Drop one cached connection, or all of them when `name` is `None`.
    ///
    /// The underlying driver handle closes when the evicted connection
    /// drops; releasing it is the driver's concern.
    pub fn reset_connection(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.connections.remove(name);
            }
            None => self.connections.clear(),
        }
    }

    fn make_connection(&self, name: &str) -> DbalResult<Connection> {
        let params = self
            .connection_params
            .get(name)
            .ok_or_else(|| DbalError::UnknownConnection(name.to_string()))?;
        let driver = driver::connect(&params.driver)?;
        Ok(Connection::new(driver, params.use_named_parameters).with_sql_logging(params.log_sql))
    }
}

fn load_types(registrations: &TypeRegistrations) -> DbalResult<()> {
    for (name, adapter) in &registrations.add {
        types::add_type(name.clone(), adapter.clone())?;
    }
    for (name, adapter) in &registrations.overrides {
        types::override_type(name.clone(), adapter.clone())?;
    }
    Ok(())
}
