mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{
    HubSettings, LoggingSettings, PartialSettings, SerialSettings, ServerSettings, Settings,
    SourceSettings,
};

/// Default configuration file, relative to the working directory, without
/// extension (`config/default.toml`, `.yaml` and so on all work).
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Loads the configuration from the default file, `.env` and environment
/// variables, merged over `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let _ = dotenvy::dotenv();
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Like [`load_config`] with an explicit file path and no `.env` lookup.
///
/// Environment variables use the `TURBINE_` prefix and `__` between nested
/// keys, e.g. `TURBINE_SERIAL__BAUD_RATE=115200` or
/// `TURBINE_SOURCE__SIMULATE=true`. The file is optional.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("TURBINE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}
