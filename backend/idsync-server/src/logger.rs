use crate::error::Result as ServerErrorResult;

use idsync_config::Config;
use idsync_logging::{LogTarget, LoggerSettings};

/// Route logs per `[logging]`: a file under the config directory, else stdout
pub fn initialize(config: &Config) -> ServerErrorResult<()> {
    let config_dir = Config::config_dir()?;
    let target = LogTarget::from_config(&config.logging, &config_dir)?;

    idsync_logging::initialize(&LoggerSettings::new(
        config.logging.level.0,
        target,
        config.logging.colored,
    ))?;

    Ok(())
}
