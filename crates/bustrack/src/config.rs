//! CLI configuration: thin wrapper around `bustrack_config` that layers
//! `GlobalOpts` flag overrides (--api-url, --timeout) on top.

use bustrack_core::{ClientConfig, SimulationParams};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use bustrack_config::{Config, config_path};

/// Load the config file and environment, then apply flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = bustrack_config::load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.api_url {
        cfg.client.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.client.timeout_secs = timeout;
    }
}

pub fn client_config(cfg: &Config) -> Result<ClientConfig, CliError> {
    Ok(cfg.client.client_config()?)
}

pub fn simulation_params(cfg: &Config) -> Result<SimulationParams, CliError> {
    Ok(cfg.simulation.params()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn global(api_url: Option<&str>, timeout: Option<u64>) -> GlobalOpts {
        GlobalOpts {
            api_url: api_url.map(Into::into),
            output: OutputFormat::Table,
            verbose: 0,
            quiet: false,
            timeout,
        }
    }

    #[test]
    fn flags_override_file_values() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &global(Some("http://bus.example:8080/api"), Some(5)));
        assert_eq!(cfg.client.api_url, "http://bus.example:8080/api");
        assert_eq!(cfg.client.timeout_secs, 5);
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &global(None, None));
        assert_eq!(cfg, Config::default());
    }
}
