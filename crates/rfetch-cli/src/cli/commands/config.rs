//! `rfetch config` – show where the config lives and what is in effect.

use anyhow::{Context, Result};
use rfetch_core::config::{self, RfetchConfig};

pub fn run_config(cfg: &RfetchConfig) -> Result<()> {
    let path = config::config_path()?;
    let text = toml::to_string_pretty(cfg).context("serialize config")?;
    println!("# {}", path.display());
    print!("{}", text);
    Ok(())
}
