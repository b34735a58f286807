// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latch config` - Show the effective configuration

use anyhow::Result;
use clap::Args;
use latch_core::LatchConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Print the path of the default config file instead
    #[arg(long)]
    pub path: bool,
}

pub fn show(args: ConfigArgs, config: &LatchConfig) -> Result<()> {
    if args.path {
        match crate::settings::default_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("no user config directory on this platform"),
        }
        return Ok(());
    }
    print!("{}", config.to_toml_string()?);
    Ok(())
}
