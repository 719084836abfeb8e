use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Process configuration, read once from the environment at startup.
pub(crate) struct Config {
    pub(crate) bind_address: String,
    pub(crate) repos_dir: PathBuf
}

impl Config {
    pub(crate) fn from_env() -> Result<Config> {
        let bind_address = env::var("BIND_ADDRESS").context("Unable to read mandatory BIND_ADDRESS environment variable")?;

        let repos_dir = env::var("REPOS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("repos"));

        if !repos_dir.is_dir() {
            fs::create_dir_all(repos_dir.as_path()).context("Unable to create repositories directory")?;
        }

        Ok(Config {
            bind_address,
            repos_dir
        })
    }
}
