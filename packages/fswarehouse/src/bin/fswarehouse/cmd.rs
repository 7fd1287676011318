use std::path::PathBuf;

use color_eyre::{
    Result,
    eyre::{Context, OptionExt as _},
};
use tap::{Pipe, Tap};
use tracing::{debug, instrument};

use fswarehouse::FileWarehouse;

pub mod ids;
pub mod retrieve;
pub mod store;

/// Options selecting which warehouse to operate on.
#[derive(Clone, clap::Args, Debug)]
pub struct WarehouseOptions {
    /// Base directory holding the secrets.
    ///
    /// Defaults to a `secrets` directory inside the per-user data directory.
    #[arg(long = "dir", env = "FSWAREHOUSE_DIR", global = true)]
    pub dir: Option<PathBuf>,
}

impl WarehouseOptions {
    /// Open the warehouse in the configured directory.
    #[instrument(name = "WarehouseOptions::open")]
    pub fn open(&self) -> Result<FileWarehouse> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => user_data_path().context("find user data path")?,
        };
        FileWarehouse::new(dir)
            .tap(|warehouse| debug!(%warehouse, "open warehouse"))
            .pipe(Ok)
    }
}

/// Determine the default secrets directory for the current user.
///
/// - Linux: `$XDG_DATA_HOME/fswarehouse/secrets`
/// - macOS: `$HOME/Library/Application Support/fswarehouse/secrets`
/// - Windows: `%APPDATA%\fswarehouse\data\secrets`
///
/// If unable to find those directories, falls back to
/// `$HOME/.local/share/fswarehouse/secrets`.
#[instrument]
fn user_data_path() -> Result<PathBuf> {
    let base = match directories::ProjectDirs::from("", "", "fswarehouse") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => homedir::my_home()
            .context("get user home directory")?
            .ok_or_eyre("user has no home directory")?
            .join(".local")
            .join("share")
            .join("fswarehouse"),
    };
    base.join("secrets")
        .tap(|dir| debug!(?dir, "user data path"))
        .pipe(Ok)
}
