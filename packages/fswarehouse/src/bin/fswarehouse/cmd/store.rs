use std::{io::Read as _, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing::{info, instrument};

use fswarehouse::Warehouse;

#[derive(Clone, clap::Args, Debug)]
pub struct Options {
    /// ID of the secret, such as `team/db-password`.
    pub id: String,

    /// Read the secret from this file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[instrument(skip(warehouse))]
pub fn exec(warehouse: &impl Warehouse, options: Options) -> Result<()> {
    let data = match &options.file {
        Some(file) => std::fs::read(file).with_context(|| format!("read {file:?}"))?,
        None => {
            let mut data = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .context("read secret from stdin")?;
            data
        }
    };

    warehouse
        .store(&options.id, &data)
        .with_context(|| format!("store secret {:?}", options.id))?;
    info!(id = %options.id, bytes = data.len(), "stored secret");
    Ok(())
}
