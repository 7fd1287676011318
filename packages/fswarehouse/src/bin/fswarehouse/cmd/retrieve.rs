use std::{io::Write as _, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing::instrument;

use fswarehouse::Warehouse;

#[derive(Clone, clap::Args, Debug)]
pub struct Options {
    /// ID of the secret, such as `team/db-password`.
    pub id: String,

    /// Write the secret to this file instead of stdout.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[instrument(skip(warehouse))]
pub fn exec(warehouse: &impl Warehouse, options: Options) -> Result<()> {
    let data = warehouse
        .retrieve(&options.id)
        .with_context(|| format!("retrieve secret {:?}", options.id))?;

    match &options.file {
        Some(file) => std::fs::write(file, &data).with_context(|| format!("write {file:?}")),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data).context("write secret to stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}
