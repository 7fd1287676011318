use color_eyre::{Result, eyre::Context};
use tracing::instrument;

use fswarehouse::Warehouse;

#[instrument(skip(warehouse))]
pub fn exec(warehouse: &impl Warehouse) -> Result<()> {
    let ids = warehouse.ids().context("list secret ids")?;
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
