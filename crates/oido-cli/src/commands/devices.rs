//! Output device listing.

use anyhow::Result;
use clap::Args;
use oido_io::{CpalBackend, OutputBackend};

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> Result<()> {
    let backend = CpalBackend::new();

    let default = backend.default_output_device()?;
    let default_name = default.as_ref().map(|d| d.name.clone());

    let devices = backend.list_output_devices()?;
    if devices.is_empty() {
        println!("no output devices found");
        return Ok(());
    }

    for (index, device) in devices.iter().enumerate() {
        let marker = if Some(&device.name) == default_name.as_ref() {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} [{index}] {} ({} Hz)",
            device.name, device.default_sample_rate
        );
    }
    Ok(())
}
