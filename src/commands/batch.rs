//! Batch command - write sample SLURM submission scripts

use anyhow::{Context, Result};
use std::fs;

use crate::config::{Machine, Settings};
use crate::scheduler::slurm;
use crate::utils;

/// Main handler for the batch command
pub fn handle_batch(settings: &Settings) -> Result<()> {
    for machine_name in &settings.machine_targets {
        let machine: Machine = machine_name.parse()?;
        if machine != Machine::Generic {
            // No runtime module naming scheme exists for named clusters.
            utils::print_note(&format!("Skipping batch file for machine: {machine}"));
            continue;
        }
        for mpi_name in &settings.mpi_targets {
            let batch = slurm::batch_file(machine, mpi_name)?;
            let path = settings.output_dir.join(&batch.filename);
            fs::write(&path, &batch.text)
                .with_context(|| format!("Failed to write batch file {}", path.display()))?;
            utils::print_message(&format!(
                "Wrote batch file {}",
                utils::style_path(&path.display().to_string())
            ));
        }
    }
    Ok(())
}
