//! Targets command - list the configured build matrix

use anyhow::Result;

use crate::config::Settings;
use crate::utils;

/// Main handler for the targets command
pub fn handle_targets(settings: &Settings) -> Result<()> {
    utils::print_message("The list of Docker targets:");
    for machine in &settings.machine_targets {
        utils::print_message(&format!("- Machine: {}", utils::style_name(machine)));
        if machine == "generic" {
            for mpi in &settings.mpi_targets {
                utils::print_message(&format!("  - MPI: {}", utils::style_name(mpi)));
            }
        }
    }
    utils::print_note("A specific machine has a preset MPI target");
    Ok(())
}
