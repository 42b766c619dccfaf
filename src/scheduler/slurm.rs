//! Sample SLURM batch files for running the imager inside a
//! Singularity container

use anyhow::{bail, Result};

use crate::config::Machine;
use crate::mpi::{MpiKind, MpiSpec};

use super::SAMPLE_NTASKS;

/// A generated batch script plus its output filename
#[derive(Debug, Clone)]
pub struct BatchFile {
    pub filename: String,
    pub text: String,
}

/// Assemble a sample sbatch script for one (machine, MPI) target.
///
/// The runtime module and container image names are keyed off the MPI
/// implementation; an unversioned OpenMPI target has no module naming
/// scheme and is rejected.
pub fn batch_file(machine: Machine, mpi_name: &str) -> Result<BatchFile> {
    let spec = MpiSpec::parse(mpi_name)?;

    let (module, image, oversubscribe) = match (spec.kind, spec.version) {
        (MpiKind::Mpich, _) => (
            "mpich/3.3.0".to_string(),
            "yandasoft-mpich_latest.sif".to_string(),
            false,
        ),
        (MpiKind::OpenMpi, Some(ver)) => (
            format!("openmpi/{ver}-ofed45-gcc"),
            format!("yandasoft-{ver}_latest.sif"),
            true,
        ),
        (MpiKind::OpenMpi, None) => {
            bail!("OpenMPI version must be specified for batch file: {mpi_name}")
        }
    };

    let mut text = String::new();
    text.push_str("#!/bin/bash -l\n");
    text.push_str(concat!(
        "## This file is automatically created by ",
        env!("CARGO_PKG_NAME"),
        "\n"
    ));
    text.push_str(&format!("#SBATCH --ntasks={SAMPLE_NTASKS}\n"));
    text.push_str("#SBATCH --time=02:00:00\n");
    text.push_str("#SBATCH --job-name=cimager\n");
    text.push_str("#SBATCH --export=NONE\n\n");
    text.push_str("module load singularity/3.5.0\n");
    text.push_str(&format!("module load {module}\n\n"));
    let flags = if oversubscribe { " -oversubscribe" } else { "" };
    text.push_str(&format!(
        "mpirun -n {SAMPLE_NTASKS}{flags} singularity exec {image} cimager -c dirty.in > dirty_${{SLURM_JOB_ID}}.log\n"
    ));

    Ok(BatchFile {
        filename: format!("sample-{machine}-{mpi_name}.sbatch"),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_machine_and_raw_identifier() {
        let batch = batch_file(Machine::Generic, "openmpi-3.1.6").unwrap();
        assert_eq!(batch.filename, "sample-generic-openmpi-3.1.6.sbatch");
    }

    #[test]
    fn mpich_uses_fixed_module_and_image() {
        let batch = batch_file(Machine::Generic, "mpich").unwrap();
        assert!(batch.text.contains("module load mpich/3.3.0\n"));
        assert!(batch.text.contains("singularity exec yandasoft-mpich_latest.sif"));
        assert!(!batch.text.contains("-oversubscribe"));
    }

    #[test]
    fn openmpi_interpolates_the_version() {
        let batch = batch_file(Machine::Generic, "openmpi-3.1.6").unwrap();
        assert!(batch.text.contains("module load openmpi/3.1.6-ofed45-gcc\n"));
        assert!(batch
            .text
            .contains("mpirun -n 5 -oversubscribe singularity exec yandasoft-3.1.6_latest.sif"));
    }

    #[test]
    fn unversioned_openmpi_is_rejected() {
        assert!(batch_file(Machine::Generic, "openmpi").is_err());
    }

    #[test]
    fn script_header_is_fixed() {
        let batch = batch_file(Machine::Generic, "mpich").unwrap();
        let mut lines = batch.text.lines();
        assert_eq!(lines.next(), Some("#!/bin/bash -l"));
        assert!(lines.next().unwrap().starts_with("## This file is automatically created by"));
        assert_eq!(lines.next(), Some("#SBATCH --ntasks=5"));
        assert!(batch.text.contains("#SBATCH --export=NONE"));
    }
}
