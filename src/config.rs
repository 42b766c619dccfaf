use anyhow::Result;
use config as config_crate;
use config_crate::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils;

/// DockerHub repository prefix for base images
pub const BASE_IMAGE_PREFIX: &str = "csirocass/yandabase:";
/// Image name suffixes; currently empty on both stages
pub const BASE_IMAGE_SUFFIX: &str = "";
pub const FINAL_IMAGE_SUFFIX: &str = "";

/// A machine the images are targeted at.
///
/// `generic` requires an MPI target; `galaxy` (Pawsey) ships a base
/// image with Cray MPICH already baked in and ignores any MPI target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    Generic,
    Galaxy,
}

impl Machine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Machine::Generic => "generic",
            Machine::Galaxy => "galaxy",
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown machine target: {0}")]
pub struct UnknownMachine(pub String);

impl FromStr for Machine {
    type Err = UnknownMachine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(Machine::Generic),
            "galaxy" => Ok(Machine::Galaxy),
            other => Err(UnknownMachine(other.to_string())),
        }
    }
}

/// Immutable run settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub debug: bool,
    /// Machine targets, lowercased
    pub machine_targets: Vec<String>,
    /// MPI targets for the generic machine, lowercased
    pub mpi_targets: Vec<String>,
    /// Branch checked out for the yandasoft source build
    pub git_branch: String,
    pub casacore_ver: String,
    pub cmake_ver: String,
    /// Directory recipe and batch files are written into
    pub output_dir: PathBuf,
    /// Job count passed to the `make -j` invocations inside the recipes
    pub nproc: usize,
}

/// On-disk / environment representation of [`Settings`]
#[derive(Debug, Deserialize)]
struct RawSettings {
    machine_targets: Vec<String>,
    mpi_targets: Vec<String>,
    git_branch: String,
    casacore_ver: String,
    cmake_ver: String,
    output_dir: String,
    nproc: Option<usize>,
}

impl Settings {
    /// Load settings from defaults, optional config files and
    /// `YANDAGEN_*` environment variables, in increasing priority.
    pub fn load(debug: bool) -> Result<Self> {
        let mut builder = ConfigLoader::builder()
            .set_default("machine_targets", vec!["generic".to_string()])?
            .set_default("mpi_targets", vec!["openmpi-3.1.6".to_string()])?
            .set_default("git_branch", "develop")?
            .set_default("casacore_ver", "3.3.0")?
            .set_default("cmake_ver", "3.18.4")?
            .set_default("output_dir", ".")?;

        // User config file
        if let Some(config_dir) = dirs::config_dir() {
            let user_conf = config_dir.join("yandagen").join("config");
            if let Some(path_str) = user_conf.to_str() {
                builder = builder.add_source(File::with_name(path_str).required(false));
            }
        }

        // Project config file in the working directory
        builder = builder.add_source(File::with_name("yandagen").required(false));

        // Environment variables (highest priority)
        builder = builder.add_source(Environment::with_prefix("YANDAGEN"));

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        utils::print_debug(&format!("Raw settings: {:#?}", raw));

        let output_dir = PathBuf::from(
            shellexpand::full(&raw.output_dir)
                .unwrap_or_else(|_| std::borrow::Cow::Borrowed(&raw.output_dir))
                .to_string(),
        );

        let nproc = raw.nproc.unwrap_or_else(default_nproc);
        utils::print_debug(&format!("Build job count: {}", nproc));

        Ok(Self {
            debug,
            machine_targets: lowercased(raw.machine_targets),
            mpi_targets: lowercased(raw.mpi_targets),
            git_branch: raw.git_branch,
            casacore_ver: raw.casacore_ver,
            cmake_ver: raw.cmake_ver,
            output_dir,
            nproc,
        })
    }

    /// DockerHub prefix for final images, keyed off the source branch.
    pub fn final_image_prefix(&self) -> String {
        match self.git_branch.as_str() {
            "release/1.1.0" => "csirocass/yandasoft:1.1-".to_string(),
            "master" => "csirocass/yandasoft:".to_string(),
            _ => "csirocass/yandasoft:dev-".to_string(),
        }
    }
}

fn lowercased(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.to_lowercase()).collect()
}

/// Default number of CPUs for the parallel builds inside the recipes
pub fn default_nproc() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
