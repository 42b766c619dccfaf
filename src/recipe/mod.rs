//! Dockerfile assembly for base and final images

pub mod yandabase;
pub mod yandasoft;

use crate::config::Machine;

/// First line of every generated file
pub const GENERATED_HEADER: &str = concat!(
    "# This file is automatically created by ",
    env!("CARGO_PKG_NAME"),
    "\n"
);

/// MPI wrapper for g++
pub const CMAKE_CXX_COMPILER: &str = "-DCMAKE_CXX_COMPILER=mpicxx";

/// Install prefix for MPI libraries built from source
pub const MPI_DIR: &str = "/usr/local";

/// Compile flags downstream cmake invocations need to find MPI
pub const MPI_COMPILE_FLAGS: &str = "-I/usr/local/include -pthread";

/// Error types for recipe assembly
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("OpenMPI version must be specified")]
    OpenMpiVersionRequired,

    #[error("MPI target is required for machine: {0}")]
    MpiTargetRequired(Machine),
}

/// Output of recipe assembly: the recipe text plus its derived names
#[derive(Debug, Clone)]
pub struct BuiltRecipe {
    pub recipe_name: String,
    pub image_name: String,
    pub text: String,
}
