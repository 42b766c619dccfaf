//! Docker build targets
//!
//! A [`DockerTarget`] pairs a recipe file with the image it produces.
//! Fields are validated as they are set and a target only exists once
//! recipe name, recipe text and image name are all present, so an
//! incomplete target cannot be persisted or built.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::utils;

/// Error types for target construction and persistence
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("Illegal recipe name: {0}")]
    IllegalRecipeName(String),

    #[error("Illegal image name: {0}")]
    IllegalImageName(String),

    #[error("Recipe is empty string")]
    EmptyRecipe,

    #[error("Docker recipe file name has not been set")]
    MissingRecipeName,

    #[error("Docker recipe content has not been set")]
    MissingRecipe,

    #[error("Docker image name has not been set")]
    MissingImageName,

    #[error("Docker recipe file does not exist: {0}")]
    RecipeFileMissing(String),
}

/// Builder for [`DockerTarget`]; setters may run in any order.
#[derive(Debug, Default)]
pub struct DockerTargetBuilder {
    recipe_name: Option<String>,
    recipe: Option<String>,
    image_name: Option<String>,
}

impl DockerTargetBuilder {
    pub fn recipe_name(mut self, name: impl Into<String>) -> Result<Self, TargetError> {
        let name = name.into();
        if !utils::is_proper_name(&name) {
            return Err(TargetError::IllegalRecipeName(name));
        }
        self.recipe_name = Some(name);
        Ok(self)
    }

    pub fn recipe(mut self, text: impl Into<String>) -> Result<Self, TargetError> {
        let text = text.into();
        if text.is_empty() {
            return Err(TargetError::EmptyRecipe);
        }
        self.recipe = Some(text);
        Ok(self)
    }

    pub fn image_name(mut self, name: impl Into<String>) -> Result<Self, TargetError> {
        let name = name.into();
        if !utils::is_proper_name(&name) {
            return Err(TargetError::IllegalImageName(name));
        }
        self.image_name = Some(name);
        Ok(self)
    }

    pub fn finalize(self) -> Result<DockerTarget, TargetError> {
        let recipe_name = self.recipe_name.ok_or(TargetError::MissingRecipeName)?;
        let recipe = self.recipe.ok_or(TargetError::MissingRecipe)?;
        let image_name = self.image_name.ok_or(TargetError::MissingImageName)?;
        Ok(DockerTarget { recipe_name, recipe, image_name })
    }
}

/// A fully specified build target: recipe filename, recipe text and
/// image name.
#[derive(Debug, Clone)]
pub struct DockerTarget {
    recipe_name: String,
    recipe: String,
    image_name: String,
}

impl DockerTarget {
    pub fn builder() -> DockerTargetBuilder {
        DockerTargetBuilder::default()
    }

    pub fn recipe_name(&self) -> &str {
        &self.recipe_name
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn recipe(&self) -> &str {
        &self.recipe
    }

    /// Write the recipe text verbatim into `dir`, named after the
    /// recipe name.
    pub fn write_recipe(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.recipe_name);
        fs::write(&path, &self.recipe)
            .with_context(|| format!("Failed to write recipe {}", path.display()))?;
        Ok(path)
    }

    /// The equivalent command line for building this target.
    pub fn build_command(&self) -> String {
        format!(
            "docker build --no-cache --pull -t {} -f {} .",
            self.image_name, self.recipe_name
        )
    }

    /// Run `docker build` for this target, synchronously, with the
    /// build cache disabled and a fresh base-layer pull. The recipe
    /// file must already exist in `dir`. A failed build is reported but
    /// not propagated.
    pub fn build_image(&self, dir: &Path) -> Result<()> {
        let recipe_path = dir.join(&self.recipe_name);
        if !recipe_path.is_file() {
            return Err(
                TargetError::RecipeFileMissing(recipe_path.display().to_string()).into()
            );
        }
        let docker_bin = which::which("docker").context("docker executable not found in PATH")?;

        utils::print_debug(&format!("Running: {}", self.build_command()));
        let status = Command::new(docker_bin)
            .args([
                "build",
                "--no-cache",
                "--pull",
                "-t",
                &self.image_name,
                "-f",
                &self.recipe_name,
                ".",
            ])
            .current_dir(dir)
            .status()
            .with_context(|| format!("Failed to run docker build for {}", self.image_name))?;
        if !status.success() {
            utils::print_warning(&format!(
                "docker build exited with {} for {}",
                status,
                utils::style_name(&self.image_name)
            ));
        }
        Ok(())
    }
}
