//! Make command - generate Dockerfiles and optionally build the images

use anyhow::Result;
use clap::Parser;

use crate::config::{Machine, Settings, BASE_IMAGE_PREFIX, BASE_IMAGE_SUFFIX, FINAL_IMAGE_SUFFIX};
use crate::docker::DockerTarget;
use crate::mpi::MpiSpec;
use crate::recipe::{self, BuiltRecipe};
use crate::utils;

#[derive(Debug, Parser)]
pub struct MakeArgs {
    /// Actually build the base images
    #[arg(short = 'b', long)]
    pub base_image: bool,

    /// Actually build the final images
    #[arg(short = 'f', long)]
    pub final_image: bool,
}

/// Main handler for the make command
pub fn handle_make(args: &MakeArgs, settings: &Settings) -> Result<()> {
    utils::print_debug(&format!("Make args: {:?}", args));

    if args.base_image {
        utils::print_message("Making base images ...");
    } else {
        utils::print_message("Base image will not be made");
    }
    if args.final_image {
        utils::print_message("Making final images ...");
    } else {
        utils::print_message("Final image will not be made");
    }

    for machine_name in &settings.machine_targets {
        let machine: Machine = machine_name.parse()?;
        match machine {
            Machine::Generic => {
                for mpi_name in &settings.mpi_targets {
                    let spec: MpiSpec = mpi_name.parse()?;
                    process_target(machine, Some(&spec), args, settings)?;
                }
            }
            // Named machines carry a preset MPI configuration
            _ => process_target(machine, None, args, settings)?,
        }
    }

    utils::print_success("All targets processed");
    Ok(())
}

/// Build base then final image for one target, wiring the base image
/// name into the final recipe.
fn process_target(
    machine: Machine,
    mpi: Option<&MpiSpec>,
    args: &MakeArgs,
    settings: &Settings,
) -> Result<()> {
    let base = realize(
        recipe::yandabase::assemble(machine, mpi, BASE_IMAGE_PREFIX, BASE_IMAGE_SUFFIX, settings)?,
        args.base_image,
        "base",
        settings,
    )?;
    realize(
        recipe::yandasoft::assemble(
            machine,
            mpi,
            &settings.final_image_prefix(),
            FINAL_IMAGE_SUFFIX,
            base.image_name(),
            settings,
        )?,
        args.final_image,
        "final",
        settings,
    )?;
    Ok(())
}

/// Persist one recipe, then either run the docker build or echo the
/// equivalent command.
fn realize(
    built: BuiltRecipe,
    build: bool,
    stage: &str,
    settings: &Settings,
) -> Result<DockerTarget> {
    let target = DockerTarget::builder()
        .recipe_name(built.recipe_name)?
        .recipe(built.text)?
        .image_name(built.image_name)?
        .finalize()?;

    let path = target.write_recipe(&settings.output_dir)?;
    utils::print_message(&format!(
        "Wrote {} recipe {} for image {}",
        utils::style_action(stage),
        utils::style_path(&path.display().to_string()),
        utils::style_name(target.image_name())
    ));

    if build {
        target.build_image(&settings.output_dir)?;
    } else {
        println!("{}", utils::style_command(&target.build_command()));
    }
    Ok(target)
}
