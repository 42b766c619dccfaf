//! Final image recipes: the yandasoft source builds on top of a base
//! image

use crate::config::{Machine, Settings};
use crate::mpi::MpiSpec;

use super::{BuiltRecipe, RecipeError, CMAKE_CXX_COMPILER, GENERATED_HEADER, MPI_COMPILE_FLAGS};

/// Assemble the final image recipe for one (machine, MPI) target,
/// layered on `base_image`. Naming mirrors the base image rule with the
/// `Dockerfile-yandasoft-` stem.
pub fn assemble(
    machine: Machine,
    mpi: Option<&MpiSpec>,
    prefix: &str,
    suffix: &str,
    base_image: &str,
    settings: &Settings,
) -> Result<BuiltRecipe, RecipeError> {
    let label = match machine {
        Machine::Generic => {
            let spec = mpi.ok_or(RecipeError::MpiTargetRequired(machine))?;
            spec.short_label()
        }
        Machine::Galaxy => machine.to_string(),
    };

    let mut text = String::from(GENERATED_HEADER);
    text.push_str(&format!("FROM {base_image} as buildenv\n"));
    text.push_str(&build_stages(settings));

    Ok(BuiltRecipe {
        recipe_name: format!("Dockerfile-yandasoft-{label}"),
        image_name: format!("{prefix}{label}{suffix}"),
        text,
    })
}

/// The checkout-and-build sequence: LOFAR components, then the
/// all_yandasoft meta-repository at the configured branch.
fn build_stages(settings: &Settings) -> String {
    let nproc = settings.nproc;
    let cxx_flags = format!(
        "-DCMAKE_CXX_FLAGS=\"{MPI_COMPILE_FLAGS}\" -DCMAKE_BUILD_TYPE=Release -DENABLE_OPENMP=YES"
    );
    let build_flags =
        "-DBUILD_ANALYSIS=OFF -DBUILD_PIPELINE=OFF -DBUILD_COMPONENTS=OFF -DBUILD_SERVICES=OFF";

    let mut s = String::new();
    s.push_str("# Build LOFAR\n");
    s.push_str("WORKDIR /usr/local/share\n");
    s.push_str("RUN mkdir LOFAR\n");
    s.push_str(&lofar_component("lofar-common", &cxx_flags, nproc));
    s.push_str(&lofar_component("lofar-blob", &cxx_flags, nproc));
    s.push_str("# Build yandasoft\n");
    s.push_str("WORKDIR /home\n");
    s.push_str("RUN git clone https://gitlab.com/ASKAPSDP/all_yandasoft.git\n");
    s.push_str("WORKDIR /home/all_yandasoft\n");
    s.push_str("RUN git checkout develop\n");
    s.push_str("RUN ./git-do clone\n");
    s.push_str(&format!("RUN ./git-do checkout {}\n", settings.git_branch));
    s.push_str("RUN mkdir build\n");
    s.push_str("WORKDIR /home/all_yandasoft/build\n");
    s.push_str(&format!(
        "RUN cmake {CMAKE_CXX_COMPILER} {cxx_flags} {build_flags} .. \\\n"
    ));
    s.push_str(&format!("    && make -j{nproc} \\\n"));
    s.push_str("    && make install\n");
    s
}

/// One LOFAR component: clone, checkout, cmake build, install. The
/// LOFAR components track develop regardless of the yandasoft branch.
fn lofar_component(name: &str, cxx_flags: &str, nproc: usize) -> String {
    let mut s = String::new();
    s.push_str("WORKDIR /usr/local/share/LOFAR\n");
    s.push_str(&format!(
        "RUN git clone https://bitbucket.csiro.au/scm/askapsdp/{name}.git\n"
    ));
    s.push_str(&format!("WORKDIR /usr/local/share/LOFAR/{name}\n"));
    s.push_str("RUN git checkout develop\n");
    s.push_str("RUN mkdir build\n");
    s.push_str(&format!("WORKDIR /usr/local/share/LOFAR/{name}/build\n"));
    s.push_str(&format!("RUN cmake {CMAKE_CXX_COMPILER} {cxx_flags} .. \\\n"));
    s.push_str(&format!("    && make -j{nproc} \\\n"));
    s.push_str("    && make install\n");
    s
}
