//! Base image recipes: OS layer, toolchain, MPI, casacore and casarest
//!
//! The base image holds everything that rarely changes, so the final
//! (yandasoft) image can be rebuilt quickly on top of it.

use crate::config::{Machine, Settings};
use crate::mpi::{MpiKind, MpiSpec};

use super::{BuiltRecipe, RecipeError, CMAKE_CXX_COMPILER, GENERATED_HEADER, MPI_COMPILE_FLAGS, MPI_DIR};

/// Pinned casarest snapshot (steve-ord fork)
const CASAREST_REF: &str = "078f94e";

/// Packages installed from the base system, at whatever versions the
/// distribution pins.
const APT_PACKAGES: &[&str] = &[
    "g++",
    "gfortran",
    "m4",
    "autoconf",
    "automake",
    "libtool",
    "flex",
    "bison",
    "make",
    "libncurses5-dev",
    "libreadline-dev",
    "libopenblas-dev",
    "liblapacke-dev",
    "libcfitsio-dev",
    "wcslib-dev",
    "libhdf5-serial-dev",
    "libfftw3-dev",
    "libpython2.7-dev",
    "libpython3-dev",
    "python-pip",
    "python-numpy",
    "python-scipy",
    "libboost-python-dev",
    "libboost-dev",
    "libboost-filesystem-dev",
    "libboost-program-options-dev",
    "libboost-signals-dev",
    "libboost-system-dev",
    "libboost-thread-dev",
    "libboost-regex-dev",
    "libcppunit-dev",
    "git",
    "libffi-dev",
    "libgsl-dev",
    "liblog4cxx-dev",
    "patch",
    "subversion",
    "wget",
    "docker",
    "libxerces-c-dev",
    "libcurl4-openssl-dev",
    "xsltproc",
    "gcovr",
    "libzmq3-dev",
];

/// Assemble the base image recipe for one (machine, MPI) target.
///
/// The image name is `prefix` + short label + `suffix`; the label is
/// the MPI short label for the generic machine and the machine name for
/// named clusters, which carry a preset MPI runtime and ignore `mpi`.
pub fn assemble(
    machine: Machine,
    mpi: Option<&MpiSpec>,
    prefix: &str,
    suffix: &str,
    settings: &Settings,
) -> Result<BuiltRecipe, RecipeError> {
    let (foundation, mpi_part, label) = match machine {
        Machine::Generic => {
            let spec = mpi.ok_or(RecipeError::MpiTargetRequired(machine))?;
            (
                "FROM ubuntu:bionic as buildenv\n".to_string(),
                mpi_stage(spec, settings.nproc)?,
                spec.short_label(),
            )
        }
        Machine::Galaxy => (
            // Pawsey image with Cray MPICH already baked into Ubuntu
            "FROM pawsey/mpich-base:3.1.4_ubuntu18.04 as buildenv\n".to_string(),
            String::new(),
            machine.to_string(),
        ),
    };

    let mut text = String::from(GENERATED_HEADER);
    text.push_str(&foundation);
    text.push_str(&apt_install_stage());
    text.push_str(&cmake_stage(&settings.cmake_ver));
    text.push_str(&mpi_part);
    text.push_str(&casacore_stage(settings));

    Ok(BuiltRecipe {
        recipe_name: format!("Dockerfile-yandabase-{label}"),
        image_name: format!("{prefix}{label}{suffix}"),
        text,
    })
}

/// System upgrade plus the fixed package list
fn apt_install_stage() -> String {
    let mut s = String::new();
    s.push_str("ENV DEBIAN_FRONTEND=\"noninteractive\"\n");
    s.push_str("RUN apt-get update \\\n");
    s.push_str("    && apt-get upgrade -y \\\n");
    s.push_str("    && apt-get autoremove -y \\\n");
    s.push_str("    && apt-get install -y");
    for pkg in APT_PACKAGES {
        s.push_str(" \\\n        ");
        s.push_str(pkg);
    }
    s.push_str(" \\\n    && rm -rf /var/lib/apt\n");
    s
}

/// Bootstrap a recent cmake; the distribution one is too old for
/// casacore.
fn cmake_stage(cmake_ver: &str) -> String {
    let source = format!("cmake-{cmake_ver}.tar.gz");
    let mut s = String::new();
    s.push_str("# Build the latest cmake\n");
    s.push_str("RUN mkdir /usr/local/share/cmake\n");
    s.push_str("WORKDIR /usr/local/share/cmake\n");
    s.push_str(&format!(
        "RUN wget https://github.com/Kitware/CMake/releases/download/v{cmake_ver}/{source} \\\n"
    ));
    s.push_str(&format!("    && tar -zxf {source} \\\n"));
    s.push_str(&format!("    && rm {source}\n"));
    s.push_str(&format!("WORKDIR /usr/local/share/cmake/cmake-{cmake_ver}\n"));
    s.push_str("RUN ./bootstrap --system-curl \\\n");
    s.push_str("    && make \\\n");
    s.push_str("    && make install\n");
    s
}

/// MPI installation stage for the generic machine.
///
/// A pinned version is built from the upstream source archive; without
/// a version MPICH falls back to the distribution package, while
/// OpenMPI has no usable distribution default and must be pinned.
fn mpi_stage(spec: &MpiSpec, nproc: usize) -> Result<String, RecipeError> {
    let mut s = String::new();
    match (spec.kind, spec.version) {
        (MpiKind::Mpich, None) => {
            s.push_str("RUN apt-get install -y libmpich-dev \\\n");
            s.push_str("    && rm -rf /var/lib/apt\n");
        }
        (MpiKind::Mpich, Some(ver)) => {
            let stem = spec.archive_stem();
            let web_dir = format!("https://www.mpich.org/static/downloads/{ver}");
            s.push_str("# Build MPICH\n");
            s.push_str("WORKDIR /home\n");
            s.push_str(&format!("RUN wget {web_dir}/{stem}.tar.gz \\\n"));
            s.push_str(&format!("    && tar -zxf {stem}.tar.gz \\\n"));
            s.push_str(&format!("    && rm {stem}.tar.gz\n"));
            s.push_str(&format!("WORKDIR /home/{stem}\n"));
            s.push_str(&format!("RUN ./configure --prefix={MPI_DIR} \\\n"));
            s.push_str(&format!("    && make -j{nproc} \\\n"));
            s.push_str("    && make install\n");
            s.push_str(&format!("ENV PATH=$PATH:{MPI_DIR}/bin\n"));
            s.push_str(&format!("ENV LD_LIBRARY_PATH=$LD_LIBRARY_PATH:{MPI_DIR}/lib\n"));
        }
        (MpiKind::OpenMpi, None) => return Err(RecipeError::OpenMpiVersionRequired),
        (MpiKind::OpenMpi, Some(ver)) => {
            let stem = spec.archive_stem();
            let web_dir = format!(
                "https://download.open-mpi.org/release/open-mpi/{}",
                ver.release_dir()
            );
            s.push_str("# Build OpenMPI\n");
            s.push_str("WORKDIR /home\n");
            s.push_str(&format!("RUN wget {web_dir}/{stem}.tar.gz \\\n"));
            s.push_str(&format!("    && tar -zxf {stem}.tar.gz \\\n"));
            s.push_str(&format!("    && rm {stem}.tar.gz\n"));
            s.push_str(&format!("WORKDIR /home/{stem}\n"));
            // C++ bindings stay enabled; some downstream code still uses them.
            s.push_str("RUN ./configure --enable-mpi-cxx \\\n");
            s.push_str(&format!("    && make all -j{nproc} \\\n"));
            s.push_str("    && make install\n");
            s.push_str("ENV PATH=/usr/local/bin:$PATH\n");
            s.push_str("ENV LD_LIBRARY_PATH=/usr/local/lib:$LD_LIBRARY_PATH\n");
            s.push_str("ENV MPI_INCLUDE_PATH=\"/usr/local/include\"\n");
            s.push_str("ENV MPI_LIBRARIES=\"/usr/local/lib\"\n");
            s.push_str(&format!("ENV MPI_COMPILE_FLAGS=\"{MPI_COMPILE_FLAGS}\"\n"));
        }
    }
    Ok(s)
}

/// Measures data, casacore and the pinned casarest snapshot
fn casacore_stage(settings: &Settings) -> String {
    let ver = &settings.casacore_ver;
    let nproc = settings.nproc;
    let mut s = String::new();
    s.push_str("# Fetch the latest measures data\n");
    s.push_str("RUN mkdir /usr/local/share/casacore \\\n");
    s.push_str("    && mkdir /usr/local/share/casacore/data\n");
    s.push_str("WORKDIR /usr/local/share/casacore/data\n");
    s.push_str("RUN wget ftp://ftp.astron.nl/outgoing/Measures/WSRT_Measures.ztar \\\n");
    s.push_str("    && mv WSRT_Measures.ztar WSRT_Measures.tar.gz \\\n");
    s.push_str("    && tar -zxf WSRT_Measures.tar.gz \\\n");
    s.push_str("    && rm WSRT_Measures.tar.gz \\\n");
    s.push_str("    && mkdir /var/lib/jenkins \\\n");
    s.push_str("    && mkdir /var/lib/jenkins/workspace\n");
    s.push_str("# Build casacore\n");
    s.push_str("WORKDIR /usr/local/share/casacore\n");
    s.push_str(&format!(
        "RUN wget https://github.com/casacore/casacore/archive/v{ver}.tar.gz \\\n"
    ));
    s.push_str(&format!("    && tar -xzf v{ver}.tar.gz \\\n"));
    s.push_str(&format!("    && rm v{ver}.tar.gz\n"));
    s.push_str(&format!("WORKDIR /usr/local/share/casacore/casacore-{ver}\n"));
    s.push_str("RUN mkdir build\n");
    s.push_str("WORKDIR build\n");
    s.push_str(&format!(
        "RUN cmake {CMAKE_CXX_COMPILER} -DUSE_FFTW3=ON -DDATA_DIR=/usr/local/share/casacore/data \\\n"
    ));
    s.push_str("    -DUSE_OPENMP=ON -DUSE_HDF5=ON -DBUILD_PYTHON=ON -DUSE_THREADS=ON -DCMAKE_BUILD_TYPE=Release .. \\\n");
    s.push_str(&format!("    && make -j{nproc} \\\n"));
    s.push_str("    && make install\n");
    s.push_str("# Build casarest\n");
    s.push_str("WORKDIR /usr/local/share/casacore/\n");
    s.push_str(&format!(
        "RUN wget https://github.com/steve-ord/casarest/tarball/{CASAREST_REF} \\\n"
    ));
    s.push_str(&format!("    && tar -xzf {CASAREST_REF} \\\n"));
    s.push_str(&format!("    && rm {CASAREST_REF}\n"));
    s.push_str(&format!("WORKDIR steve-ord-casarest-{CASAREST_REF}\n"));
    s.push_str("RUN mkdir build\n");
    s.push_str("WORKDIR build\n");
    s.push_str(&format!("RUN cmake {CMAKE_CXX_COMPILER} -DCMAKE_BUILD_TYPE=Release .. \\\n"));
    s.push_str(&format!("    && make -j{nproc} \\\n"));
    s.push_str("    && make install\n");
    s.push_str("WORKDIR /usr/local/share/casacore\n");
    s.push_str(&format!("RUN rm -rf casacore-{ver} \\\n"));
    s.push_str(&format!("    && rm -rf steve-ord-casarest-{CASAREST_REF} \\\n"));
    s.push_str("    && apt-get clean\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_settings() -> Settings {
        Settings {
            debug: false,
            machine_targets: vec!["generic".to_string()],
            mpi_targets: vec!["openmpi-3.1.6".to_string()],
            git_branch: "develop".to_string(),
            casacore_ver: "3.3.0".to_string(),
            cmake_ver: "3.18.4".to_string(),
            output_dir: PathBuf::from("."),
            nproc: 1,
        }
    }

    #[test]
    fn generic_openmpi_naming() {
        let spec = MpiSpec::parse("openmpi-3.1.6").unwrap();
        let built =
            assemble(Machine::Generic, Some(&spec), "p:", "", &test_settings()).unwrap();
        assert_eq!(built.image_name, "p:openmpi3");
        assert_eq!(built.recipe_name, "Dockerfile-yandabase-openmpi3");
    }

    #[test]
    fn first_line_marks_generated_file() {
        let spec = MpiSpec::parse("mpich").unwrap();
        let built =
            assemble(Machine::Generic, Some(&spec), "p:", "", &test_settings()).unwrap();
        let first = built.text.lines().next().unwrap();
        assert!(first.starts_with("# This file is automatically created by"));
    }

    #[test]
    fn unversioned_mpich_uses_distribution_package() {
        let spec = MpiSpec::parse("mpich").unwrap();
        let built =
            assemble(Machine::Generic, Some(&spec), "p:", "", &test_settings()).unwrap();
        assert!(built.text.contains("apt-get install -y libmpich-dev"));
        assert!(!built.text.contains("mpich.org"));
    }

    #[test]
    fn versioned_mpich_builds_from_source() {
        let spec = MpiSpec::parse("mpich-3.3.2").unwrap();
        let built =
            assemble(Machine::Generic, Some(&spec), "p:", "", &test_settings()).unwrap();
        assert!(built
            .text
            .contains("https://www.mpich.org/static/downloads/3.3.2/mpich-3.3.2.tar.gz"));
        assert!(built.text.contains("./configure --prefix=/usr/local"));
        assert_eq!(built.image_name, "p:mpich3");
    }

    #[test]
    fn versioned_openmpi_builds_from_release_dir() {
        let spec = MpiSpec::parse("openmpi-3.1.6").unwrap();
        let built =
            assemble(Machine::Generic, Some(&spec), "p:", "", &test_settings()).unwrap();
        assert!(built.text.contains(
            "https://download.open-mpi.org/release/open-mpi/v3.1/openmpi-3.1.6.tar.gz"
        ));
        assert!(built.text.contains("./configure --enable-mpi-cxx"));
        assert!(built.text.contains("ENV MPI_COMPILE_FLAGS=\"-I/usr/local/include -pthread\""));
    }

    #[test]
    fn unversioned_openmpi_is_fatal() {
        let spec = MpiSpec::parse("openmpi").unwrap();
        let err =
            assemble(Machine::Generic, Some(&spec), "p:", "", &test_settings()).unwrap_err();
        assert!(matches!(err, RecipeError::OpenMpiVersionRequired));
    }

    #[test]
    fn generic_without_mpi_is_fatal() {
        let err = assemble(Machine::Generic, None, "p:", "", &test_settings()).unwrap_err();
        assert!(matches!(err, RecipeError::MpiTargetRequired(Machine::Generic)));
    }

    #[test]
    fn galaxy_uses_preset_foundation_and_ignores_mpi() {
        let built = assemble(Machine::Galaxy, None, "p:", "", &test_settings()).unwrap();
        assert!(built
            .text
            .contains("FROM pawsey/mpich-base:3.1.4_ubuntu18.04 as buildenv"));
        assert_eq!(built.recipe_name, "Dockerfile-yandabase-galaxy");
        assert_eq!(built.image_name, "p:galaxy");
        assert!(!built.text.contains("# Build OpenMPI"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let spec = MpiSpec::parse("openmpi-3.1.6").unwrap();
        let settings = test_settings();
        let a = assemble(Machine::Generic, Some(&spec), "p:", "", &settings).unwrap();
        let b = assemble(Machine::Generic, Some(&spec), "p:", "", &settings).unwrap();
        assert_eq!(a.text, b.text);
    }
}
