//! MPI target identifiers and version handling
//!
//! A target is written as `mpich`, `openmpi`, `mpich-X.Y.Z` or
//! `openmpi-X.Y.Z`. Without a version the platform package is installed;
//! with a version the library is built from source at exactly that
//! version.

use std::fmt;
use std::str::FromStr;

/// Supported MPI implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpiKind {
    Mpich,
    OpenMpi,
}

impl MpiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MpiKind::Mpich => "mpich",
            MpiKind::OpenMpi => "openmpi",
        }
    }
}

impl fmt::Display for MpiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A three-component version number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Release directory component used by the OpenMPI download site,
    /// e.g. `v3.1` for 3.1.6.
    pub fn release_dir(&self) -> String {
        format!("v{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extract a version number from a free-form suffix.
///
/// Collects the maximal digit runs in `input`, in order of appearance.
/// Exactly three runs parse as a [`Version`]; any other count yields
/// `None` and the caller must treat the input as versionless.
pub fn split_version(input: &str) -> Option<Version> {
    let mut runs: Vec<u32> = Vec::new();
    let mut current = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(current.parse().ok()?);
            current.clear();
        }
    }
    if !current.is_empty() {
        runs.push(current.parse().ok()?);
    }
    match runs[..] {
        [major, minor, patch] => Some(Version::new(major, minor, patch)),
        _ => None,
    }
}

/// Error types for MPI target parsing
#[derive(Debug, thiserror::Error)]
pub enum MpiError {
    #[error("MPI name is too short: {0}")]
    TooShort(String),

    #[error("Expecting mpich, got: {0}")]
    ExpectingMpich(String),

    #[error("Expecting openmpi, got: {0}")]
    ExpectingOpenmpi(String),

    #[error("Illegal MPI name: {0}")]
    IllegalName(String),

    #[error("Illegal {kind} version: {suffix}")]
    IllegalVersion { kind: MpiKind, suffix: String },
}

/// A parsed MPI target: implementation kind plus optional pinned version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpiSpec {
    pub kind: MpiKind,
    pub version: Option<Version>,
}

impl MpiSpec {
    /// Parse a target identifier.
    ///
    /// The dispatch is deliberately strict on length and prefix: the
    /// only valid identifiers are `mpich` (5 chars), `openmpi` (7
    /// chars), and the versioned forms where one separator character
    /// follows the implementation name. Identifiers that merely contain
    /// `mpich`/`openmpi` elsewhere are illegal.
    pub fn parse(name: &str) -> Result<Self, MpiError> {
        match name.len() {
            0..=4 => Err(MpiError::TooShort(name.to_string())),
            5 => {
                if name == "mpich" {
                    Ok(Self { kind: MpiKind::Mpich, version: None })
                } else {
                    Err(MpiError::ExpectingMpich(name.to_string()))
                }
            }
            6 => Err(MpiError::IllegalName(name.to_string())),
            7 => {
                if name == "openmpi" {
                    Ok(Self { kind: MpiKind::OpenMpi, version: None })
                } else {
                    Err(MpiError::ExpectingOpenmpi(name.to_string()))
                }
            }
            _ => {
                if let Some(rest) = name.strip_prefix("mpich") {
                    Self::parse_versioned(MpiKind::Mpich, rest)
                } else if let Some(rest) = name.strip_prefix("openmpi") {
                    Self::parse_versioned(MpiKind::OpenMpi, rest)
                } else {
                    Err(MpiError::IllegalName(name.to_string()))
                }
            }
        }
    }

    /// Parse the part after the implementation name: one separator
    /// character followed by the version suffix.
    fn parse_versioned(kind: MpiKind, rest: &str) -> Result<Self, MpiError> {
        let suffix = rest.get(1..).unwrap_or("");
        match split_version(suffix) {
            Some(version) => Ok(Self { kind, version: Some(version) }),
            None => Err(MpiError::IllegalVersion { kind, suffix: suffix.to_string() }),
        }
    }

    /// Short label used in image names and recipe filenames: the kind
    /// name plus the major version digit when a version is pinned.
    pub fn short_label(&self) -> String {
        match self.version {
            Some(v) => format!("{}{}", self.kind, v.major),
            None => self.kind.to_string(),
        }
    }

    /// Canonical `name-X.Y.Z` stem, as used in source tarball names.
    pub fn archive_stem(&self) -> String {
        match self.version {
            Some(v) => format!("{}-{}", self.kind, v),
            None => self.kind.to_string(),
        }
    }
}

impl FromStr for MpiSpec {
    type Err = MpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_dotted_version() {
        assert_eq!(split_version("3.1.6"), Some(Version::new(3, 1, 6)));
    }

    #[test]
    fn splits_version_with_interspersed_text() {
        assert_eq!(split_version("a3b1c6d"), Some(Version::new(3, 1, 6)));
    }

    #[test]
    fn rejects_wrong_group_counts() {
        assert_eq!(split_version(""), None);
        assert_eq!(split_version("3.1"), None);
        assert_eq!(split_version("a3b1c6d9"), None);
    }

    #[test]
    fn composes_dotted_version() {
        assert_eq!(Version::new(3, 1, 6).to_string(), "3.1.6");
        assert_eq!(Version::new(1, 10, 7).release_dir(), "v1.10");
    }

    #[test]
    fn parses_unversioned_kinds() {
        let spec = MpiSpec::parse("mpich").unwrap();
        assert_eq!(spec.kind, MpiKind::Mpich);
        assert_eq!(spec.version, None);

        let spec = MpiSpec::parse("openmpi").unwrap();
        assert_eq!(spec.kind, MpiKind::OpenMpi);
        assert_eq!(spec.version, None);
    }

    #[test]
    fn parses_versioned_kinds() {
        let spec = MpiSpec::parse("openmpi-3.1.6").unwrap();
        assert_eq!(spec.kind, MpiKind::OpenMpi);
        assert_eq!(spec.version, Some(Version::new(3, 1, 6)));

        let spec = MpiSpec::parse("mpich-3.3.2").unwrap();
        assert_eq!(spec.kind, MpiKind::Mpich);
        assert_eq!(spec.version, Some(Version::new(3, 3, 2)));
    }

    #[test]
    fn length_dispatch_is_strict() {
        assert!(matches!(MpiSpec::parse("mpi"), Err(MpiError::TooShort(_))));
        assert!(matches!(MpiSpec::parse("mpick"), Err(MpiError::ExpectingMpich(_))));
        // No valid identifier has exactly six characters.
        assert!(matches!(MpiSpec::parse("openmp"), Err(MpiError::IllegalName(_))));
        assert!(matches!(MpiSpec::parse("openmpy"), Err(MpiError::ExpectingOpenmpi(_))));
        assert!(matches!(MpiSpec::parse("lam-mpi-7.1.4"), Err(MpiError::IllegalName(_))));
    }

    #[test]
    fn bad_version_suffix_names_the_suffix() {
        match MpiSpec::parse("openmpi-3.1") {
            Err(MpiError::IllegalVersion { kind, suffix }) => {
                assert_eq!(kind, MpiKind::OpenMpi);
                assert_eq!(suffix, "3.1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn labels_carry_major_digit_only_when_versioned() {
        assert_eq!(MpiSpec::parse("openmpi-3.1.6").unwrap().short_label(), "openmpi3");
        assert_eq!(MpiSpec::parse("mpich").unwrap().short_label(), "mpich");
        assert_eq!(MpiSpec::parse("mpich-3.3.2").unwrap().archive_stem(), "mpich-3.3.2");
    }
}
