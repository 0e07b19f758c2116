//! A directory of platform descriptor files.
//!
//! Descriptors are discovered recursively. `.yaml` and `.yml` files are read
//! as YAML, `.json` files as JSON; everything else is ignored.

use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fmt, fs,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::domain::{Config, PlatformDescriptor};

/// Name of the configuration file looked up in the source root.
pub const CONFIG_FILE: &str = "cardocs.toml";

/// A descriptor file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// The offending file.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Failure to load a source directory.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source root does not exist or is not a directory.
    NotADirectory(PathBuf),

    /// One or more descriptor files are unreadable or malformed.
    InvalidFiles(Vec<FileError>),

    /// An explicitly requested configuration file could not be loaded.
    Config(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADirectory(path) => write!(f, "{} is not a directory", path.display()),
            Self::InvalidFiles(errors) => {
                write!(f, "Invalid descriptor files: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            Self::Config(message) => f.write_str(message),
        }
    }
}

/// A filesystem directory holding platform descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDirectory {
    root: PathBuf,
}

impl SourceDirectory {
    /// Open a source directory.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotADirectory`] if the path is not a directory.
    pub fn new(root: PathBuf) -> Result<Self, SourceError> {
        if !root.is_dir() {
            return Err(SourceError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    /// The root of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every descriptor under the root, in path order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidFiles`] listing every file that could
    /// not be read or parsed.
    pub fn load(&self) -> Result<Vec<PlatformDescriptor>, SourceError> {
        let paths = collect_descriptor_paths(&self.root);
        tracing::debug!(
            "Found {} descriptor files under {}",
            paths.len(),
            self.root.display()
        );

        let (descriptors, failures): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| load_descriptor(path))
            .partition(Result::is_ok);

        let failures: Vec<_> = failures.into_iter().filter_map(Result::err).collect();
        if !failures.is_empty() {
            return Err(SourceError::InvalidFiles(failures));
        }

        let descriptors: Vec<_> = descriptors.into_iter().filter_map(Result::ok).collect();
        warn_on_duplicates(&descriptors);
        Ok(descriptors)
    }

    /// Load the run configuration.
    ///
    /// An explicit path must load. Otherwise `cardocs.toml` in the root is
    /// used when present, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the explicit file cannot be loaded.
    pub fn config(&self, explicit: Option<&Path>) -> Result<Config, SourceError> {
        match explicit {
            Some(path) => Config::load(path).map_err(SourceError::Config),
            None => Ok(load_config(&self.root)),
        }
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_descriptor_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| Format::of(entry.path()).is_some())
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();
    paths
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("yaml" | "yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

fn load_descriptor(path: &Path) -> Result<PlatformDescriptor, FileError> {
    let fail = |message: String| FileError {
        path: path.to_path_buf(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
    let descriptor = match Format::of(path) {
        Some(Format::Json) => serde_json::from_str(&content).map_err(|e| fail(e.to_string()))?,
        _ => serde_yaml::from_str(&content).map_err(|e| fail(e.to_string()))?,
    };

    tracing::trace!("Loaded descriptor from {}", path.display());
    Ok(descriptor)
}

fn warn_on_duplicates(descriptors: &[PlatformDescriptor]) {
    let mut seen = BTreeMap::new();
    for descriptor in descriptors {
        let count = seen.entry(descriptor.platform.as_str()).or_insert(0usize);
        *count += 1;
        if *count == 2 {
            tracing::warn!("Platform {} is described more than once", descriptor.platform);
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{CountStrategy, SupportType};

    const SONATA: &str = r"
platform: HYUNDAI_SONATA
brand: hyundai
flags: [MANDO_RADAR]
params:
  mass: 1513
  wheelbase: 2.84
  max_lateral_accel: inf
docs:
  - name: Hyundai Sonata 2020-23
    parts: [comma_3x, hyundai_a]
    min_steer_speed: 32 mph
    support_type: upstream
";

    const CIVIC: &str = r#"{
  "platform": "HONDA_CIVIC",
  "brand": "honda",
  "docs": [{ "name": "Honda Civic 2016-18", "support_type": "Dashcam mode" }]
}"#;

    fn write(dir: &TempDir, relative: &str, content: &str) {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_yaml_and_json_in_path_order() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "hyundai/sonata.yaml", SONATA);
        write(&tmp, "honda/civic.json", CIVIC);
        write(&tmp, "README.md", "# not a descriptor");

        let descriptors = SourceDirectory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();

        let platforms: Vec<_> = descriptors.iter().map(|d| d.platform.as_str()).collect();
        assert_eq!(platforms, ["HONDA_CIVIC", "HYUNDAI_SONATA"]);

        let sonata = &descriptors[1];
        let params = sonata.params.as_ref().unwrap();
        assert_eq!(params.max_lateral_accel, Some(f64::INFINITY));
        let speed = sonata.docs[0].min_steer_speed.unwrap();
        assert!((speed - 32.0 * 0.447_04).abs() < 1e-9);
        assert_eq!(descriptors[0].docs[0].support_type, SupportType::Dashcam);
    }

    #[test]
    fn malformed_files_are_all_reported() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "good.yaml", SONATA);
        write(&tmp, "bad.yaml", "platform: [unclosed");
        write(&tmp, "worse.json", "{");

        let error = SourceDirectory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap_err();

        let SourceError::InvalidFiles(failures) = error else {
            panic!("expected invalid files, got {error:?}");
        };
        let names: Vec<_> = failures
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["bad.yaml", "worse.json"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nowhere");

        let error = SourceDirectory::new(missing).unwrap_err();
        assert!(matches!(error, SourceError::NotADirectory(_)));
    }

    #[test]
    fn config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let source = SourceDirectory::new(tmp.path().to_path_buf()).unwrap();

        assert_eq!(source.config(None).unwrap(), Config::default());
    }

    #[test]
    fn config_is_read_from_the_root() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, CONFIG_FILE, "_version = \"1\"\npart_counting = \"distinct\"\n");
        let source = SourceDirectory::new(tmp.path().to_path_buf()).unwrap();

        let config = source.config(None).unwrap();
        assert_eq!(config.part_counting, CountStrategy::Distinct);
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = TempDir::new().unwrap();
        let source = SourceDirectory::new(tmp.path().to_path_buf()).unwrap();

        let error = source
            .config(Some(&tmp.path().join("missing.toml")))
            .unwrap_err();
        assert!(error.to_string().starts_with("Failed to read config file:"));
    }
}
