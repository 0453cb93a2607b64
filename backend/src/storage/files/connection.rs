use anyhow::{Context, Result};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the file that points a data directory somewhere else
pub const REDIRECT_FILE_NAME: &str = ".therapy_redirect";

/// FileConnection owns the data directory layout:
///
/// ```text
/// {data_directory}/
/// ├── config.yaml
/// ├── staff.csv
/// └── enrollments/
///     └── {enrollment_id}.yaml
/// ```
#[derive(Clone, Debug)]
pub struct FileConnection {
    base_directory: PathBuf,
}

impl FileConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
        }

        Ok(Self { base_directory: base_path })
    }

    /// Create a connection in the default data directory, following a redirect file
    /// if one is present there
    pub fn new_default() -> Result<Self> {
        Self::new(Self::resolve_redirect(Self::default_data_directory()?))
    }

    /// `~/Documents/Therapy Center`
    pub fn default_data_directory() -> Result<PathBuf> {
        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        Ok(PathBuf::from(home_dir).join("Documents").join("Therapy Center"))
    }

    /// Follow `{directory}/.therapy_redirect` when it names an existing directory
    pub fn resolve_redirect(directory: PathBuf) -> PathBuf {
        let redirect_file = directory.join(REDIRECT_FILE_NAME);
        if !redirect_file.exists() {
            info!("No redirect file found, using data directory: {}", directory.display());
            return directory;
        }

        match fs::read_to_string(&redirect_file) {
            Ok(redirected_path) => {
                let path = PathBuf::from(redirected_path.trim());
                if path.exists() {
                    info!("Found redirect file, using data directory: {}", path.display());
                    path
                } else {
                    warn!(
                        "Redirect file points to non-existent directory: {}. Using default.",
                        path.display()
                    );
                    directory
                }
            }
            Err(e) => {
                error!("Failed to read redirect file: {}. Using default directory.", e);
                directory
            }
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn enrollments_directory(&self) -> PathBuf {
        self.base_directory.join("enrollments")
    }

    pub fn staff_file_path(&self) -> PathBuf {
        self.base_directory.join("staff.csv")
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.base_directory.join("config.yaml")
    }

    /// Create the enrollments directory if it doesn't exist
    pub fn ensure_enrollments_directory(&self) -> Result<PathBuf> {
        let dir = self.enrollments_directory();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            info!("Created enrollments directory: {:?}", dir);
        }
        Ok(dir)
    }
}

/// Write `contents` next to `path` and rename it into place
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}
