use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as route manifests
const MANIFEST_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// File scanner for route manifest directories.
///
/// The `FileScanner` recursively walks a directory to find every route manifest
/// (`.json`, `.yaml` or `.yml`). Hidden directories (those starting with `.`) are
/// skipped.
///
/// # Example
///
/// ```no_run
/// use idoc_gen::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./routes"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
///
/// Contains the discovered manifests and any warnings encountered during scanning.
pub struct ScanResult {
    /// Manifest paths in sorted order, so runs are reproducible
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Whether a path looks like a route manifest
    pub fn is_manifest(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Scans the directory tree and collects all manifest files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        if !self.root_path.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root_path.display());
        }

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }
                !e.file_name().to_string_lossy().starts_with('.')
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && Self::is_manifest(path) {
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_manifests_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("billing")).unwrap();
        fs::write(root.join("users.yaml"), "[]").unwrap();
        fs::write(root.join("billing/invoices.json"), "[]").unwrap();
        fs::write(root.join("billing/charges.YML"), "[]").unwrap();
        fs::write(root.join("README.md"), "# routes").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        let names: Vec<_> = result
            .manifest_files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["billing/charges.YML", "billing/invoices.json", "users.yaml"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join(".cache/old.json"), "[]").unwrap();
        fs::write(root.join("api.json"), "[]").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(result.manifest_files.len(), 1);
        assert!(result.manifest_files[0].ends_with("api.json"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let scanner = FileScanner::new(PathBuf::from("/nonexistent/routes"));
        assert!(scanner.scan().is_err());
    }
}
