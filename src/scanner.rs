use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as route module files
const ROUTE_FILE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// File scanner locating route module files.
///
/// The `FileScanner` recursively walks a routes directory and collects every YAML file.
/// Hidden directories (those starting with `.`) and `target` are skipped.
///
/// # Example
///
/// ```no_run
/// use docstr_swagger::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./routes"));
/// let result = scanner.scan().unwrap();
/// for file in &result.route_files {
///     println!("{} -> {}", file.module, file.path.display());
/// }
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A discovered route module file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFile {
    /// Dotted module name derived from the path relative to the root
    pub module: String,
    pub path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Route module files, sorted by path
    pub route_files: Vec<RouteFile>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the directory tree and collects all route module files.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut route_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() || !is_route_file(path) {
                        continue;
                    }
                    match module_name(&self.root_path, path) {
                        Some(module) => {
                            debug!("Found route module {} at {}", module, path.display());
                            route_files.push(RouteFile {
                                module,
                                path: path.to_path_buf(),
                            });
                        }
                        None => {
                            let warning = format!("Cannot derive module name for {}", path.display());
                            warn!("{}", warning);
                            warnings.push(warning);
                        }
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
            route_files,
            warnings,
        })
    }
}

fn is_route_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ROUTE_FILE_EXTENSIONS.contains(&ext))
}

/// Dotted module name of `path` relative to `root`: `api/v1/urls.yaml` → `api.v1.urls`
pub fn module_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();
    let parts = parts?;
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}
