use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Conventional subdirectory holding route definitions inside a module directory.
pub const ROUTES_DIR: &str = "routes";
/// Conventional subdirectory holding controller classes inside a module directory.
pub const CONTROLLERS_DIR: &str = "controllers";
/// Conventional subdirectory holding middleware classes inside a module directory.
pub const MIDDLEWARES_DIR: &str = "middlewares";

/// Extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "ts"];

/// File scanner for module directories of an Express-style project.
///
/// Every module directory is expected to contain `routes/`, `controllers/` and
/// `middlewares/` subtrees. The `FileScanner` walks each subtree recursively and collects
/// the files whose extension is in the configured list. `node_modules` and hidden
/// directories are skipped.
///
/// A module that lacks one of the subtrees, or has unreadable entries, simply
/// contributes fewer files: enumeration problems never fail the scan.
///
/// # Example
///
/// ```no_run
/// use swagger_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(vec!["js".to_string()]);
/// let result = scanner.scan(&[PathBuf::from("./src/modules/users")]);
/// println!("Found {} route files", result.route_files.len());
/// ```
pub struct FileScanner {
    extensions: Vec<String>,
}

/// Result of a scan over one or more module directories.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Files under `routes/`
    pub route_files: Vec<PathBuf>,
    /// Files under `controllers/`
    pub controller_files: Vec<PathBuf>,
    /// Files under `middlewares/`
    pub middleware_files: Vec<PathBuf>,
}

impl FileScanner {
    /// Creates a scanner for the given extensions (with or without the leading dot).
    pub fn new(extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// The normalized extension list.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Scans every module directory and returns the three file lists in walk order.
    pub fn scan(&self, module_dirs: &[PathBuf]) -> ScanResult {
        let mut result = ScanResult::default();

        for module_dir in module_dirs {
            debug!("Scanning module directory: {}", module_dir.display());
            result
                .route_files
                .extend(self.scan_subtree(&module_dir.join(ROUTES_DIR)));
            result
                .controller_files
                .extend(self.scan_subtree(&module_dir.join(CONTROLLERS_DIR)));
            result
                .middleware_files
                .extend(self.scan_subtree(&module_dir.join(MIDDLEWARES_DIR)));
        }

        result
    }

    fn scan_subtree(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            debug!("Skipping missing directory: {}", root.display());
            return Vec::new();
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == root {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "node_modules"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.has_wanted_extension(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    debug!("Skipping unreadable path under {}: {}", root.display(), e);
                }
            }
        }
        files
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|wanted| wanted == ext))
            .unwrap_or(false)
    }
}

/// Splits route files into designated router-context files and the remaining route files.
///
/// Explicitly designated files win. Without any, every route file whose stem is `index`
/// is treated as a router aggregation file. Router-context files never appear in the
/// returned route list.
pub fn partition_router_context(
    route_files: Vec<PathBuf>,
    designated: &[PathBuf],
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    if designated.is_empty() {
        return route_files
            .into_iter()
            .partition(|path| path.file_stem().and_then(|s| s.to_str()) == Some("index"));
    }

    let routes = route_files
        .into_iter()
        .filter(|path| !designated.iter().any(|d| same_file(d, path)))
        .collect();
    (designated.to_vec(), routes)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
