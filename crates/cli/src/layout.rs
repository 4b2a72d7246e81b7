//! Output tree and file helpers.
//!
//! ```text
//! <output>/java/**          Java beans, written by the compiler
//! <output>/js/<ns>.js       composed CommonJS modules (or all.js)
//! <output>/ts/<ns>.d.ts     composed declaration modules
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use t2ng_core::Namespace;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

const JAVA_DIR: &str = "java";
const JS_DIR: &str = "js";
const TS_DIR: &str = "ts";

/// File name of the merged JavaScript bundle.
pub const MERGED_JS_FILE: &str = "all.js";
/// Extension of compiler-generated and composed JavaScript.
pub const JS_SUFFIX: &str = ".js";
/// Extension of compiler-generated and composed declarations.
pub const DTS_SUFFIX: &str = ".d.ts";

/// The generated source directory of one run.
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
}

impl OutputTree {
    /// Wipe `root` if it exists, then create it with its three target
    /// directories.
    pub fn init(root: &Path) -> Result<Self, String> {
        if root.exists() {
            fs::remove_dir_all(root).map_err(|err| {
                format!(
                    "Failed to wipe generated source directory {}: {err}",
                    root.display()
                )
            })?;
            info!("wiped output generated source directory {}", root.display());
        }

        let tree = Self {
            root: root.to_path_buf(),
        };
        for dir in [tree.java_dir(), tree.js_dir(), tree.ts_dir()] {
            fs::create_dir_all(&dir).map_err(|err| {
                format!(
                    "can't init generated source directory at {}: {err}",
                    dir.display()
                )
            })?;
        }
        Ok(tree)
    }

    /// Root of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compiler output directory for Java beans.
    pub fn java_dir(&self) -> PathBuf {
        self.root.join(JAVA_DIR)
    }

    /// Directory of composed JavaScript modules.
    pub fn js_dir(&self) -> PathBuf {
        self.root.join(JS_DIR)
    }

    /// Directory of composed declaration modules.
    pub fn ts_dir(&self) -> PathBuf {
        self.root.join(TS_DIR)
    }

    /// `js/<ns>.js`
    pub fn js_module(&self, namespace: &Namespace) -> PathBuf {
        self.js_dir().join(format!("{namespace}{JS_SUFFIX}"))
    }

    /// `ts/<ns>.d.ts`
    pub fn ts_module(&self, namespace: &Namespace) -> PathBuf {
        self.ts_dir().join(format!("{namespace}{DTS_SUFFIX}"))
    }
}

/// Write `contents` to a temporary file next to `path`, then rename it into
/// place so readers never observe a partial module.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), String> {
    let dir = path
        .parent()
        .ok_or_else(|| format!("can't build module {}: no parent directory", path.display()))?;
    let mut file = NamedTempFile::new_in(dir)
        .map_err(|err| format!("can't build module {}: {err}", path.display()))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| format!("can't build module {}: {err}", path.display()))?;
    file.persist(path)
        .map_err(|err| format!("can't build module {}: {}", path.display(), err.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "Module written.");
    Ok(())
}

/// Files below `dir` whose name ends with `suffix`, in file-name order.
///
/// `.js` never matches a `.d.ts` file and vice versa.
pub fn list_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry =
            entry.map_err(|err| format!("Failed to list files in {}: {err}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Read every file, in order.
pub fn read_files(files: &[PathBuf]) -> Result<Vec<String>, String> {
    files
        .iter()
        .map(|file| {
            fs::read_to_string(file)
                .map_err(|err| format!("Failed to read {}: {err}", file.display()))
        })
        .collect()
}

/// Delete every file.
pub fn remove_files(files: &[PathBuf]) -> Result<(), String> {
    for file in files {
        fs::remove_file(file)
            .map_err(|err| format!("Failed to remove {}: {err}", file.display()))?;
    }
    Ok(())
}

/// Concatenate every composed JavaScript module into `js/all.js` and delete
/// the individual modules.
pub fn merge_javascript(tree: &OutputTree) -> Result<PathBuf, String> {
    let modules = list_files(&tree.js_dir(), JS_SUFFIX)?;
    let bodies = read_files(&modules)?;
    let mut merged = String::new();
    for body in &bodies {
        merged.push_str(body);
        if !body.ends_with('\n') {
            merged.push('\n');
        }
    }

    remove_files(&modules)?;
    let target = tree.js_dir().join(MERGED_JS_FILE);
    write_atomically(&target, &merged)?;
    info!(
        modules = modules.len(),
        path = %target.display(),
        "Merged JavaScript modules."
    );
    Ok(target)
}
