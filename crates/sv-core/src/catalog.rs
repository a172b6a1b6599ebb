//! Migration script discovery.
//!
//! Scripts live flat in one directory and are named
//! `<product>_ddl_v<MAJOR>.<MINOR>.sql`. The version in the file name (the
//! catalog version) decides ordering and gating. A script may also carry a
//! `#database_version=<MAJOR>.<MINOR>` marker on its first line; that
//! declared version is advisory and only used to warn about mismatches.

use crate::checksum::script_checksum;
use crate::error::{CoreError, CoreResult};
use crate::version::SchemaVersion;
use regex::Regex;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static DECLARED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#database_version=(\d+\.\d+)").expect("declared version regex is valid")
});

/// File-name pattern for one product's DDL scripts
#[derive(Debug, Clone)]
pub struct ScriptPattern {
    product: String,
    regex: Regex,
}

impl ScriptPattern {
    /// Build the pattern `<product>_ddl_v<MAJOR>.<MINOR>.sql`
    pub fn new(product: &str) -> CoreResult<Self> {
        if product.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Script product prefix cannot be empty".to_string(),
            });
        }
        let source = format!(r"^{}_ddl_v(\d+\.\d+)\.sql$", regex::escape(product));
        let regex = Regex::new(&source).map_err(|e| CoreError::ConfigInvalid {
            message: format!("Invalid script pattern for '{}': {}", product, e),
        })?;
        Ok(Self {
            product: product.to_string(),
            regex,
        })
    }

    /// Human-readable form, e.g. `mtk_backend_ddl_v<MAJOR>.<MINOR>.sql`
    pub fn display(&self) -> String {
        format!("{}_ddl_v<MAJOR>.<MINOR>.sql", self.product)
    }

    /// Catalog version embedded in `file_name`; `Ok(None)` when it does not match.
    ///
    /// A matching name whose version does not fit a `u32` component is an
    /// error, so a file that looks like a script is never dropped quietly.
    pub fn version_of(&self, file_name: &str) -> CoreResult<Option<SchemaVersion>> {
        let Some(raw) = self
            .regex
            .captures(file_name)
            .and_then(|caps| caps.get(1))
        else {
            return Ok(None);
        };
        SchemaVersion::parse(raw.as_str()).map(Some)
    }
}

/// A discovered script file and its catalog version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Path to the script file
    pub path: PathBuf,
    /// Version parsed from the file name
    pub version: SchemaVersion,
}

impl ScriptEntry {
    /// File name for log output
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A script loaded for execution. Immutable once discovered.
#[derive(Debug, Clone)]
pub struct MigrationScript {
    /// Path and catalog version
    pub entry: ScriptEntry,
    /// Full script text, executed verbatim
    pub sql: String,
    /// Version from the first-line marker, if present
    pub declared_version: Option<SchemaVersion>,
    /// SHA-256 of `sql`
    pub checksum: String,
}

impl MigrationScript {
    /// Catalog version
    pub fn version(&self) -> SchemaVersion {
        self.entry.version
    }

    /// Declared version when it disagrees with the catalog version
    pub fn version_mismatch(&self) -> Option<SchemaVersion> {
        self.declared_version
            .filter(|declared| *declared != self.entry.version)
    }
}

/// List scripts in `dir` matching `pattern`, sorted by catalog version.
///
/// The scan is not recursive. Files that do not match the pattern are
/// ignored. Two files with the same catalog version are an error.
pub fn list_scripts(dir: &Path, pattern: &ScriptPattern) -> CoreResult<Vec<ScriptEntry>> {
    if !dir.is_dir() {
        return Err(CoreError::ScriptsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let read_dir = fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = item.path();
        if !path.is_file() {
            continue;
        }
        let file_name = item.file_name();
        let version = pattern
            .version_of(&file_name.to_string_lossy())
            .inspect_err(|e| log::warn!("Cannot use {} as a script: {}", path.display(), e))?;
        let Some(version) = version else {
            log::debug!("Ignoring non-matching file {}", path.display());
            continue;
        };
        entries.push(ScriptEntry { path, version });
    }

    entries.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.path.cmp(&b.path)));

    if let Some(pair) = entries.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(CoreError::DuplicateScriptVersion {
            version: pair[0].version.to_string(),
            path1: pair[0].path.display().to_string(),
            path2: pair[1].path.display().to_string(),
        });
    }

    Ok(entries)
}

/// Read the advisory `#database_version=` marker from the first line.
///
/// Returns `None` if the file cannot be read or has no well-formed marker.
pub fn extract_declared_version(path: &Path) -> Option<SchemaVersion> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    let mut first_line = String::new();
    if let Err(e) = BufReader::new(file).read_line(&mut first_line) {
        log::warn!("Cannot read {}: {}", path.display(), e);
        return None;
    }
    declared_version_in(&first_line)
}

fn declared_version_in(line: &str) -> Option<SchemaVersion> {
    let caps = DECLARED_VERSION.captures(line.trim())?;
    SchemaVersion::parse(caps.get(1)?.as_str()).ok()
}

/// List and read every script in `dir`.
pub fn load_scripts(dir: &Path, pattern: &ScriptPattern) -> CoreResult<Vec<MigrationScript>> {
    list_scripts(dir, pattern)?
        .into_iter()
        .map(|entry| {
            let sql = fs::read_to_string(&entry.path).map_err(|e| CoreError::IoWithPath {
                path: entry.path.display().to_string(),
                source: e,
            })?;
            let declared_version = extract_declared_version(&entry.path);
            let checksum = script_checksum(&sql);
            Ok(MigrationScript {
                entry,
                sql,
                declared_version,
                checksum,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
