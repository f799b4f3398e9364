use crate::ExpError;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// An input document: either a path to a JSON file or an already-loaded
/// value. An explicit variant at the boundary instead of run-time type
/// inspection.
#[derive(Debug, Clone)]
pub enum Input {
    Path(PathBuf),
    Data(Value),
}

impl Input {
    /// Resolves the input to a JSON value. IO and parse failures on the
    /// path variant surface as `InputUnreadable`.
    pub fn read(self) -> Result<Value, ExpError> {
        match self {
            Self::Data(value) => Ok(value),
            Self::Path(path) => {
                let contents =
                    std::fs::read_to_string(&path).map_err(|err| {
                        ExpError::InputUnreadable {
                            path: path.clone(),
                            reason: err.to_string(),
                        }
                    })?;
                serde_json::from_str(&contents).map_err(|err| {
                    ExpError::InputUnreadable {
                        path,
                        reason: err.to_string(),
                    }
                })
            }
        }
    }
}

/// Strict boolean parsing over an enumerated token table. Tokens are trimmed
/// and matched case-insensitively; anything outside the table is an error.
pub fn parse_bool(token: &str) -> Result<bool, ExpError> {
    match token.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" => Ok(true),
        "no" | "n" | "false" | "f" | "0" => Ok(false),
        _ => Err(ExpError::InvalidBool(token.to_string())),
    }
}

/// Appends `-{suffix}` to a file name, before the extension if there is one:
/// `latency` becomes `latency-2`, `config.json` becomes `config-2.json`.
pub fn add_suffix(path: impl AsRef<Path>, suffix: Option<&str>) -> PathBuf {
    let path = path.as_ref();
    let suffix = match suffix {
        Some(suffix) => suffix,
        None => return path.to_path_buf(),
    };
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => {
            format!("{}-{}.{}", stem, suffix, ext.to_string_lossy())
        }
        None => format!("{}-{}", stem, suffix),
    };
    path.with_file_name(name)
}
