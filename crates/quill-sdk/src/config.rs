use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Where a quill instance keeps its data.
///
/// Read from `quill.toml`; every field is optional there and falls back to
/// [`QuillConfig::default`]. The file is never written back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Directory holding the block store.
    pub store_dir: PathBuf,
    /// File holding the current root id.
    pub root_file: PathBuf,
    /// Name given to the root node by `init`.
    pub root_name: String,
    /// Default log filter when `QUILL_LOG` is unset.
    pub log_level: String,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".quill/store"),
            root_file: PathBuf::from(".quill/ROOT"),
            root_name: "root".into(),
            log_level: "info".into(),
        }
    }
}

impl QuillConfig {
    pub const FILE_NAME: &'static str = "quill.toml";

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load `path`, or return the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> SdkResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(SdkError::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        Self::from_toml(&text).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
