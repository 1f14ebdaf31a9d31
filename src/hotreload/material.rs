//! Credential files on disk and the bytes read from them.
//!
//! Layout of the secret directory (normally a mounted secret volume):
//!
//! ```text
//! <root>/etc/hetzner-secret/
//!     hcloud           bearer token for the cloud API
//!     robot-user       basic-auth user for the bare-metal API
//!     robot-password   basic-auth password for the bare-metal API
//! ```
//!
//! Values are trimmed of surrounding whitespace. The same trimming is used
//! for the initial load and for every reload.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CredentialError;

/// File holding the cloud API token.
pub const HCLOUD_TOKEN_FILE: &str = "hcloud";
/// File holding the bare-metal API user name.
pub const ROBOT_USER_FILE: &str = "robot-user";
/// File holding the bare-metal API password.
pub const ROBOT_PASSWORD_FILE: &str = "robot-password";

/// The credential directory below a root directory.
pub fn credentials_directory(root: &Path) -> PathBuf {
    root.join("etc").join("hetzner-secret")
}

/// Raw credential bytes captured from one or more files at one point in time.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialMaterial {
    files: BTreeMap<String, Vec<u8>>,
}

impl CredentialMaterial {
    /// Read `names` from `dir`.
    ///
    /// Every file must exist and be readable; a missing half of a set is an
    /// error, never a partial result.
    pub fn read(dir: &Path, names: &[&str]) -> Result<Self, CredentialError> {
        let mut files = BTreeMap::new();
        for name in names {
            let path = dir.join(name);
            let bytes = std::fs::read(&path).map_err(|err| match err.kind() {
                ErrorKind::NotFound => CredentialError::MissingFile { path: path.clone() },
                _ => CredentialError::Unreadable {
                    path: path.clone(),
                    source: err,
                },
            })?;
            files.insert((*name).to_string(), bytes);
        }
        Ok(Self { files })
    }

    /// Build material from in-memory values (environment overrides, tests).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        Self {
            files: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.as_ref().to_vec()))
                .collect(),
        }
    }

    /// Raw bytes of one file, if present.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Trimmed UTF-8 value of one file.
    ///
    /// Missing, empty and non-UTF-8 values are validation errors.
    pub fn text(&self, name: &str) -> Result<&str, CredentialError> {
        let bytes = self.get(name).ok_or_else(|| CredentialError::MissingFile {
            path: PathBuf::from(name),
        })?;
        let value = std::str::from_utf8(bytes)
            .map_err(|_| CredentialError::InvalidEncoding {
                file: name.to_string(),
            })?
            .trim();
        if value.is_empty() {
            return Err(CredentialError::Empty {
                file: name.to_string(),
            });
        }
        Ok(value)
    }

    /// Names of the files captured.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, bytes) in &self.files {
            map.entry(name, &format_args!("<{} bytes redacted>", bytes.len()));
        }
        map.finish()
    }
}
