// src/options.rs
//! Translation options, loadable from a TOML document.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{TranslateError, TranslateResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationOptions {
    /// Drop runtime reflection metadata. Shim, function and companion
    /// emission are unaffected.
    pub strip_reflection: bool,

    /// Name of the explicit receiver parameter of functionalized methods.
    pub receiver_name: String,

    /// Prefix of shim parameter names (`arg0`, `arg1`, ...).
    pub shim_param_prefix: String,

    /// Source type name to target name, used when building selectors.
    pub type_renames: FxHashMap<String, String>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            strip_reflection: false,
            receiver_name: "self".to_string(),
            shim_param_prefix: "arg".to_string(),
            type_renames: default_type_renames(),
        }
    }
}

pub fn default_type_renames() -> FxHashMap<String, String> {
    [("java.lang.String", "NSString"), ("java.lang.Object", "Id")]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

impl TranslationOptions {
    /// Parses options from TOML. Missing keys keep their defaults; a
    /// `type_renames` table replaces the default renames entirely.
    pub fn from_toml_str(content: &str) -> TranslateResult<Self> {
        toml::from_str(content).map_err(|source| TranslateError::Options {
            message: source.message().to_string(),
            source,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> TranslateResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| TranslateError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn with_strip_reflection(mut self, strip: bool) -> Self {
        self.strip_reflection = strip;
        self
    }

    /// The target name for a source type name, if it is renamed.
    pub fn rename(&self, name: &str) -> Option<&str> {
        self.type_renames.get(name).map(String::as_str)
    }
}
