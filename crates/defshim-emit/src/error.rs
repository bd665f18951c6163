use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use defshim_resolve::ResolveError;

/// Result type for translation of a unit
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors that abort the translation of a compilation unit.
///
/// Symbol clashes are not listed: the name table settles them on its own.
#[derive(Debug, Error, Diagnostic)]
pub enum TranslateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error("`{interface}.super.{signature}` in `{ty}` does not name an inherited default")]
    #[diagnostic(
        code(defshim_emit::unknown_super_default),
        help("`I.super.m()` may only call a default method that `I` declares or inherits")
    )]
    UnknownSuperDefault { ty: String, interface: String, signature: String },

    #[error("Default method `{signature}` of `{interface}` has no body")]
    #[diagnostic(code(defshim_emit::missing_default_body))]
    MissingDefaultBody { interface: String, signature: String },

    #[error("Invalid translation options: {message}")]
    #[diagnostic(code(defshim_emit::options))]
    Options {
        message: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not read options file `{}`", .path.display())]
    #[diagnostic(code(defshim_emit::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
