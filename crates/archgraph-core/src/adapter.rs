//! Language adapter trait.
//!
//! A [`LanguageAdapter`] teaches the pipeline two things about a language:
//! how a root-relative path names a module, and how one file's text becomes
//! [`ModuleFacts`]. Everything after extraction (aggregation, resolution,
//! graph building) is language-agnostic.
//!
//! # Contract
//!
//! - `extract` reads nothing but its arguments. It runs on worker threads
//!   with no ordering guarantee, so adapters must be `Sync`.
//! - Facts come back unresolved: every [`crate::facts::Reference`] holds the
//!   raw text only.
//! - A file that is not valid source is an error the pipeline turns into a
//!   warning. An error reporting [`ExtractFailure::is_fatal`] aborts the run
//!   instead, since it means the adapter itself cannot work.

use crate::facts::ModuleFacts;
use crate::workspace::ModuleIdentity;

/// Per-file extraction error reported back to the pipeline.
pub trait ExtractFailure: std::error::Error + Send + Sync + 'static {
    /// 1-based line the failure points at, if any.
    fn line(&self) -> Option<u32> {
        None
    }

    /// Whether the adapter is unusable, as opposed to this one file being bad.
    fn is_fatal(&self) -> bool {
        false
    }
}

pub trait LanguageAdapter: Sync {
    /// The error type for this adapter.
    type Error: ExtractFailure;

    /// Language name for logs and reports.
    fn language(&self) -> &'static str;

    /// Source file extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Module identity of a root-relative path, or `None` if the file cannot
    /// be named as a module.
    fn module_identity(&self, relative_path: &str) -> Option<ModuleIdentity>;

    /// Extract the facts of one file.
    fn extract(
        &self,
        identity: &ModuleIdentity,
        relative_path: &str,
        text: &str,
    ) -> Result<ModuleFacts, Self::Error>;
}
