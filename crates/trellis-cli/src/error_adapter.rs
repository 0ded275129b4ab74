//! Error adapter for converting TrellisError to miette diagnostics.
//!
//! The library's errors carry no source spans, so every error renders as a
//! single diagnostic with a stable code and, where one helps, a hint.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use trellis::TrellisError;

/// Adapter presenting a [`TrellisError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a TrellisError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TrellisError::Io(_) => "trellis::io",
            TrellisError::NotFound(_) => "trellis::not_found",
            TrellisError::Validation(_) => "trellis::validation",
            TrellisError::Store(_) => "trellis::store",
            TrellisError::Config(_) => "trellis::config",
            TrellisError::Export(_) => "trellis::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            TrellisError::NotFound(_) => "check that every connection target names a node id",
            TrellisError::Validation(_) => {
                "every node needs a non-empty name and job title; job descriptions are only allowed in collaboration diagrams"
            }
            TrellisError::Store(_) => {
                "the document must be TOML with a `kind` and a list of `[[nodes]]`"
            }
            TrellisError::Config(_) => "see the [router], [placement] and [style] config sections",
            TrellisError::Io(_) | TrellisError::Export(_) => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
