//! Remote object references.
//!
//! A [`RemoteSource`] is either a URI fetched over the network or a local /
//! opaque path read directly, plus the label it was given on the command line.

mod filename;

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

pub use filename::sanitize_filename_for_linux;

/// Schemes served by the network transport.
const URI_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Where a remote object lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Uri(Url),
    Path(PathBuf),
}

/// A remote object reference and its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    location: Location,
    label: String,
}

impl RemoteSource {
    /// Parse user input. Network URLs become URIs, `file://` URLs and
    /// everything else are treated as local paths.
    pub fn parse(input: &str) -> Self {
        let location = match Url::parse(input) {
            Ok(url) if URI_SCHEMES.contains(&url.scheme()) => Location::Uri(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Location::Path(path),
                Err(()) => Location::Path(PathBuf::from(input)),
            },
            _ => Location::Path(PathBuf::from(input)),
        };
        Self {
            location,
            label: input.to_string(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self {
            location: Location::Path(path),
            label,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_uri(&self) -> bool {
        matches!(self.location, Location::Uri(_))
    }

    pub fn url(&self) -> Option<&Url> {
        match &self.location {
            Location::Uri(url) => Some(url),
            Location::Path(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::Path(p) => Some(p),
            Location::Uri(_) => None,
        }
    }

    /// Safe local filename for the fetched object.
    pub fn file_name(&self) -> String {
        let raw = match &self.location {
            Location::Uri(url) => filename::last_url_segment(url),
            Location::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        };
        filename::finish(raw)
    }
}

impl fmt::Display for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
