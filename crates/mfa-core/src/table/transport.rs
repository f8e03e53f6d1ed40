//! Retrieval of the raw table bytes.
//!
//! Remote tables are fetched with a single blocking GET (libcurl via the curl
//! crate); local tables are opened from disk. Runs in the current thread; call
//! from `spawn_blocking` when used from async code.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ArchiveError;

/// Where the table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Remote(url::Url),
    Local(PathBuf),
}

impl Locator {
    /// `http://` and `https://` strings are remote; anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        match url::Url::parse(raw) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Locator::Remote(u),
            _ => Locator::Local(PathBuf::from(raw)),
        }
    }

    /// Open a byte stream over the table.
    pub(crate) fn open(&self) -> Result<Box<dyn Read + Send>, ArchiveError> {
        match self {
            Locator::Remote(u) => {
                let body = http_get(u.as_str())?;
                Ok(Box::new(Cursor::new(body)))
            }
            Locator::Local(p) => {
                let f = File::open(p)
                    .map_err(|e| ArchiveError::transport(&p.display().to_string(), e))?;
                Ok(Box::new(f))
            }
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Remote(u) => write!(f, "{}", u),
            Locator::Local(p) => write!(f, "{}", p.display()),
        }
    }
}

/// GET `url`, following redirects; non-2xx is a transport failure.
fn http_get(url: &str) -> Result<Vec<u8>, ArchiveError> {
    let fail = |e: curl::Error| ArchiveError::transport(url, e);
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(fail)?;
    easy.follow_location(true).map_err(fail)?;
    easy.connect_timeout(Duration::from_secs(15)).map_err(fail)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(fail)?;
        transfer.perform().map_err(fail)?;
    }

    let code = easy.response_code().map_err(fail)?;
    if !(200..300).contains(&code) {
        return Err(ArchiveError::transport(url, format!("HTTP {}", code)));
    }
    tracing::debug!(url, bytes = body.len(), "fetched job table");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_is_remote() {
        match Locator::parse("https://example.com/all-locations.csv") {
            Locator::Remote(u) => assert_eq!(u.host_str(), Some("example.com")),
            other => panic!("expected Remote, got {:?}", other),
        }
    }

    #[test]
    fn paths_are_local() {
        assert_eq!(
            Locator::parse("data/table.csv"),
            Locator::Local(PathBuf::from("data/table.csv"))
        );
        assert_eq!(
            Locator::parse("/tmp/table.csv"),
            Locator::Local(PathBuf::from("/tmp/table.csv"))
        );
    }

    #[test]
    fn other_schemes_are_local() {
        assert!(matches!(Locator::parse("ftp://host/t.csv"), Locator::Local(_)));
    }

    #[test]
    fn missing_local_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let loc = Locator::Local(dir.path().join("absent.csv"));
        let err = loc.open().err().expect("open must fail");
        assert!(err.is_transport());
    }

    #[test]
    fn unreachable_remote_is_transport_error() {
        // Port 9 on localhost is not expected to serve HTTP.
        let loc = Locator::parse("http://127.0.0.1:9/table.csv");
        let err = loc.open().err().expect("GET must fail");
        assert!(err.is_transport());
    }
}
