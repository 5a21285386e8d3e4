use std::path::Path;

use serde::{Deserialize, Serialize};

/* ============================ Path risk classes ============================ */

/// How likely touching a root folder path is to hang the process.
///
/// `Unknown` covers paths that are flagged risky without being recognizably
/// network-backed: overlong paths and paths that don't exist locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PathClass {
    Local,
    NetworkShare,
    FtpLike,
    #[default]
    Unknown,
}

/// Paths longer than this are treated as risky even when they look local.
pub const DEFAULT_PATH_LENGTH_LIMIT: usize = 200;

const FTP_SCHEMES: [&str; 3] = ["ftp://", "sftp://", "ftps://"];

/// Classify a root folder path without touching the network.
///
/// Priority: FTP-family scheme, then UNC shape, then length, then local
/// existence. The existence check is local-filesystem only; scheme and UNC
/// paths return before any filesystem call is made.
#[must_use]
pub fn classify_path(path: &str, length_limit: usize) -> PathClass {
    let trimmed = path.trim();

    let lower = trimmed.to_lowercase();
    if FTP_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return PathClass::FtpLike;
    }

    if has_unc_shape(trimmed) {
        return PathClass::NetworkShare;
    }

    if trimmed.chars().count() > length_limit {
        return PathClass::Unknown;
    }

    if trimmed.is_empty() || !Path::new(trimmed).exists() {
        return PathClass::Unknown;
    }

    PathClass::Local
}

/// Leading double separator followed by a host segment, e.g. `\\nas\share`
/// or `//nas/share`. A third separator in front (`\\\x`) is not a host.
fn has_unc_shape(path: &str) -> bool {
    let rest = if let Some(r) = path.strip_prefix(r"\\") {
        r
    } else if let Some(r) = path.strip_prefix("//") {
        r
    } else {
        return false;
    };

    rest.chars().next().is_some_and(|c| c != '\\' && c != '/')
}

/// Everything except `Local` gets the bounded probe before use.
#[must_use]
pub const fn is_risky(class: PathClass) -> bool {
    !matches!(class, PathClass::Local)
}
