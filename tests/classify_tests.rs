use tether::core::{DEFAULT_PATH_LENGTH_LIMIT, PathClass, classify_path, is_risky};

use tempfile::TempDir;

#[test]
fn ftp_family_schemes_classify_as_ftp_like() {
    for path in [
        "ftp://server/share",
        "sftp://server/share",
        "ftps://server/share",
    ] {
        assert_eq!(
            classify_path(path, DEFAULT_PATH_LENGTH_LIMIT),
            PathClass::FtpLike,
            "{path}"
        );
    }
}

#[test]
fn ftp_scheme_detection_ignores_case() {
    for path in ["FTP://server/x", "Sftp://server/x", "fTpS://server/x"] {
        assert_eq!(
            classify_path(path, DEFAULT_PATH_LENGTH_LIMIT),
            PathClass::FtpLike,
            "{path}"
        );
    }
}

#[test]
fn scheme_beats_every_other_rule() {
    // Overlong and clearly nonexistent, but the scheme decides first.
    let long_tail = "x".repeat(400);
    let path = format!("ftp://host/{long_tail}");
    assert_eq!(
        classify_path(&path, DEFAULT_PATH_LENGTH_LIMIT),
        PathClass::FtpLike
    );
}

#[test]
fn unc_paths_classify_as_network_share() {
    assert_eq!(
        classify_path(r"\\nas\projects", DEFAULT_PATH_LENGTH_LIMIT),
        PathClass::NetworkShare
    );
    assert_eq!(
        classify_path("//nas/projects", DEFAULT_PATH_LENGTH_LIMIT),
        PathClass::NetworkShare
    );
}

#[test]
fn double_separator_without_host_is_not_a_share() {
    // A third separator means there is no host segment.
    for path in [r"\\\broken", "///broken", r"\\", "//"] {
        assert_ne!(
            classify_path(path, DEFAULT_PATH_LENGTH_LIMIT),
            PathClass::NetworkShare,
            "{path}"
        );
    }
}

#[test]
fn overlong_path_is_unknown_even_when_plausible() {
    let path = format!("/tmp/{}", "a".repeat(300));
    assert_eq!(classify_path(&path, 200), PathClass::Unknown);
}

#[test]
fn length_limit_is_configurable() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().to_string_lossy().to_string();

    // Same existing path flips to risky when the limit shrinks below it.
    assert_eq!(classify_path(&path, 4096), PathClass::Local);
    assert_eq!(classify_path(&path, 1), PathClass::Unknown);
}

#[test]
fn existing_local_directory_is_local() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().to_string_lossy().to_string();
    let class = classify_path(&path, DEFAULT_PATH_LENGTH_LIMIT);
    assert_eq!(class, PathClass::Local);
    assert!(!is_risky(class));
}

#[test]
fn missing_path_is_unknown() {
    assert_eq!(
        classify_path("/definitely/not/here/today", DEFAULT_PATH_LENGTH_LIMIT),
        PathClass::Unknown
    );
    assert_eq!(classify_path("", DEFAULT_PATH_LENGTH_LIMIT), PathClass::Unknown);
}

#[test]
fn everything_but_local_is_risky() {
    assert!(is_risky(PathClass::FtpLike));
    assert!(is_risky(PathClass::NetworkShare));
    assert!(is_risky(PathClass::Unknown));
    assert!(!is_risky(PathClass::Local));
}
