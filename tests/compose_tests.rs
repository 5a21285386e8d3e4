use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tether::core::{
    IgnoreSet, MetaPrompt, Profile, RootFolder, build_context_blob, build_file_contents,
    build_meta_prompts_text, collapse_consecutive_blank_lines, compose_context_blob, path_to_unix,
    read_file_with_fallback, scan_profile_roots, strip_comments_for_ext,
};

#[test]
fn blob_blocks_appear_in_the_fixed_order() {
    let blob = compose_context_blob("TREE", "CONTENTS", "<meta prompt 1=\"m\">\nx\n</meta prompt 1>", "do it");
    let expected = "<file_tree>\nTREE\n</file_tree>\n\n\
                    <file_contents>\nCONTENTS\n</file_contents>\n\n\
                    <meta prompt 1=\"m\">\nx\n</meta prompt 1>\n\
                    <user_instructions>\ndo it\n</user_instructions>\n";
    assert_eq!(blob, expected);
}

#[test]
fn file_contents_fences_each_file_with_its_extension() {
    let tmp = TempDir::new().unwrap();
    let rs = tmp.path().join("lib.rs");
    let no_ext = tmp.path().join("Makefile");
    fs::write(&rs, "pub fn x() {}\n").unwrap();
    fs::write(&no_ext, "all:\n\ttrue\n").unwrap();

    let out = build_file_contents(&[rs.clone(), no_ext.clone()], false);
    let expected = format!(
        "File: {}\n```rs\npub fn x() {{}}\n\n```\n\nFile: {}\n```txt\nall:\n\ttrue\n\n```\n",
        path_to_unix(&rs),
        path_to_unix(&no_ext)
    );
    assert_eq!(out, expected);
}

#[test]
fn unreadable_file_contributes_an_error_marker() {
    let tmp = TempDir::new().unwrap();
    let gone = tmp.path().join("gone.rs");

    let out = build_file_contents(&[gone], false);
    assert!(out.contains("```rs\n<Error reading file:"), "{out}");
    // The fence still closes so the rest of the blob stays well-formed.
    assert!(out.trim_end().ends_with("```"), "{out}");
}

#[test]
fn meta_prompts_number_only_the_enabled_ones() {
    let prompts = vec![
        MetaPrompt {
            title: "First".to_string(),
            text: "alpha".to_string(),
            enabled: true,
        },
        MetaPrompt {
            title: "Disabled".to_string(),
            text: "hidden".to_string(),
            enabled: false,
        },
        MetaPrompt {
            title: "Second".to_string(),
            text: "beta".to_string(),
            enabled: true,
        },
    ];

    let out = build_meta_prompts_text(&prompts);
    let expected = "<meta prompt 1=\"First\">\nalpha\n</meta prompt 1>\n\
                    <meta prompt 2=\"Second\">\nbeta\n</meta prompt 2>";
    assert_eq!(out, expected);
    assert!(!out.contains("hidden"));
}

#[test]
fn comment_stripping_follows_the_extension() {
    let rs = "fn main() {\n    // say hi\n    println!(\"hi\"); /* inline */\n}\n";
    let stripped = strip_comments_for_ext(rs, "rs");
    assert!(!stripped.contains("say hi"));
    assert!(!stripped.contains("inline"));
    assert!(stripped.contains("println!"));

    let py = "x = 1  # counter\ny = 2\n";
    let stripped = strip_comments_for_ext(py, "py");
    assert!(!stripped.contains("counter"));
    assert!(stripped.contains("y = 2"));

    // Unknown extensions pass through untouched.
    let md = "# heading\nbody\n";
    assert_eq!(strip_comments_for_ext(md, "md"), md);
}

#[test]
fn lossy_read_survives_invalid_utf8() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("latin1.txt");
    fs::write(&path, b"caf\xe9 au lait\n").unwrap();

    let text = read_file_with_fallback(&path).unwrap();
    assert!(text.contains("caf"));
    assert!(text.contains("au lait"));
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn collapse_consecutive_blank_lines_keeps_single_spacers() {
    let s = "a\n\n\nb\n\nc\n";
    assert_eq!(collapse_consecutive_blank_lines(s), "a\n\nb\n\nc\n");
}

#[test]
fn full_blob_build_from_a_profile() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.rs"), "fn main() {}\n").unwrap();

    let profile = Profile {
        name: "p".to_string(),
        root_folders: vec![RootFolder::new(path_to_unix(tmp.path()))],
        user_instructions: "Review this.".to_string(),
        meta_prompts: vec![MetaPrompt {
            title: "Tone".to_string(),
            text: "Be terse.".to_string(),
            enabled: true,
        }],
        ..Profile::default()
    };

    let roots = scan_profile_roots(&profile, &IgnoreSet::default());
    let files = tether::core::collect_all_files(&roots);
    let blob = build_context_blob(&profile, &roots, &files);

    assert!(blob.starts_with("<file_tree>\n"));
    assert!(blob.contains("└── main.rs"));
    assert!(blob.contains("File: "));
    assert!(blob.contains("```rs\nfn main() {}\n\n```"));
    assert!(blob.contains("<meta prompt 1=\"Tone\">\nBe terse.\n</meta prompt 1>"));
    assert!(blob.trim_end().ends_with("</user_instructions>"));
}
