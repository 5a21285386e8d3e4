use regex::Regex;
use std::{
    io,
    path::{Path, PathBuf},
};

use crate::core::{MetaPrompt, Node, Profile, path_to_unix};

/* ============================= Tree rendering ============================== */

/// Render scanned roots as a unicode box-drawing tree. Each root starts at
/// column zero with its full path; children follow the scanner's order.
#[must_use]
pub fn render_file_tree(roots: &[Node]) -> String {
    let mut out = String::new();
    for (i, root) in roots.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&path_to_unix(&root.path));
        out.push('\n');
        let mut prefix = String::new();
        render_children(root, &mut prefix, &mut out);
    }
    out
}

fn render_children(node: &Node, prefix: &mut String, out: &mut String) {
    let len = node.children.len();
    for (idx, child) in node.children.iter().enumerate() {
        let last = idx + 1 == len;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.name);
        out.push('\n');

        if child.is_dir && !child.children.is_empty() {
            let saved = prefix.len();
            prefix.push_str(if last { "    " } else { "│   " });
            render_children(child, prefix, out);
            prefix.truncate(saved);
        }
    }
}

/* ============================== File reading =============================== */

/// Read a file as text, degrading to lossy UTF-8 for odd encodings instead
/// of failing the whole export.
pub fn read_file_with_fallback(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/* ============================ Comment stripping ============================ */

fn comment_patterns_for_ext(ext: &str) -> &'static [&'static str] {
    match ext {
        "py" => &[r"(?m)#.*$", "(?s)\"\"\".*?\"\"\"", r"(?s)'''.*?'''"],
        "js" | "ts" | "java" | "c" | "cpp" | "h" | "cs" | "go" | "rs" | "swift" | "kt" => {
            &[r"(?m)//.*$", r"(?s)/\*.*?\*/"]
        }
        "php" => &[r"(?m)//.*$", r"(?m)#.*$", r"(?s)/\*.*?\*/"],
        "sh" | "bash" | "rb" | "yaml" | "yml" | "toml" => &[r"(?m)#.*$"],
        "sql" | "lua" => &[r"(?m)--.*$"],
        "html" | "xml" => &[r"(?s)<!--.*?-->"],
        _ => &[],
    }
}

/// Remove comments from source text based on its file extension. Unknown
/// extensions pass through untouched.
#[must_use]
pub fn strip_comments_for_ext(code: &str, ext: &str) -> String {
    let patterns = comment_patterns_for_ext(ext);
    if patterns.is_empty() {
        return code.to_string();
    }

    let mut out = code.to_string();
    for pat in patterns {
        if let Ok(re) = Regex::new(pat) {
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out
}

#[must_use]
pub fn collapse_consecutive_blank_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_blank = false;
    for line in s.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && prev_blank {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        prev_blank = is_blank;
    }
    if !s.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    out
}

/* ============================ Blob composition ============================= */

fn language_tag(path: &Path) -> &str {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("txt")
}

/// One `File: <path>` block per file, contents fenced with the extension as
/// the language tag. A file that can't be read contributes an error marker
/// inside its fence rather than aborting the export.
#[must_use]
pub fn build_file_contents(files: &[PathBuf], strip_comments: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    for path in files {
        let ext = language_tag(path);
        lines.push(format!("File: {}", path_to_unix(path)));
        lines.push(format!("```{ext}"));
        match read_file_with_fallback(path) {
            Ok(content) => {
                if strip_comments {
                    lines.push(strip_comments_for_ext(&content, ext));
                } else {
                    lines.push(content);
                }
            }
            Err(e) => lines.push(format!("<Error reading file: {e}>")),
        }
        lines.push("```".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Enabled meta prompts, numbered in order of appearance.
#[must_use]
pub fn build_meta_prompts_text(prompts: &[MetaPrompt]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut idx = 1;

    for p in prompts.iter().filter(|p| p.enabled) {
        lines.push(format!("<meta prompt {idx}=\"{}\">", p.title));
        lines.push(p.text.clone());
        lines.push(format!("</meta prompt {idx}>"));
        idx += 1;
    }

    lines.join("\n")
}

#[must_use]
pub fn compose_context_blob(
    file_tree: &str,
    file_contents: &str,
    meta_prompts: &str,
    user_instructions: &str,
) -> String {
    format!(
        "<file_tree>\n{file_tree}\n</file_tree>\n\n\
         <file_contents>\n{file_contents}\n</file_contents>\n\n\
         {meta_prompts}\n\
         <user_instructions>\n{user_instructions}\n</user_instructions>\n"
    )
}

/// The full export: tree of the scanned roots, contents of the selected
/// files, plus the profile's enabled meta prompts and instructions.
#[must_use]
pub fn build_context_blob(profile: &Profile, roots: &[Node], files: &[PathBuf]) -> String {
    let tree = render_file_tree(roots);
    let contents = build_file_contents(files, profile.strip_comments);
    let meta = build_meta_prompts_text(&profile.meta_prompts);
    compose_context_blob(&tree, &contents, &meta, &profile.user_instructions)
}
