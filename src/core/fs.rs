use crate::core::{IgnoreSet, Node, Profile};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

/* =========================== Filesystem & paths ============================ */

#[must_use]
pub fn path_to_unix(p: &Path) -> String {
    let mut s = String::new();
    let mut first = true;

    for comp in p {
        if !first {
            s.push('/');
        }
        first = false;

        let comp_str = comp.to_string_lossy();

        // Handle UNC paths on Windows
        #[cfg(windows)]
        if comp_str == "\\" && s.is_empty() {
            continue;
        }

        s.push_str(&comp_str);
    }

    // Convert \\server\share to //server/share so UNC roots stay recognizable
    #[cfg(windows)]
    if let Some(path_str) = p.to_str()
        && path_str.starts_with(r"\\")
        && !path_str.starts_with(r"\\?")
    {
        return path_str.replace('\\', "/");
    }

    s
}

#[must_use]
pub fn unix_to_path(s: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(s.replace('/', "\\"))
    } else {
        PathBuf::from(s)
    }
}

fn rel_unix(root: &Path, p: &Path) -> String {
    p.strip_prefix(root)
        .map_or_else(|_| path_to_unix(p), path_to_unix)
}

/* ============================== Tree scanning ============================== */

/// Scan one root folder into a tree, pruning everything the ignore set
/// matches (by file name or root-relative path).
#[must_use]
pub fn scan_root_to_node(root: &Path, ignores: &IgnoreSet) -> Node {
    scan_rec(root, root, ignores)
}

fn scan_rec(dir: &Path, root: &Path, ignores: &IgnoreSet) -> Node {
    let name = dir.file_name().map_or_else(
        || dir.to_string_lossy().to_string(),
        |os| os.to_string_lossy().to_string(),
    );

    let mut node = Node {
        name,
        path: dir.to_path_buf(),
        is_dir: true,
        children: Vec::new(),
        expanded: true,
        has_children: false,
    };

    let (mut files, mut dirs) = gather_dir_entries(dir, root, ignores);
    files.sort_by(|a, b| a.0.cmp(&b.0));
    dirs.sort_by(|a, b| a.0.cmp(&b.0));

    node.children.reserve(files.len() + dirs.len());

    for (basename, path) in files {
        node.has_children = true;
        node.children.push(Node {
            name: basename,
            path,
            is_dir: false,
            children: Vec::new(),
            expanded: false,
            has_children: false,
        });
    }

    for (_basename, path) in dirs {
        let child = scan_rec(&path, root, ignores);
        node.has_children = node.has_children || !child.children.is_empty() || child.has_children;
        node.children.push(child);
    }

    node
}

type NamePath = (String, PathBuf);

fn gather_dir_entries(
    dir: &Path,
    root: &Path,
    ignores: &IgnoreSet,
) -> (Vec<NamePath>, Vec<NamePath>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return (Vec::new(), Vec::new());
    };

    let mut dirs: Vec<NamePath> = Vec::new();
    let mut files: Vec<NamePath> = Vec::new();

    for ent in entries.flatten() {
        let path = ent.path();
        let base: String = ent.file_name().to_string_lossy().into_owned();

        if ignores.matches(&rel_unix(root, &path), &base) {
            continue;
        }

        let is_dir = ent.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push((base, path));
        } else {
            files.push((base, path));
        }
    }

    (files, dirs)
}

/// Scan every usable root folder of a profile. Folders whose cached access
/// is flagged as a warning are left out (the UI renders them with an
/// indicator instead), and roots resolving to the same real directory are
/// scanned once.
#[must_use]
pub fn scan_profile_roots(profile: &Profile, ignores: &IgnoreSet) -> Vec<Node> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::new();

    for rf in &profile.root_folders {
        if rf.access.state.is_warning() {
            continue;
        }
        let path = unix_to_path(&rf.path);
        if !path.is_dir() {
            continue;
        }
        let real = dunce::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !visited.insert(real) {
            continue;
        }
        out.push(scan_root_to_node(&path, ignores));
    }

    out
}

/* ============================ Selection state ============================== */

/// Explicit per-path checks from the profile, keyed by absolute path.
#[must_use]
pub fn selection_map(profile: &Profile) -> HashMap<PathBuf, bool> {
    profile
        .selections
        .iter()
        .map(|s| (unix_to_path(&s.path), s.state))
        .collect()
}

/// Walk a tree collecting checked files, with directory states inherited by
/// descendants unless overridden by an explicit check.
pub fn collect_selected_paths<T: ::std::hash::BuildHasher>(
    node: &Node,
    explicit: &HashMap<PathBuf, bool, T>,
    inherited: Option<bool>,
    files_out: &mut Vec<PathBuf>,
    dirs_out: &mut Vec<PathBuf>,
) {
    let my_effective = explicit
        .get(&node.path)
        .copied()
        .or(inherited)
        .unwrap_or(false);

    if node.is_dir {
        if my_effective && node.has_children {
            dirs_out.push(node.path.clone());
        }
        for c in &node.children {
            collect_selected_paths(c, explicit, Some(my_effective), files_out, dirs_out);
        }
    } else if my_effective {
        files_out.push(node.path.clone());
    }
}

/// Checked files across all scanned roots, in tree order.
#[must_use]
pub fn collect_selected_files<T: ::std::hash::BuildHasher>(
    roots: &[Node],
    explicit: &HashMap<PathBuf, bool, T>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for root in roots {
        collect_selected_paths(root, explicit, None, &mut files, &mut dirs);
    }
    files
}

/// Every file under the scanned roots, for whole-tree exports.
#[must_use]
pub fn collect_all_files(roots: &[Node]) -> Vec<PathBuf> {
    fn rec(n: &Node, out: &mut Vec<PathBuf>) {
        if n.is_dir {
            for c in &n.children {
                rec(c, out);
            }
        } else {
            out.push(n.path.clone());
        }
    }

    let mut out = Vec::new();
    for root in roots {
        rec(root, &mut out);
    }
    out
}
