use regex::Regex;

/* ============================ Ignore patterns ============================== */

/// Compiled fnmatch-style ignore patterns.
///
/// A pattern matches when it matches either an entry's file name or its
/// root-relative path (forward slashes), so `node_modules` prunes a folder
/// anywhere in the tree while `docs/*.md` targets one subtree.
#[derive(Debug, Default)]
pub struct IgnoreSet {
    rules: Vec<Regex>,
}

impl IgnoreSet {
    #[must_use]
    pub fn compile(patterns: &[String]) -> Self {
        let mut rules = Vec::new();
        for raw in patterns {
            let pat = raw.trim();
            if pat.is_empty() {
                continue;
            }
            match Regex::new(&glob_to_regex(pat)) {
                Ok(re) => rules.push(re),
                Err(e) => log::warn!("ignoring unusable pattern '{pat}': {e}"),
            }
        }
        Self { rules }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn matches(&self, rel_path: &str, file_name: &str) -> bool {
        self.rules
            .iter()
            .any(|re| re.is_match(file_name) || re.is_match(rel_path))
    }
}

/// Translate one fnmatch glob (`*`, `?`, `[seq]`, `[!seq]`) into an anchored
/// regex. Everything else is matched literally; an unterminated or empty
/// bracket is taken as a literal `[`.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut re = String::with_capacity(glob.len() + 8);
    re.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i + 1);
                match close {
                    Some(end) if end > i + 1 => {
                        re.push('[');
                        let mut j = i + 1;
                        if chars[j] == '!' {
                            re.push('^');
                            j += 1;
                        }
                        while j < end {
                            if chars[j] == '\\' {
                                re.push_str("\\\\");
                            } else {
                                re.push(chars[j]);
                            }
                            j += 1;
                        }
                        re.push(']');
                        i = end;
                    }
                    _ => re.push_str(&regex::escape("[")),
                }
            }
            c => re.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    re.push('$');
    re
}
