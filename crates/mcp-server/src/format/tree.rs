use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MAX_DEPTH: usize = 4;
pub const DEFAULT_MAX_ENTRIES_PER_FOLDER: usize = 30;

const DEPTH_MARKER: &str = "... (depth limit reached)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub max_depth: usize,
    pub max_entries_per_folder: usize,
    /// Case-insensitive substrings; matching paths are dropped.
    pub exclude_patterns: Vec<String>,
    /// Line printed before the fenced block.
    pub header: Option<String>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_entries_per_folder: DEFAULT_MAX_ENTRIES_PER_FOLDER,
            exclude_patterns: Vec::new(),
            header: None,
        }
    }
}

#[derive(Debug, Default)]
struct Folder {
    folders: BTreeMap<String, Folder>,
    files: BTreeSet<String>,
}

impl Folder {
    fn insert(&mut self, segments: &[&str]) {
        match segments {
            [] => {}
            [file] => {
                self.files.insert((*file).to_string());
            }
            [dir, rest @ ..] => self.folders.entry((*dir).to_string()).or_default().insert(rest),
        }
    }
}

enum Entry<'a> {
    Folder(&'a str, &'a Folder),
    File(&'a str),
}

fn case_insensitive(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Render relative paths as an ASCII tree inside a fenced block. Folders come before
/// files at every level, each group sorted ignoring case.
pub fn render_file_tree<I, S>(paths: I, options: &TreeOptions) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let excludes: Vec<String> = options
        .exclude_patterns
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    let mut root = Folder::default();
    for raw in paths {
        let normalized = raw.as_ref().trim().replace('\\', "/");
        let lower = normalized.to_lowercase();
        if excludes.iter().any(|pattern| lower.contains(pattern)) {
            continue;
        }
        let segments: Vec<&str> = normalized
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        root.insert(&segments);
    }

    let mut body = String::new();
    if root.folders.is_empty() && root.files.is_empty() {
        body.push_str("(no files)\n");
    } else {
        render_folder(&root, "", 1, options, &mut body);
    }

    let mut out = String::new();
    if let Some(header) = options.header.as_deref().filter(|h| !h.is_empty()) {
        out.push_str(header);
        out.push('\n');
    }
    out.push_str("```\n");
    out.push_str(&body);
    out.push_str("```");
    out
}

fn render_folder(
    folder: &Folder,
    prefix: &str,
    depth: usize,
    options: &TreeOptions,
    out: &mut String,
) {
    if depth > options.max_depth.max(1) {
        out.push_str(prefix);
        out.push_str("└── ");
        out.push_str(DEPTH_MARKER);
        out.push('\n');
        return;
    }

    let mut folders: Vec<(&String, &Folder)> = folder.folders.iter().collect();
    folders.sort_by(|a, b| case_insensitive(a.0, b.0));
    let mut files: Vec<&String> = folder.files.iter().collect();
    files.sort_by(|a, b| case_insensitive(a, b));

    let mut entries: Vec<Entry<'_>> = folders
        .into_iter()
        .map(|(name, child)| Entry::Folder(name, child))
        .chain(files.into_iter().map(|name| Entry::File(name)))
        .collect();
    let limit = options.max_entries_per_folder.max(1);
    let hidden = entries.len().saturating_sub(limit);
    entries.truncate(limit);

    let lines = entries.len() + usize::from(hidden > 0);
    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == lines;
        let connector = if last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        match entry {
            Entry::Folder(name, child) => {
                out.push_str(name);
                out.push_str("/\n");
                let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
                render_folder(child, &nested, depth + 1, options, out);
            }
            Entry::File(name) => {
                out.push_str(name);
                out.push('\n');
            }
        }
    }
    if hidden > 0 {
        out.push_str(prefix);
        out.push_str(&format!("└── ... ({hidden} more items)\n"));
    }
}
