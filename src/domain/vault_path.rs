//! Helpers for vault-relative paths.
//!
//! Paths are plain strings using `/` as the separator regardless of
//! platform. The empty string denotes the vault root.

/// Normalizes a user-supplied relative path.
///
/// Converts `\` to `/`, strips leading `./` and `/`, collapses repeated
/// separators and drops any trailing separator.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut trimmed = unified.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns the final path component.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the final path component without its extension.
pub fn file_stem(path: &str) -> &str {
    let name = base_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Returns the parent folder, or `""` for entries at the root.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Joins a folder and a name. An empty folder means the root.
pub fn join(folder: &str, name: &str) -> String {
    let folder = normalize(folder);
    let name = normalize(name);
    if folder.is_empty() {
        name
    } else if name.is_empty() {
        folder
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Returns true if `path` lies inside `folder` (at any depth).
///
/// Matching is per component: `Projects` contains `Projects/a.md` but not
/// `ProjectsX/a.md`. The root folder contains every path.
pub fn is_within(path: &str, folder: &str) -> bool {
    let folder = normalize(folder);
    if folder.is_empty() {
        return true;
    }
    let path = normalize(path);
    path == folder
        || path
            .strip_prefix(folder.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns the reason a path is unusable as a store key, if any.
pub fn validate(path: &str) -> Option<&'static str> {
    let normalized = normalize(path);
    if normalized.is_empty() {
        return Some("path is empty");
    }
    if normalized.split('/').any(|seg| seg == "..") {
        return Some("path escapes the vault root");
    }
    None
}
