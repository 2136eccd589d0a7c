//! Vault-path helpers.
//!
//! Note and attachment paths are `/`-separated strings supplied by the host,
//! not OS paths, so these operate on strings directly.

/// Returns the last path segment.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Returns the extension of the last segment, without the leading dot.
/// Dotfiles such as `.gitignore` have no extension.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(i) if i > 0 => &name[i + 1..],
        _ => "",
    }
}

/// Returns the last path segment with its extension removed.
pub fn file_base_name(path: &str) -> &str {
    let name = file_name(path);
    let ext = extension(path);
    if ext.is_empty() {
        name
    } else {
        &name[..name.len() - ext.len() - 1]
    }
}

/// Returns everything before the last `/`, or `"."` when there is none.
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => ".",
    }
}

/// Maps the `"."` placeholder for "no folder" to an empty string.
pub fn dot_to_empty(s: &str) -> &str {
    if s == "." {
        ""
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_nested_paths() {
        assert_eq!(file_name("notes/daily/2024-01-01.md"), "2024-01-01.md");
        assert_eq!(file_base_name("notes/daily/2024-01-01.md"), "2024-01-01");
        assert_eq!(extension("notes/daily/2024-01-01.md"), "md");
        assert_eq!(parent_path("notes/daily/2024-01-01.md"), "notes/daily");
    }

    #[test]
    fn handles_bare_names() {
        assert_eq!(file_base_name("note.md"), "note");
        assert_eq!(dot_to_empty(parent_path("note.md")), "");
    }

    #[test]
    fn handles_missing_extension() {
        assert_eq!(extension("folder/README"), "");
        assert_eq!(file_base_name("folder/README"), "README");
        assert_eq!(extension(".gitignore"), "");
    }

    #[test]
    fn handles_multiple_dots() {
        assert_eq!(extension("a/archive.tar.gz"), "gz");
        assert_eq!(file_base_name("a/archive.tar.gz"), "archive.tar");
    }
}
