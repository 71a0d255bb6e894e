//! Name normalization for folders, entities, and actions
//!
//! Every helper is a total function over its input; the only one that
//! touches the file system is [`case_corrected_path`], which consults
//! directory listings to repair segment casing.

use std::path::{Component, Path, PathBuf};

/// Derive a folder-safe PascalCase name from a free-form platform name.
/// Words are split on runs of non-alphanumeric characters; each word keeps
/// its own tail casing.
pub fn to_pascal_case(input: &str) -> String {
    input
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Sanitize a common model or enum name. The `::` namespace separator
/// survives as `_`; every other non-alphanumeric character is stripped.
pub fn format_common_name(input: &str) -> String {
    input
        .split("::")
        .map(|part| {
            part.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Kebab-case a human-readable name: camel boundaries and runs of
/// non-alphanumeric characters become single dashes, everything lowercases.
pub fn to_kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_lower_or_digit = false;
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            if c.is_ascii_uppercase() && prev_lower_or_digit && !out.is_empty() {
                out.push('-');
            }
            prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
            prev_lower_or_digit = false;
        }
    }

    out
}

/// Local folder name for an action: kebab-cased display name joined with
/// the last six characters of the remote identifier. The suffix keeps
/// folders unique across actions that share a display name.
pub fn action_folder_name(name: &str, id: &str) -> String {
    let suffix: String = {
        let chars: Vec<char> = id.chars().collect();
        let start = chars.len().saturating_sub(6);
        chars[start..].iter().collect()
    };
    format!("{}-{}", to_kebab_case(name), suffix)
}

/// Make a remote model name safe as a single path segment. `:` and `/`
/// carry namespacing in remote names and map to `_` locally.
pub fn sanitize_path_component(input: &str) -> String {
    input.replace([':', '/'], "_")
}

/// Resolve each path segment against the actual on-disk casing via
/// case-insensitive directory lookups. Segments with no match (and
/// non-normal components) pass through unchanged.
pub fn case_corrected_path(input: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in input.components() {
        match component {
            Component::Normal(segment) => {
                let lookup_dir = if result.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    result.as_path()
                };
                let wanted = segment.to_string_lossy();
                let matched = std::fs::read_dir(lookup_dir).ok().and_then(|entries| {
                    entries
                        .filter_map(|entry| entry.ok())
                        .map(|entry| entry.file_name())
                        .find(|name| name.to_string_lossy().eq_ignore_ascii_case(&wanted))
                });
                match matched {
                    Some(actual) => result.push(actual),
                    None => result.push(segment),
                }
            }
            other => result.push(other.as_os_str()),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_strips_and_capitalizes() {
        assert_eq!(to_pascal_case("my shopify store"), "MyShopifyStore");
        assert_eq!(to_pascal_case("quick-books!"), "QuickBooks");
        assert_eq!(to_pascal_case("  hubspot  "), "Hubspot");
        assert_eq!(to_pascal_case("v2 API"), "V2API");
    }

    #[test]
    fn common_name_keeps_namespace_separator_as_underscore() {
        assert_eq!(format_common_name("Foo::Bar"), "Foo_Bar");
        assert_eq!(format_common_name("Bar Baz!"), "BarBaz");
        assert_eq!(format_common_name("Foo::Bar Baz!"), "Foo_BarBaz");
        assert_eq!(format_common_name("a::b::c"), "a_b_c");
    }

    #[test]
    fn kebab_case_handles_spaces_and_camel_boundaries() {
        assert_eq!(to_kebab_case("Get Records"), "get-records");
        assert_eq!(to_kebab_case("updateRecord"), "update-record");
        assert_eq!(to_kebab_case("Get  All/Records"), "get-all-records");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
    }

    #[test]
    fn action_folder_name_appends_id_suffix() {
        assert_eq!(
            action_folder_name("Get Records", "64f0a1b2c3d4e5f6a7b8c9d0"),
            "get-records-b8c9d0"
        );
        // Short ids are used whole
        assert_eq!(action_folder_name("List", "abc"), "list-abc");
    }

    #[test]
    fn path_components_replace_namespace_characters() {
        assert_eq!(sanitize_path_component("sales::Order"), "sales__Order");
        assert_eq!(sanitize_path_component("a/b:c"), "a_b_c");
        assert_eq!(sanitize_path_component("plain"), "plain");
    }

    #[test]
    fn case_corrected_path_repairs_segment_casing() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Platforms").join("Shopify")).unwrap();

        let wrong = dir.path().join("platforms").join("shopify");
        let corrected = case_corrected_path(&wrong);
        assert_eq!(corrected, dir.path().join("Platforms").join("Shopify"));

        // unknown segments pass through unchanged
        let missing = dir.path().join("platforms").join("unknown");
        let corrected = case_corrected_path(&missing);
        assert_eq!(corrected, dir.path().join("Platforms").join("unknown"));
    }
}
