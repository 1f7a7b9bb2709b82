// ─── Reference Expansion ───
// Turns the raw reference blob into individual tokens. `@path` lines pull
// in a secondary list (one level only, not recursive).

use std::path::PathBuf;

use tracing::debug;

use crate::core::error::ModError;

/// Result of expanding a reference blob.
#[derive(Debug, Default)]
pub struct ExpandedReferences {
    /// Tokens in input order.
    pub references: Vec<String>,
    /// `@path` includes that could not be read, with the reason.
    pub unreadable: Vec<(String, ModError)>,
}

/// Split the blob into tokens.
///
/// - blank lines and `#` lines are dropped
/// - a `#` token ends the line (trailing comment)
/// - other lines are split on whitespace
/// - `@path` lines are replaced by the tokens of `path`, read with the same
///   comment rules but never expanded further
pub async fn expand_references(input: &str) -> ExpandedReferences {
    let mut expanded = ExpandedReferences::default();

    for line in input.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(path) = line.strip_prefix('@') {
            let path = PathBuf::from(path.trim());
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => {
                    let before = expanded.references.len();
                    expanded
                        .references
                        .extend(contents.lines().flat_map(tokens).map(str::to_string));
                    debug!(
                        "Expanded {:?} into {} references",
                        path,
                        expanded.references.len() - before
                    );
                }
                Err(source) => expanded
                    .unreadable
                    .push((line.to_string(), ModError::io(path, source))),
            }
            continue;
        }

        expanded.references.extend(tokens(line).map(str::to_string));
    }

    expanded
}

/// Whitespace-separated tokens of one line, up to the first `#` token.
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace().take_while(|token| !token.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_lines_and_whitespace() {
        let expanded = expand_references("123 456\n\n  cool-mod:9 \n# ignored 777\n").await;
        assert_eq!(expanded.references, vec!["123", "456", "cool-mod:9"]);
        assert!(expanded.unreadable.is_empty());
    }

    #[tokio::test]
    async fn trailing_comment_ends_line() {
        let expanded = expand_references("123 #pinned for now 456").await;
        assert_eq!(expanded.references, vec!["123"]);
    }

    #[tokio::test]
    async fn includes_file_one_level_deep() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested.txt");
        std::fs::write(&nested, "999\n").unwrap();
        let list = dir.path().join("mods.txt");
        std::fs::write(
            &list,
            format!("# server mods\n111\n\njei@forge\n@{}\n", nested.display()),
        )
        .unwrap();

        let expanded = expand_references(&format!("000\n@{}\n222", list.display())).await;
        assert_eq!(
            expanded.references,
            vec![
                "000".to_string(),
                "111".to_string(),
                "jei@forge".to_string(),
                format!("@{}", nested.display()),
                "222".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn unreadable_include_is_reported() {
        let expanded = expand_references("@/no/such/list.txt\n5").await;
        assert_eq!(expanded.references, vec!["5"]);
        assert_eq!(expanded.unreadable.len(), 1);
        assert_eq!(expanded.unreadable[0].0, "@/no/such/list.txt");
    }

    #[tokio::test]
    async fn included_lines_drop_trailing_comments() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("mods.txt");
        std::fs::write(&list, "123 # note\n  # header\njei@forge   #pinned\n").unwrap();

        let expanded = expand_references(&format!("@{}", list.display())).await;
        assert_eq!(expanded.references, vec!["123", "jei@forge"]);
        assert!(expanded.unreadable.is_empty());
    }
}
