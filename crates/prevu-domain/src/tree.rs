use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::source::SourceFile;

/// One node of the sandbox mount tree. Serializes to the exact shape the
/// mount call expects: `{"file":{"contents":"..."}}` for leaves and
/// `{"directory":{...}}` for directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileNode {
    #[serde(rename = "file")]
    File { contents: String },
    #[serde(rename = "directory")]
    Directory(IndexMap<String, FileNode>),
}

pub type FileSystemTree = IndexMap<String, FileNode>;

/// Result of materializing a flat file set into a mount tree.
#[derive(Debug, Default)]
pub struct TreeBuild {
    pub tree: FileSystemTree,
    pub diagnostics: Diagnostics,
}

/// Build the nested mount tree from a flat file set.
///
/// Never fails: a file whose path has no usable segments, or that would
/// claim a segment both as file and directory, is dropped with a
/// diagnostic. The first claim on a segment wins.
#[must_use]
pub fn build_tree(files: &[SourceFile]) -> TreeBuild {
    let mut build = TreeBuild::default();
    'files: for file in files {
        let segments: Vec<&str> = file
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some((leaf, parents)) = segments.split_last() else {
            build.diagnostics.push(
                DiagnosticKind::EmptyPath,
                format!("skipping `{}`: no usable path segments", file.path),
            );
            continue;
        };
        let mut current = &mut build.tree;
        for segment in parents {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| FileNode::Directory(IndexMap::new()));
            match entry {
                FileNode::Directory(children) => current = children,
                FileNode::File { .. } => {
                    build.diagnostics.push(
                        DiagnosticKind::PathCollision,
                        format!("skipping `{}`: `{segment}` is already a file", file.path),
                    );
                    continue 'files;
                }
            }
        }
        if matches!(current.get(*leaf), Some(FileNode::Directory(_))) {
            build.diagnostics.push(
                DiagnosticKind::PathCollision,
                format!("skipping `{}`: already a directory", file.path),
            );
            continue;
        }
        current.insert(
            (*leaf).to_string(),
            FileNode::File {
                contents: file.content.clone(),
            },
        );
    }
    build
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nests_files_at_their_exact_position() {
        let build = build_tree(&[
            SourceFile::new("app/page.tsx", "export default function Page(){}"),
            SourceFile::new("package.json", "{}"),
        ]);
        assert!(build.diagnostics.is_empty());
        let value = serde_json::to_value(&build.tree).expect("tree serializes");
        assert_eq!(
            value,
            json!({
                "app": {
                    "directory": {
                        "page.tsx": { "file": { "contents": "export default function Page(){}" } }
                    }
                },
                "package.json": { "file": { "contents": "{}" } }
            })
        );
    }

    #[test]
    fn drops_empty_and_redundant_segments() {
        let build = build_tree(&[
            SourceFile::new("/app//page.tsx", "a"),
            SourceFile::new("///", "b"),
        ]);
        assert_eq!(build.diagnostics.count_of(DiagnosticKind::EmptyPath), 1);
        let value = serde_json::to_value(&build.tree).expect("tree serializes");
        assert_eq!(
            value,
            json!({
                "app": { "directory": { "page.tsx": { "file": { "contents": "a" } } } }
            })
        );
    }

    #[test]
    fn file_claim_is_never_converted_to_directory() {
        let build = build_tree(&[
            SourceFile::new("lib/db", "file first"),
            SourceFile::new("lib/db/client.ts", "needs db as directory"),
        ]);
        assert_eq!(build.diagnostics.count_of(DiagnosticKind::PathCollision), 1);
        assert_eq!(
            serde_json::to_value(&build.tree).expect("tree serializes"),
            json!({
                "lib": { "directory": { "db": { "file": { "contents": "file first" } } } }
            })
        );
    }

    #[test]
    fn directory_claim_is_never_overwritten_by_file() {
        let build = build_tree(&[
            SourceFile::new("app/api/route.ts", "handler"),
            SourceFile::new("app/api", "late file claim"),
        ]);
        assert_eq!(build.diagnostics.count_of(DiagnosticKind::PathCollision), 1);
        assert_eq!(
            serde_json::to_value(&build.tree).expect("tree serializes"),
            json!({
                "app": {
                    "directory": {
                        "api": { "directory": { "route.ts": { "file": { "contents": "handler" } } } }
                    }
                }
            })
        );
    }

    #[test]
    fn later_file_content_wins_for_the_same_path() {
        let build = build_tree(&[
            SourceFile::new("app/page.tsx", "first"),
            SourceFile::new("app/page.tsx", "second"),
        ]);
        assert!(build.diagnostics.is_empty());
        assert_eq!(
            serde_json::to_value(&build.tree).expect("tree serializes"),
            json!({
                "app": { "directory": { "page.tsx": { "file": { "contents": "second" } } } }
            })
        );
    }
}
