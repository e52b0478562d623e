#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod diagnostic;
pub mod manifest;
pub mod source;
pub mod tree;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use manifest::{merge_missing, strip_matching, DependencyMap, PackageManifest};
pub use source::{
    file_content, find_file, has_file, remove_file, upsert_file, validate_sources, RawSourceFile,
    SourceFile,
};
pub use tree::{build_tree, FileNode, FileSystemTree, TreeBuild};
