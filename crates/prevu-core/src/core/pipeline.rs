//! The preprocessing pipeline: validate the raw generator output, repair it
//! for the sandbox, and materialize the mount tree. Total end to end — all
//! repair work is visible in the returned diagnostics, never thrown.

use prevu_domain::{
    build_tree, upsert_file, validate_sources, DependencyMap, DiagnosticKind, Diagnostics,
    FileSystemTree, PackageManifest, RawSourceFile, SourceFile,
};

use crate::core::detect::detect;
use crate::core::neutralize::neutralize;
use crate::core::sanitize::{sanitize, MANIFEST_PATH};

/// Fully repaired input, ready to mount and launch.
#[derive(Debug)]
pub struct PreparedPreview {
    pub files: Vec<SourceFile>,
    pub manifest: PackageManifest,
    pub tree: FileSystemTree,
    pub diagnostics: Diagnostics,
}

/// Run the whole preprocessing pipeline: validate, sanitize, auto-detect
/// missing dependencies, neutralize environment guards, write the manifest
/// back into the file set, then build the mount tree.
#[must_use]
pub fn prepare_preview(
    raw_files: Vec<RawSourceFile>,
    dependencies: &DependencyMap,
    dev_dependencies: &DependencyMap,
) -> PreparedPreview {
    let mut diagnostics = Diagnostics::default();
    let files = validate_sources(raw_files, &mut diagnostics);
    let outcome = sanitize(files, dependencies, dev_dependencies, &mut diagnostics);
    let mut files = outcome.files;
    let mut manifest = outcome.manifest;
    detect(&files, &mut manifest, &mut diagnostics);
    neutralize(&mut files, &mut diagnostics);
    match manifest.to_json() {
        Ok(text) => upsert_file(&mut files, MANIFEST_PATH, text),
        Err(err) => diagnostics.push(
            DiagnosticKind::MalformedManifest,
            format!("could not serialize package.json: {err}"),
        ),
    }
    let build = build_tree(&files);
    diagnostics.extend(build.diagnostics);
    tracing::debug!(
        files = files.len(),
        diagnostics = diagnostics.len(),
        "prepared preview file set"
    );
    PreparedPreview {
        files,
        manifest,
        tree: build.tree,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_to_end_builds_the_expected_tree() {
        let prepared = prepare_preview(
            vec![RawSourceFile::new(
                "app/page.tsx",
                "export default function Page(){}",
            )],
            &DependencyMap::from_iter([("next".to_string(), "^14.0.0".to_string())]),
            &DependencyMap::new(),
        );
        let tree = serde_json::to_value(&prepared.tree).expect("tree serializes");
        assert_eq!(
            tree["app"],
            json!({
                "directory": {
                    "page.tsx": { "file": { "contents": "export default function Page(){}" } }
                }
            })
        );
        // The repaired set carries the synthesized ambient files alongside.
        assert!(tree.get("package.json").is_some());
        assert!(tree.get(".env").is_some());
        assert!(tree.get("tsconfig.json").is_some());
        assert_eq!(
            prepared.manifest.dependencies.get("next").map(String::as_str),
            Some("^14.0.0")
        );
    }

    #[test]
    fn pipeline_repairs_a_generated_server_first_project() {
        let prepared = prepare_preview(
            vec![
                RawSourceFile::new(
                    "package.json",
                    r#"{"scripts":{"dev":"next dev --turbopack","prisma:generate":"prisma generate"},"dependencies":{"next":"^14.0.0","@prisma/client":"^5.0.0","bcrypt":"^5.1.0"}}"#,
                ),
                RawSourceFile::new(
                    "lib/db.ts",
                    "import { PrismaClient } from \"@prisma/client\";\nexport const prisma = new PrismaClient();\n",
                ),
                RawSourceFile::new(
                    "app/api/login/route.ts",
                    "import { compare } from \"bcrypt\";\nimport { create } from \"zustand\";\n",
                ),
                RawSourceFile::new("prisma/schema.prisma", "model User { id Int @id }"),
                RawSourceFile::new("middleware.ts", "export default function middleware() { /* guard */ }\n"),
                RawSourceFile::new(json!(42), "dropped"),
            ],
            &DependencyMap::new(),
            &DependencyMap::new(),
        );

        assert!(!prepared.manifest.declares("@prisma/client"));
        assert!(!prepared.manifest.declares("bcrypt"));
        assert_eq!(
            prepared.manifest.scripts.get("dev").map(String::as_str),
            Some("next dev")
        );
        assert!(!prepared.manifest.scripts.contains_key("prisma:generate"));
        assert_eq!(
            prepared.manifest.dependencies.get("zustand").map(String::as_str),
            Some("^4.5.2")
        );

        let manifest_text = prevu_domain::file_content(&prepared.files, "package.json")
            .expect("manifest written back");
        assert!(manifest_text.contains("zustand"));

        let tree = serde_json::to_value(&prepared.tree).expect("tree serializes");
        assert!(tree.get("prisma").is_none());
        assert_eq!(
            tree["middleware.ts"]["file"]["contents"]
                .as_str()
                .map(|content| content.contains("NextResponse.next()")),
            Some(true)
        );

        assert!(prepared.diagnostics.contains(DiagnosticKind::InvalidSourceFile));
        assert!(prepared.diagnostics.contains(DiagnosticKind::RemovedDependency));
        assert!(prepared.diagnostics.contains(DiagnosticKind::DetectedDependency));
    }
}
