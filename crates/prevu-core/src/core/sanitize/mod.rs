//! Manifest and dependency sanitization: strips packages the sandbox cannot
//! run, synthesizes missing manifest/config files, and rewrites source that
//! hard-depends on a stripped package so the preview still renders.

use once_cell::sync::Lazy;
use regex::Regex;

use prevu_domain::{
    file_content, has_file, merge_missing, remove_file, strip_matching, upsert_file,
    DependencyMap, DiagnosticKind, Diagnostics, PackageManifest, SourceFile,
};

use crate::core::detect::is_script_path;

mod deny;
mod stubs;

pub use deny::{is_denied, DENY_LIST};
pub(crate) use stubs::MANIFEST_PATH;

/// Everything `sanitize` changed or produced.
#[derive(Debug)]
pub struct SanitizeOutcome {
    pub files: Vec<SourceFile>,
    pub manifest: PackageManifest,
    pub removed: Vec<String>,
}

/// Repair the file set and dependency sets for the sandbox.
///
/// Total: malformed input (unparsable manifest, odd file contents) degrades
/// into diagnostics and the affected step is skipped. Idempotent over its
/// own output.
#[must_use]
pub fn sanitize(
    mut files: Vec<SourceFile>,
    dependencies: &DependencyMap,
    dev_dependencies: &DependencyMap,
    diagnostics: &mut Diagnostics,
) -> SanitizeOutcome {
    // Parse an existing manifest; an unparsable one is discarded so the
    // synthesized default takes over.
    let parsed = file_content(&files, MANIFEST_PATH).map(PackageManifest::parse);
    let mut manifest = match parsed {
        Some(Ok(mut manifest)) => {
            merge_missing(&mut manifest.dependencies, dependencies);
            merge_missing(&mut manifest.dev_dependencies, dev_dependencies);
            manifest
        }
        Some(Err(err)) => {
            diagnostics.push(
                DiagnosticKind::MalformedManifest,
                format!("discarding unparsable package.json: {err}"),
            );
            synthesize_manifest(dependencies, dev_dependencies, diagnostics)
        }
        None => synthesize_manifest(dependencies, dev_dependencies, diagnostics),
    };

    let mut removed = strip_matching(&mut manifest.dependencies, is_denied);
    removed.extend(strip_matching(&mut manifest.dev_dependencies, is_denied));
    removed.sort();
    removed.dedup();
    for name in &removed {
        diagnostics.push(
            DiagnosticKind::RemovedDependency,
            format!("removed sandbox-incompatible dependency `{name}`"),
        );
    }
    if !removed.is_empty() {
        tracing::debug!(removed = ?removed, "stripped sandbox-incompatible dependencies");
    }

    strip_turbo_flag(&mut manifest, diagnostics);
    remove_orm_scripts(&mut manifest, diagnostics);

    let orm_removed = removed.iter().any(|name| name == "prisma" || name == "@prisma/client");
    if orm_removed {
        replace_orm_client(&mut files, diagnostics);
        remove_session_adapter(&mut files, diagnostics);
        alias_orm_type_imports(&mut files, diagnostics);
    }
    if removed.iter().any(|name| name == "bcrypt") {
        inject_bcrypt_stub(&mut files, diagnostics);
    }

    if !has_file(&files, stubs::TSCONFIG_PATH) {
        upsert_file(&mut files, stubs::TSCONFIG_PATH, stubs::TSCONFIG_STUB);
        diagnostics.push(DiagnosticKind::SynthesizedFile, "synthesized tsconfig.json");
    }
    let has_next_config = ["next.config.js", "next.config.mjs", "next.config.ts"]
        .iter()
        .any(|path| has_file(&files, path));
    if !has_next_config {
        upsert_file(&mut files, stubs::NEXT_CONFIG_PATH, stubs::NEXT_CONFIG_STUB);
        diagnostics.push(
            DiagnosticKind::SynthesizedFile,
            "synthesized next.config.mjs",
        );
    }

    remove_schema_files(&mut files, diagnostics);

    SanitizeOutcome {
        files,
        manifest,
        removed,
    }
}

fn synthesize_manifest(
    dependencies: &DependencyMap,
    dev_dependencies: &DependencyMap,
    diagnostics: &mut Diagnostics,
) -> PackageManifest {
    let mut manifest = PackageManifest {
        name: Some("preview-app".to_string()),
        version: Some("0.1.0".to_string()),
        private: Some(true),
        ..PackageManifest::default()
    };
    manifest.scripts.insert("dev".to_string(), "next dev".to_string());
    manifest.scripts.insert("build".to_string(), "next build".to_string());
    manifest.scripts.insert("start".to_string(), "next start".to_string());
    manifest.dependencies = dependencies.clone();
    manifest.dev_dependencies = dev_dependencies.clone();
    for (name, version) in [
        ("next", stubs::PINNED_NEXT),
        ("react", stubs::PINNED_REACT),
        ("react-dom", stubs::PINNED_REACT),
    ] {
        manifest
            .dependencies
            .entry(name.to_string())
            .or_insert_with(|| version.to_string());
    }
    diagnostics.push(DiagnosticKind::SynthesizedFile, "synthesized package.json");
    manifest
}

/// The turbo dev flag changes the startup banner to a format the readiness
/// detector does not recognize; left in place it would hang the start phase.
fn strip_turbo_flag(manifest: &mut PackageManifest, diagnostics: &mut Diagnostics) {
    let Some(dev) = manifest.scripts.get_mut("dev") else {
        return;
    };
    if !dev.contains("--turbopack") && !dev.contains("--turbo") {
        return;
    }
    let stripped = dev
        .split_whitespace()
        .filter(|arg| *arg != "--turbopack" && *arg != "--turbo")
        .collect::<Vec<_>>()
        .join(" ");
    diagnostics.push(
        DiagnosticKind::RewrittenFile,
        format!("stripped turbo flag from dev script (`{dev}` -> `{stripped}`)"),
    );
    *dev = stripped;
}

fn remove_orm_scripts(manifest: &mut PackageManifest, diagnostics: &mut Diagnostics) {
    let keys: Vec<String> = manifest
        .scripts
        .keys()
        .filter(|key| key.contains("prisma"))
        .cloned()
        .collect();
    for key in keys {
        manifest.scripts.shift_remove(&key);
        diagnostics.push(
            DiagnosticKind::RemovedScript,
            format!("removed script `{key}`"),
        );
    }
}

/// Replace the module that instantiates the ORM client (or create one at
/// the conventional path) with the proxy-backed stand-in.
fn replace_orm_client(files: &mut Vec<SourceFile>, diagnostics: &mut Diagnostics) {
    let target = files
        .iter()
        .find(|file| is_script_path(&file.path) && file.content.contains("new PrismaClient"))
        .map(|file| file.path.clone());
    let path = target.unwrap_or_else(|| stubs::PRISMA_CLIENT_PATH.to_string());
    upsert_file(files, &path, stubs::PRISMA_CLIENT_STUB);
    diagnostics.push(
        DiagnosticKind::RewrittenFile,
        format!("replaced `{path}` with a sandbox Prisma client stand-in"),
    );
}

static ADAPTER_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+[^;\n]*from\s+["'](?:@next-auth|@auth)/prisma-adapter["'];?[ \t]*\r?\n?"#)
        .expect("adapter import pattern")
});

static ADAPTER_OPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*adapter\s*:\s*PrismaAdapter\([^)]*\)\s*,?[ \t]*\r?\n?")
        .expect("adapter option pattern")
});

/// Remove the Prisma session-adapter import and its option assignment from
/// auth configuration, leaving the surrounding options intact.
fn remove_session_adapter(files: &mut [SourceFile], diagnostics: &mut Diagnostics) {
    for file in files.iter_mut() {
        if !is_script_path(&file.path) {
            continue;
        }
        let mut touched = false;
        if ADAPTER_IMPORT_RE.is_match(&file.content) {
            file.content = ADAPTER_IMPORT_RE.replace_all(&file.content, "").into_owned();
            touched = true;
        }
        if ADAPTER_OPTION_RE.is_match(&file.content) {
            file.content = ADAPTER_OPTION_RE.replace_all(&file.content, "").into_owned();
            touched = true;
        }
        if touched {
            diagnostics.push(
                DiagnosticKind::RewrittenFile,
                format!("removed Prisma session adapter from `{}`", file.path),
            );
        }
    }
}

static ORM_TYPE_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:type\s+)?\{([^}]*)\}\s*from\s+["']@prisma/client["'];?[ \t]*$"#)
        .expect("orm type import pattern")
});

/// Turn `import { User } from "@prisma/client"` into a local permissive
/// alias so type annotations keep compiling without the generated client.
fn alias_orm_type_imports(files: &mut [SourceFile], diagnostics: &mut Diagnostics) {
    for file in files.iter_mut() {
        if !is_script_path(&file.path) || !ORM_TYPE_IMPORT_RE.is_match(&file.content) {
            continue;
        }
        file.content = ORM_TYPE_IMPORT_RE
            .replace_all(&file.content, |caps: &regex::Captures<'_>| {
                caps[1]
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| {
                        // `User as U` and `type User` bind the last token.
                        let local = name.split_whitespace().last().unwrap_or(name);
                        format!("type {local} = any;")
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .into_owned();
        diagnostics.push(
            DiagnosticKind::RewrittenFile,
            format!("aliased Prisma type imports in `{}`", file.path),
        );
    }
}

static BCRYPT_SPECIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']bcrypt["']"#).expect("bcrypt specifier pattern"));

fn inject_bcrypt_stub(files: &mut Vec<SourceFile>, diagnostics: &mut Diagnostics) {
    upsert_file(files, stubs::BCRYPT_STUB_PATH, stubs::BCRYPT_STUB);
    diagnostics.push(
        DiagnosticKind::SynthesizedFile,
        format!("injected bcrypt stand-in at `{}`", stubs::BCRYPT_STUB_PATH),
    );
    let replacement = format!("\"{}\"", stubs::BCRYPT_ALIAS);
    for file in files.iter_mut() {
        if file.path == stubs::BCRYPT_STUB_PATH || !is_script_path(&file.path) {
            continue;
        }
        if BCRYPT_SPECIFIER_RE.is_match(&file.content) {
            file.content = BCRYPT_SPECIFIER_RE
                .replace_all(&file.content, replacement.as_str())
                .into_owned();
            diagnostics.push(
                DiagnosticKind::RewrittenFile,
                format!("rewrote bcrypt import in `{}`", file.path),
            );
        }
    }
}

fn remove_schema_files(files: &mut Vec<SourceFile>, diagnostics: &mut Diagnostics) {
    let schema_paths: Vec<String> = files
        .iter()
        .filter(|file| file.path.ends_with(".prisma"))
        .map(|file| file.path.clone())
        .collect();
    for path in schema_paths {
        remove_file(files, &path);
        diagnostics.push(
            DiagnosticKind::RemovedFile,
            format!("removed Prisma schema `{path}`"),
        );
    }
}
