//! Static import scanning: packages that generated source imports but the
//! manifest never declares get added at known-good versions so the install
//! phase does not fail on the first missing module.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use prevu_domain::{DiagnosticKind, Diagnostics, PackageManifest, SourceFile};

use crate::core::sanitize::is_denied;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

pub(crate) fn is_script_path(path: &str) -> bool {
    path.rsplit('.')
        .next()
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

// Matches static import/export-from specifiers plus dynamic `import(...)`
// and CommonJS `require(...)` calls.
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?:import|export)\s+(?:[\w${},*\s]+from\s+)?["']([^"']+)["']"#,
        "|",
        r#"(?:require|import)\s*\(\s*["']([^"']+)["']\s*\)"#,
    ))
    .expect("import pattern")
});

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Known-good versions for packages the generator reaches for most often.
/// Anything else gets the unpinned `latest` marker.
const KNOWN_VERSIONS: &[(&str, &str)] = &[
    ("@radix-ui/react-dialog", "^1.1.1"),
    ("@radix-ui/react-dropdown-menu", "^2.1.1"),
    ("@radix-ui/react-slot", "^1.1.0"),
    ("@tanstack/react-query", "^5.45.1"),
    ("axios", "^1.7.2"),
    ("clsx", "^2.1.1"),
    ("date-fns", "^3.6.0"),
    ("framer-motion", "^11.2.10"),
    ("lucide-react", "^0.395.0"),
    ("next-auth", "^4.24.7"),
    ("react-hook-form", "^7.52.0"),
    ("recharts", "^2.12.7"),
    ("sonner", "^1.5.0"),
    ("swr", "^2.2.5"),
    ("tailwind-merge", "^2.3.0"),
    ("uuid", "^10.0.0"),
    ("zod", "^3.23.8"),
    ("zustand", "^4.5.2"),
];

const LATEST: &str = "latest";

/// Scan every script-like file for imported packages missing from the
/// manifest and add them to the runtime dependency set. Idempotent.
pub fn detect(files: &[SourceFile], manifest: &mut PackageManifest, diagnostics: &mut Diagnostics) {
    let mut missing: IndexSet<String> = IndexSet::new();
    for file in files {
        if !is_script_path(&file.path) {
            continue;
        }
        for caps in IMPORT_RE.captures_iter(&file.content) {
            let Some(specifier) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let Some(name) = bare_package_name(specifier.as_str()) else {
                continue;
            };
            if is_builtin(&name) || is_denied(&name) || manifest.declares(&name) {
                continue;
            }
            missing.insert(name);
        }
    }
    for name in missing {
        let version = curated_version(&name);
        diagnostics.push(
            DiagnosticKind::DetectedDependency,
            format!("added `{name}@{version}` (imported but undeclared)"),
        );
        manifest.dependencies.insert(name, version.to_string());
    }
}

/// First two segments for scoped specifiers, first segment otherwise.
/// Relative, absolute, and alias specifiers carry no package name.
fn bare_package_name(specifier: &str) -> Option<String> {
    if specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with("@/")
        || specifier.starts_with("~/")
    {
        return None;
    }
    if specifier.starts_with('@') {
        let mut parts = specifier.split('/');
        match (parts.next(), parts.next()) {
            (Some(scope), Some(name)) if !name.is_empty() => Some(format!("{scope}/{name}")),
            _ => None,
        }
    } else {
        specifier
            .split('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

fn is_builtin(name: &str) -> bool {
    if name.starts_with("node:") {
        return true;
    }
    NODE_BUILTINS.contains(&name)
}

fn curated_version(name: &str) -> &'static str {
    KNOWN_VERSIONS
        .iter()
        .find(|(known, _)| *known == name)
        .map_or(LATEST, |(_, version)| *version)
}
