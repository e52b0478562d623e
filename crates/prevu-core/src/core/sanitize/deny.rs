/// Packages that cannot run inside the sandbox: ORM clients that expect a
/// generated native engine, native password hashing, native image/SQLite/
/// canvas bindings, and OS-level file-watch shims.
pub const DENY_LIST: &[&str] = &[
    "@prisma/client",
    "prisma",
    "bcrypt",
    "argon2",
    "sharp",
    "sqlite3",
    "better-sqlite3",
    "canvas",
    "fsevents",
];

/// Exact or sub-path match against the deny-list (`prisma` also covers
/// `prisma/client-extension` style specifiers, but never `prisma-like`).
#[must_use]
pub fn is_denied(name: &str) -> bool {
    DENY_LIST.iter().any(|entry| {
        name.strip_prefix(entry)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
