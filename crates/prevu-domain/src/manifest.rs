use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Package name to version-range, insertion-ordered.
pub type DependencyMap = IndexMap<String, String>;

/// Typed view of `package.json`. Fields this pipeline never touches survive
/// a parse/serialize round trip through the flattened `extra` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: DependencyMap,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub dev_dependencies: DependencyMap,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageManifest {
    /// Parse a `package.json` document.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the text is not a JSON object of
    /// the expected shape.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize back to pretty-printed JSON with a trailing newline, the
    /// way package managers write the file.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self).map(|mut text| {
            text.push('\n');
            text
        })
    }

    /// Whether `name` appears in either dependency set.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

/// Merge `incoming` specs into `target`, keeping existing pins. Returns the
/// names that were added.
pub fn merge_missing(target: &mut DependencyMap, incoming: &DependencyMap) -> Vec<String> {
    let mut added = Vec::new();
    for (name, version) in incoming {
        if !target.contains_key(name) {
            target.insert(name.clone(), version.clone());
            added.push(name.clone());
        }
    }
    added
}

/// Remove every entry whose name matches `predicate`, preserving the order
/// of the remainder. Returns the removed names.
pub fn strip_matching(map: &mut DependencyMap, predicate: impl Fn(&str) -> bool) -> Vec<String> {
    let removed: Vec<String> = map
        .keys()
        .filter(|name| predicate(name.as_str()))
        .cloned()
        .collect();
    for name in &removed {
        map.shift_remove(name);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_preserves_unknown_fields_and_casing() {
        let text = r#"{
  "name": "demo",
  "version": "1.0.0",
  "scripts": { "dev": "next dev" },
  "dependencies": { "next": "^14.0.0" },
  "devDependencies": { "typescript": "^5.4.0" },
  "browserslist": ["defaults"]
}"#;
        let manifest = PackageManifest::parse(text).expect("valid manifest");
        assert_eq!(manifest.dev_dependencies.get("typescript").map(String::as_str), Some("^5.4.0"));
        let value: Value = serde_json::from_str(&manifest.to_json().expect("serializes"))
            .expect("round trip parses");
        assert_eq!(value["devDependencies"]["typescript"], json!("^5.4.0"));
        assert_eq!(value["browserslist"], json!(["defaults"]));
    }

    #[test]
    fn parse_rejects_non_object_documents() {
        assert!(PackageManifest::parse("not json").is_err());
        assert!(PackageManifest::parse("[1,2,3]").is_err());
    }

    #[test]
    fn merge_missing_keeps_existing_pins() {
        let mut target = DependencyMap::from_iter([("next".to_string(), "^14.2.5".to_string())]);
        let incoming = DependencyMap::from_iter([
            ("next".to_string(), "^13.0.0".to_string()),
            ("zod".to_string(), "^3.23.8".to_string()),
        ]);
        let added = merge_missing(&mut target, &incoming);
        assert_eq!(added, vec!["zod".to_string()]);
        assert_eq!(target.get("next").map(String::as_str), Some("^14.2.5"));
    }

    #[test]
    fn strip_matching_reports_removed_names_in_order() {
        let mut map = DependencyMap::from_iter([
            ("@prisma/client".to_string(), "^5.0.0".to_string()),
            ("left-pad".to_string(), "^1.0.0".to_string()),
            ("bcrypt".to_string(), "^5.1.0".to_string()),
        ]);
        let removed = strip_matching(&mut map, |name| name != "left-pad");
        assert_eq!(removed, vec!["@prisma/client".to_string(), "bcrypt".to_string()]);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("left-pad"));
    }
}
