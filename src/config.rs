use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Options for a single-file transform.
///
/// Every field has a default, so a partial JSON object (or none at all) is
/// a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformConfig {
    /// Import sources treated as framework built-ins (`react`, `next/link`, ...).
    pub framework_prefixes: Vec<String>,
    pub text_sample_limit: usize,
    /// Path fragments that mark a file as a page.
    pub page_markers: Vec<String>,
    /// Source tag -> target tag, applied on top of the static mapping table.
    pub target_overrides: BTreeMap<String, String>,
    pub package_name: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            framework_prefixes: ["react", "react-dom", "next", "react-native"]
                .into_iter()
                .map(String::from)
                .collect(),
            text_sample_limit: 10,
            page_markers: ["/pages/", "/app/", "/screens/", "/views/"]
                .into_iter()
                .map(String::from)
                .collect(),
            target_overrides: BTreeMap::new(),
            package_name: "app".to_string(),
        }
    }
}

impl TransformConfig {
    /// Build a config from a loose JSON map, ignoring keys that fail to parse.
    pub fn from_map(mut config: HashMap<String, serde_json::Value>) -> Self {
        let mut out = Self::default();

        if let Some(v) = config.remove("frameworkPrefixes") {
            if let Ok(prefixes) = serde_json::from_value(v) {
                out.framework_prefixes = prefixes;
            }
        }
        if let Some(limit) = config.remove("textSampleLimit").and_then(|v| v.as_u64()) {
            out.text_sample_limit = limit as usize;
        }
        if let Some(v) = config.remove("pageMarkers") {
            if let Ok(markers) = serde_json::from_value(v) {
                out.page_markers = markers;
            }
        }
        if let Some(v) = config.remove("targetOverrides") {
            if let Ok(overrides) = serde_json::from_value(v) {
                out.target_overrides = overrides;
            }
        }
        if let Some(name) = config
            .remove("packageName")
            .and_then(|v| v.as_str().map(|s| s.to_string()))
        {
            out.package_name = name;
        }
        out
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_framework_source(&self, source: &str) -> bool {
        self.framework_prefixes.iter().any(|prefix| {
            source == prefix
                || source
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_prefix_matches_whole_segments() {
        let config = TransformConfig::default();
        assert!(config.is_framework_source("react"));
        assert!(config.is_framework_source("next/link"));
        assert!(!config.is_framework_source("react-icons"));
        assert!(!config.is_framework_source("nextra"));
    }

    #[test]
    fn from_map_keeps_defaults_for_bad_values() {
        let mut map = HashMap::new();
        map.insert("textSampleLimit".to_string(), serde_json::json!(3));
        map.insert("pageMarkers".to_string(), serde_json::json!(42));
        map.insert(
            "targetOverrides".to_string(),
            serde_json::json!({ "div": "Card" }),
        );
        let config = TransformConfig::from_map(map);
        assert_eq!(config.text_sample_limit, 3);
        assert!(config.page_markers.contains(&"/pages/".to_string()));
        assert_eq!(config.target_overrides.get("div").map(String::as_str), Some("Card"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = TransformConfig::from_json(r#"{ "packageName": "shop" }"#)
            .expect("valid config");
        assert_eq!(config.package_name, "shop");
        assert_eq!(config.text_sample_limit, 10);
    }
}
