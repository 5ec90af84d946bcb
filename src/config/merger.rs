//! Deep merge for layered YAML configuration.
//!
//! - Mappings merge recursively
//! - Sequences and scalars in the overlay replace the base
//! - `null` in the overlay removes the key, so the built-in default applies again

use serde_yaml::Value;

/// Merge `overlay` onto `base`, overlay winning at each conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        // An empty file parses to null; treat it as "no changes".
        (base, Value::Null) => base.clone(),

        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order; the last layer has the highest priority.
pub fn merge_configs(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn overlay_replaces_only_the_conflicting_key() {
        let base = yaml(
            r#"
trail:
  base_url: https://trails-api.herd.eco/v1
  timeout_secs: 30
"#,
        );
        let overlay = yaml(
            r#"
trail:
  base_url: http://localhost:4010
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert_eq!(result["trail"]["base_url"], "http://localhost:4010");
        assert_eq!(result["trail"]["timeout_secs"], 30);
    }

    #[test]
    fn sequences_are_replaced() {
        let base = yaml("backoff_ms: [500, 1000, 2000]");
        let overlay = yaml("backoff_ms: [100]");

        let result = deep_merge(&base, &overlay);
        let backoff = result["backoff_ms"].as_sequence().unwrap();

        assert_eq!(backoff.len(), 1);
        assert_eq!(backoff[0], 100);
    }

    #[test]
    fn null_removes_key() {
        let base = yaml(
            r#"
wallet:
  address: "0xabc"
  signer_url: http://127.0.0.1:8545
"#,
        );
        let overlay = yaml("wallet:\n  signer_url: null");

        let result = deep_merge(&base, &overlay);

        assert!(result["wallet"].get("signer_url").is_none());
        assert_eq!(result["wallet"]["address"], "0xabc");
    }

    #[test]
    fn empty_file_changes_nothing() {
        let base = yaml("campaign:\n  crowdfund_id: \"3356\"");
        let result = deep_merge(&base, &Value::Null);
        assert_eq!(result, base);
    }

    #[test]
    fn layers_apply_in_order() {
        let layers = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&layers);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }
}
