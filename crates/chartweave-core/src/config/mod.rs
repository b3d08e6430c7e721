use crate::{Error, Result};
use serde_json::{Map, Value, json};

/// Pipeline settings as a JSON object addressed by dotted paths.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig(Value);

impl Default for PipelineConfig {
    fn default() -> Self {
        Self(json!({
            "pivot": {
                "categoryKey": "day_name",
                "seriesKey": "channel_name"
            },
            "validation": {
                "categoryPlaceholder": "${categories}"
            },
            "defaults": {
                "tooltip": { "trigger": "axis" },
                "toolbox": { "feature": { "saveAsImage": {} } },
                "grid": {
                    "left": "3%",
                    "right": "4%",
                    "bottom": "3%",
                    "containLabel": true
                }
            }
        }))
    }
}

impl PipelineConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a YAML override document.
    pub fn overrides_from_yaml(text: &str) -> Result<Value> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| Error::InvalidConfig {
            format: "YAML",
            message: e.to_string(),
        })?;
        ensure_object("YAML", value)
    }

    /// Parses a JSON5 override document. Plain JSON is accepted as well.
    pub fn overrides_from_json5(text: &str) -> Result<Value> {
        let value: Value = json5::from_str(text).map_err(|e| Error::InvalidConfig {
            format: "JSON5",
            message: e.to_string(),
        })?;
        ensure_object("JSON5", value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get_value(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get_value(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get_value(dotted_path)?.as_bool()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    pub fn category_key(&self) -> &str {
        self.get_str("pivot.categoryKey").unwrap_or("day_name")
    }

    pub fn series_key(&self) -> &str {
        self.get_str("pivot.seriesKey").unwrap_or("channel_name")
    }

    pub fn category_placeholder(&self) -> &str {
        self.get_str("validation.categoryPlaceholder")
            .unwrap_or("${categories}")
    }

    /// Layout default (`tooltip`, `toolbox`, `grid`) attached by the structural transformer.
    pub fn layout_default(&self, key: &str) -> Option<&Value> {
        self.get_value("defaults")?.as_object()?.get(key)
    }
}

fn ensure_object(format: &'static str, value: Value) -> Result<Value> {
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        other => Err(Error::InvalidConfig {
            format,
            message: format!("expected a mapping at the top level, got {other}"),
        }),
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
