use serde::de::DeserializeOwned;
use serde_yaml::Value;

/// Separates path segments, as in `grpc_channel:Default:RetryPolicy`.
pub const KEY_DELIMITER: char = ':';

/// Read-only view of a node in a configuration tree.
///
/// A section always has a key and a path, even when the node it points at does
/// not exist; looking up a missing child is not an error.
#[derive(Clone, Debug)]
pub struct ConfigSection<'a> {
    key: String,
    path: String,
    value: Option<&'a Value>,
}

impl<'a> ConfigSection<'a> {
    pub fn root(value: &'a Value) -> Self {
        Self {
            key: String::new(),
            path: String::new(),
            value: Some(value),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    /// True when the node holds a scalar or has children.
    pub fn exists(&self) -> bool {
        self.value.is_some_and(|value| !is_empty_node(value))
    }

    /// Looks up a descendant by a `:`-separated path. Keys are matched case-insensitively.
    pub fn get_section(&self, path: &str) -> ConfigSection<'a> {
        path.split(KEY_DELIMITER)
            .fold(self.clone(), |section, key| section.child(key))
    }

    fn child(&self, key: &str) -> ConfigSection<'a> {
        let value = self.value.and_then(|value| match value {
            Value::Mapping(mapping) => mapping
                .iter()
                .find(|(k, _)| key_to_string(k).is_some_and(|k| k.eq_ignore_ascii_case(key)))
                .map(|(_, v)| v),
            Value::Sequence(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        });

        ConfigSection {
            key: key.to_string(),
            path: self.child_path(key),
            value,
        }
    }

    /// Immediate children in document order. Sequence items are keyed by index.
    pub fn children(&self) -> Vec<ConfigSection<'a>> {
        match self.value {
            Some(Value::Mapping(mapping)) => mapping
                .iter()
                .filter_map(|(k, v)| {
                    let key = key_to_string(k)?;
                    Some(ConfigSection {
                        path: self.child_path(&key),
                        key,
                        value: Some(v),
                    })
                })
                .collect(),
            Some(Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let key = i.to_string();
                    ConfigSection {
                        path: self.child_path(&key),
                        key,
                        value: Some(v),
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Deserializes the node, or returns `None` when it is missing or empty.
    ///
    /// Mapping keys are matched like section keys, ignoring case, and also
    /// ignoring `_`: they are lowercased with underscores removed before
    /// deserializing, so `T` must accept field names in that form.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_yaml::Error> {
        match self.value {
            Some(value) if !is_empty_node(value) => {
                serde_yaml::from_value(normalize_keys(value)).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}{KEY_DELIMITER}{key}", self.path)
        }
    }
}

fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(mapping) => mapping.is_empty(),
        Value::Tagged(tagged) => is_empty_node(&tagged.value),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn normalize_keys(value: &Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .iter()
                .map(|(k, v)| {
                    let key = match k {
                        Value::String(key) => Value::String(normalize_key(key)),
                        other => other.clone(),
                    };
                    (key, normalize_keys(v))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.iter().map(normalize_keys).collect()),
        other => other.clone(),
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
