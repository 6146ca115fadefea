//! Typed key/value configuration lookup.
//!
//! # Responsibilities
//! - Expose the loose collaborator contract: dotted-key lookup with typed
//!   accessors, `None` on absence or type mismatch
//! - Provide a TOML-backed implementation
//!
//! # Design Decisions
//! - This surface never errors; components that read through it own their
//!   fallback defaults and log when they apply them
//! - Integer accessors accept integer values and numeric strings, since
//!   external config stores frequently deliver everything as strings

use toml::Value;

/// Key/value lookup with typed accessors.
pub trait ConfigSource: Send + Sync {
    fn get_str(&self, key: &str) -> Option<String>;
    fn get_i64(&self, key: &str) -> Option<i64>;
    fn get_f64(&self, key: &str) -> Option<f64>;
    fn get_bool(&self, key: &str) -> Option<bool>;
}

/// `ConfigSource` over a parsed TOML document. Keys are dotted paths,
/// e.g. `"rate_limit.capacity"`.
#[derive(Debug, Clone)]
pub struct TomlSource {
    root: Value,
}

impl TomlSource {
    pub fn new(root: toml::Table) -> Self {
        Self {
            root: Value::Table(root),
        }
    }

    /// Parse a TOML string into a source. Malformed input yields an empty
    /// source rather than an error; readers fall back to their defaults.
    pub fn from_str(content: &str) -> Self {
        let root = content.parse::<toml::Table>().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "malformed config source, all lookups will miss");
            toml::Table::new()
        });
        Self::new(root)
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for part in key.split('.') {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }
}

impl ConfigSource for TomlSource {
    fn get_str(&self, key: &str) -> Option<String> {
        self.lookup(key)?.as_str().map(str::to_string)
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        match self.lookup(key)? {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        match self.lookup(key)? {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.lookup(key)? {
            Value::Boolean(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
