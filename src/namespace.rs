//! Prefix-scoped access to the shared environment store.

use crate::key::{compose_key, has_camel_boundary, to_flat_segment};
use crate::store::{self, EnvStore};
use crate::value::{parse, Value};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::trace;

/// A view of the environment store scoped by an optional prefix.
///
/// Many namespaces may exist concurrently over the same store; a
/// namespace with prefix `APP` only ever touches keys starting with
/// `APP_`. Keys given in camelCase are canonicalized, so
/// `get("redisHost")`, `get("redis_host")` and `get("REDIS_HOST")` are
/// equivalent.
///
/// ```
/// use envscope::Namespace;
///
/// let env = Namespace::with_store(envscope::store::memory(), Some("app"));
/// env.set("port", 3000);
/// assert_eq!(env.get("port"), Some(envscope::Value::Int(3000)));
/// ```
#[derive(Clone)]
pub struct Namespace {
    store: Rc<dyn EnvStore>,
    prefix: Option<String>,
}

impl Namespace {
    /// Unprefixed namespace over the process environment.
    pub fn new() -> Self {
        Self {
            store: store::process(),
            prefix: None,
        }
    }

    /// Prefixed namespace over the process environment.
    ///
    /// The prefix is uppercased at construction; an empty prefix is the
    /// same as no prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        Self::with_store(store::process(), Some(prefix))
    }

    /// Namespace over an injected store.
    pub fn with_store(store: Rc<dyn EnvStore>, prefix: Option<&str>) -> Self {
        let prefix = prefix
            .filter(|p| !p.is_empty())
            .map(|p| p.to_ascii_uppercase());
        Self { store, prefix }
    }

    /// Prefixed namespace over the process environment with defaults
    /// applied at construction. Existing values are never overwritten.
    pub fn with_defaults(prefix: &str, defaults: &Map<String, Json>) -> Self {
        let env = Self::with_prefix(prefix);
        env.set_defaults(defaults);
        env
    }

    /// The prefix this namespace is bound to, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The full store key for `key` under this namespace's prefix.
    pub fn env_key(&self, key: &str) -> String {
        compose_key(self.prefix.as_deref(), &key.to_ascii_uppercase())
    }

    /// Look up `key`, coercing the stored string to a typed value.
    ///
    /// When no direct entry exists, the key is retried as an object
    /// prefix, so `get("redis")` surfaces `REDIS_HOST`/`REDIS_PORT`
    /// entries as one object. Returns `None` when nothing matches.
    pub fn get(&self, key: &str) -> Option<Value> {
        if has_camel_boundary(key) {
            return self.get(&to_flat_segment(key));
        }
        let env_key = self.env_key(key);
        if let Some(raw) = self.store.get(&env_key) {
            return Some(parse(&raw));
        }
        let object = self.get_as_object(key);
        if !object.is_empty() {
            let map: Map<String, Json> = object
                .into_iter()
                .map(|(k, v)| (k, Json::from(v)))
                .collect();
            return Some(Value::Json(Json::Object(map)));
        }
        None
    }

    /// Like [`get`](Self::get), falling back to `default` when the key
    /// is wholly absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Set `key` to `value`.
    ///
    /// Object values expand recursively into one store entry per leaf;
    /// the parent key itself never receives a JSON blob. Arrays and
    /// scalars become a single entry.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.set_value(key, &value.into());
    }

    fn set_value(&self, key: &str, value: &Value) {
        if has_camel_boundary(key) {
            return self.set_value(&to_flat_segment(key), value);
        }
        if let Some(children) = value.as_object() {
            for (child_key, child_value) in children {
                self.set_value(
                    &compose_key(Some(key), child_key),
                    &Value::Json(child_value.clone()),
                );
            }
            return;
        }
        let env_key = self.env_key(key);
        let raw = value.to_string();
        trace!(key = %env_key, "set");
        self.store.set(&env_key, &raw);
    }

    /// Remove `key` from the store. Absent keys are a no-op.
    pub fn unset(&self, key: &str) {
        if has_camel_boundary(key) {
            return self.unset(&to_flat_segment(key));
        }
        let env_key = self.env_key(key);
        trace!(key = %env_key, "unset");
        self.store.remove(&env_key);
    }

    /// Fill in any of `defaults` that are not already set.
    ///
    /// A value that is already present always wins. When the present
    /// value is itself an object, nested defaults recurse into it and
    /// fill only the missing leaves.
    pub fn set_defaults(&self, defaults: &Map<String, Json>) {
        self.apply_defaults(defaults, None);
    }

    fn apply_defaults(&self, defaults: &Map<String, Json>, prefix: Option<&str>) {
        for (key, default) in defaults {
            let prefixed = compose_key(prefix, key);
            match self.get(&prefixed) {
                None => self.set(&prefixed, Value::Json(default.clone())),
                Some(current) => {
                    if let (Some(_), Json::Object(nested)) = (current.as_object(), default) {
                        self.apply_defaults(nested, Some(&prefixed));
                    }
                }
            }
        }
    }

    /// Every store key under this namespace's prefix, in store order.
    pub fn raw_keys(&self) -> Vec<String> {
        let keys = self.store.keys();
        match &self.prefix {
            None => keys,
            Some(prefix) => {
                let lead = format!("{}_", prefix);
                keys.into_iter()
                    .filter(|key| key.starts_with(&lead))
                    .collect()
            }
        }
    }

    /// Everything under this namespace, coerced, keyed by the
    /// lowercased key with the prefix stripped.
    pub fn all(&self) -> BTreeMap<String, Value> {
        self.raw_keys()
            .into_iter()
            .filter_map(|key| {
                let raw = self.store.get(&key)?;
                Some((self.local_key(&key), parse(&raw)))
            })
            .collect()
    }

    /// Like [`all`](Self::all) but with the raw stored strings.
    pub fn all_raw(&self) -> BTreeMap<String, String> {
        self.raw_keys()
            .into_iter()
            .filter_map(|key| {
                let raw = self.store.get(&key)?;
                Some((self.local_key(&key), raw))
            })
            .collect()
    }

    fn local_key(&self, store_key: &str) -> String {
        match &self.prefix {
            Some(prefix) => store_key[prefix.len() + 1..].to_ascii_lowercase(),
            None => store_key.to_ascii_lowercase(),
        }
    }

    /// Collect every entry under `key_prefix` as an object.
    ///
    /// Given `APP_REDIS_HOST=localhost` and `APP_REDIS_PORT=3000`, an
    /// `APP` namespace returns `{host: "localhost", port: 3000}` for
    /// `get_as_object("redis")`.
    pub fn get_as_object(&self, key_prefix: &str) -> BTreeMap<String, Value> {
        if has_camel_boundary(key_prefix) {
            return self.get_as_object(&to_flat_segment(key_prefix));
        }
        let sub = Namespace {
            store: Rc::clone(&self.store),
            prefix: Some(self.env_key(key_prefix)),
        };
        sub.all()
    }

    /// Run `f` with `overrides` in place, restoring the previous state
    /// when it returns. Keys that had no prior value are removed again.
    pub fn with_overrides<R>(&self, overrides: &[(&str, Value)], f: impl FnOnce() -> R) -> R {
        let guard = self.begin_overrides(overrides);
        let result = f();
        guard.restore();
        result
    }

    /// Apply `overrides` and hand back a guard that undoes them.
    ///
    /// The overrides stay in effect until [`OverrideGuard::restore`] is
    /// called. Dropping the guard without calling it leaves the
    /// overrides in place permanently; there is no automatic cleanup.
    pub fn begin_overrides(&self, overrides: &[(&str, Value)]) -> OverrideGuard {
        let mut saved = Vec::with_capacity(overrides.len());
        for (key, value) in overrides {
            let canonical = if has_camel_boundary(key) {
                to_flat_segment(key)
            } else {
                key.to_string()
            };
            let env_key = self.env_key(&canonical);
            saved.push((env_key.clone(), self.store.get(&env_key)));
            self.set_value(&canonical, value);
        }
        OverrideGuard {
            namespace: self.clone(),
            saved,
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

/// Undoes a set of overrides applied by [`Namespace::begin_overrides`].
///
/// Restoration is explicit. This deliberately has no `Drop` impl: a
/// guard that is dropped without `restore` leaks its overrides into the
/// store for the rest of the process.
#[must_use = "overrides stay in place until restore() is called"]
pub struct OverrideGuard {
    namespace: Namespace,
    saved: Vec<(String, Option<String>)>,
}

impl OverrideGuard {
    /// Put every overridden key back to its previous raw value, or
    /// remove it if it had none.
    pub fn restore(self) {
        for (env_key, prior) in &self.saved {
            match prior {
                Some(raw) => self.namespace.store.set(env_key, raw),
                None => self.namespace.store.remove(env_key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory;
    use serde_json::json;

    fn scoped(prefix: &str) -> Namespace {
        Namespace::with_store(memory(), Some(prefix))
    }

    #[test]
    fn test_env_key_with_prefix() {
        let env = scoped("myapp");
        assert_eq!(env.env_key("hello"), "MYAPP_HELLO");
    }

    #[test]
    fn test_env_key_without_prefix() {
        let env = Namespace::with_store(memory(), None);
        assert_eq!(env.env_key("hello"), "HELLO");
    }

    #[test]
    fn test_prefix_is_uppercased() {
        let env = scoped("myapp");
        assert_eq!(env.prefix(), Some("MYAPP"));
        let shouting = scoped("MYAPP");
        assert_eq!(shouting.prefix(), Some("MYAPP"));
    }

    #[test]
    fn test_empty_prefix_is_no_prefix() {
        let env = Namespace::with_store(memory(), Some(""));
        assert_eq!(env.prefix(), None);
        assert_eq!(env.env_key("key"), "KEY");
    }

    #[test]
    fn test_set_then_get() {
        let env = scoped("myapp");
        env.set("lol", "wut");
        assert_eq!(env.get("lol"), Some(Value::Str("wut".to_string())));
    }

    #[test]
    fn test_set_writes_flat_store_key() {
        let store = memory();
        let env = Namespace::with_store(Rc::clone(&store), Some("myapp"));
        env.set("lol", "wut");
        assert_eq!(store.get("MYAPP_LOL"), Some("wut".to_string()));
    }

    #[test]
    fn test_set_number_round_trips() {
        let env = scoped("app");
        env.set("port", 3000);
        assert_eq!(env.get("port"), Some(Value::Int(3000)));
    }

    #[test]
    fn test_set_array_round_trips() {
        let env = scoped("myapp");
        env.set("admins", json!(["a@x.com", "b@x.com"]));
        let admins = env.get("admins").unwrap();
        assert_eq!(admins.as_json().unwrap()[1], json!("b@x.com"));
    }

    #[test]
    fn test_set_object_expands_without_parent_blob() {
        let store = memory();
        let env = Namespace::with_store(Rc::clone(&store), Some("app"));
        env.set("redis", json!({"host": "localhost", "port": 3000}));
        assert_eq!(store.get("APP_REDIS_HOST"), Some("localhost".to_string()));
        assert_eq!(store.get("APP_REDIS_PORT"), Some("3000".to_string()));
        assert_eq!(store.get("APP_REDIS"), None);
    }

    #[test]
    fn test_get_reassembles_object() {
        let store = memory();
        store.set("APP_REDIS_HOST", "localhost");
        store.set("APP_REDIS_PORT", "3000");
        let env = Namespace::with_store(store, Some("app"));
        let redis = env.get("redis").unwrap();
        let object = redis.as_object().unwrap();
        assert_eq!(object["host"], json!("localhost"));
        assert_eq!(object["port"], json!(3000));
    }

    #[test]
    fn test_get_as_object_coerces_leaves() {
        let store = memory();
        store.set("APP_REDIS_HOST", "localhost");
        store.set("APP_REDIS_PORT", "3000");
        let env = Namespace::with_store(store, Some("app"));
        let redis = env.get_as_object("redis");
        assert_eq!(redis["host"], Value::Str("localhost".to_string()));
        assert_eq!(redis["port"], Value::Int(3000));
    }

    #[test]
    fn test_camel_case_lookup_equivalence() {
        let store = memory();
        store.set("APP_REDIS_HOST", "localhost");
        let env = Namespace::with_store(store, Some("app"));
        assert_eq!(env.get("redisHost"), env.get("redis_host"));
        assert_eq!(env.get("redis_host"), env.get("REDIS_HOST"));
        assert!(env.get("redisHost").is_some());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let env = scoped("noexist");
        assert_eq!(env.get("yayay"), None);
    }

    #[test]
    fn test_get_or_falls_back() {
        let env = scoped("noexist");
        assert_eq!(env.get_or("port", 3000), Value::Int(3000));
    }

    #[test]
    fn test_unset() {
        let env = scoped("myapp");
        env.set("wut", "lol");
        env.unset("wut");
        assert_eq!(env.get("wut"), None);
        // Unsetting a missing key is fine.
        env.unset("wut");
    }

    #[test]
    fn test_defaults_do_not_override_existing() {
        let store = memory();
        store.set("MYAPP_AWESOME", "yep");
        let env = Namespace::with_store(store, Some("myapp"));
        let defaults = json!({"rad": "to the max", "awesome": "to the extreme"});
        env.set_defaults(defaults.as_object().unwrap());
        assert_eq!(env.get("rad"), Some(Value::Str("to the max".to_string())));
        assert_eq!(env.get("awesome"), Some(Value::Str("yep".to_string())));
    }

    #[test]
    fn test_nested_defaults_fill_missing_leaves_only() {
        let store = memory();
        store.set("APP_REDIS_HOST", "remote.example.com");
        let env = Namespace::with_store(Rc::clone(&store), Some("app"));
        let defaults = json!({"redis": {"host": "localhost", "port": 6379}});
        env.set_defaults(defaults.as_object().unwrap());
        assert_eq!(
            store.get("APP_REDIS_HOST"),
            Some("remote.example.com".to_string())
        );
        assert_eq!(store.get("APP_REDIS_PORT"), Some("6379".to_string()));
    }

    #[test]
    fn test_raw_keys_filters_on_prefix() {
        let store = memory();
        store.set("APP_ONE", "1");
        store.set("APP_TWO", "2");
        store.set("APPLE", "no");
        store.set("OTHER", "no");
        let env = Namespace::with_store(store, Some("app"));
        assert_eq!(env.raw_keys(), vec!["APP_ONE", "APP_TWO"]);
    }

    #[test]
    fn test_all_strips_prefix_and_coerces() {
        let store = memory();
        store.set("APP_PORT", "3000");
        store.set("APP_DEBUG", "true");
        let env = Namespace::with_store(store, Some("app"));
        let all = env.all();
        assert_eq!(all["port"], Value::Int(3000));
        assert_eq!(all["debug"], Value::Bool(true));
    }

    #[test]
    fn test_all_raw_keeps_strings() {
        let store = memory();
        store.set("APP_PORT", "3000");
        let env = Namespace::with_store(store, Some("app"));
        assert_eq!(env.all_raw()["port"], "3000");
    }

    #[test]
    fn test_with_overrides_restores_on_return() {
        let env = scoped("myapp");
        env.set("hello", "universe");
        env.with_overrides(
            &[("hello", "world".into()), ("goodnight", "moon".into())],
            || {
                assert_eq!(env.get("hello"), Some(Value::Str("world".to_string())));
                assert_eq!(env.get("goodnight"), Some(Value::Str("moon".to_string())));
            },
        );
        assert_eq!(env.get("hello"), Some(Value::Str("universe".to_string())));
        assert_eq!(env.get("goodnight"), None);
    }

    #[test]
    fn test_begin_overrides_holds_until_restore() {
        let env = scoped("myapp");
        env.set("hello", "universe");
        let guard = env.begin_overrides(&[("hello", "world".into())]);
        assert_eq!(env.get("hello"), Some(Value::Str("world".to_string())));
        guard.restore();
        assert_eq!(env.get("hello"), Some(Value::Str("universe".to_string())));
    }

    #[test]
    fn test_dropped_guard_leaks_overrides() {
        let env = scoped("myapp");
        let guard = env.begin_overrides(&[("leaked", "yes".into())]);
        drop(guard);
        assert_eq!(env.get("leaked"), Some(Value::Str("yes".to_string())));
    }
}
