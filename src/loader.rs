//! Bulk-loading of configuration files into the environment store.
//!
//! Two formats are supported. A file whose trimmed content starts with
//! `{` is parsed as one JSON object and flattened into the flat key
//! namespace; anything else is treated as dotenv-style `key=value`
//! lines. In both modes a key already present in the store is never
//! overwritten: the first writer wins, whether that was the hosting
//! process or an earlier load.

use crate::error::EnvError;
use crate::flatten::flatten;
use crate::store::{EnvStore, ProcessStore};
use crate::value::Value;
use serde_json::Value as Json;
use std::path::Path;
use std::{fs, io};
use tracing::debug;

/// Load `.env` from the current directory into the process environment.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load() -> Result<bool, EnvError> {
    load_from(".env")
}

/// Load a configuration file into the process environment.
pub fn load_from(path: impl AsRef<Path>) -> Result<bool, EnvError> {
    load_into(&ProcessStore, path)
}

/// Load a configuration file into an injected store.
///
/// Returns `Ok(false)` when the file does not exist and `Ok(true)` after
/// a successful merge. A malformed JSON file is the only loud failure.
pub fn load_into(store: &dyn EnvStore, path: impl AsRef<Path>) -> Result<bool, EnvError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(EnvError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    debug!(path = %path.display(), "loading environment file");
    if contents.trim_start().starts_with('{') {
        merge_json(store, &contents, path)?;
    } else {
        merge_dotenv(store, &contents);
    }
    Ok(true)
}

fn merge_json(store: &dyn EnvStore, contents: &str, path: &Path) -> Result<(), EnvError> {
    let parse_error = || EnvError::Parse {
        path: path.to_path_buf(),
    };
    let parsed: Json = serde_json::from_str(contents).map_err(|_| parse_error())?;
    let obj = parsed.as_object().ok_or_else(parse_error)?;
    for (key, leaf) in flatten(obj, None) {
        merge_entry(store, &key, &Value::from(leaf).to_string());
    }
    Ok(())
}

fn merge_dotenv(store: &dyn EnvStore, contents: &str) {
    for line in contents.lines() {
        if let Some((key, value)) = parse_line(line) {
            merge_entry(store, key, value);
        }
    }
}

/// First writer wins: a key already in the store is left untouched.
fn merge_entry(store: &dyn EnvStore, key: &str, value: &str) {
    if store.contains(key) {
        debug!(key, "skipping, already set");
        return;
    }
    store.set(key, value);
}

/// Split one dotenv line into a key/value pair.
///
/// Lines that are blank, comments, or otherwise don't look like
/// `key=value` yield `None` and are skipped by the caller. An optional
/// leading `export ` is stripped case-insensitively, the split happens
/// on the first `=`, and one layer of matching single or double quotes
/// around the value is removed. No escape sequences are processed.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = strip_export(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, strip_quotes(value.trim())))
}

fn strip_export(line: &str) -> &str {
    match line.split_once(char::is_whitespace) {
        Some((first, rest)) if first.eq_ignore_ascii_case("export") && !first.contains('=') => {
            rest.trim_start()
        }
        _ => line,
    }
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
