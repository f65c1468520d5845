//! Answer input for the command-line front end
//!
//! Field assignments (`key=value`) and TOML answer files are fed through the
//! same form collection as interactive pages, so multi-select fields and
//! empty values behave identically.

use crate::form::{self, ControlKind, Form, FormControl};
use crate::session::PAGE_COUNT;
use lzm_common::models::PageAnswers;
use lzm_common::{Error, Result};
use std::collections::BTreeMap;

/// Build page answers from `key=value` assignments; repeated keys accumulate
pub fn answers_from_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<PageAnswers> {
    let mut form = Form::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidInput(format!("expected key=value, got '{}'", assignment))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidInput(format!("empty field name in '{}'", assignment)));
        }
        form.push(FormControl::new(ControlKind::Hidden, key, value.trim()));
    }
    Ok(form::collect(&form))
}

/// Parse an answers file with one `[pageN]` table per page
///
/// ```toml
/// [page1]
/// 종류 = ["Gecko"]
/// 종류_가중치_Gecko = 15
///
/// [page2]
/// 활동패턴 = "야행성"
/// ```
pub fn pages_from_toml(text: &str) -> Result<Vec<(u8, PageAnswers)>> {
    let tables: BTreeMap<String, toml::Table> =
        toml::from_str(text).map_err(|e| Error::InvalidInput(format!("answers file: {}", e)))?;

    let mut pages = Vec::new();
    for (name, table) in tables {
        let page = name
            .strip_prefix("page")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=PAGE_COUNT).contains(n))
            .ok_or_else(|| Error::InvalidInput(format!("unknown section [{}]", name)))?;

        let mut form = Form::new();
        for (key, value) in &table {
            for scalar in scalars(key, value)? {
                form.push(FormControl::new(ControlKind::Hidden, key, &scalar));
            }
        }
        pages.push((page, form::collect(&form)));
    }

    pages.sort_by_key(|(page, _)| *page);
    Ok(pages)
}

fn scalars(key: &str, value: &toml::Value) -> Result<Vec<String>> {
    match value {
        toml::Value::Array(items) => items
            .iter()
            .map(|item| scalar(key, item))
            .collect(),
        other => Ok(vec![scalar(key, other)?]),
    }
}

fn scalar(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(n) => Ok(n.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        _ => Err(Error::InvalidInput(format!("unsupported value for '{}'", key))),
    }
}
