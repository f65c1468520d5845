//! Survey form model and field collection
//!
//! A [`Form`] stands in for one page's DOM form: an ordered list of named
//! controls. [`collect`] reads it the way `FormData` would, [`restore`]
//! writes saved answers back by name/value equality.

use lzm_common::models::{AnswerValue, PageAnswers};

/// Multi-select checkbox groups that always collect as sequences
pub const MULTI_SELECT_FIELDS: [&str; 2] = ["종류", "외형태그"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Number,
    Hidden,
    Select,
    TextArea,
    Radio,
    Checkbox,
}

impl ControlKind {
    fn is_checkable(self) -> bool {
        matches!(self, ControlKind::Radio | ControlKind::Checkbox)
    }
}

/// One named form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub name: String,
    pub kind: ControlKind,
    pub value: String,
    pub checked: bool,
}

impl FormControl {
    pub fn new(kind: ControlKind, name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value: value.to_string(),
            checked: false,
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self::new(ControlKind::Text, name, value)
    }

    pub fn select(name: &str, value: &str) -> Self {
        Self::new(ControlKind::Select, name, value)
    }

    pub fn radio(name: &str, value: &str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(ControlKind::Radio, name, value)
        }
    }

    pub fn checkbox(name: &str, value: &str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(ControlKind::Checkbox, name, value)
        }
    }

    /// Whether this control contributes an entry when the form is read
    fn is_successful(&self) -> bool {
        !self.kind.is_checkable() || self.checked
    }
}

/// Ordered collection of controls for one survey page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    controls: Vec<FormControl>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, control: FormControl) -> Self {
        self.controls.push(control);
        self
    }

    pub fn push(&mut self, control: FormControl) {
        self.controls.push(control);
    }

    pub fn controls(&self) -> &[FormControl] {
        &self.controls
    }

    /// Remove every control with this name
    pub fn remove(&mut self, name: &str) {
        self.controls.retain(|c| c.name != name);
    }

    /// Check the radio/checkbox with this name and value; radios uncheck siblings
    pub fn check(&mut self, name: &str, value: &str) -> bool {
        let Some(idx) = self
            .controls
            .iter()
            .position(|c| c.name == name && c.value == value && c.kind.is_checkable())
        else {
            return false;
        };

        if self.controls[idx].kind == ControlKind::Radio {
            for c in self.controls.iter_mut() {
                if c.name == name && c.kind == ControlKind::Radio {
                    c.checked = false;
                }
            }
        }
        self.controls[idx].checked = true;
        true
    }

    pub fn uncheck(&mut self, name: &str, value: &str) {
        for c in self.controls.iter_mut() {
            if c.name == name && c.value == value {
                c.checked = false;
            }
        }
    }

    /// Set the value of the first non-checkable control with this name
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self
            .controls
            .iter_mut()
            .find(|c| c.name == name && !c.kind.is_checkable())
        {
            Some(c) => {
                c.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// `(name, value)` entries in document order, like `FormData`
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.controls
            .iter()
            .filter(|c| c.is_successful())
            .map(|c| (c.name.as_str(), c.value.as_str()))
    }
}

/// Read a form into page answers
///
/// Repeated names become sequences in encounter order; empty values are
/// omitted. The multi-select groups always yield deduplicated sequences.
pub fn collect(form: &Form) -> PageAnswers {
    let mut answers = PageAnswers::new();

    for (name, value) in form.entries() {
        if value.is_empty() {
            continue;
        }
        answers.append(name, value);
    }

    for field in MULTI_SELECT_FIELDS {
        if let Some(existing) = answers.get(field) {
            let mut unique: Vec<String> = Vec::new();
            for v in existing.values() {
                if !unique.iter().any(|u| u == v) {
                    unique.push(v.to_string());
                }
            }
            answers.insert(field, AnswerValue::Multi(unique));
        }
    }

    answers
}

/// Outcome of writing saved answers back into a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub applied: usize,
    pub skipped: Vec<String>,
}

/// Re-apply saved answers to matching controls
///
/// Fields with no matching control (removed since the save) are skipped.
pub fn restore(form: &mut Form, answers: &PageAnswers) -> RestoreReport {
    let mut report = RestoreReport::default();

    for (name, value) in answers.iter() {
        let applied = match value {
            AnswerValue::Multi(values) => {
                let mut any = false;
                for v in values {
                    any |= form.check(name, v);
                }
                any
            }
            AnswerValue::Single(v) => {
                let kind = form
                    .controls()
                    .iter()
                    .find(|c| &c.name == name)
                    .map(|c| c.kind);
                match kind {
                    Some(k) if k.is_checkable() => form.check(name, v),
                    Some(_) => form.set_value(name, v),
                    None => false,
                }
            }
        };

        if applied {
            report.applied += 1;
        } else {
            report.skipped.push(name.clone());
        }
    }

    report
}
