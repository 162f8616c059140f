//! Line templates for labeled-record text files.
//!
//! A template is declared as data and compiled once. Label patterns are regex
//! fragments anchored at the start of a line and followed by a single space;
//! matching is case-sensitive and proceeds line by line in document order.
use crate::table::Frame;
use anyhow::{ensure, Context, Result};
use regex::{Regex, RegexBuilder};

/// One `Label: value` line of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Regex fragment for the label, including its trailing colon.
    pub label: &'static str,
    pub column: &'static str,
    /// Absorb following lines until a blank line or another field label.
    pub continuation: bool,
}

impl FieldSpec {
    pub const fn new(label: &'static str, column: &'static str) -> Self {
        Self {
            label,
            column,
            continuation: false,
        }
    }

    pub const fn continued(mut self) -> Self {
        self.continuation = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TemplateSpec {
    /// Repeating records of consecutive field lines.
    Records(&'static [FieldSpec]),
    /// A single delimited list field expanded into one row per item.
    List {
        label: &'static str,
        column: &'static str,
        separator: char,
    },
}

struct CompiledField {
    regex: Regex,
    column: &'static str,
    continuation: bool,
}

impl CompiledField {
    fn capture<'t>(&self, line: &'t str) -> Option<&'t str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.name("value"))
            .map(|value| value.as_str())
    }
}

enum Compiled {
    Records(Vec<CompiledField>),
    List {
        field: CompiledField,
        separator: char,
    },
}

/// A compiled template ready to run over decoded text.
pub struct LineTemplate {
    compiled: Compiled,
}

impl LineTemplate {
    pub fn compile(spec: &TemplateSpec) -> Result<Self> {
        let compiled = match spec {
            TemplateSpec::Records(fields) => {
                ensure!(!fields.is_empty(), "record template has no fields");
                Compiled::Records(
                    fields
                        .iter()
                        .map(|field| compile_field(field.label, field.column, field.continuation))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            TemplateSpec::List {
                label,
                column,
                separator,
            } => Compiled::List {
                field: compile_field(label, *column, false)?,
                separator: *separator,
            },
        };
        Ok(Self { compiled })
    }

    pub fn columns(&self) -> Vec<&'static str> {
        match &self.compiled {
            Compiled::Records(fields) => fields.iter().map(|field| field.column).collect(),
            Compiled::List { field, .. } => vec![field.column],
        }
    }

    /// Rows found in `text`, in document order.
    pub fn apply(&self, text: &str) -> Result<Frame> {
        let lines: Vec<&str> = text.lines().collect();
        let mut frame = Frame::new(self.columns());
        match &self.compiled {
            Compiled::Records(fields) => {
                let mut cursor = 0;
                while cursor < lines.len() {
                    match match_record(fields, &lines, cursor) {
                        Some((values, next)) => {
                            frame.push_row(values)?;
                            cursor = next;
                        }
                        None => cursor += 1,
                    }
                }
            }
            Compiled::List { field, separator } => {
                if let Some(value) = lines.iter().find_map(|line| field.capture(line)) {
                    // An empty list ("Interests: ") means no interests, not one blank one.
                    for item in value.split(*separator).filter(|item| !item.is_empty()) {
                        frame.push_row(vec![item.to_string()])?;
                    }
                }
            }
        }
        Ok(frame)
    }
}

fn compile_field(label: &str, column: &'static str, continuation: bool) -> Result<CompiledField> {
    let pattern = format!("^(?:{label}) (?P<value>.*)$");
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(false)
        .build()
        .with_context(|| format!("invalid label pattern for column {column}"))?;
    Ok(CompiledField {
        regex,
        column,
        continuation,
    })
}

/// Match every field consecutively from `start`; returns the values and the
/// line after the record.
fn match_record(
    fields: &[CompiledField],
    lines: &[&str],
    start: usize,
) -> Option<(Vec<String>, usize)> {
    let mut values = Vec::with_capacity(fields.len());
    let mut cursor = start;
    for field in fields {
        let mut value = field.capture(lines.get(cursor)?)?.to_string();
        cursor += 1;
        if field.continuation {
            while let Some(line) = lines.get(cursor) {
                if line.trim().is_empty() || fields.iter().any(|other| other.capture(line).is_some())
                {
                    break;
                }
                value.push('\n');
                value.push_str(line);
                cursor += 1;
            }
        }
        values.push(value);
    }
    Some((values, cursor))
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
