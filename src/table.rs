//! Extracted tables and their renderer wire shape.
use crate::props::Translatable;
use anyhow::{ensure, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Ordered rows over a column set fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; values are positional and must cover every column.
    pub fn push_row(&mut self, values: Vec<String>) -> Result<()> {
        ensure!(
            values.len() == self.columns.len(),
            "row has {} values for {} columns",
            values.len(),
            self.columns.len()
        );
        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index` as a column-name to value mapping.
    pub fn record(&self, index: usize) -> Option<BTreeMap<String, String>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    pub fn records(&self) -> impl Iterator<Item = BTreeMap<String, String>> + '_ {
        (0..self.rows.len()).filter_map(|index| self.record(index))
    }

    /// Column-oriented JSON (`{"col": {"0": value, ...}}`), column order kept.
    pub fn to_column_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&ColumnOriented(self))
    }
}

struct ColumnOriented<'a>(&'a Frame);

struct ColumnValues<'a> {
    frame: &'a Frame,
    column: usize,
}

impl Serialize for ColumnOriented<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.columns.len()))?;
        for (column, name) in self.0.columns.iter().enumerate() {
            map.serialize_entry(
                name,
                &ColumnValues {
                    frame: self.0,
                    column,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for ColumnValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.frame.rows.len()))?;
        for (index, row) in self.frame.rows.iter().enumerate() {
            map.serialize_entry(&index.to_string(), &row[self.column])?;
        }
        map.end()
    }
}

/// One reviewable table in a consent form.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// Identifies the table after donation; unique within one form.
    pub id: String,
    pub title: Translatable,
    pub frame: Frame,
    pub description: Option<Translatable>,
    /// Renderer chart specs, passed through untouched.
    pub visualizations: Vec<serde_json::Value>,
    /// Display hint, passed through untouched.
    pub folded: bool,
}

impl ExtractedTable {
    pub fn new(id: impl Into<String>, title: Translatable, frame: Frame) -> Self {
        Self {
            id: id.into(),
            title,
            frame,
            description: None,
            visualizations: Vec::new(),
            folded: false,
        }
    }

    pub fn with_description(mut self, description: Translatable) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_visualizations(mut self, visualizations: Vec<serde_json::Value>) -> Self {
        self.visualizations = visualizations;
        self
    }
}

#[derive(Serialize)]
#[serde(tag = "__type__", rename = "PropsUIPromptConsentFormTable")]
struct TableWire<'a> {
    id: &'a str,
    title: &'a Translatable,
    data_frame: String,
    description: Option<&'a Translatable>,
    visualizations: Option<&'a [serde_json::Value]>,
    folded: bool,
}

impl Serialize for ExtractedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data_frame = self
            .frame
            .to_column_json()
            .map_err(serde::ser::Error::custom)?;
        TableWire {
            id: &self.id,
            title: &self.title,
            data_frame,
            description: self.description.as_ref(),
            visualizations: (!self.visualizations.is_empty())
                .then_some(self.visualizations.as_slice()),
            folded: self.folded,
        }
        .serialize(serializer)
    }
}
