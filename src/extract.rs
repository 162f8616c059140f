//! Turns archive members into tables.
//!
//! Every extractor reads its own member and fails on its own: a missing,
//! undecodable, or malformed member yields no table and a [`MemberFailure`],
//! never an error for the whole archive.
use crate::archive::{ArchiveError, MemberSource};
use crate::props::StaticText;
use crate::table::{ExtractedTable, Frame};
use anyhow::{Context, Result};
use serde::Serialize;

mod template;

pub use template::{FieldSpec, LineTemplate, TemplateSpec};

fn no_visualizations() -> Vec<serde_json::Value> {
    Vec::new()
}

/// Static description of one table and the member it is read from.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub id: &'static str,
    pub member: &'static str,
    pub title: StaticText,
    pub description: StaticText,
    pub template: TemplateSpec,
    pub visualizations: fn() -> Vec<serde_json::Value>,
}

impl TableSpec {
    pub const fn new(
        id: &'static str,
        member: &'static str,
        title: StaticText,
        description: StaticText,
        template: TemplateSpec,
    ) -> Self {
        Self {
            id,
            member,
            title,
            description,
            template,
            visualizations: no_visualizations,
        }
    }

    pub const fn with_visualizations(mut self, build: fn() -> Vec<serde_json::Value>) -> Self {
        self.visualizations = build;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Missing,
    Unreadable,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberFailure {
    pub member: &'static str,
    pub kind: FailureKind,
    pub reason: String,
}

/// Non-empty tables plus the members that produced nothing.
#[derive(Debug, Default, Serialize)]
pub struct Extraction {
    pub tables: Vec<ExtractedTable>,
    pub failures: Vec<MemberFailure>,
}

pub struct Extractor {
    spec: &'static TableSpec,
    template: LineTemplate,
}

impl Extractor {
    pub fn new(spec: &'static TableSpec) -> Result<Self> {
        let template = LineTemplate::compile(&spec.template)
            .with_context(|| format!("compile template for {}", spec.id))?;
        Ok(Self { spec, template })
    }

    pub fn spec(&self) -> &'static TableSpec {
        self.spec
    }

    /// Rows of one member's decoded text.
    pub fn extract_text(&self, text: &str) -> Result<Frame> {
        self.template.apply(text)
    }

    /// The member's table, `None` when the member holds no rows.
    pub fn extract(
        &self,
        archive: &dyn MemberSource,
    ) -> std::result::Result<Option<ExtractedTable>, MemberFailure> {
        let text = archive
            .read_text(self.spec.member)
            .map_err(|err| self.failure_from_archive(err))?;
        let frame = self.extract_text(&text).map_err(|err| MemberFailure {
            member: self.spec.member,
            kind: FailureKind::Malformed,
            reason: format!("{err:#}"),
        })?;
        if frame.is_empty() {
            return Ok(None);
        }
        let table = ExtractedTable::new(self.spec.id, self.spec.title.into(), frame)
            .with_description(self.spec.description.into())
            .with_visualizations((self.spec.visualizations)());
        Ok(Some(table))
    }

    fn failure_from_archive(&self, err: ArchiveError) -> MemberFailure {
        let kind = if err.is_missing_member() {
            FailureKind::Missing
        } else {
            FailureKind::Unreadable
        };
        MemberFailure {
            member: self.spec.member,
            kind,
            reason: err.to_string(),
        }
    }
}

/// Run every extractor against `archive`, in order.
pub fn extract_all(extractors: &[Extractor], archive: &dyn MemberSource) -> Extraction {
    let mut extraction = Extraction::default();
    for extractor in extractors {
        match extractor.extract(archive) {
            Ok(Some(table)) => {
                tracing::debug!(table = %table.id, rows = table.frame.len(), "extracted table");
                extraction.tables.push(table);
            }
            Ok(None) => {
                tracing::debug!(member = extractor.spec.member, "member produced no rows");
            }
            Err(failure) => {
                match failure.kind {
                    FailureKind::Missing => {
                        tracing::debug!(member = failure.member, "member absent")
                    }
                    FailureKind::Unreadable | FailureKind::Malformed => tracing::warn!(
                        member = failure.member,
                        reason = %failure.reason,
                        "member extraction failed"
                    ),
                }
                extraction.failures.push(failure);
            }
        }
    }
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;

    static SEARCHES: TableSpec = TableSpec::new(
        "test_searches",
        "Searches.txt",
        StaticText::same("Searches"),
        StaticText::same("What you searched"),
        TemplateSpec::Records(&[
            FieldSpec::new("Date:", "moment"),
            FieldSpec::new("Search Term:", "term"),
        ]),
    );

    static LIKES: TableSpec = TableSpec::new(
        "test_likes",
        "Like List.txt",
        StaticText::same("Likes"),
        StaticText::same("What you liked"),
        TemplateSpec::Records(&[
            FieldSpec::new("Date:", "moment"),
            FieldSpec::new("Link:", "video"),
        ]),
    );

    fn extractors() -> Vec<Extractor> {
        vec![
            Extractor::new(&SEARCHES).unwrap(),
            Extractor::new(&LIKES).unwrap(),
        ]
    }

    #[test]
    fn missing_member_is_a_local_failure() {
        let archive =
            MemoryArchive::new().with_member("Searches.txt", "Date: 2021-05-01\nSearch Term: cats\n");
        let extraction = extract_all(&extractors(), &archive);
        assert_eq!(extraction.tables.len(), 1);
        assert_eq!(extraction.tables[0].id, "test_searches");
        assert_eq!(extraction.failures.len(), 1);
        assert_eq!(extraction.failures[0].member, "Like List.txt");
        assert_eq!(extraction.failures[0].kind, FailureKind::Missing);
    }

    #[test]
    fn undecodable_member_does_not_affect_others() {
        let archive = MemoryArchive::new()
            .with_member("Searches.txt", vec![0xc3, 0x28, 0x0a])
            .with_member("Like List.txt", "Date: 2021-05-01\nLink: https://v/1\n");
        let extraction = extract_all(&extractors(), &archive);
        assert_eq!(extraction.tables.len(), 1);
        assert_eq!(extraction.tables[0].id, "test_likes");
        assert_eq!(extraction.failures[0].kind, FailureKind::Unreadable);
    }

    #[test]
    fn member_without_matches_is_omitted_silently() {
        let archive = MemoryArchive::new().with_member("Searches.txt", "nothing useful here\n");
        let extraction = extract_all(&extractors()[..1], &archive);
        assert!(extraction.tables.is_empty());
        assert!(extraction.failures.is_empty());
    }

    #[test]
    fn table_carries_static_title_and_description() {
        let archive =
            MemoryArchive::new().with_member("Searches.txt", "Date: d\nSearch Term: t\n");
        let table = Extractor::new(&SEARCHES)
            .unwrap()
            .extract(&archive)
            .unwrap()
            .unwrap();
        assert_eq!(table.title.translations.en, "Searches");
        assert_eq!(
            table.description.as_ref().unwrap().translations.nl,
            "What you searched"
        );
        assert!(table.visualizations.is_empty());
        assert!(!table.folded);
    }

    #[test]
    fn rerunning_extraction_is_side_effect_free() {
        let archive = MemoryArchive::new()
            .with_member("Searches.txt", "Date: a\nSearch Term: b\nDate: c\nSearch Term: d\n");
        let extractors = extractors();
        let first = extract_all(&extractors, &archive);
        let second = extract_all(&extractors, &archive);
        assert_eq!(first.tables, second.tables);
        assert_eq!(first.failures, second.failures);
    }
}
