//! Category inference for uploaded exports.
//!
//! A platform declares the export shapes it recognizes as [`DdpCategory`]
//! values. Validation opens the upload, matches its member names against the
//! categories in declaration order, and resolves a [`StatusCode`].
use crate::archive::{ArchiveError, ArchiveOpener, MemberSource};
use serde::{Serialize, Serializer};

/// Label used for the category slot when nothing matched.
pub const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdpFileType {
    Json,
    Html,
    Csv,
    Txt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Nl,
}

/// One recognized export shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DdpCategory {
    pub id: &'static str,
    pub file_type: DdpFileType,
    pub language: Language,
    pub known_files: &'static [&'static str],
}

impl DdpCategory {
    pub fn matches<S: AsRef<str>>(&self, member_names: &[S]) -> bool {
        member_names
            .iter()
            .any(|name| self.known_files.contains(&name.as_ref()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCode {
    pub id: u8,
    pub description: &'static str,
    pub message: &'static str,
}

/// The fixed status code set of one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCodes {
    pub valid: StatusCode,
    pub unrecognized: StatusCode,
    pub unreadable: StatusCode,
}

/// Outcome of one validation call.
///
/// A category is present exactly when the status is the valid code; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    #[serde(serialize_with = "serialize_category")]
    category: Option<&'static DdpCategory>,
    status: StatusCode,
}

fn serialize_category<S: Serializer>(
    category: &Option<&'static DdpCategory>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(category.map_or(UNKNOWN_CATEGORY, |category| category.id))
}

impl ValidationResult {
    pub fn category(&self) -> Option<&'static DdpCategory> {
        self.category
    }

    pub fn category_id(&self) -> &'static str {
        self.category.map_or(UNKNOWN_CATEGORY, |category| category.id)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_recognized(&self) -> bool {
        self.category.is_some()
    }
}

/// Static validation rules of one platform.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    categories: &'static [DdpCategory],
    codes: StatusCodes,
}

/// Validation outcome together with the opened archive, when there is one.
pub struct ArchiveValidation {
    pub result: ValidationResult,
    pub archive: Option<Box<dyn MemberSource>>,
}

impl Validator {
    pub const fn new(categories: &'static [DdpCategory], codes: StatusCodes) -> Self {
        Self { categories, codes }
    }

    /// Pick the first declared category sharing a member name with the upload.
    pub fn infer_category<S: AsRef<str>>(&self, member_names: &[S]) -> ValidationResult {
        match self
            .categories
            .iter()
            .find(|category| category.matches(member_names))
        {
            Some(category) => ValidationResult {
                category: Some(category),
                status: self.codes.valid,
            },
            None => ValidationResult {
                category: None,
                status: self.codes.unrecognized,
            },
        }
    }

    /// Result for a container that could not be opened at all.
    pub fn unreadable(&self) -> ValidationResult {
        ValidationResult {
            category: None,
            status: self.codes.unreadable,
        }
    }

    /// Open `handle` and infer its category; an unopenable container
    /// short-circuits to the unreadable code.
    pub fn validate_archive(&self, opener: &dyn ArchiveOpener, handle: &str) -> ArchiveValidation {
        match opener.open(handle) {
            Ok(archive) => {
                let names = archive.member_names();
                let result = self.infer_category(&names);
                tracing::info!(
                    members = names.len(),
                    category = result.category_id(),
                    status = result.status().id,
                    "validated archive"
                );
                ArchiveValidation {
                    result,
                    archive: Some(archive),
                }
            }
            Err(err) => {
                report_unreadable(&err);
                ArchiveValidation {
                    result: self.unreadable(),
                    archive: None,
                }
            }
        }
    }
}

fn report_unreadable(err: &ArchiveError) {
    tracing::warn!(error = %err, "archive could not be opened");
}
