//! Page descriptions handed to the host renderer.
//!
//! Every value serializes to the `__type__`-tagged JSON the renderer
//! understands. The flow never looks inside a page after building it.
use crate::table::ExtractedTable;
use serde::Serialize;

/// Text shown to the participant in each supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translations {
    pub en: String,
    pub nl: String,
}

/// Localizable text wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translatable {
    pub translations: Translations,
}

impl Translatable {
    pub fn new(en: impl Into<String>, nl: impl Into<String>) -> Self {
        Self {
            translations: Translations {
                en: en.into(),
                nl: nl.into(),
            },
        }
    }
}

/// Compile-time text pair, used by static platform definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticText {
    pub en: &'static str,
    pub nl: &'static str,
}

impl StaticText {
    /// Same text for every language.
    pub const fn same(text: &'static str) -> Self {
        Self { en: text, nl: text }
    }
}

impl From<StaticText> for Translatable {
    fn from(text: StaticText) -> Self {
        Translatable::new(text.en, text.nl)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "__type__", rename = "PropsUIHeader")]
pub struct Header {
    pub title: Translatable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "__type__", rename = "PropsUIFooter")]
pub struct Footer {}

/// Top-level page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "__type__")]
pub enum Page {
    #[serde(rename = "PropsUIPageDonation")]
    Donation(Box<DonationPage>),
    #[serde(rename = "PropsUIPageEnd")]
    End,
}

impl Page {
    pub fn donation(platform: &str, title: Translatable, body: PromptBody) -> Self {
        Page::Donation(Box::new(DonationPage {
            platform: platform.to_string(),
            header: Header { title },
            body,
            footer: Some(Footer::default()),
        }))
    }

    /// Donation pages collect an answer; the end page does not.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Page::Donation(_))
    }

    pub fn body(&self) -> Option<&PromptBody> {
        match self {
            Page::Donation(page) => Some(&page.body),
            Page::End => None,
        }
    }
}

/// A multi-purpose page scoped to one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationPage {
    pub platform: String,
    pub header: Header,
    pub body: PromptBody,
    pub footer: Option<Footer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "__type__")]
pub enum PromptBody {
    #[serde(rename = "PropsUIPromptFileInput")]
    FileInput(FileInput),
    #[serde(rename = "PropsUIPromptConfirm")]
    Confirm(Confirm),
    #[serde(rename = "PropsUIPromptConsentForm")]
    ConsentForm(ConsentForm),
    #[serde(rename = "PropsUIPromptQuestionnaire")]
    Questionnaire(Questionnaire),
}

impl PromptBody {
    /// Stable name used in logs and protocol errors.
    pub fn kind(&self) -> &'static str {
        match self {
            PromptBody::FileInput(_) => "file_input",
            PromptBody::Confirm(_) => "confirm",
            PromptBody::ConsentForm(_) => "consent_form",
            PromptBody::Questionnaire(_) => "questionnaire",
        }
    }
}

/// Ask the participant to pick a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInput {
    pub description: Translatable,
    /// Accepted MIME types, advisory only.
    pub extensions: String,
}

/// Two-button confirmation; `ok` answers `True`, `cancel` answers `False`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirm {
    pub text: Translatable,
    pub ok: Translatable,
    pub cancel: Translatable,
}

/// Tables shown to the participant prior to donation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentForm {
    pub tables: Vec<ExtractedTable>,
    pub meta_tables: Vec<ExtractedTable>,
    pub description: Option<Translatable>,
    pub donate_question: Option<Translatable>,
    pub donate_button: Option<Translatable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    pub description: Translatable,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "__type__")]
pub enum Question {
    #[serde(rename = "PropsUIQuestionOpen")]
    Open { id: u32, question: Translatable },
}
