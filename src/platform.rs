//! Supported platforms.
//!
//! A platform bundles everything the flow needs to know about one export
//! source: how to recognize its archive, how to pull tables out of it, and
//! the participant-facing copy around those steps.
use crate::archive::MemberSource;
use crate::extract::Extraction;
use crate::props::StaticText;
use crate::validate::Validator;
use anyhow::{anyhow, Result};

pub mod tiktok;

/// Participant-facing text of one platform.
#[derive(Debug, Clone, Copy)]
pub struct PlatformCopy {
    pub file_page_title: StaticText,
    pub file_prompt: StaticText,
    pub retry_text: StaticText,
    pub consent_page_title: StaticText,
    pub consent_description: StaticText,
    pub donate_question: StaticText,
    pub donate_button: StaticText,
}

pub trait Platform {
    /// Identifier used in configuration.
    fn id(&self) -> &'static str;

    /// Display name; also the namespace of donation keys.
    fn name(&self) -> &'static str;

    fn validator(&self) -> &Validator;

    fn copy(&self) -> &PlatformCopy;

    /// Extract every known table from a recognized archive.
    fn extract(&self, archive: &dyn MemberSource) -> Extraction;
}

/// Identifiers accepted by [`platform_by_id`].
pub const PLATFORM_IDS: &[&str] = &[tiktok::PLATFORM_ID];

pub fn platform_by_id(id: &str) -> Result<Box<dyn Platform>> {
    match id {
        tiktok::PLATFORM_ID => Ok(Box::new(tiktok::TikTok::new()?)),
        other => Err(anyhow!(
            "unknown platform {other} (expected one of: {})",
            PLATFORM_IDS.join(", ")
        )),
    }
}
