//! Consent form assembly.
use crate::platform::PlatformCopy;
use crate::props::{ConsentForm, StaticText};
use crate::table::{ExtractedTable, Frame};
use anyhow::Result;

const NO_DATA_TITLE: StaticText =
    StaticText::same("Er ging niks mis, maar we konden geen gegevens in jouw data vinden");
const NO_DATA_CELL: &str = "No data found";

/// Single-row table shown when extraction found nothing.
pub fn placeholder_table(platform: &str) -> Result<ExtractedTable> {
    let mut frame = Frame::new([NO_DATA_CELL]);
    frame.push_row(vec![NO_DATA_CELL.to_string()])?;
    Ok(ExtractedTable::new(
        format!("{platform}_no_data_found"),
        NO_DATA_TITLE.into(),
        frame,
    ))
}

#[derive(Debug)]
pub struct AssembledForm {
    pub form: ConsentForm,
    /// The placeholder was substituted for an empty extraction.
    pub no_data: bool,
}

/// Wrap `tables` into a consent form; never yields an empty table list.
pub fn assemble(
    tables: Vec<ExtractedTable>,
    platform: &str,
    copy: &PlatformCopy,
) -> Result<AssembledForm> {
    let no_data = tables.is_empty();
    let tables = if no_data {
        vec![placeholder_table(platform)?]
    } else {
        tables
    };
    Ok(AssembledForm {
        form: ConsentForm {
            tables,
            meta_tables: Vec::new(),
            description: Some(copy.consent_description.into()),
            donate_question: Some(copy.donate_question.into()),
            donate_button: Some(copy.donate_button.into()),
        },
        no_data,
    })
}
