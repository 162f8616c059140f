//! The donation flow state machine.
//!
//! A [`DonationFlow`] walks every configured platform in order: ask for a
//! file, validate it (offering a retry when it is not recognized), show the
//! extracted tables for review, donate what the participant approved, and
//! ask a short questionnaire. The host drives it one command at a time:
//! [`DonationFlow::start`] yields the first command and every call to
//! [`DonationFlow::resume`] hands back the answer to the previous command and
//! yields the next one.
//!
//! Commands between two prompts are queued in an outbox. While the outbox is
//! non-empty the host's payloads are acknowledgements and are ignored; once
//! it drains, the next payload answers the pending prompt.
use crate::archive::ArchiveOpener;
use crate::extract::FailureKind;
use crate::form;
use crate::platform::{Platform, PlatformCopy};
use crate::props::{Confirm, FileInput, Page, PromptBody, Question, Questionnaire, Translatable};
use crate::protocol::{Command, Payload};
use crate::session_log::SessionLog;
use crate::table::ExtractedTable;
use crate::validate::ArchiveValidation;
use std::collections::VecDeque;
use thiserror::Error;

/// MIME types offered by the file prompt unless configured otherwise.
pub const DEFAULT_FILE_EXTENSIONS: &str = "application/zip, text/plain, application/json";

pub const EXIT_MESSAGE: &str = "Success";

/// Platform slot of the questionnaire page.
const QUESTIONNAIRE_PLATFORM: &str = "page";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{payload} is not a valid answer to the {step} prompt")]
    ProtocolViolation {
        step: &'static str,
        payload: &'static str,
    },
    #[error("flow has not been started")]
    NotStarted,
    #[error("flow has already been started")]
    AlreadyStarted,
    #[error("flow has finished")]
    Finished,
    #[error("flow stopped after an earlier error")]
    Poisoned,
    #[error("assemble consent form: {0}")]
    Assembly(String),
    #[error("encode donation payload")]
    Encode(#[from] serde_json::Error),
}

/// Interactive steps that suspend the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    File,
    Retry,
    Consent,
    Questionnaire,
}

impl Prompt {
    pub fn name(self) -> &'static str {
        match self {
            Prompt::File => "file_input",
            Prompt::Retry => "retry_confirm",
            Prompt::Consent => "consent_form",
            Prompt::Questionnaire => "questionnaire",
        }
    }

    /// Every prompt accepts `False` and `None` as "declined".
    fn accepts(self, payload: &Payload) -> bool {
        match payload {
            Payload::False | Payload::None => true,
            Payload::StringValue(_) => self == Prompt::File,
            Payload::True => self == Prompt::Retry,
            Payload::JsonValue(_) => matches!(self, Prompt::Consent | Prompt::Questionnaire),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusEvent {
    NoDataFound,
    Donated,
    SkipReviewConsent,
}

impl StatusEvent {
    fn key_suffix(self) -> &'static str {
        match self {
            StatusEvent::NoDataFound => "NO-DATA-FOUND",
            StatusEvent::Donated => "DONATED",
            StatusEvent::SkipReviewConsent => "SKIP-REVIEW-CONSENT",
        }
    }

    fn status(self) -> &'static str {
        match self {
            StatusEvent::NoDataFound => "NO_DATA_FOUND",
            StatusEvent::Donated => "DONATED",
            StatusEvent::SkipReviewConsent => "SKIP_REVIEW_CONSENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Awaiting { platform: usize, prompt: Prompt },
    /// Exit and end page queued; nothing left to ask.
    Closing,
    Finished,
    Poisoned,
}

/// One participant session walking through every configured platform.
pub struct DonationFlow {
    session_id: String,
    platforms: Vec<Box<dyn Platform>>,
    opener: Box<dyn ArchiveOpener>,
    file_extensions: String,
    log: SessionLog,
    outbox: VecDeque<Command>,
    state: State,
}

impl DonationFlow {
    pub fn new(
        session_id: impl Into<String>,
        platforms: Vec<Box<dyn Platform>>,
        opener: Box<dyn ArchiveOpener>,
    ) -> Self {
        let session_id = session_id.into();
        Self {
            log: SessionLog::new(session_id.clone(), module_path!()),
            session_id,
            platforms,
            opener,
            file_extensions: DEFAULT_FILE_EXTENSIONS.to_string(),
            outbox: VecDeque::new(),
            state: State::Created,
        }
    }

    pub fn with_file_extensions(mut self, extensions: impl Into<String>) -> Self {
        self.file_extensions = extensions.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_log(&self) -> &SessionLog {
        &self.log
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// The prompt whose answer the next [`DonationFlow::resume`] reads, if
    /// every queued command has been handed out.
    pub fn pending_prompt(&self) -> Option<Prompt> {
        match self.state {
            State::Awaiting { prompt, .. } if self.outbox.is_empty() => Some(prompt),
            _ => None,
        }
    }

    /// Emit the first command.
    pub fn start(&mut self) -> Result<Command, FlowError> {
        match self.state {
            State::Created => {}
            State::Finished => return Err(FlowError::Finished),
            State::Poisoned => return Err(FlowError::Poisoned),
            State::Awaiting { .. } | State::Closing => return Err(FlowError::AlreadyStarted),
        }
        tracing::info!(
            session = %self.session_id,
            platforms = self.platforms.len(),
            "starting donation flow"
        );
        self.log.info("Starting the donation flow");
        let begun = self
            .push_tracking(format!("{}-tracking", self.session_id))
            .and_then(|()| self.enter_platform(0));
        if let Err(err) = begun {
            self.state = State::Poisoned;
            return Err(err);
        }
        self.outbox.pop_front().ok_or(FlowError::Finished)
    }

    /// Hand in the answer to the previous command and get the next one.
    ///
    /// Returns `Ok(None)` once the end page has been acknowledged.
    pub fn resume(&mut self, payload: Payload) -> Result<Option<Command>, FlowError> {
        match self.state {
            State::Created => return Err(FlowError::NotStarted),
            State::Finished => return Err(FlowError::Finished),
            State::Poisoned => return Err(FlowError::Poisoned),
            State::Awaiting { .. } | State::Closing => {}
        }
        if let Some(command) = self.outbox.pop_front() {
            return Ok(Some(command));
        }
        match self.state {
            State::Awaiting { platform, prompt } => {
                if let Err(err) = self.answer(platform, prompt, payload) {
                    tracing::error!(session = %self.session_id, error = %err, "donation flow stopped");
                    self.state = State::Poisoned;
                    return Err(err);
                }
                Ok(self.outbox.pop_front())
            }
            _ => {
                tracing::info!(session = %self.session_id, "donation flow finished");
                self.state = State::Finished;
                Ok(None)
            }
        }
    }

    fn answer(&mut self, index: usize, prompt: Prompt, payload: Payload) -> Result<(), FlowError> {
        if !prompt.accepts(&payload) {
            return Err(FlowError::ProtocolViolation {
                step: prompt.name(),
                payload: payload.kind(),
            });
        }
        tracing::debug!(
            session = %self.session_id,
            prompt = prompt.name(),
            payload = payload.kind(),
            "prompt answered"
        );
        match prompt {
            Prompt::File => self.on_file(index, payload),
            Prompt::Retry => self.on_retry(index, payload),
            Prompt::Consent => self.on_consent(index, payload),
            Prompt::Questionnaire => self.on_questionnaire(index, payload),
        }
    }

    fn enter_platform(&mut self, index: usize) -> Result<(), FlowError> {
        if index < self.platforms.len() {
            return self.prompt_file(index);
        }
        self.outbox.push_back(Command::exit(0, EXIT_MESSAGE));
        self.outbox.push_back(Command::render(Page::End));
        self.state = State::Closing;
        Ok(())
    }

    fn prompt_file(&mut self, index: usize) -> Result<(), FlowError> {
        let (name, copy) = self.platform(index);
        self.log.info(format!("Prompt for file for {name}"));
        self.push_platform_tracking(name)?;
        let body = PromptBody::FileInput(FileInput {
            description: copy.file_prompt.into(),
            extensions: self.file_extensions.clone(),
        });
        self.suspend(
            index,
            Prompt::File,
            Page::donation(name, copy.file_page_title.into(), body),
        );
        Ok(())
    }

    fn on_file(&mut self, index: usize, payload: Payload) -> Result<(), FlowError> {
        let (name, copy) = self.platform(index);
        let Payload::StringValue(handle) = payload else {
            self.log.info(format!("Skipped {name}"));
            self.push_platform_tracking(name)?;
            return self.enter_platform(index + 1);
        };
        let ArchiveValidation { result, archive } =
            self.platforms[index]
                .validator()
                .validate_archive(self.opener.as_ref(), &handle);
        match archive {
            Some(archive) if result.is_recognized() => {
                self.log.info(format!("Payload for {name}"));
                self.push_platform_tracking(name)?;
                let extraction = self.platforms[index].extract(archive.as_ref());
                for failure in &extraction.failures {
                    if failure.kind != FailureKind::Missing {
                        self.log
                            .warn(format!("Could not extract {}: {}", failure.member, failure.reason));
                    }
                }
                self.prompt_consent(index, extraction.tables)
            }
            _ => {
                self.log.info(format!(
                    "Not a valid {name} zip; No payload; prompt retry_confirmation"
                ));
                self.push_platform_tracking(name)?;
                let body = PromptBody::Confirm(Confirm {
                    text: copy.retry_text.into(),
                    ok: Translatable::new("Try again", "Probeer opnieuw"),
                    cancel: Translatable::new("Continue", "Verder"),
                });
                self.suspend(
                    index,
                    Prompt::Retry,
                    Page::donation(name, copy.file_page_title.into(), body),
                );
                Ok(())
            }
        }
    }

    fn on_retry(&mut self, index: usize, payload: Payload) -> Result<(), FlowError> {
        if payload == Payload::True {
            return self.prompt_file(index);
        }
        let (name, _) = self.platform(index);
        self.log.info(format!("Skipped during retry {name}"));
        self.push_platform_tracking(name)?;
        self.enter_platform(index + 1)
    }

    fn prompt_consent(&mut self, index: usize, tables: Vec<ExtractedTable>) -> Result<(), FlowError> {
        let (name, copy) = self.platform(index);
        self.log.info(format!("Prompt consent; {name}"));
        self.push_platform_tracking(name)?;
        let assembled = form::assemble(tables, name, &copy)
            .map_err(|err| FlowError::Assembly(format!("{err:#}")))?;
        if assembled.no_data {
            self.push_status(name, StatusEvent::NoDataFound)?;
        }
        self.suspend(
            index,
            Prompt::Consent,
            Page::donation(
                name,
                copy.consent_page_title.into(),
                PromptBody::ConsentForm(assembled.form),
            ),
        );
        Ok(())
    }

    fn on_consent(&mut self, index: usize, payload: Payload) -> Result<(), FlowError> {
        let (name, _) = self.platform(index);
        let Payload::JsonValue(donation) = payload else {
            self.log
                .info(format!("Skipped after reviewing consent: {name}"));
            self.push_platform_tracking(name)?;
            self.push_status(name, StatusEvent::SkipReviewConsent)?;
            return self.enter_platform(index + 1);
        };
        self.log.info(format!("Data donated; {name}"));
        self.push_donation(name.to_string(), donation);
        self.push_platform_tracking(name)?;
        self.push_status(name, StatusEvent::Donated)?;
        self.suspend(index, Prompt::Questionnaire, questionnaire_page());
        Ok(())
    }

    fn on_questionnaire(&mut self, index: usize, payload: Payload) -> Result<(), FlowError> {
        let (name, _) = self.platform(index);
        match payload {
            Payload::JsonValue(answers) => {
                let key = format!("{}-{name}-questionnaire-donation", self.session_id);
                self.push_donation(key, answers);
            }
            _ => {
                self.log.info(format!("Skipped questionnaire: {name}"));
                self.push_platform_tracking(name)?;
            }
        }
        self.enter_platform(index + 1)
    }

    fn platform(&self, index: usize) -> (&'static str, PlatformCopy) {
        let platform = &self.platforms[index];
        (platform.name(), *platform.copy())
    }

    fn suspend(&mut self, index: usize, prompt: Prompt, page: Page) {
        tracing::debug!(
            session = %self.session_id,
            platform = index,
            prompt = prompt.name(),
            "awaiting answer"
        );
        self.outbox.push_back(Command::render(page));
        self.state = State::Awaiting {
            platform: index,
            prompt,
        };
    }

    fn push_donation(&mut self, key: String, payload: String) {
        tracing::debug!(session = %self.session_id, key = %key, bytes = payload.len(), "donation queued");
        self.outbox.push_back(Command::donate(key, payload));
    }

    fn push_tracking(&mut self, key: String) -> Result<(), FlowError> {
        let snapshot = self.log.snapshot_json()?;
        self.push_donation(key, snapshot);
        Ok(())
    }

    fn push_platform_tracking(&mut self, name: &str) -> Result<(), FlowError> {
        self.push_tracking(format!("{}-{name}-tracking", self.session_id))
    }

    fn push_status(&mut self, name: &str, event: StatusEvent) -> Result<(), FlowError> {
        let key = format!("{}-{name}-{}", self.session_id, event.key_suffix());
        let payload = serde_json::to_string(&serde_json::json!({ "status": event.status() }))?;
        self.push_donation(key, payload);
        Ok(())
    }
}

fn questionnaire_page() -> Page {
    let body = PromptBody::Questionnaire(Questionnaire {
        description: Translatable::new(
            "Below you can find a couple of questions about the data donation process",
            "Hieronder vind u een paar vragen over het data donatie process",
        ),
        questions: vec![
            Question::Open {
                id: 1,
                question: Translatable::new("rekeningnummer", "rekeningnummer"),
            },
            Question::Open {
                id: 2,
                question: Translatable::new("Ten name van", "Ten name van"),
            },
        ],
    });
    Page::donation(
        QUESTIONNAIRE_PLATFORM,
        Translatable::new("Questionnaire", "Vragenlijst"),
        body,
    )
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
