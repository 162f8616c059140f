//! JSON-lines host driver.
//!
//! Writes every command as one JSON line and reads one payload line for each
//! interactive page. Donations, the exit command, and the end page are
//! acknowledged automatically.
use crate::flow::DonationFlow;
use crate::protocol::{Command, Payload};
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostSummary {
    pub commands: usize,
    pub answers: usize,
    pub donations: usize,
    pub exit_code: Option<i32>,
}

impl HostSummary {
    fn record(&mut self, command: &Command) {
        self.commands += 1;
        match command {
            Command::Donate { .. } => self.donations += 1,
            Command::Exit { code, .. } => self.exit_code = Some(*code),
            Command::RenderPage { .. } => {}
        }
    }
}

/// Run `flow` to completion against a line-oriented peer.
pub fn drive<R, W>(flow: &mut DonationFlow, input: R, mut output: W) -> Result<HostSummary>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines().enumerate();
    let mut summary = HostSummary::default();
    let mut next = Some(flow.start()?);
    while let Some(command) = next {
        summary.record(&command);
        serde_json::to_writer(&mut output, &command).context("write command")?;
        output.write_all(b"\n").context("write command")?;
        output.flush().context("flush command")?;
        let payload = if command.awaits_answer() {
            summary.answers += 1;
            read_payload(&mut lines, flow)?
        } else {
            Payload::None
        };
        next = flow.resume(payload)?;
    }
    tracing::info!(
        session = flow.session_id(),
        commands = summary.commands,
        donations = summary.donations,
        "host finished"
    );
    Ok(summary)
}

fn read_payload<I>(lines: &mut I, flow: &DonationFlow) -> Result<Payload>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    for (index, line) in lines {
        let line = line.with_context(|| format!("read payload line {}", index + 1))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        return serde_json::from_str(line)
            .with_context(|| format!("parse payload on line {}", index + 1));
    }
    let prompt = flow
        .pending_prompt()
        .map_or("pending", |prompt| prompt.name());
    Err(anyhow!("input ended while the {prompt} prompt awaited an answer"))
}

/// Run `flow` to completion, answering prompts from `payloads` in order, and
/// return every emitted command.
pub fn replay<I>(flow: &mut DonationFlow, payloads: I) -> Result<Vec<Command>>
where
    I: IntoIterator<Item = Payload>,
{
    let mut payloads = payloads.into_iter();
    let mut trace = Vec::new();
    let mut next = Some(flow.start()?);
    while let Some(command) = next {
        let payload = if command.awaits_answer() {
            payloads
                .next()
                .ok_or_else(|| anyhow!("ran out of payloads after {} commands", trace.len() + 1))?
        } else {
            Payload::None
        };
        trace.push(command);
        next = flow.resume(payload)?;
    }
    Ok(trace)
}
