use super::{DonationFlow, FlowError, Prompt};
use crate::archive::{MemoryArchive, MemoryOpener};
use crate::platform::tiktok::TikTok;
use crate::platform::Platform;
use crate::props::{Page, PromptBody};
use crate::protocol::{Command, Payload};

const SEARCHES: &str = "Date: 2021-05-01\nSearch Term: cats\n";

fn opener() -> MemoryOpener {
    MemoryOpener::new()
        .with_archive(
            "ddp.zip",
            MemoryArchive::new().with_member("TikTok/Activity/Searches.txt", SEARCHES),
        )
        .with_archive(
            "empty.zip",
            MemoryArchive::new().with_member("Comments.txt", "nothing to see\n"),
        )
        .with_archive(
            "other.zip",
            MemoryArchive::new().with_member("watch-history.json", "{}"),
        )
        .with_archive(
            "followers.zip",
            MemoryArchive::new().with_member("Follower.txt", "Date: 2022-01-01 00:00:00\n"),
        )
        .with_archive(
            "garbled.zip",
            MemoryArchive::new()
                .with_member("Searches.txt", vec![0xff_u8, 0xfe, 0xfd])
                .with_member("Like List.txt", "Date: 2022-03-01\nLink: https://v/9\n"),
        )
}

fn flow() -> DonationFlow {
    let platforms: Vec<Box<dyn Platform>> = vec![Box::new(TikTok::new().unwrap())];
    DonationFlow::new("s1", platforms, Box::new(opener()))
}

/// Drive a fresh flow, answering prompts from `answers` and acknowledging
/// everything else with `None`.
fn run(answers: Vec<Payload>) -> Vec<Command> {
    let mut flow = flow();
    let mut answers = answers.into_iter();
    let mut trace = vec![flow.start().unwrap()];
    loop {
        let last = trace.last().unwrap();
        let payload = if last.awaits_answer() {
            answers.next().expect("script ran out of answers")
        } else {
            Payload::None
        };
        match flow.resume(payload).unwrap() {
            Some(command) => trace.push(command),
            None => break,
        }
    }
    assert!(flow.is_finished());
    assert!(answers.next().is_none(), "unused answers left in script");
    trace
}

fn describe(command: &Command) -> String {
    match command {
        Command::RenderPage { page } => match page.body() {
            Some(body) => format!("render {}", body.kind()),
            None => "render end".to_string(),
        },
        Command::Donate { key, .. } => format!("donate {key}"),
        Command::Exit { code, message } => format!("exit {code} {message}"),
    }
}

fn describe_all(trace: &[Command]) -> Vec<String> {
    trace.iter().map(describe).collect()
}

fn consent_form(trace: &[Command]) -> &crate::props::ConsentForm {
    trace
        .iter()
        .find_map(|command| match command {
            Command::RenderPage { page } => match page.body() {
                Some(PromptBody::ConsentForm(form)) => Some(form),
                _ => None,
            },
            _ => None,
        })
        .expect("consent form rendered")
}

fn payload_of<'a>(trace: &'a [Command], key: &str) -> &'a str {
    trace
        .iter()
        .find_map(|command| match command {
            Command::Donate { key: k, payload } if k == key => Some(payload.as_str()),
            _ => None,
        })
        .expect("donation present")
}

#[test]
fn full_donation_trace() {
    let trace = run(vec![
        Payload::StringValue("ddp.zip".to_string()),
        Payload::JsonValue(r#"[{"id":"tiktok_searches"}]"#.to_string()),
        Payload::JsonValue(r#"{"1":"NL00"}"#.to_string()),
    ]);
    assert_eq!(
        describe_all(&trace),
        vec![
            "donate s1-tracking",
            "donate s1-TikTok-tracking",
            "render file_input",
            "donate s1-TikTok-tracking",
            "donate s1-TikTok-tracking",
            "render consent_form",
            "donate TikTok",
            "donate s1-TikTok-tracking",
            "donate s1-TikTok-DONATED",
            "render questionnaire",
            "donate s1-TikTok-questionnaire-donation",
            "exit 0 Success",
            "render end",
        ]
    );
    assert_eq!(payload_of(&trace, "TikTok"), r#"[{"id":"tiktok_searches"}]"#);
    assert_eq!(payload_of(&trace, "s1-TikTok-DONATED"), r#"{"status":"DONATED"}"#);
    assert_eq!(
        payload_of(&trace, "s1-TikTok-questionnaire-donation"),
        r#"{"1":"NL00"}"#
    );
    let form = consent_form(&trace);
    assert_eq!(form.tables.len(), 1);
    assert_eq!(form.tables[0].id, "tiktok_searches");
}

#[test]
fn first_tracking_flush_holds_the_start_line() {
    let trace = run(vec![Payload::None]);
    assert_eq!(
        payload_of(&trace, "s1-tracking"),
        r#"["INFO --- ddp_flow::flow --- Starting the donation flow"]"#
    );
}

#[test]
fn empty_extraction_donates_no_data_found_before_consent() {
    let trace = run(vec![
        Payload::StringValue("empty.zip".to_string()),
        Payload::False,
    ]);
    let steps = describe_all(&trace);
    let no_data = steps
        .iter()
        .position(|step| step == "donate s1-TikTok-NO-DATA-FOUND")
        .expect("NO-DATA-FOUND donated");
    let consent = steps
        .iter()
        .position(|step| step == "render consent_form")
        .unwrap();
    assert!(no_data < consent);
    assert_eq!(
        payload_of(&trace, "s1-TikTok-NO-DATA-FOUND"),
        r#"{"status":"NO_DATA_FOUND"}"#
    );
    let form = consent_form(&trace);
    assert_eq!(form.tables.len(), 1);
    assert_eq!(form.tables[0].id, "TikTok_no_data_found");
}

#[test]
fn follower_only_export_has_no_data() {
    let trace = run(vec![
        Payload::StringValue("followers.zip".to_string()),
        Payload::False,
    ]);
    assert!(describe_all(&trace).contains(&"donate s1-TikTok-NO-DATA-FOUND".to_string()));
    let form = consent_form(&trace);
    assert_eq!(form.tables.len(), 1);
    assert_eq!(form.tables[0].id, "TikTok_no_data_found");
}

/// Tracking payload flushed right before the consent form.
fn tracking_before_consent(trace: &[Command]) -> Vec<String> {
    let consent = describe_all(trace)
        .iter()
        .position(|step| step == "render consent_form")
        .expect("consent form rendered");
    match &trace[consent - 1] {
        Command::Donate { key, payload } if key == "s1-TikTok-tracking" => {
            serde_json::from_str(payload).unwrap()
        }
        other => panic!("expected tracking before consent, got {}", describe(other)),
    }
}

#[test]
fn unreadable_member_is_logged_and_skipped() {
    let trace = run(vec![
        Payload::StringValue("garbled.zip".to_string()),
        Payload::False,
    ]);
    let form = consent_form(&trace);
    let ids: Vec<&str> = form.tables.iter().map(|table| table.id.as_str()).collect();
    assert_eq!(ids, vec!["tiktok_like_list"]);
    let warnings: Vec<String> = tracking_before_consent(&trace)
        .into_iter()
        .filter(|line| line.starts_with("WARNING --- "))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Could not extract Searches.txt: cannot read member Searches.txt"));
}

#[test]
fn missing_members_are_not_logged() {
    let trace = run(vec![
        Payload::StringValue("ddp.zip".to_string()),
        Payload::False,
    ]);
    assert!(tracking_before_consent(&trace)
        .iter()
        .all(|line| !line.contains("Could not extract")));
}

#[test]
fn declined_consent_skips_donation_and_questionnaire() {
    for decline in [Payload::False, Payload::None] {
        let trace = run(vec![Payload::StringValue("ddp.zip".to_string()), decline]);
        let steps = describe_all(&trace);
        assert!(!steps.contains(&"donate TikTok".to_string()));
        assert!(!steps.contains(&"render questionnaire".to_string()));
        assert_eq!(
            steps[steps.len() - 4..],
            [
                "donate s1-TikTok-tracking",
                "donate s1-TikTok-SKIP-REVIEW-CONSENT",
                "exit 0 Success",
                "render end",
            ]
        );
        assert_eq!(
            payload_of(&trace, "s1-TikTok-SKIP-REVIEW-CONSENT"),
            r#"{"status":"SKIP_REVIEW_CONSENT"}"#
        );
    }
}

#[test]
fn skipping_the_file_prompt_ends_the_platform() {
    let trace = run(vec![Payload::False]);
    assert_eq!(
        describe_all(&trace),
        vec![
            "donate s1-tracking",
            "donate s1-TikTok-tracking",
            "render file_input",
            "donate s1-TikTok-tracking",
            "exit 0 Success",
            "render end",
        ]
    );
}

#[test]
fn unrecognized_archive_then_continue_skips_without_reprompt() {
    let trace = run(vec![
        Payload::StringValue("other.zip".to_string()),
        Payload::False,
    ]);
    assert_eq!(
        describe_all(&trace),
        vec![
            "donate s1-tracking",
            "donate s1-TikTok-tracking",
            "render file_input",
            "donate s1-TikTok-tracking",
            "render confirm",
            "donate s1-TikTok-tracking",
            "exit 0 Success",
            "render end",
        ]
    );
}

#[test]
fn unreadable_archive_then_try_again_reprompts_for_a_file() {
    let trace = run(vec![
        Payload::StringValue("corrupt.zip".to_string()),
        Payload::True,
        Payload::StringValue("ddp.zip".to_string()),
        Payload::None,
    ]);
    let steps = describe_all(&trace);
    assert_eq!(
        steps[..8],
        [
            "donate s1-tracking",
            "donate s1-TikTok-tracking",
            "render file_input",
            "donate s1-TikTok-tracking",
            "render confirm",
            "donate s1-TikTok-tracking",
            "render file_input",
            "donate s1-TikTok-tracking",
        ]
    );
    assert!(steps.contains(&"render consent_form".to_string()));
}

#[test]
fn skipped_questionnaire_is_logged_not_donated() {
    let trace = run(vec![
        Payload::StringValue("ddp.zip".to_string()),
        Payload::JsonValue("[]".to_string()),
        Payload::None,
    ]);
    let steps = describe_all(&trace);
    assert!(!steps.contains(&"donate s1-TikTok-questionnaire-donation".to_string()));
    assert_eq!(
        steps[steps.len() - 3..],
        ["donate s1-TikTok-tracking", "exit 0 Success", "render end"]
    );
    let last_tracking = trace
        .iter()
        .rev()
        .find_map(|command| match command {
            Command::Donate { key, payload } if key == "s1-TikTok-tracking" => Some(payload),
            _ => None,
        })
        .unwrap();
    assert!(last_tracking.contains("Skipped questionnaire: TikTok"));
}

#[test]
fn pages_carry_platform_copy() {
    let mut flow = flow().with_file_extensions("application/zip");
    flow.start().unwrap();
    flow.resume(Payload::None).unwrap();
    let Some(Command::RenderPage {
        page: Page::Donation(page),
    }) = flow.resume(Payload::None).unwrap()
    else {
        panic!("expected donation page");
    };
    assert_eq!(page.platform, "TikTok");
    assert_eq!(
        page.header.title.translations.nl,
        "Selecteer je TikTok bestand"
    );
    match &page.body {
        PromptBody::FileInput(input) => assert_eq!(input.extensions, "application/zip"),
        other => panic!("unexpected body {}", other.kind()),
    }
    assert_eq!(flow.pending_prompt(), Some(Prompt::File));
}

#[test]
fn identical_scripts_produce_identical_traces() {
    let script = || {
        vec![
            Payload::StringValue("other.zip".to_string()),
            Payload::True,
            Payload::StringValue("ddp.zip".to_string()),
            Payload::JsonValue("[]".to_string()),
            Payload::JsonValue("{}".to_string()),
        ]
    };
    assert_eq!(run(script()), run(script()));
}

#[test]
fn wrong_payload_kind_poisons_the_flow() {
    let mut flow = flow();
    flow.start().unwrap();
    flow.resume(Payload::None).unwrap();
    flow.resume(Payload::None).unwrap();
    let err = flow.resume(Payload::True).unwrap_err();
    assert!(matches!(
        err,
        FlowError::ProtocolViolation {
            step: "file_input",
            payload: "True"
        }
    ));
    assert!(matches!(
        flow.resume(Payload::False),
        Err(FlowError::Poisoned)
    ));
    assert!(matches!(flow.start(), Err(FlowError::Poisoned)));
}

#[test]
fn json_at_retry_prompt_is_a_violation() {
    let mut flow = flow();
    flow.start().unwrap();
    flow.resume(Payload::None).unwrap();
    flow.resume(Payload::None).unwrap();
    flow.resume(Payload::StringValue("other.zip".to_string()))
        .unwrap();
    flow.resume(Payload::None).unwrap();
    assert_eq!(flow.pending_prompt(), Some(Prompt::Retry));
    let err = flow
        .resume(Payload::JsonValue("{}".to_string()))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "JsonValue is not a valid answer to the retry_confirm prompt"
    );
}

#[test]
fn lifecycle_errors() {
    let mut flow = flow();
    assert!(matches!(flow.resume(Payload::None), Err(FlowError::NotStarted)));
    flow.start().unwrap();
    assert!(matches!(flow.start(), Err(FlowError::AlreadyStarted)));

    let mut done = self::flow();
    done.start().unwrap();
    let mut payload = Payload::None;
    loop {
        match done.resume(payload).unwrap() {
            Some(command) if command.awaits_answer() => payload = Payload::False,
            Some(_) => payload = Payload::None,
            None => break,
        }
    }
    assert!(done.is_finished());
    assert!(matches!(done.resume(Payload::None), Err(FlowError::Finished)));
}

#[test]
fn sessions_are_isolated() {
    let mut first = flow();
    let second = flow();
    first.start().unwrap();
    assert!(!first.session_log().is_empty());
    assert!(second.session_log().is_empty());
}
