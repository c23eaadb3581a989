//! End-to-end tests for the mirror loops with in-memory platform clients

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tootmirror_core::config::FetchMode;
use tootmirror_core::destination::DestinationClient;
use tootmirror_core::error::{MirrorError, Result};
use tootmirror_core::orchestrator::{DeleteOutcome, Mirror, UpdateOutcome};
use tootmirror_core::policy::{MirrorPolicy, UrlAppendMode};
use tootmirror_core::post::Post;
use tootmirror_core::source::mastodon::parse_status;
use tootmirror_core::source::{Account, EventStream, SourceClient, StreamEvent};
use tootmirror_core::text::weighted_length;

const ACCOUNT_ID: &str = "42";

/// Source that replays scripted poll batches and stream events
struct ScriptedSource {
    batches: RefCell<VecDeque<Result<Vec<Post>>>>,
    events: RefCell<Vec<Result<StreamEvent>>>,
    since_ids: Rc<RefCell<Vec<Option<String>>>>,
    shutdown: Arc<AtomicBool>,
}

impl ScriptedSource {
    fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self {
            batches: RefCell::new(VecDeque::new()),
            events: RefCell::new(Vec::new()),
            since_ids: Rc::new(RefCell::new(Vec::new())),
            shutdown,
        }
    }

    fn with_batches(self, batches: Vec<Result<Vec<Post>>>) -> Self {
        *self.batches.borrow_mut() = batches.into();
        self
    }

    fn with_events(self, events: Vec<Result<StreamEvent>>) -> Self {
        *self.events.borrow_mut() = events;
        self
    }
}

impl SourceClient for ScriptedSource {
    fn verify_credentials(&self) -> Result<Account> {
        Ok(Account {
            id: ACCOUNT_ID.into(),
            username: "me".into(),
            acct: "me".into(),
        })
    }

    fn fetch_statuses(&self, account_id: &str, since_id: Option<&str>) -> Result<Vec<Post>> {
        assert_eq!(account_id, ACCOUNT_ID);
        self.since_ids
            .borrow_mut()
            .push(since_id.map(str::to_string));

        match self.batches.borrow_mut().pop_front() {
            Some(batch) => batch,
            None => {
                self.shutdown.store(true, Ordering::SeqCst);
                Ok(Vec::new())
            }
        }
    }

    fn stream_user(&self) -> Result<EventStream> {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        Ok(Box::new(events.into_iter()))
    }
}

/// Destination that records every call
#[derive(Default, Clone)]
struct RecordingDestination {
    created: Rc<RefCell<Vec<String>>>,
    deleted: Rc<RefCell<Vec<String>>>,
    fail_creates: bool,
}

impl DestinationClient for RecordingDestination {
    fn create_post(&self, text: &str) -> Result<String> {
        if self.fail_creates {
            return Err(MirrorError::Transport {
                service: "twitter".into(),
                reason: "connection reset".into(),
            });
        }
        let mut created = self.created.borrow_mut();
        created.push(text.to_string());
        Ok(format!("tw-{}", created.len()))
    }

    fn delete_post(&self, id: &str) -> Result<()> {
        self.deleted.borrow_mut().push(id.to_string());
        Ok(())
    }
}

fn post(id: &str, body: &str) -> Post {
    let mut post = Post::new(id, body);
    post.account_id = ACCOUNT_ID.into();
    post
}

fn update(post: Post) -> Result<StreamEvent> {
    Ok(StreamEvent::Update(Box::new(post)))
}

#[test]
fn test_stream_mirrors_then_deletes() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(shutdown.clone()).with_events(vec![
        update(post("100", "first")),
        Ok(StreamEvent::Heartbeat),
        Ok(StreamEvent::Delete("100".into())),
    ]);
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default());

    let err = mirror.run_streaming(&shutdown).unwrap_err();

    assert!(matches!(err, MirrorError::ConnectionLost(_)));
    assert_eq!(*destination.created.borrow(), vec!["first"]);
    assert_eq!(*destination.deleted.borrow(), vec!["tw-1"]);
    assert!(mirror.records().is_empty());
}

#[test]
fn test_stream_skips_foreign_and_ineligible_posts() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut foreign = post("1", "boosted by a friend");
    foreign.account_id = "7".into();
    let mut reshare = post("2", "my reshare");
    reshare.is_reshare = true;

    let source = ScriptedSource::new(shutdown.clone()).with_events(vec![
        update(foreign),
        update(reshare),
        update(post("3", "mine")),
    ]);
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default());

    let _ = mirror.run_streaming(&shutdown);

    assert_eq!(*destination.created.borrow(), vec!["mine"]);
    assert_eq!(mirror.records().len(), 1);
}

#[test]
fn test_stream_connection_lost_stops_processing() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(shutdown.clone()).with_events(vec![
        update(post("1", "before")),
        Err(MirrorError::ConnectionLost("reset by peer".into())),
        update(post("2", "after")),
    ]);
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default());

    let err = mirror.run_streaming(&shutdown).unwrap_err();

    assert_eq!(err.to_string(), "stream connection lost: reset by peer");
    assert_eq!(*destination.created.borrow(), vec!["before"]);
}

#[test]
fn test_stream_survives_bad_events() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(shutdown.clone()).with_events(vec![
        Err(MirrorError::api("mastodon", "unknown visibility")),
        update(post("2", "still here")),
    ]);
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default());

    let _ = mirror.run_streaming(&shutdown);

    assert_eq!(*destination.created.borrow(), vec!["still here"]);
}

#[test]
fn test_stream_returns_ok_on_shutdown() {
    let shutdown = Arc::new(AtomicBool::new(true));
    let source = ScriptedSource::new(shutdown.clone())
        .with_events(vec![update(post("1", "too late"))]);
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default());

    assert!(mirror.run_streaming(&shutdown).is_ok());
    assert!(destination.created.borrow().is_empty());
}

#[test]
fn test_failed_create_is_not_tracked() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(shutdown.clone()).with_events(vec![
        update(post("1", "hello")),
        Ok(StreamEvent::Delete("1".into())),
    ]);
    let destination = RecordingDestination {
        fail_creates: true,
        ..Default::default()
    };
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default());

    let _ = mirror.run_streaming(&shutdown);

    assert!(mirror.records().is_empty());
    assert!(destination.deleted.borrow().is_empty());
}

#[test]
fn test_polling_skips_existing_posts_and_mirrors_oldest_first() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(shutdown.clone()).with_batches(vec![
        Ok(vec![post("2", "old two"), post("1", "old one")]),
        Err(MirrorError::Http {
            service: "mastodon".into(),
            status: 502,
        }),
        Ok(vec![post("4", "new four"), post("3", "new three")]),
    ]);
    let since_ids = source.since_ids.clone();
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default())
        .with_mode(FetchMode::Polling {
            interval: Duration::from_millis(1),
        });

    mirror.run(&shutdown).unwrap();

    assert_eq!(*destination.created.borrow(), vec!["new three", "new four"]);
    assert_eq!(
        *since_ids.borrow(),
        vec![
            None,
            Some("2".to_string()),
            Some("2".to_string()),
            Some("4".to_string()),
        ]
    );
    assert_eq!(mirror.account().map(|a| a.id.as_str()), Some(ACCOUNT_ID));
}

#[test]
fn test_polling_empty_account_mirrors_everything_after_priming() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(shutdown.clone())
        .with_batches(vec![Ok(Vec::new()), Ok(vec![post("1", "first ever")])]);
    let destination = RecordingDestination::default();
    let mut mirror = Mirror::new(source, destination.clone(), MirrorPolicy::default())
        .with_mode(FetchMode::Polling {
            interval: Duration::from_millis(1),
        });

    mirror.run(&shutdown).unwrap();

    assert_eq!(*destination.created.borrow(), vec!["first ever"]);
}

#[test]
fn test_mastodon_status_to_published_text() {
    let json = r#"{
        "id": "555",
        "account": { "id": "42", "username": "me" },
        "content": "<p>Sunset at the pier</p>",
        "spoiler_text": "",
        "visibility": "public",
        "sensitive": false,
        "reblog": null,
        "mentions": [],
        "in_reply_to_id": null,
        "media_attachments": [{ "id": "9", "type": "image" }],
        "url": "https://mastodon.example/@me/555"
    }"#;
    let status = parse_status(json).unwrap();

    let destination = RecordingDestination::default();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut mirror = Mirror::new(
        ScriptedSource::new(shutdown),
        destination.clone(),
        MirrorPolicy::default().with_url_append_mode(UrlAppendMode::OnlyMedia),
    );
    mirror.verify().unwrap();

    assert_eq!(
        mirror.on_update(&status),
        UpdateOutcome::Mirrored {
            destination_id: "tw-1".into()
        }
    );
    assert_eq!(
        *destination.created.borrow(),
        vec!["Sunset at the pier https://mastodon.example/@me/555"]
    );
    assert_eq!(mirror.on_delete("555"), DeleteOutcome::Deleted);
}

#[test]
fn test_long_post_with_url_fits_the_limit() {
    let url = "https://mastodon.example/@me/1";
    let mut long = post("1", &"1234567890".repeat(30));
    long.canonical_url = url.into();

    let destination = RecordingDestination::default();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut mirror = Mirror::new(
        ScriptedSource::new(shutdown),
        destination.clone(),
        MirrorPolicy::default().with_url_append_mode(UrlAppendMode::Always),
    );
    mirror.on_update(&long);

    let created = destination.created.borrow();
    let text = &created[0];
    let expected = format!("{} {url} ...", &"1234567890".repeat(30)[..212]);
    assert_eq!(*text, expected);
    assert_eq!(weighted_length(text), 240);
}
