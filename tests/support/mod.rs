use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::PathBuf;
use tempfile::TempDir;

/// Environment variables that feed configuration flags
const CONFIG_ENV: &[&str] = &[
    "USE_STREAMING",
    "MIRROR_RESHARES",
    "MIRROR_REPLIES",
    "MIRROR_SENSITIVE",
    "URL_APPEND_MODE",
    "POLL_INTERVAL_MS",
    "ALLOWED_VISIBILITIES",
    "ELLIPSIS_MARKER",
    "CHARACTER_LIMIT",
    "RECORD_RETENTION_SECS",
    "MASTODON_URL",
    "MASTODON_ACCESS_TOKEN",
    "MASTODON_STREAMING_URL",
    "TWITTER_CONSUMER_KEY",
    "TWITTER_CONSUMER_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_TOKEN_SECRET",
    "RUST_LOG",
    "TOOTMIRROR_LOG",
];

/// Get a Command for tootmirror with no configuration inherited from the environment
pub fn tootmirror() -> Command {
    let mut cmd = cargo_bin_cmd!("tootmirror");
    for name in CONFIG_ENV {
        cmd.env_remove(name);
    }
    cmd
}

/// Write a Mastodon status document into a temp dir
pub fn write_status(dir: &TempDir, name: &str, json: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path
}

/// A minimal Mastodon status with the given visibility and media count
pub fn status_json(visibility: &str, media: usize) -> String {
    let media = (0..media)
        .map(|i| format!(r#"{{"id":"{i}","type":"image"}}"#))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{
            "id": "777",
            "account": {{ "id": "42", "username": "me", "acct": "me" }},
            "created_at": "2024-03-01T12:00:00.000Z",
            "content": "<p>Sunset at the pier</p>",
            "spoiler_text": "",
            "visibility": "{visibility}",
            "sensitive": false,
            "reblog": null,
            "mentions": [],
            "in_reply_to_id": null,
            "media_attachments": [{media}],
            "url": "https://mastodon.example/@me/777"
        }}"#
    )
}
