//! `tootmirror run` command - mirror until interrupted

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::cli::RunArgs;
use crate::commands::dispatch::macros::trace_command;
use crate::commands::dispatch::CommandContext;
use tootmirror_core::config::FetchMode;
use tootmirror_core::destination::TwitterClient;
use tootmirror_core::error::{MirrorError, Result};
use tootmirror_core::orchestrator::Mirror;
use tootmirror_core::source::MastodonClient;

/// Exit code used when a second interrupt aborts the run
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Execute the run command
pub fn execute(ctx: &CommandContext, args: &RunArgs) -> Result<()> {
    let config = args.to_config()?;
    trace_command!(ctx.cli, ctx.start, "load_config");

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        if request_shutdown(&flag) {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
    .map_err(|e| MirrorError::Io(io::Error::other(e.to_string())))?;

    let source = MastodonClient::new(config.mastodon.clone());
    let destination = TwitterClient::new(config.twitter.clone());
    let mut mirror = Mirror::from_config(source, destination, &config);

    let account = mirror.verify()?;
    trace_command!(ctx.cli, ctx.start, "verify_credentials");

    let mode = match config.mode {
        FetchMode::Streaming => "streaming".to_string(),
        FetchMode::Polling { interval } => format!("polling every {}ms", interval.as_millis()),
    };
    if !ctx.cli.quiet {
        eprintln!(
            "Mirroring @{} ({mode}), press Ctrl-C to stop (twice to exit immediately)",
            account.acct
        );
    }

    mirror.run(&shutdown)?;
    info!(records = mirror.records().len(), "shutdown");
    Ok(())
}

/// Flag a graceful shutdown.
///
/// Returns true when one was already requested, in which case the caller
/// exits without waiting for the stream to deliver its next event.
fn request_shutdown(flag: &AtomicBool) -> bool {
    flag.swap(true, Ordering::SeqCst)
}
