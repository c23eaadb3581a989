//! `tootmirror verify` command - check Mastodon credentials

use crate::cli::VerifyArgs;
use crate::commands::dispatch::CommandContext;
use tootmirror_core::error::Result;
use tootmirror_core::source::{MastodonClient, SourceClient};

/// Execute the verify command
pub fn execute(ctx: &CommandContext, args: &VerifyArgs) -> Result<()> {
    let config = args.mastodon.to_config()?;
    let account = MastodonClient::new(config).verify_credentials()?;

    crate::output_by_format_result!(ctx.cli.format,
        json => {
            println!(
                "{}",
                serde_json::json!({
                    "id": account.id,
                    "username": account.username,
                    "acct": account.acct,
                })
            );
            Ok::<(), tootmirror_core::error::MirrorError>(())
        },
        human => {
            if !ctx.cli.quiet {
                println!("Authenticated as @{} (id {})", account.acct, account.id);
            }
        }
    )
}
