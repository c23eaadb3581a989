//! `tootmirror evaluate` command - dry-run the pipeline on one status

use crate::cli::EvaluateArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::read_input;
use tootmirror_core::error::Result;
use tootmirror_core::mirror::{check_eligibility, render, should_append_url};
use tootmirror_core::source::mastodon::parse_status;
use tootmirror_core::text::weighted_length;

/// Execute the evaluate command
pub fn execute(ctx: &CommandContext, args: &EvaluateArgs) -> Result<()> {
    let policy = args.policy.to_policy()?;
    let post = parse_status(&read_input(args.file.as_deref())?)?;

    let skip_reason = check_eligibility(&post, &policy).err();
    let append_url = should_append_url(&post, &policy);
    let text = render(&post, &policy);

    crate::output_by_format_result!(ctx.cli.format,
        json => {
            println!(
                "{}",
                serde_json::json!({
                    "id": post.id,
                    "created_at": post.created_at.map(|t| t.to_rfc3339()),
                    "eligible": skip_reason.is_none(),
                    "reason": skip_reason.map(|r| r.as_str()),
                    "append_url": append_url,
                    "text": text,
                    "weighted_length": weighted_length(&text),
                })
            );
            Ok::<(), tootmirror_core::error::MirrorError>(())
        },
        human => {
            match skip_reason {
                None => println!("eligible: yes"),
                Some(reason) => println!("eligible: no ({reason})"),
            }
            println!("append url: {}", if append_url { "yes" } else { "no" });
            if let Some(created_at) = post.created_at {
                println!("created: {}", created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            if !ctx.cli.quiet {
                println!();
                println!("{text}");
            }
        }
    )
}
