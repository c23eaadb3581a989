//! `tootmirror preview` command - compose text without publishing

use crate::cli::PreviewArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::read_input;
use tootmirror_core::error::Result;
use tootmirror_core::mirror::{compose, needs_truncation};
use tootmirror_core::text::html::html_to_text;
use tootmirror_core::text::weighted_length;

/// Execute the preview command
pub fn execute(ctx: &CommandContext, args: &PreviewArgs) -> Result<()> {
    let policy = args.policy.to_policy()?;

    let raw = match &args.body {
        Some(body) => body.clone(),
        None => read_input(None)?.trim_end_matches(['\r', '\n']).to_string(),
    };
    let body = if args.html { html_to_text(&raw) } else { raw };

    let text = compose(&body, &args.extras, &policy);
    let truncated = needs_truncation(&body, &args.extras, &policy);

    crate::output_by_format_result!(ctx.cli.format,
        json => {
            println!(
                "{}",
                serde_json::json!({
                    "text": text,
                    "weighted_length": weighted_length(&text),
                    "character_limit": policy.character_limit,
                    "truncated": truncated,
                })
            );
            Ok::<(), tootmirror_core::error::MirrorError>(())
        },
        human => {
            println!("{text}");
        }
    )
}
