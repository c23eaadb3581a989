//! Command dispatch logic for tootmirror

use std::time::Instant;

use crate::cli::{Cli, Commands};
use crate::commands::{evaluate, preview, run as run_command, verify};
use tootmirror_core::error::Result;

mod command;
pub(crate) mod macros;

pub use command::{Command, CommandContext, NoCommand};

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Run(args) => run_command::execute(ctx, args),
            Commands::Verify(args) => verify::execute(ctx, args),
            Commands::Preview(args) => preview::execute(ctx, args),
            Commands::Evaluate(args) => evaluate::execute(ctx, args),
        }
    }
}

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let ctx = CommandContext::new(cli, start);

    match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    }
}
