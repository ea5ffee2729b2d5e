use clap::{Args, Subcommand};

mod list;

#[derive(Debug, Args)]
pub(crate) struct SignedCommand {
    #[command(subcommand)]
    command: SignedSubcommand,
}

#[derive(Debug, Subcommand)]
enum SignedSubcommand {
    List(list::ListSignedArgs),
}

pub(crate) async fn run(command: SignedCommand) -> Result<(), String> {
    match command.command {
        SignedSubcommand::List(args) => list::run(args).await,
    }
}
