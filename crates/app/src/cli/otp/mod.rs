use clap::{Args, Subcommand};

mod create;
mod purge;

#[derive(Debug, Args)]
pub(crate) struct OtpCommand {
    #[command(subcommand)]
    command: OtpSubcommand,
}

#[derive(Debug, Subcommand)]
enum OtpSubcommand {
    Create(create::CreateOtpArgs),
    Purge(purge::PurgeOtpsArgs),
}

pub(crate) async fn run(command: OtpCommand) -> Result<(), String> {
    match command.command {
        OtpSubcommand::Create(args) => create::run(args).await,
        OtpSubcommand::Purge(args) => purge::run(args).await,
    }
}
