use clap::{Parser, Subcommand};

mod db;
mod otp;
mod signed;

#[derive(Debug, Parser)]
#[command(name = "taper-app", about = "Taper signing CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Otp(otp::OtpCommand),
    Signed(signed::SignedCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Otp(command) => otp::run(command).await,
            Commands::Signed(command) => signed::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
