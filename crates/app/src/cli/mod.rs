use clap::{Parser, Subcommand};
use dispatch_app::database::{self, Db, PoolSettings};

mod db;
mod product;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "dispatch-app", about = "Dispatch admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Product(product::ProductCommand),
    Token(token::TokenCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Product(command) => product::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

async fn connect(database_url: &str) -> Result<Db, String> {
    let settings = PoolSettings {
        max_connections: 2,
        ..PoolSettings::default()
    };

    database::connect(database_url, settings)
        .await
        .map(Db::new)
        .map_err(|error| format!("failed to connect to database: {error}"))
}
