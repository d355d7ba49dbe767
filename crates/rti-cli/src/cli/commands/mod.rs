use super::args::*;

pub mod auth;
pub mod documents;
pub mod headers;

use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::AuthUrl(args) => auth::auth_url(args),
        Command::Exchange(args) => auth::exchange(args).await,
        Command::Refresh(args) => auth::refresh(args).await,
        Command::Token(args) => auth::token(args).await,
        Command::Headers(args) => headers::run(args),
        Command::Generate(args) => documents::generate(args),
        Command::Validate(args) => documents::validate(args),
        Command::Version => {
            println!("rti {}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
