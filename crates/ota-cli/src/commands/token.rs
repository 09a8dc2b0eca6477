//! Bearer token issuance.

use clap::Args;
use tracing::info;

use ota_auth::{JwtEncoder, TokenSubject};
use ota_core::config::AppConfig;
use ota_core::error::AppError;

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Subject name: the board name for board tokens
    pub subject: String,

    /// Issue a board token instead of an operator token
    #[arg(short, long)]
    pub board: bool,
}

/// Print a signed token for the subject
pub fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    let subject = if args.board {
        TokenSubject::board(&args.subject)
    } else {
        TokenSubject::operator(&args.subject)
    };

    let token = JwtEncoder::new(&config.auth).issue(&subject)?;
    info!(subject = %subject.name, board = subject.is_board, "Token issued");
    println!("{token}");
    Ok(())
}
