use clap::{Args, Parser, Subcommand, ValueEnum};
use rti_core::Environment;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rti",
    version,
    about = "UK payroll RTI compliance toolkit: OAuth tokens, fraud prevention headers, FPS/EPS/EYU documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the authorization URL for the consent flow
    AuthUrl(AuthUrlArgs),
    /// Exchange an authorization code for a token
    Exchange(ExchangeArgs),
    /// Refresh an access token
    Refresh(RefreshArgs),
    /// Print a usable access token for a credentials file, refreshing it when needed
    Token(TokenArgs),
    /// Print the fraud prevention header set
    Headers(HeadersArgs),
    /// Generate an FPS, EPS or EYU document from JSON input
    Generate(GenerateArgs),
    /// Structurally validate a generated document
    Validate(ValidateArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    #[arg(long, env = "RTI_CLIENT_ID")]
    pub client_id: String,

    #[arg(long, env = "RTI_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// sandbox or production
    #[arg(long, env = "RTI_ENVIRONMENT", default_value = "sandbox")]
    pub environment: Environment,
}

#[derive(Args, Debug, Clone)]
pub struct AuthUrlArgs {
    #[arg(long, env = "RTI_CLIENT_ID")]
    pub client_id: String,

    #[arg(long)]
    pub redirect_uri: String,

    #[arg(long, default_value = "write:paye-employer-paye-rti")]
    pub scope: String,

    #[arg(long, env = "RTI_ENVIRONMENT", default_value = "sandbox")]
    pub environment: Environment,
}

#[derive(Args, Debug, Clone)]
pub struct ExchangeArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Authorization code from the redirect
    #[arg(long)]
    pub code: String,

    #[arg(long)]
    pub redirect_uri: String,

    /// Write a credentials file holding the issued token
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RefreshArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long, env = "RTI_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: String,
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Credentials JSON file; rewritten in place after a refresh
    #[arg(long)]
    pub credentials: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct HeadersArgs {
    #[arg(long)]
    pub user_id: Option<String>,

    /// Directory holding the persisted device identifier
    #[arg(long, env = "RTI_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// JSON file describing the client device
    #[arg(long)]
    pub device: Option<PathBuf>,

    /// Print header names as sent on the wire (Gov-Client- prefix)
    #[arg(long)]
    pub wire: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Fps,
    Eps,
    Eyu,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// JSON input; must carry a "type" field unless --kind is given
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, value_enum)]
    pub kind: Option<DocumentKind>,

    /// Write the document here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    pub file: PathBuf,
}
