//! Rewardpang CLI

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use clap::{Args, Parser, Subcommand};
use jiff::civil::Date;
use rewardpang::{
    display::statement::{StatementError, write_months, write_summary},
    fixtures::{FixtureError, LedgerFixture, load_ledger},
    ledger::LedgerError,
    settlement::{Eligibility, SettlementError, SettlementFlow, SettlementPolicy},
};
use rewardpang_client::{
    api::{AccessToken, ApiError, HttpRewardpangApi, RewardpangApi},
    config::{self, ApiConfig, ConfigError, LoggingConfig},
    observability::{ObservabilityError, init_logging},
    session::{CashbackSession, SessionError},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "rewardpang", about = "Rewardpang cashback ledger", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    api: ApiConfig,

    #[command(flatten)]
    logging: LoggingConfig,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<Date>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Read records from a YAML ledger file instead of the backend; takes
    /// precedence over a configured access token
    #[arg(long, conflicts_with = "authorization_code")]
    ledger: Option<PathBuf>,

    /// Backend access token
    #[arg(long, env = "REWARDPANG_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// One-time authorization code to exchange for an access token
    #[arg(long, conflicts_with = "access_token")]
    authorization_code: Option<String>,

    /// Referrer sent with the authorization code
    #[arg(long, default_value = "DEFAULT")]
    referrer: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show accrued, confirmed, paid, pending and available cashback
    Summary,

    /// List purchases grouped by month
    Months,

    /// Request a settlement of the whole available balance
    Settle,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] ObservabilityError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("either --ledger, --access-token or --authorization-code is required")]
    MissingCredentials,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);

            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "errors are reported to the terminal even when logging is off"
)]
fn report(error: &CliError) {
    eprintln!("error: {error}");
}

async fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(&cli.logging)?;

    let today = match cli.today {
        Some(today) => today,
        None => config::today(&cli.api.time_zone()?),
    };

    if let Some(path) = &cli.source.ledger {
        let fixture = load_ledger(path)?;

        info!(path = %path.display(), "loaded ledger file");

        return run_offline(&cli.command, &fixture, today);
    }

    let mut session = connect(&cli.source, cli.api).await?;

    run_online(&cli.command, &mut session, today).await
}

async fn connect(source: &SourceArgs, api: ApiConfig) -> Result<CashbackSession, CliError> {
    let api: Arc<dyn RewardpangApi> = Arc::new(HttpRewardpangApi::new(api)?);

    if let Some(code) = &source.authorization_code {
        return Ok(CashbackSession::sign_in(api, code, &source.referrer).await?);
    }

    let token = source
        .access_token
        .clone()
        .map(AccessToken::new)
        .ok_or(CliError::MissingCredentials)?;

    Ok(CashbackSession::load(api, token).await?)
}

fn run_offline(
    command: &Commands,
    fixture: &LedgerFixture<'static>,
    today: Date,
) -> Result<(), CliError> {
    let ledger = &fixture.ledger;
    let policy = SettlementPolicy::standard(ledger.currency());
    let snapshot = ledger.snapshot(today)?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Summary => {
            write_summary(&mut out, &snapshot)?;

            let eligibility = policy.eligibility(&snapshot, fixture.bank_account.as_ref())?;
            write_eligibility(&mut out, &eligibility)?;
        }
        Commands::Months => write_months(&mut out, ledger, today)?,
        Commands::Settle => {
            let mut flow = SettlementFlow::new();
            let request = flow.begin(
                &policy,
                &snapshot,
                fixture.bank_account.as_ref(),
                &fixture.user_group_id,
            )?;

            writeln!(
                out,
                "Would request {} to {} {} ({}); no backend in offline mode.",
                request.amount, request.bank_name, request.account_number, request.account_holder
            )?;
        }
    }

    Ok(())
}

async fn run_online(
    command: &Commands,
    session: &mut CashbackSession,
    today: Date,
) -> Result<(), CliError> {
    match command {
        Commands::Summary => {
            let mut out = io::stdout().lock();

            write_summary(&mut out, &session.snapshot(today)?)?;
            write_eligibility(&mut out, &session.eligibility(today)?)?;

            if let Some(link) = &session.profile().referral_link {
                writeln!(out, "Referral link: {}", link.url)?;
            }
        }
        Commands::Months => write_months(io::stdout().lock(), session.ledger(), today)?,
        Commands::Settle => {
            let created = session.submit_settlement(today).await?;
            let snapshot = session.snapshot(today)?;

            let mut out = io::stdout().lock();

            writeln!(
                out,
                "Requested settlement {} for {} ({}).",
                created.id, created.amount, created.status
            )?;
            write_summary(&mut out, &snapshot)?;
        }
    }

    Ok(())
}

fn write_eligibility(mut out: impl Write, eligibility: &Eligibility<'_>) -> io::Result<()> {
    match eligibility {
        Eligibility::Eligible { amount } => writeln!(out, "Settlement available: {amount}"),
        Eligibility::BelowMinimum { available, minimum } => writeln!(
            out,
            "Settlement unavailable: {available} available, minimum is {minimum}"
        ),
        Eligibility::MissingBankAccount => {
            writeln!(out, "Settlement unavailable: register a bank account first")
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn ledger_is_accepted_alongside_access_token() -> TestResult {
        let cli = Cli::try_parse_from([
            "rewardpang",
            "--ledger",
            "ledger.yml",
            "--access-token",
            "abc",
            "--today",
            "2024-02-08",
            "summary",
        ])?;

        assert_eq!(cli.source.ledger, Some(PathBuf::from("ledger.yml")));
        assert!(cli.source.access_token.is_some());
        assert!(matches!(cli.command, Commands::Summary));

        Ok(())
    }

    #[test]
    fn ledger_conflicts_with_authorization_code() {
        let result = Cli::try_parse_from([
            "rewardpang",
            "--ledger",
            "ledger.yml",
            "--authorization-code",
            "code",
            "summary",
        ]);

        assert!(result.is_err());
    }
}
