mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an API connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "catalogctl", &mut std::io::stdout());
            Ok(())
        }

        // Everything else runs against a live session
        cmd => {
            let conn = config::connect(&cli.global)?;
            conn.catalog.start().await;

            let needs_session = !matches!(cmd, Command::Auth(_));
            let result = async {
                if needs_session {
                    conn.ensure_signed_in().await?;
                }
                tracing::debug!(command = ?cmd, "dispatching command");
                commands::dispatch(cmd, &conn, &cli.global).await
            }
            .await;

            conn.catalog.shutdown().await;
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AuthArgs, AuthCommand};

    #[test]
    fn auth_commands_parse() {
        let cli = Cli::try_parse_from(["catalogctl", "auth", "login", "--username", "ops"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Command::Auth(AuthArgs {
                command: AuthCommand::Login { username: Some(ref u) }
            })) if u == "ops"
        ));
    }
}
