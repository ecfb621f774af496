mod commands;
mod host;
mod logging;
mod render;
mod repl;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use token_widget_core::{Credentials, EndpointConfig, TransactionService, WalletConnector};
use zeroize::{Zeroize, Zeroizing};

use crate::commands::Command;
use crate::host::{Host, SessionConnector};

#[derive(Parser)]
#[command(
    name = "token-widget",
    about = "Deposit, withdraw and check token balances from the terminal",
    version
)]
pub(crate) struct Cli {
    /// Backend base URL (default: http://localhost:3000)
    #[arg(long, env = "TOKEN_WIDGET_BASE_URL")]
    base_url: Option<String>,

    /// User ID sent with every request
    #[arg(long, env = "TOKEN_WIDGET_USER_ID", default_value = "")]
    user_id: String,

    /// Access code (prompted for if not given)
    #[arg(long, env = "TOKEN_WIDGET_ACCESS_CODE", hide_env_values = true)]
    access_code: Option<String>,

    /// Read the access code from stdin (for scripting)
    #[arg(long, conflicts_with = "access_code")]
    access_code_stdin: bool,

    /// Keep the widgets locked until a wallet is connected
    #[arg(long)]
    require_wallet: bool,

    /// Run a single command, wait for its result and exit
    #[arg(long)]
    cmd: Option<String>,

    /// Output in JSON format (useful with --cmd)
    #[arg(long)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            base_url: self.base_url.clone(),
        }
    }

    fn access_code(&self) -> Result<Zeroizing<String>> {
        if let Some(code) = &self.access_code {
            return Ok(Zeroizing::new(code.clone()));
        }
        if self.access_code_stdin {
            return read_access_code_stdin();
        }
        Ok(Zeroizing::new(
            rpassword::prompt_password("Access code: ").context("Failed to read access code")?,
        ))
    }

    fn connector(&self) -> Option<Arc<dyn WalletConnector>> {
        if self.require_wallet {
            Some(Arc::new(SessionConnector::default()))
        } else {
            None
        }
    }

    fn build_host(&self) -> Result<Host> {
        let access_code = self.access_code()?;
        let credentials = Credentials::new(self.user_id.as_str(), access_code.as_str());
        let service = TransactionService::http(credentials, self.endpoint())
            .context("Invalid backend configuration")?;
        Ok(Host::new(Arc::new(service), self.connector(), self.json))
    }
}

fn read_access_code_stdin() -> Result<Zeroizing<String>> {
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read access code from stdin")?;
    let trimmed = input.trim_end_matches(['\n', '\r']).to_string();
    input.zeroize();
    Ok(Zeroizing::new(trimmed))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Some(cmd_str) = &cli.cmd {
        run_oneshot(&cli, cmd_str).await
    } else {
        repl::run_repl(&cli).await
    }
}

async fn run_oneshot(cli: &Cli, cmd_str: &str) -> Result<()> {
    let command = Command::parse(cmd_str)?;
    if command == Command::Exit {
        return Ok(());
    }

    let mut host = cli.build_host()?;
    let immediate = host.execute(&command).await;
    // Print the settled state. Status is redrawn once its balance fetch lands.
    let output = if host.outstanding() == 0 {
        immediate
    } else {
        let settled = host.wait().await;
        if command == Command::Status {
            host.execute(&command).await
        } else {
            settled
        }
    };
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
