/// Command definitions and parsing for the widget REPL and one-shot mode.
use anyhow::{bail, Result};
use token_widget_core::TransactionKind;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Switch to a tab, optionally entering an amount and submitting:
    /// deposit [amount], withdraw [amount]
    Transact {
        kind: TransactionKind,
        amount: Option<String>,
    },
    /// Replace the active tab's amount text: amount <text>
    Amount { text: String },
    /// Submit the active tab
    Submit,
    /// Switch tabs without submitting: tab <deposit|withdraw>
    Tab { kind: TransactionKind },
    /// Fetch the balance
    Balance,
    /// Press the wallet connect button
    Connect,
    /// Show both tabs, the balance and the wallet state
    Status,
    /// Block until every outstanding request has completed
    Wait,
    /// Clear the active tab's result message
    Dismiss,
    /// Print help
    Help { command: Option<String> },
    /// Exit
    Exit,
}

impl Command {
    /// Parse a command from a raw input string.
    ///
    /// Amounts are kept as raw text; validating them is the widget's job so
    /// that bad input shows up as a failed widget state, not a parse error.
    pub(crate) fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("No command entered. Type 'help' for a list of commands.");
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), Some(rest.trim())),
            None => (input.to_lowercase(), None),
        };
        let arg = rest.filter(|s| !s.is_empty());

        match cmd.as_str() {
            "deposit" | "dep" => Ok(Command::Transact {
                kind: TransactionKind::Deposit,
                amount: arg.map(str::to_string),
            }),
            "withdraw" | "wd" => Ok(Command::Transact {
                kind: TransactionKind::Withdraw,
                amount: arg.map(str::to_string),
            }),
            "amount" | "amt" => Ok(Command::Amount {
                text: arg.unwrap_or_default().to_string(),
            }),
            "submit" | "ok" => Ok(Command::Submit),
            "tab" => {
                let name = arg.ok_or_else(|| {
                    anyhow::anyhow!("Missing tab. Usage: tab <deposit|withdraw>")
                })?;
                let kind = name.parse::<TransactionKind>().map_err(anyhow::Error::msg)?;
                Ok(Command::Tab { kind })
            }
            "balance" | "bal" => Ok(Command::Balance),
            "connect" => Ok(Command::Connect),
            "status" => Ok(Command::Status),
            "wait" => Ok(Command::Wait),
            "dismiss" | "clear" => Ok(Command::Dismiss),
            "help" | "?" => Ok(Command::Help {
                command: arg.map(|s| s.to_lowercase()),
            }),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            other => bail!("Unknown command: '{other}'. Type 'help' for a list of commands."),
        }
    }
}

/// Every word the REPL completer should offer.
pub(crate) const COMMAND_WORDS: &[&str] = &[
    "deposit", "dep", "withdraw", "wd", "amount", "amt", "submit", "ok", "tab", "balance", "bal",
    "connect", "status", "wait", "dismiss", "clear", "help", "?", "exit", "quit", "q",
];

#[must_use]
pub(crate) fn help_text(command: Option<&str>) -> String {
    match command {
        Some("deposit") | Some("dep") => {
            "deposit [amount]\n  Switch to the deposit tab. With an amount, enter it and submit.\n  Example: deposit 50\n  Alias: dep".to_string()
        }
        Some("withdraw") | Some("wd") => {
            "withdraw [amount]\n  Switch to the withdraw tab. With an amount, enter it and submit.\n  Example: withdraw 20\n  Alias: wd".to_string()
        }
        Some("amount") | Some("amt") => {
            "amount <text>\n  Type into the active tab's amount field without submitting.\n  Locked while a request is processing.\n  Alias: amt".to_string()
        }
        Some("submit") | Some("ok") => {
            "submit\n  Press the active tab's button. Ignored while processing.\n  Alias: ok".to_string()
        }
        Some("tab") => {
            "tab <deposit|withdraw>\n  Switch tabs. Pending requests keep running.".to_string()
        }
        Some("balance") | Some("bal") => {
            "balance\n  Fetch and show the current token balance.\n  Alias: bal".to_string()
        }
        Some("connect") => {
            "connect\n  Press the wallet button (connects or disconnects).\n  Only relevant with --require-wallet.".to_string()
        }
        Some("status") => "status\n  Show both tabs, the balance and the wallet state.".to_string(),
        Some("wait") => "wait\n  Wait for all outstanding requests to finish.".to_string(),
        Some("dismiss") | Some("clear") => {
            "dismiss\n  Clear the active tab's result message.\n  Alias: clear".to_string()
        }
        Some("help") | Some("?") => {
            "help [command]\n  List all commands, or describe one.\n  Example: help deposit\n  Alias: ?".to_string()
        }
        Some("exit") | Some("quit") | Some("q") => {
            "exit\n  Leave the session. Outstanding results are discarded.\n  Aliases: quit, q".to_string()
        }
        Some(other) => format!("Unknown command: '{other}'. Type 'help' for a list of commands."),
        None => [
            "Commands:",
            "  deposit [amount]        Deposit tab; submit if an amount is given",
            "  withdraw [amount]       Withdraw tab; submit if an amount is given",
            "  amount <text>           Edit the active amount field",
            "  submit                  Submit the active tab",
            "  tab <deposit|withdraw>  Switch tabs",
            "  balance                 Show the balance",
            "  connect                 Press the wallet button",
            "  status                  Show everything",
            "  wait                    Wait for outstanding requests",
            "  dismiss                 Clear the active result",
            "  help [command]          Show help",
            "  exit                    Quit",
        ]
        .join("\n"),
    }
}
