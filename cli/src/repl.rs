/// REPL shell: Reedline-based interactive widget session.
use anyhow::Result;
use reedline::{DefaultCompleter, DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use token_widget_core::DEFAULT_BASE_URL;

use crate::commands::{Command, COMMAND_WORDS};
use crate::Cli;

pub async fn run_repl(cli: &Cli) -> Result<()> {
    println!("Token Widget v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Backend: {}",
        cli.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    );
    println!();

    let mut host = cli.build_host()?;
    host.mount();
    if host.is_gated() {
        println!("A wallet connection is required. Type 'connect' to connect.");
    }
    println!("Type 'help' for a list of commands.");
    println!();

    let prompt_str = if cli.user_id.is_empty() {
        "[tokens]".to_string()
    } else {
        format!("[tokens {}]", cli.user_id)
    };
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(prompt_str),
        DefaultPromptSegment::Empty,
    );

    let commands: Vec<String> = COMMAND_WORDS.iter().map(|w| w.to_string()).collect();
    let completer = Box::new(DefaultCompleter::new(commands));
    let mut line_editor = Reedline::create().with_completer(completer);

    loop {
        for line in host.drain() {
            println!("{line}");
        }

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match Command::parse(line) {
                    Ok(Command::Exit) => {
                        println!("Goodbye.");
                        break;
                    }
                    Ok(cmd) => {
                        let output = host.execute(&cmd).await;
                        if !output.is_empty() {
                            println!("{output}");
                        }
                    }
                    Err(e) => {
                        eprintln!("{e}");
                    }
                }
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                println!("Goodbye.");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }
    }

    Ok(())
}
