mod debug_report;

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use interject::rules::companion::{self, Transcript};
use interject::{ActionTag, Conversation, DialogId, RecordedHistory, Utterance};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("interject=warn")))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let history = RecordedHistory { last: config.last, previous: config.previous.clone(), speaking: config.speaking };
    let voice = Arc::new(Transcript::new().with_previous_to_last(config.previous).with_rate_control(true));

    let mut conversation = Conversation::new(Arc::new(history), Arc::new(config.actions));
    companion::install(conversation.registry_mut(), voice.clone());

    let utterance = Utterance::new(config.hypotheses, !config.interim);
    let report = debug_report::Report::new(config.color);
    let out = conversation.resolve_verbose(utterance)?;
    report.print_run(&out.utterance, &out.details);

    if let Some(inquiry) = out.inquiry {
        let directive = futures::executor::block_on(inquiry.respond_async())?;
        report.print_response(&voice.events(), Some(directive));
    } else {
        println!();
    }
    Ok(())
}

struct CliConfig {
    /// Newest first.
    hypotheses: Vec<String>,
    interim: bool,
    last: Option<DialogId>,
    previous: Option<DialogId>,
    /// Newest first.
    actions: Vec<ActionTag>,
    speaking: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut hypotheses: Vec<String> = Vec::new();
    let mut interim = false;
    let mut last: Option<DialogId> = None;
    let mut previous: Option<DialogId> = None;
    let mut actions: Vec<ActionTag> = Vec::new();
    let mut speaking = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("interject {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--interim" => interim = true,
            "--speaking" => speaking = true,
            "--hypothesis" | "-u" => {
                let value = args.next().ok_or_else(|| "error: --hypothesis expects a value".to_string())?;
                hypotheses.push(value);
            }
            "--last" => {
                let value = args.next().ok_or_else(|| "error: --last expects a value".to_string())?;
                last = Some(DialogId::from(value));
            }
            "--previous" => {
                let value = args.next().ok_or_else(|| "error: --previous expects a value".to_string())?;
                previous = Some(DialogId::from(value));
            }
            "--action" => {
                let value = args.next().ok_or_else(|| "error: --action expects a value".to_string())?;
                actions.push(ActionTag::from(value));
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    hypotheses.push(rest);
                }
                break;
            }
            _ if arg.starts_with("--hypothesis=") => {
                hypotheses.push(arg.trim_start_matches("--hypothesis=").to_string());
            }
            _ if arg.starts_with("--last=") => last = Some(DialogId::from(arg.trim_start_matches("--last=").to_string())),
            _ if arg.starts_with("--previous=") => {
                previous = Some(DialogId::from(arg.trim_start_matches("--previous=").to_string()));
            }
            _ if arg.starts_with("--action=") => {
                actions.push(ActionTag::from(arg.trim_start_matches("--action=").to_string()));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                hypotheses.push(rest);
                break;
            }
        }
    }

    if hypotheses.is_empty() {
        hypotheses = read_stdin_hypotheses()?;
    }

    if hypotheses.iter().all(|h| h.trim().is_empty()) {
        return Err(format!("error: no hypothesis provided\n\n{}", help_text()));
    }

    Ok(CliConfig { hypotheses, interim, last, previous, actions, speaking, color })
}

/// One hypothesis per non-empty line, newest first.
fn read_stdin_hypotheses() -> Result<Vec<String>, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "interject {version}

Resolve an utterance against the companion reaction catalog and show how
the tiers were walked.

Usage:
  interject [OPTIONS] [--] <hypothesis...>
  interject [OPTIONS] -u <newest> -u <older> ...

Options:
  -u, --hypothesis <text>    Recognizer hypothesis; repeat for older ones
                             (newest first). If omitted, reads remaining args,
                             or one hypothesis per stdin line.
  --interim                  Treat the transcript as interim (default: final).
  --last <dialog>            Dialog id the agent spoke last.
  --previous <dialog>        Dialog id spoken before the last one.
  --action <tag>             Ongoing action; repeat for more (newest first).
  --speaking                 The agent is still speaking.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  RUST_LOG                   Log filter, e.g. interject=trace.

Exit codes:
  0  Success (whether or not a reaction matched).
  1  Resolution failed.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
