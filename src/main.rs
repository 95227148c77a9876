//! calc-bridge host binary
//!
//! Started by the browser with the caller origin as argument (Chrome) or the
//! manifest path and extension id (Firefox). Also runs by hand (`--manual`)
//! and registers itself with `--install` / `--uninstall`.

use std::io;
use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use calc_bridge::config::{load_config, Config};
use calc_bridge::error::BridgeError;
use calc_bridge::host::{self, Completion, EntryDraft, Stage};
use calc_bridge::install::{self, InstallOptions};
use calc_bridge::logging::{self, LoggingGuard};
use calc_bridge::popup_form::{show_popup, FormOutcome};
use calc_bridge::protocol::read_request;
use calc_bridge::scraper::HttpFetcher;
use calc_bridge::spreadsheet::OdsAppender;

#[derive(Parser, Debug)]
#[command(name = "calc-bridge", version)]
#[command(about = "Native messaging host that stores browser entries in a spreadsheet")]
struct Cli {
    /// Configuration file (default: <config_dir>/calc-bridge/config.json)
    #[arg(long, env = "CALC_BRIDGE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore stdin and show the form without a browser request
    #[arg(long)]
    manual: bool,

    /// Write native messaging manifests for Chrome, Chromium and Firefox
    #[arg(long, conflicts_with = "uninstall")]
    install: bool,

    /// Chrome extension id or origin allowed to connect (repeatable)
    #[arg(long = "chrome-origin", value_name = "ORIGIN", requires = "install")]
    chrome_origins: Vec<String>,

    /// Firefox extension id allowed to connect (repeatable)
    #[arg(long = "firefox-id", value_name = "ID", requires = "install")]
    firefox_ids: Vec<String>,

    /// Remove the native messaging manifests
    #[arg(long)]
    uninstall: bool,

    /// Passed by Chrome on Windows, ignored
    #[arg(long = "parent-window", value_name = "ID", hide = true)]
    parent_window: Option<String>,

    /// Arguments from the browser (caller origin, manifest path, extension id)
    launch_args: Vec<String>,
}

impl Cli {
    /// Run by hand rather than by a browser. Only then does the
    /// confirmation go to stdout, which is otherwise the message pipe.
    fn is_console_run(&self) -> bool {
        self.manual || self.launch_args.is_empty()
    }
}

/// Short console text for a failure, the full chain goes to the log
fn console_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<BridgeError>() {
        Some(bridge) => bridge.user_message(),
        None => format!("{:#}", e),
    }
}

fn exit_with(result: anyhow::Result<()>, guard: LoggingGuard) -> ! {
    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %format!("{:#}", e), "calc-bridge failed");
            eprintln!("calc-bridge: {}", console_message(&e));
            1
        }
    };
    // Flush the log file before the process goes away
    drop(guard);
    std::process::exit(code)
}

fn run_install(cli: &Cli) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("Failed to locate the host binary")?;
    let home = install::home_dir()?;
    let options = InstallOptions {
        chrome_origins: cli.chrome_origins.clone(),
        firefox_ids: cli.firefox_ids.clone(),
    };
    for path in install::install(&home, &exe, &options)? {
        println!("Installed {}", path.display());
    }
    Ok(())
}

fn run_uninstall() -> anyhow::Result<()> {
    let home = install::home_dir()?;
    let removed = install::uninstall(&home)?;
    if removed.is_empty() {
        println!("No manifests found");
    }
    for path in removed {
        println!("Removed {}", path.display());
    }
    Ok(())
}

/// Append the row and reply. Runs inside the form's completion callback.
fn finish(
    draft: EntryDraft,
    outcome: FormOutcome,
    config: &Config,
    console: bool,
) -> anyhow::Result<()> {
    let sink = OdsAppender::new(config.spreadsheet.clone());
    let completion = {
        let mut stdout = io::stdout().lock();
        host::complete(draft, outcome, &sink, &mut stdout, config)
            .with_context(|| format!("Failed to store entry in {}", sink.path().display()))?
    };
    match completion {
        Completion::Manual(message) if console => println!("{}", message),
        Completion::Manual(_) => {
            info!("Browser launch without a usable request, stdout left empty");
        }
        Completion::Responded => {}
    }
    Ok(())
}

fn run_host(cli: Cli, guard: LoggingGuard) {
    info!(
        event_type = "app_lifecycle",
        launch_args = ?cli.launch_args,
        parent_window = ?cli.parent_window,
        manual = cli.manual,
        "Host started"
    );

    let console = cli.is_console_run();
    let config = load_config(cli.config.as_deref());
    let request = if cli.manual {
        None
    } else {
        info!(stage = %Stage::AwaitingRequest, "Waiting for native message");
        read_request(&mut io::stdin().lock())
    };

    let fetcher = HttpFetcher::new(config.user_agent.clone());
    let draft = host::prepare(request.as_ref(), &config, &fetcher, Local::now().date_naive());
    let form = draft.form.clone();
    let form_config = config.form.clone();

    show_popup(
        form,
        &form_config,
        &fetcher,
        Box::new(move |outcome| {
            let result = outcome
                .context("Popup form failed")
                .and_then(|outcome| finish(draft, outcome, &config, console));
            exit_with(result, guard)
        }),
    );
}

fn main() {
    let cli = Cli::parse();
    let guard = logging::init();

    if cli.install {
        let result = run_install(&cli);
        exit_with(result, guard);
    }
    if cli.uninstall {
        exit_with(run_uninstall(), guard);
    }

    run_host(cli, guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_launch_args_are_accepted() {
        let cli = Cli::parse_from(["calc-bridge", "chrome-extension://abc/", "--parent-window=0"]);
        assert_eq!(cli.launch_args, vec!["chrome-extension://abc/"]);
        assert_eq!(cli.parent_window.as_deref(), Some("0"));
        assert!(!cli.install);
    }

    #[test]
    fn test_firefox_launch_args_are_accepted() {
        let cli = Cli::parse_from([
            "calc-bridge",
            "/home/u/.mozilla/native-messaging-hosts/com.example.browsertocalc.json",
            "calc-bridge@example.com",
        ]);
        assert_eq!(cli.launch_args.len(), 2);
    }

    #[test]
    fn test_confirmation_printed_only_for_console_runs() {
        assert!(Cli::parse_from(["calc-bridge"]).is_console_run());
        assert!(Cli::parse_from(["calc-bridge", "--manual", "chrome-extension://abc/"]).is_console_run());
        assert!(!Cli::parse_from(["calc-bridge", "chrome-extension://abc/"]).is_console_run());
    }

    #[test]
    fn test_console_message_prefers_short_bridge_text() {
        let err = anyhow::Error::new(BridgeError::Spreadsheet {
            path: "/tmp/list.ods".to_string(),
            action: "save",
            message: "disk full".to_string(),
        })
        .context("Failed to store entry in /tmp/list.ods");
        assert_eq!(console_message(&err), "Could not save spreadsheet /tmp/list.ods");

        let plain = anyhow::anyhow!("Popup form failed");
        assert_eq!(console_message(&plain), "Popup form failed");
    }

    #[test]
    fn test_install_flags() {
        let cli = Cli::parse_from([
            "calc-bridge",
            "--install",
            "--chrome-origin",
            "abc",
            "--chrome-origin",
            "def",
            "--firefox-id",
            "x@example.com",
        ]);
        assert!(cli.install);
        assert_eq!(cli.chrome_origins, vec!["abc", "def"]);
        assert_eq!(cli.firefox_ids, vec!["x@example.com"]);
    }

    #[test]
    fn test_origin_without_install_is_rejected() {
        assert!(Cli::try_parse_from(["calc-bridge", "--chrome-origin", "abc"]).is_err());
        assert!(Cli::try_parse_from(["calc-bridge", "--install", "--uninstall"]).is_err());
    }
}
