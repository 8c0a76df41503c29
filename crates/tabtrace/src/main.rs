use chrono::{DateTime, Local};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use tabtrace_engine::config::{LogFormat, SessionConfig};
use tabtrace_engine::session::SessionController;

/// Capture console logs, network requests, and JavaScript errors from a
/// Chromium browser session.
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session name; defaults to a timestamp
    name: Option<String>,

    /// Show captured logs in the terminal in addition to the files
    #[arg(long)]
    preview: bool,

    /// Output format (default, json)
    #[arg(long, default_value = "default")]
    format: LogFormat,

    /// Path to a Chrome/Chromium executable
    #[arg(long)]
    browser: Option<PathBuf>,

    /// Root directory for session logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let session_dir = args
        .log_dir
        .join(session_dir_name(args.name.as_deref(), Local::now()));

    let config = SessionConfig {
        log_dir: session_dir.clone(),
        browser_path: args.browser,
        preview: args.preview,
        format: args.format,
    };

    println!("Browser logging enabled");
    println!("Logging to: {}/", session_dir.display());
    println!("  - console.log  (console messages)");
    println!("  - network.log  (network requests & responses)");
    println!("Launching browser...");
    println!();

    let (mut session, mut disconnected) = match SessionController::start(config).await {
        Ok(started) => started,
        Err(e) => {
            eprintln!("Failed to start browser logging: {e}");
            std::process::exit(1);
        }
    };

    println!("Browser launched");
    println!("Navigate to your application and start debugging.");
    println!("Press Ctrl+C to stop logging and close the browser.");
    println!();

    let close_browser = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        // The browser window was closed by hand; nothing left to close.
        _ = &mut disconnected => false,
    };
    session.stop(close_browser).await;

    let stats = session.stats();
    println!();
    println!("Browser logging stopped");
    println!("Session saved to: {}/", session.log_dir().display());
    println!(
        "Network requests: {} total, {} logged, {} filtered",
        stats.total, stats.logged, stats.filtered
    );
}

/// `browser-<name>` for named sessions, `browser-YYYY-MM-DD-HH-MM-SS`
/// otherwise.
fn session_dir_name(name: Option<&str>, now: DateTime<Local>) -> String {
    match name {
        Some(name) => format!("browser-{name}"),
        None => format!("browser-{}", now.format("%Y-%m-%d-%H-%M-%S")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn named_session_uses_the_name() {
        let now = Local::now();
        assert_eq!(session_dir_name(Some("debug-session"), now), "browser-debug-session");
    }

    #[test]
    fn anonymous_session_uses_a_timestamp() {
        let now = Local.with_ymd_and_hms(2025, 11, 23, 14, 30, 45).unwrap();
        assert_eq!(session_dir_name(None, now), "browser-2025-11-23-14-30-45");
    }
}
