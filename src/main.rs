//! Parlor - A cozy terminal client for Plaza social servers
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use std::io::Write;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Parse CLI arguments
    let command = parse_args()?;

    // Initialize logging (PARLOR_LOG=debug for verbose output); logs go to
    // stderr so the TUI on stdout stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("PARLOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match command {
        Command::Run { server } => parlor::app::run(server),
        Command::Login { server } => login_flow(server),
        Command::Logout => logout(),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Run { server: Option<String> },
    Login { server: Option<String> },
    Logout,
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // --server applies to the TUI and to `login`
    let server = match args.iter().position(|a| a == "--server" || a == "-s") {
        Some(i) => {
            args.remove(i);
            if i < args.len() {
                Some(args.remove(i))
            } else {
                return Err(anyhow::anyhow!("--server requires a URL"));
            }
        }
        None => None,
    };

    match args.first().map(String::as_str) {
        None => Ok(Command::Run { server }),
        Some("-h" | "--help" | "help") => Ok(Command::Help),
        Some("-v" | "--version" | "version") => Ok(Command::Version),
        Some("login") => Ok(Command::Login { server }),
        Some("logout") => Ok(Command::Logout),
        Some(other) => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'parlor --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = parlor::Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
💬 Parlor - A cozy terminal client for Plaza social servers

USAGE:
    parlor [OPTIONS]                   Launch TUI
    parlor [COMMAND] [OPTIONS]

COMMANDS:
    login                              Log in and store the session
      Examples:
        parlor login
        parlor login --server https://plaza.example.com

    logout                             Delete the stored session

OPTIONS:
    -s, --server <url>                 Use this Plaza server for this run
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Navigation
      j/↓           Move down
      k/↑           Move up
      g/G           Jump to top/bottom

    Feed
      r             Refresh
      n             New post (compose)
      l             Like/unlike
      d             Delete own post
      /             Hashtag search
      Esc           Clear hashtag filter
      p             Open author's profile
      P             Open your profile

    Profile
      f             Follow/unfollow
      e             Edit profile (yours)
      o             Log out (yours)
      x             Delete account (yours)
      b/Esc         Back to feed

    View
      t             Change theme
      ?             Help
      q             Quit

CONFIG:
    {}

HOMEPAGE:
    {}
"#,
        parlor::LOGO,
        config_path,
        parlor::REPO_URL
    );
}

fn print_version() {
    println!("parlor {}", parlor::VERSION);
}

/// Prompt for credentials on stdin and store the session.
///
/// The TUI has its own login screen; this path exists for scripted setup.
fn login_flow(server_override: Option<String>) -> Result<()> {
    let mut config = parlor::Config::load()?;
    if let Some(server) = server_override {
        config.server_url = server;
    }
    let server = config.server_base().to_string();

    println!("Logging in to {}", server);

    print!("Username: ");
    std::io::stdout().flush()?;
    let mut username = String::new();
    std::io::stdin().read_line(&mut username)?;
    let username = username.trim();

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    let password = password.trim();

    let rt = tokio::runtime::Runtime::new()?;
    let session = rt.block_on(async {
        let response = parlor::api::login(&server, username, password).await?;
        // The login response carries only the token; the id and username
        // come from the profile endpoint
        let client = parlor::PlazaClient::new(&server, &response.access_token);
        let user = client.current_user().await?;
        Ok::<_, parlor::ApiError>(parlor::Session {
            token: response.access_token,
            user_id: user.id,
            username: user.username,
        })
    })?;

    parlor::session::save(&session).context("Failed to store the session")?;
    println!("✓ Logged in as @{}", session.username);

    Ok(())
}

fn logout() -> Result<()> {
    if parlor::session::delete()? {
        println!("✓ Logged out");
    } else {
        println!("No stored session");
    }
    Ok(())
}
