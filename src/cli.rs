use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::api::{ConnectOptions, Connector, YouTrackConnector};
use crate::config;
use crate::registry::{ServerDraft, ServerRegistry};
use crate::secrets::FileSecretStore;

fn registry() -> ServerRegistry {
    ServerRegistry::new(Arc::new(FileSecretStore::open_default()))
}

/// `ytb servers`: list saved servers with their tokens masked.
pub fn handle_servers() -> Result<()> {
    let servers = registry().list()?;
    if servers.is_empty() {
        println!("No servers saved. Add one with `ytb add-server <url> -t <token>`");
        return Ok(());
    }
    for server in servers {
        println!("{:<24} {}  {}", server.label, server.url, mask_token(&server.token));
    }
    Ok(())
}

/// `ytb add-server`: save a server without opening the TUI.
pub fn handle_add_server(args: &[String]) -> Result<()> {
    let draft = parse_add_server_args(args)?;
    let server = registry().add(draft)?;
    println!("Added {} ({})", server.label, server.url);
    Ok(())
}

/// `ytb projects`: list the projects of the first saved server.
pub async fn handle_projects() -> Result<()> {
    let Some(server) = registry().first()? else {
        bail!("No servers saved. Add one with `ytb add-server <url> -t <token>`");
    };
    let settings = config::load_config()?.youtrack;
    let options = ConnectOptions {
        validate_certificate: settings.validate_certificate,
        ..Default::default()
    };
    let client = YouTrackConnector
        .connect(&server, options)
        .await
        .with_context(|| format!("Failed to connect to {}", server.url))?;

    let mut projects = client.get_projects().await?;
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    for project in projects {
        let archived = if project.archived { "  (archived)" } else { "" };
        println!(
            "{:<10} {}{archived}",
            project.short_name.as_deref().unwrap_or("-"),
            project.name.as_deref().unwrap_or(&project.id)
        );
    }
    Ok(())
}

/// Parse `ytb add-server` arguments.
///
/// Supported forms:
///   ytb add-server https://yt.example.com -t perm:xyz
///   ytb add-server https://yt.example.com --token perm:xyz --label Work
pub fn parse_add_server_args(args: &[String]) -> Result<ServerDraft> {
    if args.is_empty() {
        bail!("Usage: ytb add-server <url> -t <token> [-l <label>]\n\nExample:\n  ytb add-server https://yt.example.com -t perm:abc123");
    }

    let mut draft = ServerDraft::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            flag @ ("-t" | "--token") => draft.token = Some(flag_value(args, &mut i, flag)?),
            flag @ ("-l" | "--label") => draft.label = Some(flag_value(args, &mut i, flag)?),
            other if draft.url.is_none() => draft.url = Some(other.to_string()),
            other => bail!("Unexpected argument: {other}"),
        }
        i += 1;
    }

    if draft.url.is_none() {
        bail!("Server URL is required");
    }
    Ok(draft)
}

fn flag_value(args: &[String], i: &mut usize, flag: &str) -> Result<String> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.clone()),
        None => bail!("Missing value for {flag} flag"),
    }
}

/// Keep a short prefix so tokens can be told apart.
fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(5).collect();
    format!("{prefix}****")
}

pub fn print_help() {
    println!("ytb: browse YouTrack agile boards from the terminal\n");
    println!("USAGE:");
    println!("  ytb                    Launch the TUI");
    println!("  ytb servers            List saved servers");
    println!("  ytb add-server <url>   Save a server");
    println!("  ytb projects           List projects of the first saved server");
    println!();
    println!("ADD-SERVER OPTIONS:");
    println!("  -t, --token <token>  Permanent token (required)");
    println!("  -l, --label <label>  Display name, defaults to the host");
    println!();
    println!("Settings live in {}", config::config_path().display());
    println!("Logs are written to {}", config::log_path().display());
}
