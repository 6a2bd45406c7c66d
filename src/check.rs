//! Connection self-test for the `check` command.
//!
//! Walks through the same calls the tools depend on and prints a report, so
//! a misconfigured URL or credential shows up before an agent hits it.

use crate::config::Config;
use crate::mcp::{ClientError, ConfluenceClient};
use crate::models::SpaceType;

const SAMPLE_SPACES: u32 = 10;
const SAMPLE_PAGES: u32 = 5;

/// Run the connection test, printing progress to stdout.
///
/// Returns `false` when the configuration is incomplete or a call fails.
pub async fn run(config: &Config) -> bool {
    println!("Checking Confluence configuration...\n");
    if !print_config(config) {
        println!("\nSet the missing variables and try again.");
        return false;
    }

    println!("\nConnecting to {}...\n", config.base_url);
    let client = ConfluenceClient::new(config);
    match check_connection(&client, config).await {
        Ok(()) => {
            println!("\nAll checks passed. The MCP server is ready to use.");
            true
        }
        Err(e) => {
            println!("\nConnection test failed: {}", e);
            print_hints(&e, config);
            false
        }
    }
}

/// Print the configuration. Returns `false` when a variable the check
/// needs is missing; `CONF_SPACE` is optional.
fn print_config(config: &Config) -> bool {
    let entries = [
        ("CONF_BASE_URL", Some(config.base_url.clone()), true),
        ("CONF_USERNAME", config.username.clone(), true),
        ("CONF_PASSWORD", config.masked_password(), true),
        ("CONF_SPACE", config.default_space.clone(), false),
    ];

    let mut complete = true;
    for (name, value, required) in entries {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => println!("  ok  {}: {}", name, value),
            None if required => {
                println!("  --  {} is not set", name);
                complete = false;
            }
            None => println!("  --  {} is not set (optional)", name),
        }
    }
    complete
}

async fn check_connection(client: &ConfluenceClient, config: &Config) -> Result<(), ClientError> {
    println!("1. Authenticating...");
    let user = client.current_user().await?;
    println!(
        "   Authenticated as {} ({})",
        user.display_name.as_deref().unwrap_or("unknown"),
        user.email.as_deref().unwrap_or("no email")
    );

    println!("\n2. Listing spaces...");
    let spaces = client.list_spaces(SpaceType::Global, SAMPLE_SPACES).await?;
    println!("   Found {} spaces", spaces.len());
    for space in &spaces {
        let marker = if config.default_space.as_deref() == Some(space.key.as_str()) {
            "  <- CONF_SPACE"
        } else {
            ""
        };
        println!("   - {} ({}){}", space.name, space.key, marker);
    }

    let Some(ref default_space) = config.default_space else {
        println!("\nCONF_SPACE is not set; skipping the space checks.");
        return Ok(());
    };

    println!("\n3. Checking space {}...", default_space);
    match spaces.iter().find(|s| &s.key == default_space) {
        Some(space) => {
            println!("   Space is accessible: {}", space.name);
            println!("\n4. Reading pages...");
            let pages = client.space_pages(default_space, SAMPLE_PAGES).await?;
            println!("   Read {} pages", pages.len());
            for page in &pages {
                println!("   - {} (ID: {})", page.title, page.id);
            }
        }
        None => {
            println!("   Space {} was not among the listed spaces or is not accessible", default_space);
            println!("   Use one of the space keys listed above");
        }
    }
    Ok(())
}

fn print_hints(error: &ClientError, config: &Config) {
    match error {
        ClientError::Unauthorized => {
            println!("\nPossible causes:");
            println!("  - the password or API token is wrong or expired");
            println!("  - the username is wrong");
        }
        ClientError::NotFound(_) => {
            println!("\nPossible causes:");
            println!("  - CONF_BASE_URL does not point at a Confluence instance");
        }
        ClientError::Http(e) if e.is_connect() || e.is_timeout() => {
            println!("\nPossible causes:");
            println!("  - {} is not reachable", config.base_url);
            println!("  - network or proxy problems");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new("https://wiki.example.com")
            .with_credentials(Some("alice".to_string()), Some("secret".to_string()))
    }

    #[test]
    fn default_space_is_optional() {
        assert!(print_config(&config()));
    }

    #[test]
    fn credentials_are_required() {
        assert!(!print_config(&Config::new("https://wiki.example.com")));
    }
}
