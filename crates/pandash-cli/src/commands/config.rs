//! Config command implementation.

use anyhow::{bail, Result};

use pandash_core::config::Config;

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = super::load_config();
            println!();
            println!("Pandash Configuration");
            println!("{}", "─".repeat(50));
            println!();
            println!("[server]");
            println!("  base_url = \"{}\"", config.server.base_url);
            println!("  timeout = \"{}s\"", config.server.timeout.as_secs());
            println!();
            println!("[ui]");
            println!("  theme = \"{}\"", config.ui.theme);
            println!("  default_tab = \"{}\"", config.ui.default_tab);
            println!("  auto_refresh = {}", config.ui.auto_refresh);
            println!();
            println!("[export]");
            match &config.export.directory {
                Some(dir) => println!("  directory = \"{}\"", dir.display()),
                None => println!("  # directory = (current directory)"),
            }
            println!();
        }

        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }

        ConfigAction::SetServer { url } => {
            let url = normalize_base_url(&url)?;
            let mut config = Config::load()?;
            config.server.base_url.clone_from(&url);
            config.save()?;
            println!("Set server.base_url = {}", url);
        }
    }

    Ok(())
}

/// Check the scheme and drop trailing slashes and a trailing `/api`.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Server URL must start with http:// or https://");
    }
    let url = url.strip_suffix("/api").unwrap_or(url);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://10.0.0.2:5000/").unwrap(),
            "http://10.0.0.2:5000"
        );
        assert_eq!(
            normalize_base_url(" https://pan.example.com/api ").unwrap(),
            "https://pan.example.com"
        );
        assert!(normalize_base_url("10.0.0.2:5000").is_err());
    }
}
