//! Optional config file loading. Search order: ./novelfetch.toml, then
//! $XDG_CONFIG_HOME/novelfetch/config.toml (or ~/.config/novelfetch/config.toml).

use serde::Deserialize;
use std::path::PathBuf;

/// Book downloaded when neither the CLI nor the config file names one.
pub const DEFAULT_TITLE: &str = "悔婚当日，清冷权臣求我别始乱终弃";
/// Listing pages of [DEFAULT_TITLE], in order.
pub const DEFAULT_LISTING_URLS: [&str; 2] = [
    "https://www.qizi.cc/10031437/",
    "https://www.qizi.cc/10031437/2/",
];
/// Pause between listing page fetches.
pub const DEFAULT_LISTING_DELAY_MS: u64 = 1000;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Book title; also names the output file.
    pub title: Option<String>,
    /// Listing pages to read chapter links from, in order.
    pub listing_urls: Option<Vec<String>>,
    /// Directory for the output file when -o is not set. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// Number of chapters fetched concurrently.
    pub workers: Option<usize>,
    /// Delay in milliseconds between listing page fetches.
    pub listing_delay_ms: Option<u64>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

/// Search order: (1) ./novelfetch.toml, (2) $XDG_CONFIG_HOME/novelfetch/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("novelfetch.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("novelfetch").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok(Some(config));
        }
    }
    Ok(None)
}
