//! Command-line arguments

use crate::error::CliResult;
use clap::Parser;
use resource_loader::LoaderConfig;

/// Plans and simulates asset loader requests.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "corten-loader", version)]
pub struct Cli {
    /// Request string to plan or simulate, e.g. "!libs/jquery; app: grid,form"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Export string resolved once the request loaded
    #[arg(short, long)]
    pub exports: Option<String>,

    /// Run the request against an in-memory transport instead of only planning it
    #[arg(short, long)]
    pub simulate: bool,

    /// Make fetches of this URL or script name fail (repeatable)
    #[arg(long = "fail", value_name = "URL")]
    pub fail: Vec<String>,

    /// JSON file with loader configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Overrides the script root URL
    #[arg(long)]
    pub root: Option<String>,

    /// Overrides the page URL
    #[arg(long)]
    pub page: Option<String>,

    /// Start without the built-in aliases (jQuery, $, CLS, CSS; win, doc, def)
    #[arg(long)]
    pub no_default_aliases: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Start interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Log loader activity at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments planning `query` with everything else at its default.
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Reads the configuration file, if any, adds the built-in aliases the
    /// file does not override and applies the URL overrides.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or the resulting URLs are
    /// invalid.
    pub fn load_config(&self) -> CliResult<LoaderConfig> {
        let mut config = match &self.config {
            Some(path) => LoaderConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => LoaderConfig::default(),
        };
        if !self.no_default_aliases {
            config = config.with_default_shortcuts();
        }
        if let Some(root) = &self.root {
            config.root_url = root.clone();
        }
        if let Some(page) = &self.page {
            config.page_url = page.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
