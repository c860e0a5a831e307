//! Loader configuration.
//!
//! A [`LoaderConfig`] is plain data: it deserializes from JSON with every
//! field optional, and can be adjusted with `with_*` setters.

use core_types::{LoaderError, LoaderResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Request aliases a page loader starts with.
pub const DEFAULT_QUERY_SHORTCUTS: [(&str, &str); 4] = [
    ("jQuery", "libs/jquery"),
    ("$", "jQuery"),
    ("CLS", "qb/classes"),
    ("CSS", "/static/css"),
];

/// Export aliases a page loader starts with.
pub const DEFAULT_EXPORT_SHORTCUTS: [(&str, &str); 3] = [
    ("win", "window"),
    ("doc", "document"),
    ("def", "qb; document; window"),
];

/// Settings for one [`Loader`](crate::Loader).
///
/// # Examples
///
/// ```
/// use resource_loader::LoaderConfig;
///
/// let config = LoaderConfig::from_json(r#"{ "root_url": "/assets/js" }"#).unwrap();
/// assert_eq!(config.segment_delimiter, "; ");
///
/// let (page, root) = config.resolve_urls().unwrap();
/// assert_eq!(page.as_str(), "http://localhost/");
/// assert_eq!(root.as_str(), "http://localhost/assets/js/");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// URL of the page the loader runs on; relative references resolve against it
    pub page_url: String,
    /// Directory scripts are served from, absolute or relative to the page
    pub root_url: String,
    /// Separator between request segments
    pub segment_delimiter: String,
    /// Extension appended to relative script names
    pub script_extension: String,
    /// Aliases expanded inside requests
    pub query_shortcuts: BTreeMap<String, String>,
    /// Aliases expanded inside export strings
    pub export_shortcuts: BTreeMap<String, String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_url: "http://localhost/".to_string(),
            root_url: "/static/js/".to_string(),
            segment_delimiter: "; ".to_string(),
            script_extension: ".js".to_string(),
            query_shortcuts: BTreeMap::new(),
            export_shortcuts: BTreeMap::new(),
        }
    }
}

impl LoaderConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration; missing fields keep their defaults.
    pub fn from_json(text: &str) -> LoaderResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| LoaderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the page URL.
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = url.into();
        self
    }

    /// Sets the script root.
    pub fn with_root_url(mut self, url: impl Into<String>) -> Self {
        self.root_url = url.into();
        self
    }

    /// Sets the request segment delimiter.
    pub fn with_segment_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.segment_delimiter = delimiter.into();
        self
    }

    /// Sets the script extension.
    pub fn with_script_extension(mut self, extension: impl Into<String>) -> Self {
        self.script_extension = extension.into();
        self
    }

    /// Adds a request alias.
    pub fn with_query_shortcut(mut self, alias: impl Into<String>, text: impl Into<String>) -> Self {
        self.query_shortcuts.insert(alias.into(), text.into());
        self
    }

    /// Adds an export alias.
    pub fn with_export_shortcut(mut self, alias: impl Into<String>, text: impl Into<String>) -> Self {
        self.export_shortcuts.insert(alias.into(), text.into());
        self
    }

    /// Adds [`DEFAULT_QUERY_SHORTCUTS`] and [`DEFAULT_EXPORT_SHORTCUTS`].
    ///
    /// Aliases already configured keep their replacement.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_loader::LoaderConfig;
    ///
    /// let config = LoaderConfig::new()
    ///     .with_query_shortcut("CSS", "/assets/css")
    ///     .with_default_shortcuts();
    /// assert_eq!(config.query_shortcuts["$"], "jQuery");
    /// assert_eq!(config.query_shortcuts["CSS"], "/assets/css");
    /// assert_eq!(config.export_shortcuts["doc"], "document");
    /// ```
    pub fn with_default_shortcuts(mut self) -> Self {
        for (alias, text) in DEFAULT_QUERY_SHORTCUTS {
            self.query_shortcuts
                .entry(alias.to_string())
                .or_insert_with(|| text.to_string());
        }
        for (alias, text) in DEFAULT_EXPORT_SHORTCUTS {
            self.export_shortcuts
                .entry(alias.to_string())
                .or_insert_with(|| text.to_string());
        }
        self
    }

    /// Checks the settings that cannot be repaired silently.
    pub fn validate(&self) -> LoaderResult<()> {
        if self.segment_delimiter.is_empty() {
            return Err(LoaderError::Config(
                "segment delimiter must not be empty".to_string(),
            ));
        }
        self.resolve_urls().map(|_| ())
    }

    /// Resolves the page URL and the script root.
    ///
    /// The root is resolved against the page and always ends with `/`.
    pub fn resolve_urls(&self) -> LoaderResult<(Url, Url)> {
        let page = Url::parse(&self.page_url).map_err(|source| LoaderError::InvalidUrl {
            input: self.page_url.clone(),
            source,
        })?;

        let mut root_text = self.root_url.clone();
        if !root_text.ends_with('/') {
            root_text.push('/');
        }
        let root = page
            .join(&root_text)
            .map_err(|source| LoaderError::InvalidUrl {
                input: self.root_url.clone(),
                source,
            })?;

        Ok((page, root))
    }
}
