//! Request and export string parsing.
//!
//! A request such as `"!libs/jquery; app: grid,form; /static/css/app.css"`
//! becomes a [`RequestPlan`]: tiers of absolute, typed resource URLs in the
//! order they must load. An export string such as `"app.grid; app.form|{ready}"`
//! becomes an [`ExportSpec`]: namespace paths plus scheduling flags.
//!
//! Request grammar, per segment (segments are separated by `"; "`):
//!
//! ```text
//! segment  := [marker] (absolute | group)
//! marker   := "!" | "{" digits "}"
//! absolute := "/" ... | "//" ... | "http://" ... | "https://" ... | "www." ...
//! group    := [prefix ":"] name ("," name)*
//! ```

use crate::config::LoaderConfig;
use crate::shortcuts::ShortcutTable;
use core_types::{LoaderError, LoaderResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// What a resource is fetched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Executable script
    Script,
    /// CSS stylesheet
    Stylesheet,
}

impl ResourceKind {
    /// Classifies a reference: a `.css` suffix (any case) means stylesheet.
    pub fn of(reference: &str) -> Self {
        if is_stylesheet(reference) {
            ResourceKind::Stylesheet
        } else {
            ResourceKind::Script
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Script => write!(f, "script"),
            ResourceKind::Stylesheet => write!(f, "stylesheet"),
        }
    }
}

fn is_stylesheet(reference: &str) -> bool {
    let bytes = reference.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".css")
}

/// A request, either as one string or already split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Segments joined by the configured delimiter
    Text(String),
    /// Pre-split segments
    Parts(Vec<String>),
}

impl Query {
    fn segments<'a>(&'a self, delimiter: &'a str) -> Vec<&'a str> {
        match self {
            Query::Text(text) => split_segments(text, delimiter).collect(),
            Query::Parts(parts) => parts
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Text(text)
    }
}

impl From<Vec<String>> for Query {
    fn from(parts: Vec<String>) -> Self {
        Query::Parts(parts)
    }
}

impl From<Vec<&str>> for Query {
    fn from(parts: Vec<&str>) -> Self {
        Query::Parts(parts.into_iter().map(String::from).collect())
    }
}

/// One resource of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedResource {
    /// Absolute URL
    pub url: String,
    /// Script or stylesheet
    pub kind: ResourceKind,
}

/// Resources that load together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    /// Explicit priority, or `None` for the default tier
    pub priority: Option<u32>,
    /// Distinct resources of the tier, in first-mention order
    pub resources: Vec<PlannedResource>,
}

impl Tier {
    /// URLs of the tier's resources.
    pub fn urls(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.url.as_str()).collect()
    }
}

/// The tiers of a request, in load order.
///
/// Explicit priorities come first in ascending order; the default tier is
/// always last. Empty tiers are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestPlan {
    /// Tiers in load order
    pub tiers: Vec<Tier>,
}

impl RequestPlan {
    /// Returns true if the request named no resources.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// All resources in load order.
    pub fn resources(&self) -> impl Iterator<Item = &PlannedResource> {
        self.tiers.iter().flat_map(|t| t.resources.iter())
    }
}

/// Scheduling flags of an export string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportFlags {
    /// Wait for the document to be ready
    pub ready: bool,
    /// Wait for the window to finish loading
    pub load: bool,
    /// Refetch scripts of the last tier that already loaded
    pub reload: bool,
}

/// A parsed export string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSpec {
    /// Path text with whitespace removed, before alias expansion
    pub source: Option<String>,
    /// Flags from a trailing `|{...}`
    pub flags: ExportFlags,
}

impl ExportSpec {
    /// Parses an export string.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_loader::ExportSpec;
    ///
    /// let spec = ExportSpec::parse("app.grid; app.form |{ready,reload}");
    /// assert_eq!(spec.source.as_deref(), Some("app.grid;app.form"));
    /// assert!(spec.flags.ready && spec.flags.reload && !spec.flags.load);
    ///
    /// let flags_only = ExportSpec::parse("{load}");
    /// assert!(flags_only.source.is_none());
    /// assert!(flags_only.flags.load);
    /// ```
    pub fn parse(text: &str) -> Self {
        let compact = remove_whitespace(text);
        let (source, flags) = split_flags(&compact);
        ExportSpec {
            source: (!source.is_empty()).then(|| source.to_string()),
            flags,
        }
    }
}

fn split_flags(text: &str) -> (&str, ExportFlags) {
    let mut flags = ExportFlags::default();
    let Some(body) = text.strip_suffix('}') else {
        return (text, flags);
    };
    let Some(open) = body.rfind('{') else {
        return (text, flags);
    };
    let inner = &body[open + 1..];
    if inner.is_empty()
        || !inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ',')
    {
        return (text, flags);
    }
    let head = &body[..open];
    let source = if head.is_empty() {
        head
    } else if let Some(source) = head.strip_suffix('|') {
        source
    } else {
        return (text, flags);
    };

    for flag in inner.split(',').filter(|f| !f.is_empty()) {
        match flag.to_ascii_lowercase().as_str() {
            "ready" => flags.ready = true,
            "load" => flags.load = true,
            "reload" => flags.reload = true,
            _ => tracing::warn!(flag, "ignoring unknown export flag"),
        }
    }
    (source, flags)
}

/// Turns request and export strings into plans, using the loader's aliases.
#[derive(Debug, Clone)]
pub struct RequestParser {
    page_url: Url,
    root_url: Url,
    delimiter: String,
    extension: String,
    queries: ShortcutTable,
    exports: ShortcutTable,
}

impl RequestParser {
    /// Creates a parser, loading the configured aliases.
    pub fn new(config: &LoaderConfig) -> LoaderResult<Self> {
        config.validate()?;
        let (page_url, root_url) = config.resolve_urls()?;

        let mut queries = ShortcutTable::for_queries();
        queries.add(config.query_shortcuts.clone());
        let mut exports = ShortcutTable::for_exports();
        exports.add(config.export_shortcuts.clone());

        Ok(Self {
            page_url,
            root_url,
            delimiter: config.segment_delimiter.clone(),
            extension: config.script_extension.clone(),
            queries,
            exports,
        })
    }

    /// The page URL relative references resolve against.
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// The directory relative script names resolve against.
    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// Request aliases.
    pub fn query_shortcuts(&self) -> &ShortcutTable {
        &self.queries
    }

    /// Request aliases, for adding entries.
    pub fn query_shortcuts_mut(&mut self) -> &mut ShortcutTable {
        &mut self.queries
    }

    /// Export aliases.
    pub fn export_shortcuts(&self) -> &ShortcutTable {
        &self.exports
    }

    /// Export aliases, for adding entries.
    pub fn export_shortcuts_mut(&mut self) -> &mut ShortcutTable {
        &mut self.exports
    }

    /// Parses a request into tiers.
    ///
    /// When a URL is mentioned more than once, the last mention decides its
    /// priority; its position inside the tier is that of the first mention.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_loader::{LoaderConfig, RequestParser};
    ///
    /// let parser = RequestParser::new(&LoaderConfig::default()).unwrap();
    /// let plan = parser.parse(&"{2}foo; {1}bar; baz".into()).unwrap();
    ///
    /// let order: Vec<Vec<&str>> = plan.tiers.iter().map(|t| t.urls()).collect();
    /// assert_eq!(
    ///     order,
    ///     vec![
    ///         vec!["http://localhost/static/js/bar.js"],
    ///         vec!["http://localhost/static/js/foo.js"],
    ///         vec!["http://localhost/static/js/baz.js"],
    ///     ]
    /// );
    /// ```
    pub fn parse(&self, query: &Query) -> LoaderResult<RequestPlan> {
        let mut collected = Collected::default();

        for part in query.segments(&self.delimiter) {
            let (priority, rest) = split_priority(part);
            if let Some(url) = self.absolute_url(rest)? {
                collected.insert(url, priority);
                continue;
            }

            // Aliases may expand to several segments, some of them absolute.
            let expanded = self.queries.replace_in(part)?;
            for segment in split_segments(&expanded, &self.delimiter) {
                let (priority, rest) = split_priority(segment);
                match self.absolute_url(rest)? {
                    Some(url) => collected.insert(url, priority),
                    None => self.parse_group(segment, &mut collected)?,
                }
            }
        }

        let plan = collected.into_plan();
        tracing::trace!(tiers = plan.len(), "parsed request");
        Ok(plan)
    }

    /// Parses an export string. See [`ExportSpec::parse`].
    pub fn parse_exports(&self, text: &str) -> ExportSpec {
        ExportSpec::parse(text)
    }

    /// Expands export aliases and returns the dotted namespace paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_loader::{ExportSpec, LoaderConfig, RequestParser};
    ///
    /// let config = LoaderConfig::default().with_export_shortcut("ui", "app.widgets");
    /// let parser = RequestParser::new(&config).unwrap();
    ///
    /// let paths = parser.export_paths(&ExportSpec::parse("ui: Grid,Form; app")).unwrap();
    /// assert_eq!(paths, vec!["app.widgets.Grid", "app.widgets.Form", "app"]);
    /// ```
    pub fn export_paths(&self, spec: &ExportSpec) -> LoaderResult<Vec<String>> {
        let Some(source) = &spec.source else {
            return Ok(Vec::new());
        };
        let expanded = remove_whitespace(&self.exports.replace_in(source)?);
        Ok(expanded
            .split(';')
            .filter(|part| !part.is_empty())
            .flat_map(|part| group(part, '.'))
            .collect())
    }

    /// URL of the script a module name refers to.
    pub fn script_url(&self, module: &str) -> LoaderResult<String> {
        let name = format!("{}{}", module.trim(), self.extension);
        join(&self.root_url, &name)
    }

    fn parse_group(&self, segment: &str, collected: &mut Collected) -> LoaderResult<()> {
        for item in group(&remove_whitespace(segment), '/') {
            let (priority, name) = split_priority(&item);
            if name.is_empty() {
                continue;
            }
            let url = if is_stylesheet(name) {
                join(&self.page_url, name)?
            } else {
                self.script_url(name)?
            };
            collected.insert(url, priority);
        }
        Ok(())
    }

    fn absolute_url(&self, reference: &str) -> LoaderResult<Option<String>> {
        let lower = reference.to_ascii_lowercase();
        let candidate = if lower.starts_with("www.") {
            format!("{}://{}", self.page_url.scheme(), reference)
        } else if reference.starts_with('/')
            || lower.starts_with("http://")
            || lower.starts_with("https://")
        {
            reference.to_string()
        } else {
            return Ok(None);
        };
        join(&self.page_url, &candidate).map(Some)
    }
}

fn join(base: &Url, reference: &str) -> LoaderResult<String> {
    base.join(reference)
        .map(String::from)
        .map_err(|source| LoaderError::InvalidUrl {
            input: reference.to_string(),
            source,
        })
}

/// URL to priority, remembering first-mention order.
#[derive(Default)]
struct Collected {
    order: Vec<String>,
    priorities: HashMap<String, Option<u32>>,
}

impl Collected {
    fn insert(&mut self, url: String, priority: Option<u32>) {
        if !self.priorities.contains_key(&url) {
            self.order.push(url.clone());
        }
        self.priorities.insert(url, priority);
    }

    fn into_plan(self) -> RequestPlan {
        let mut explicit: BTreeMap<u32, Vec<PlannedResource>> = BTreeMap::new();
        let mut default = Vec::new();

        for url in self.order {
            let priority = self.priorities.get(&url).copied().flatten();
            let resource = PlannedResource {
                kind: ResourceKind::of(&url),
                url,
            };
            match priority {
                Some(p) => explicit.entry(p).or_default().push(resource),
                None => default.push(resource),
            }
        }

        let mut tiers: Vec<Tier> = explicit
            .into_iter()
            .map(|(priority, resources)| Tier {
                priority: Some(priority),
                resources,
            })
            .collect();
        if !default.is_empty() {
            tiers.push(Tier {
                priority: None,
                resources: default,
            });
        }
        RequestPlan { tiers }
    }
}

/// Strips a leading `!` or `{N}` marker. `{0}` counts as priority 1 and
/// priorities beyond `u32::MAX` saturate.
fn split_priority(part: &str) -> (Option<u32>, &str) {
    if let Some(rest) = part.strip_prefix('!') {
        return (Some(1), rest.trim_start());
    }
    if let Some(inner) = part.strip_prefix('{') {
        if let Some(close) = inner.find('}') {
            let digits = &inner[..close];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let n = digits.parse::<u32>().unwrap_or(u32::MAX);
                return (Some(n.max(1)), inner[close + 1..].trim_start());
            }
        }
    }
    (None, part)
}

fn split_segments<'a>(text: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Expands `prefix:a,b` into `prefix<joiner>a`, `prefix<joiner>b`.
fn group(part: &str, joiner: char) -> Vec<String> {
    match part.split_once(':') {
        Some((prefix, children)) => children
            .split(',')
            .filter(|c| !c.is_empty())
            .map(|child| format!("{}{}{}", prefix, joiner, child))
            .collect(),
        None => part
            .split(',')
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect(),
    }
}

fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
