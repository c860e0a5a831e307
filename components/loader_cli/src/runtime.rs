//! Simulation session
//!
//! A [`Session`] owns a loader running on an in-memory transport, so
//! requests can be planned and played out without a browser:
//! - [`Session::plan`] parses a request into tiers
//! - [`Session::simulate`] runs it on the event loop and reports what happened
//! - [`Session::fail`] scripts fetch failures ahead of a simulation

use crate::error::{CliError, CliResult};
use async_runtime::{EventLoop, PromiseState};
use core_types::LoadFailure;
use resource_loader::{
    Loader, LoaderConfig, MemoryTransport, Outcome as FetchOutcome, ProgressEvent, RequestPlan,
    RequireOptions,
};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::rc::Rc;

/// How a simulated request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Every tier loaded and the exports resolved
    Loaded,
    /// A resource failed
    Failed,
    /// Still waiting, e.g. on a page milestone
    Pending,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Loaded => write!(f, "loaded"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::Pending => write!(f, "pending"),
        }
    }
}

impl From<PromiseState> for Outcome {
    fn from(state: PromiseState) -> Self {
        match state {
            PromiseState::Pending => Outcome::Pending,
            PromiseState::Fulfilled => Outcome::Loaded,
            PromiseState::Rejected => Outcome::Failed,
        }
    }
}

/// What one simulated request did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The request string
    pub query: String,
    /// Final state of the request
    pub outcome: Outcome,
    /// URLs fetched by this request, in fetch order
    pub fetched: Vec<String>,
    /// Export values, rendered as text
    pub exports: Vec<String>,
    /// Errors raised on the event loop
    pub errors: Vec<String>,
    /// Progress notifications
    pub progress: Vec<ProgressEvent>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fetched:")?;
        for (i, url) in self.fetched.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, url)?;
        }
        writeln!(f, "outcome: {}", self.outcome)?;
        if !self.exports.is_empty() {
            writeln!(f, "exports: {}", self.exports.join(", "))?;
        }
        for error in &self.errors {
            writeln!(f, "error: {}", error)?;
        }
        Ok(())
    }
}

/// Renders the tiers of a plan, one resource per line.
pub fn format_plan(plan: &RequestPlan) -> String {
    if plan.is_empty() {
        return "(nothing to load)\n".to_string();
    }
    let mut out = String::new();
    for (i, tier) in plan.tiers.iter().enumerate() {
        let label = match tier.priority {
            Some(priority) => format!("priority {}", priority),
            None => "default".to_string(),
        };
        let _ = writeln!(out, "tier {} ({}):", i + 1, label);
        for resource in &tier.resources {
            let _ = writeln!(out, "  {:<10} {}", resource.kind.to_string(), resource.url);
        }
    }
    out
}

/// A loader over an in-memory transport.
pub struct Session {
    config: LoaderConfig,
    failing: Vec<String>,
    event_loop: EventLoop,
    transport: MemoryTransport,
    loader: Loader,
    progress: Rc<RefCell<Vec<ProgressEvent>>>,
}

impl Session {
    /// Creates a session with a fresh loader.
    ///
    /// # Example
    /// ```
    /// use loader_cli::Session;
    /// use resource_loader::LoaderConfig;
    ///
    /// let session = Session::new(LoaderConfig::default()).unwrap();
    /// let report = session.simulate("app", None).unwrap();
    /// assert_eq!(report.fetched, vec!["http://localhost/static/js/app.js"]);
    /// ```
    pub fn new(config: LoaderConfig) -> CliResult<Self> {
        let event_loop = EventLoop::new();
        let transport = MemoryTransport::new(event_loop.clone());
        let loader = Loader::builder(config.clone())
            .transport(Rc::new(transport.clone()))
            .event_loop(event_loop.clone())
            .build()?;

        let progress = Rc::new(RefCell::new(Vec::new()));
        let sink = progress.clone();
        loader.on_progress(move |event| sink.borrow_mut().push(*event));

        Ok(Self {
            config,
            failing: Vec::new(),
            event_loop,
            transport,
            loader,
            progress,
        })
    }

    /// Makes fetches of `target` fail.
    ///
    /// `target` is anything a request may name: an absolute URL, a script
    /// name or an alias. Returns the URL that will fail.
    pub fn fail(&mut self, target: &str) -> CliResult<String> {
        let plan = self.loader.plan(target)?;
        let url = plan
            .resources()
            .next()
            .map(|r| r.url.clone())
            .ok_or_else(|| CliError::Usage(format!("'{}' names no resource", target)))?;

        self.transport.script(
            url.clone(),
            FetchOutcome::Fail(LoadFailure::new("simulated failure")),
        );
        self.failing.push(target.to_string());
        Ok(url)
    }

    /// Parses `query` without loading anything.
    pub fn plan(&self, query: &str) -> CliResult<RequestPlan> {
        Ok(self.loader.plan(query)?)
    }

    /// The plan and export paths of a request as JSON.
    pub fn plan_json(&self, query: &str, exports: Option<&str>) -> CliResult<serde_json::Value> {
        let plan = self.plan(query)?;
        let exports = match exports {
            Some(text) => self.loader.export_paths(text)?,
            None => Vec::new(),
        };
        Ok(serde_json::json!({
            "query": query,
            "tiers": plan.tiers,
            "exports": exports,
        }))
    }

    /// Requires `query` and runs the event loop until nothing is left to do.
    ///
    /// Load failures do not make this fail; they are listed in the report.
    ///
    /// # Errors
    ///
    /// Fails if the request is rejected before anything is fetched, e.g. on
    /// an alias cycle.
    pub fn simulate(&self, query: &str, exports: Option<&str>) -> CliResult<Report> {
        let before = self.transport.fetched().len();
        self.progress.borrow_mut().clear();

        let mut options = RequireOptions::new();
        if let Some(exports) = exports {
            options = options.exports(exports);
        }
        let request = self.loader.require(query, options)?;

        let mut errors = Vec::new();
        while let Err(error) = self.event_loop.run_until_done() {
            errors.push(error.to_string());
        }

        let outcome = Outcome::from(request.state());
        let exports = match outcome {
            Outcome::Loaded => request
                .args()
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        };
        tracing::debug!(query, %outcome, "simulation finished");

        Ok(Report {
            query: query.to_string(),
            outcome,
            fetched: self.transport.fetched()[before..].to_vec(),
            exports,
            errors,
            progress: self.progress.borrow().clone(),
        })
    }

    /// Adds a request alias from `NAME=TEXT`.
    pub fn add_alias(&mut self, definition: &str) -> CliResult<()> {
        let (name, text) = split_definition(definition)?;
        self.loader.add_query_shortcuts([(name.clone(), text.clone())]);
        self.config.query_shortcuts.insert(name, text);
        Ok(())
    }

    /// Adds an export alias from `NAME=TEXT`.
    pub fn add_export_alias(&mut self, definition: &str) -> CliResult<()> {
        let (name, text) = split_definition(definition)?;
        self.loader.add_export_shortcuts([(name.clone(), text.clone())]);
        self.config.export_shortcuts.insert(name, text);
        Ok(())
    }

    /// Starts over with a fresh loader. Aliases and failures are kept.
    pub fn reset(&mut self) -> CliResult<()> {
        let failing = std::mem::take(&mut self.failing);
        *self = Session::new(self.config.clone())?;
        for target in &failing {
            self.fail(target)?;
        }
        Ok(())
    }

    /// The loader.
    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// The in-memory transport.
    pub fn transport(&self) -> &MemoryTransport {
        &self.transport
    }

    /// Configuration including aliases added during the session.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

fn split_definition(definition: &str) -> CliResult<(String, String)> {
    let (name, text) = definition
        .split_once('=')
        .ok_or_else(|| CliError::Usage(format!("expected NAME=TEXT, got '{}'", definition)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::Usage("alias name must not be empty".to_string()));
    }
    Ok((name.to_string(), text.trim().to_string()))
}
