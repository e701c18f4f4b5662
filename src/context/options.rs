use super::{DiagnosticHandler, HandlerChain, Severity};

/// Per-call configuration routed into an [`ErrorContext`](super::ErrorContext).
///
/// Every fallible native operation accepts `impl Into<CallOptions>`; pass `()` for the
/// defaults (log diagnostics through `tracing`, fail on [`Severity::Error`]).
///
/// ```
/// use gdal_safe::context::{CallOptions, Diagnostic, Severity};
///
/// let opts = CallOptions::default()
///     .with_handler(|d: &Diagnostic| eprintln!("gdal said: {d}"))
///     .with_threshold(Severity::Warning)
///     .with_config_option("CPL_DEBUG", "ON");
/// assert_eq!(opts.threshold, Severity::Warning);
/// ```
#[derive(Debug)]
pub struct CallOptions {
    /// Handlers that observe the call's diagnostics.
    pub handlers: HandlerChain,
    /// Minimum severity that makes the call fail.
    pub threshold: Severity,
    /// `KEY=VALUE` config options applied to the calling thread for the duration of the call.
    pub config_options: Vec<(String, String)>,
    /// Output driver short name, for operations that create datasets.
    pub driver: Option<String>,
    /// Dataset creation options (`KEY=VALUE`), for operations that create datasets or
    /// export options for serializers.
    pub creation_options: Vec<String>,
}

impl Default for CallOptions {
    fn default() -> Self {
        CallOptions {
            handlers: HandlerChain::default(),
            threshold: Severity::Error,
            config_options: Vec::new(),
            driver: None,
            creation_options: Vec::new(),
        }
    }
}

impl CallOptions {
    /// Appends `handler` to the chain, after the default log handler.
    pub fn with_handler<H: DiagnosticHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Drops every handler registered so far, including the default log handler.
    pub fn without_default_handler(mut self) -> Self {
        self.handlers = HandlerChain::empty();
        self
    }

    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_config_option(mut self, key: &str, value: &str) -> Self {
        self.config_options.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_driver(mut self, driver: &str) -> Self {
        self.driver = Some(driver.to_string());
        self
    }

    pub fn with_creation_option(mut self, option: &str) -> Self {
        self.creation_options.push(option.to_string());
        self
    }
}

/// Shorthand for the default options: `geometry.buffer(1.0, 8, ())`.
impl From<()> for CallOptions {
    fn from(_: ()) -> Self {
        CallOptions::default()
    }
}
