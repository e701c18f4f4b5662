use std::fmt::{Debug, Formatter};

use super::{Diagnostic, Severity};

/// A sink for diagnostics drained from an [`ErrorContext`](super::ErrorContext).
///
/// Handlers observe diagnostics; they do not decide whether the call failed. Any
/// `FnMut(&Diagnostic)` closure is a handler.
pub trait DiagnosticHandler {
    fn handle(&mut self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticHandler for F
where
    F: FnMut(&Diagnostic),
{
    fn handle(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogHandler;

impl DiagnosticHandler for LogHandler {
    fn handle(&mut self, diagnostic: &Diagnostic) {
        let code = diagnostic.code;
        let message = diagnostic.message.as_str();
        match diagnostic.severity {
            Severity::None | Severity::Debug => tracing::debug!(code, "{message}"),
            Severity::Warning => tracing::warn!(code, "{message}"),
            Severity::Error | Severity::Fatal => tracing::error!(code, "{message}"),
        }
    }
}

/// Ordered list of handlers; each diagnostic visits every handler in insertion order.
///
/// The default chain holds a single [`LogHandler`].
pub struct HandlerChain {
    handlers: Vec<Box<dyn DiagnosticHandler>>,
}

impl HandlerChain {
    /// A chain without any handler, not even logging.
    pub fn empty() -> Self {
        HandlerChain {
            handlers: Vec::new(),
        }
    }

    pub fn push<H: DiagnosticHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn dispatch(&mut self, diagnostic: &Diagnostic) {
        for handler in self.handlers.iter_mut() {
            handler.handle(diagnostic);
        }
    }
}

impl Default for HandlerChain {
    fn default() -> Self {
        let mut chain = HandlerChain::empty();
        chain.push(LogHandler);
        chain
    }
}

impl Debug for HandlerChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}
