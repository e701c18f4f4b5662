//! Bridging GDAL's `CPLError` callback stream into `Result`s.
//!
//! GDAL reports problems by calling the error handler installed for the current thread,
//! and often still returns a plausible value. An [`ErrorContext`] collects what the
//! thread reports for the duration of exactly one native call, then decides from what was
//! collected whether the call failed:
//!
//! ```
//! use gdal_safe::context::{with_context, CallOptions, Diagnostic, Severity};
//!
//! let mut seen = Vec::new();
//! let opts = CallOptions::default().with_handler(move |d: &Diagnostic| seen.push(d.clone()));
//! let value = with_context(opts, |_ctx| {
//!     // native calls go here
//!     42
//! })
//! .unwrap();
//! assert_eq!(value, 42);
//! ```
//!
//! Every diagnostic is forwarded to the [`HandlerChain`] (by default a [`LogHandler`] that
//! logs through `tracing`), and the call fails with [`GdalError::Diagnostic`] when at least
//! one diagnostic reaches the configured [`Severity`] threshold.

use std::cell::RefCell;
use std::ffi::c_char;
use std::marker::PhantomData;

use gdal_sys::{CPLErr, CPLErrorNum, OGRErr};

use crate::config;
use crate::errors::{GdalError, Result};
use crate::utils::_string;

mod diagnostic;
mod handler;
mod options;

pub use diagnostic::{Diagnostic, Severity};
pub use handler::{DiagnosticHandler, HandlerChain, LogHandler};
pub use options::CallOptions;

/// `CPLE_AppDefined`.
const APP_DEFINED: CPLErrorNum = 1;

/// The event list of one open context.
struct Sink {
    id: u64,
    events: *mut Vec<Diagnostic>,
}

thread_local! {
    // Open contexts of this thread, innermost last. While non-empty, `collect_diagnostic`
    // is installed as this thread's error handler.
    static SINKS: RefCell<Vec<Sink>> = const { RefCell::new(Vec::new()) };
}

/// Registers `events` as the innermost sink, installing the handler for the first one.
fn attach(events: *mut Vec<Diagnostic>) -> u64 {
    SINKS.with(|sinks| {
        let mut sinks = sinks.borrow_mut();
        if sinks.is_empty() {
            unsafe {
                gdal_sys::CPLPushErrorHandlerEx(Some(collect_diagnostic), std::ptr::null_mut())
            };
        }
        // ids grow along the stack, so the next one is unique among open contexts
        let id = sinks.last().map_or(0, |sink| sink.id + 1);
        sinks.push(Sink { id, events });
        id
    })
}

/// Removes the sink `id`, wherever it sits, and uninstalls the handler after the last one.
fn detach_sink(id: u64) {
    let _ = SINKS.try_with(|sinks| {
        let mut sinks = sinks.borrow_mut();
        sinks.retain(|sink| sink.id != id);
        if sinks.is_empty() {
            unsafe { gdal_sys::CPLPopErrorHandler() };
        }
    });
}

/// Collects one native call's diagnostics.
///
/// While open, the context is the innermost sink of the calling thread, so it sees
/// exactly the diagnostics emitted by this thread. Contexts may be closed or dropped in
/// any order; the most recently opened context that is still open receives events. It is
/// `!Send`: its sink is registered with this thread only.
pub struct ErrorContext {
    options: CallOptions,
    // Boxed so the address registered as sink stays put when the context moves.
    events: Box<Vec<Diagnostic>>,
    saved_config: Vec<(String, Option<String>)>,
    sink: Option<u64>,
    closed: bool,
    noted_failure: bool,
    _not_send: PhantomData<*mut ()>,
}

impl ErrorContext {
    /// Applies the call's config options to this thread and starts listening.
    pub fn open(options: impl Into<CallOptions>) -> Result<Self> {
        let options = options.into();
        let config_options = options.config_options.clone();
        let mut ctx = ErrorContext {
            options,
            events: Box::default(),
            saved_config: Vec::with_capacity(config_options.len()),
            sink: None,
            closed: false,
            noted_failure: false,
            _not_send: PhantomData,
        };

        // On error `ctx` is dropped, which restores what was already applied.
        for (key, value) in config_options {
            let previous = config::thread_local_config_option(&key)?;
            config::set_thread_local_config_option(&key, &value)?;
            ctx.saved_config.push((key, previous));
        }

        ctx.sink = Some(attach(&mut *ctx.events as *mut Vec<Diagnostic>));
        Ok(ctx)
    }

    /// Diagnostics captured so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Records that the native call signalled failure through its return value.
    ///
    /// When no diagnostic of severity `Error` or above was captured, an `Error` diagnostic
    /// `"<method_name> failed"` is synthesized so the failure cannot go unreported.
    pub fn note_failure(&mut self, method_name: &str) {
        self.noted_failure = true;
        if !self.events.iter().any(|e| e.severity >= Severity::Error) {
            self.events.push(Diagnostic::new(
                Severity::Error,
                APP_DEFINED,
                format!("{method_name} failed"),
            ));
        }
    }

    /// Notes a failure unless `rv` is `OGRERR_NONE`. Returns whether the call succeeded.
    pub fn check_ogr(&mut self, rv: OGRErr::Type, method_name: &str) -> bool {
        let ok = rv == OGRErr::OGRERR_NONE;
        if !ok {
            self.note_failure(method_name);
        }
        ok
    }

    /// Notes a failure when `rv` is `CE_Failure` or worse.
    pub fn check_cpl(&mut self, rv: CPLErr::Type, method_name: &str) -> bool {
        let ok = Severity::from(rv) < Severity::Error;
        if !ok {
            self.note_failure(method_name);
        }
        ok
    }

    /// Stops listening, forwards every captured diagnostic to the handler chain and
    /// reports whether the call failed.
    ///
    /// A context can only be closed once.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(GdalError::InvalidState(
                "error context has already been closed".to_string(),
            ));
        }
        self.detach();
        self.closed = true;

        let events = std::mem::take(&mut *self.events);
        for event in &events {
            self.options.handlers.dispatch(event);
        }

        let threshold = self.options.threshold;
        let mut failing: Vec<&Diagnostic> =
            events.iter().filter(|e| e.severity >= threshold).collect();
        if failing.is_empty() && self.noted_failure {
            failing = events
                .iter()
                .filter(|e| e.severity >= Severity::Error)
                .collect();
        }

        match failing.first() {
            None => Ok(()),
            Some(first) => {
                let severity = failing
                    .iter()
                    .map(|e| e.severity)
                    .max()
                    .unwrap_or(first.severity);
                let message = failing
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                tracing::debug!(?severity, code = first.code, "native call failed");
                Err(GdalError::Diagnostic {
                    severity,
                    code: first.code,
                    message,
                })
            }
        }
    }

    /// Unregisters the sink and restores config options, in reverse order of application.
    fn detach(&mut self) {
        if let Some(id) = self.sink.take() {
            detach_sink(id);
            unsafe { gdal_sys::CPLErrorReset() };
        }
        while let Some((key, previous)) = self.saved_config.pop() {
            let restored = match previous {
                Some(value) => config::set_thread_local_config_option(&key, &value),
                None => config::clear_thread_local_config_option(&key),
            };
            if let Err(e) = restored {
                tracing::warn!("could not restore config option {key}: {e}");
            }
        }
    }
}

impl Drop for ErrorContext {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Runs `call` inside a freshly opened [`ErrorContext`] and closes it afterwards.
///
/// The closure's value is returned only when the context closes cleanly; otherwise it is
/// dropped, releasing any native resource it owns.
pub fn with_context<T>(
    options: impl Into<CallOptions>,
    call: impl FnOnce(&mut ErrorContext) -> T,
) -> Result<T> {
    let mut ctx = ErrorContext::open(options)?;
    let value = call(&mut ctx);
    ctx.close()?;
    Ok(value)
}

/// The thread's error handler while any context is open; feeds the innermost sink.
unsafe extern "C" fn collect_diagnostic(
    error_type: CPLErr::Type,
    error_num: CPLErrorNum,
    error_msg: *const c_char,
) {
    let diagnostic = Diagnostic::new(Severity::from(error_type), error_num, _string(error_msg));
    let _ = SINKS.try_with(|sinks| {
        if let Ok(sinks) = sinks.try_borrow() {
            if let Some(sink) = sinks.last() {
                // a sink is removed before its context frees the event list
                (*sink.events).push(diagnostic);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::ffi::CString;
    use std::rc::Rc;

    use super::*;

    fn emit(severity: Severity, code: CPLErrorNum, msg: &str) {
        let msg = CString::new(msg).unwrap();
        unsafe { gdal_sys::CPLError(severity.into(), code, msg.as_ptr()) };
    }

    fn recording() -> (CallOptions, Rc<RefCell<Vec<Diagnostic>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let opts = CallOptions::default()
            .without_default_handler()
            .with_handler(move |d: &Diagnostic| sink.borrow_mut().push(d.clone()));
        (opts, seen)
    }

    #[test]
    fn warning_does_not_fail() {
        let (opts, seen) = recording();
        let res = with_context(opts, |_| emit(Severity::Warning, 6, "just a warning"));
        assert!(res.is_ok());
        assert_eq!(
            *seen.borrow(),
            vec![Diagnostic::new(Severity::Warning, 6, "just a warning")]
        );
    }

    #[test]
    fn error_fails_and_is_seen_once() {
        let (opts, seen) = recording();
        let res = with_context(opts, |_| {
            emit(Severity::Warning, 6, "first");
            emit(Severity::Error, 4, "second");
        });
        match res {
            Err(GdalError::Diagnostic {
                severity,
                code,
                message,
            }) => {
                assert_eq!(severity, Severity::Error);
                assert_eq!(code, 4);
                assert_eq!(message, "second");
            }
            other => panic!("unexpected {other:?}"),
        }
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].message, "first");
        assert_eq!(seen[1].message, "second");
    }

    #[test]
    fn threshold_decides_failure() {
        let (opts, _) = recording();
        let res = with_context(opts.with_threshold(Severity::Warning), |_| {
            emit(Severity::Warning, 6, "w1");
            emit(Severity::Warning, 7, "w2");
        });
        match res {
            Err(GdalError::Diagnostic { code, message, .. }) => {
                assert_eq!(code, 6);
                assert_eq!(message, "w1\nw2");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn second_close_is_invalid() {
        let mut ctx = ErrorContext::open(()).unwrap();
        assert!(ctx.close().is_ok());
        assert!(ctx.is_closed());
        assert!(matches!(ctx.close(), Err(GdalError::InvalidState(_))));
    }

    #[test]
    fn note_failure_synthesizes_an_error() {
        let (opts, seen) = recording();
        let res = with_context(opts, |ctx| ctx.note_failure("OGR_G_Buffer"));
        match res {
            Err(GdalError::Diagnostic { code, message, .. }) => {
                assert_eq!(code, APP_DEFINED);
                assert_eq!(message, "OGR_G_Buffer failed");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn note_failure_keeps_captured_error() {
        let (opts, seen) = recording();
        let res = with_context(opts, |ctx| {
            emit(Severity::Error, 3, "native message");
            ctx.note_failure("GDALClose");
        });
        assert!(matches!(res, Err(GdalError::Diagnostic { code: 3, .. })));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn note_failure_fails_below_a_fatal_threshold() {
        let (opts, _) = recording();
        let res = with_context(opts.with_threshold(Severity::Fatal), |ctx| {
            ctx.note_failure("OGR_L_CreateFeature")
        });
        assert!(res.is_err());
    }

    #[test]
    fn config_options_are_scoped_to_the_call() {
        let opts = CallOptions::default().with_config_option("GDAL_SAFE_SCOPED", "YES");
        let inside = with_context(opts, |_| {
            config::get_config_option("GDAL_SAFE_SCOPED", "NO").unwrap()
        })
        .unwrap();
        assert_eq!(inside, "YES");
        assert_eq!(
            config::get_config_option("GDAL_SAFE_SCOPED", "NO").unwrap(),
            "NO"
        );
    }

    #[test]
    fn config_options_restore_previous_value() {
        config::set_thread_local_config_option("GDAL_SAFE_RESTORE", "before").unwrap();
        let opts = CallOptions::default().with_config_option("GDAL_SAFE_RESTORE", "during");
        with_context(opts, |_| ()).unwrap();
        assert_eq!(
            config::thread_local_config_option("GDAL_SAFE_RESTORE").unwrap(),
            Some("before".to_string())
        );
        config::clear_thread_local_config_option("GDAL_SAFE_RESTORE").unwrap();
    }

    #[test]
    fn nested_contexts_capture_their_own_events() {
        let (outer_opts, outer_seen) = recording();
        let (inner_opts, inner_seen) = recording();
        let res = with_context(outer_opts, |_| {
            emit(Severity::Warning, 1, "outer");
            let inner = with_context(inner_opts, |_| emit(Severity::Error, 2, "inner"));
            assert!(inner.is_err());
        });
        assert!(res.is_ok());
        assert_eq!(outer_seen.borrow().len(), 1);
        assert_eq!(inner_seen.borrow()[0].message, "inner");
    }

    #[test]
    fn threads_are_isolated() {
        let (opts, seen) = recording();
        let res = with_context(opts, |_| {
            let other = std::thread::spawn(|| {
                with_context(CallOptions::default().without_default_handler(), |_| {
                    emit(Severity::Error, 5, "from another thread")
                })
                .is_err()
            })
            .join()
            .unwrap();
            assert!(other);
        });
        assert!(res.is_ok());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn dropping_an_open_context_detaches() {
        {
            let _ctx = ErrorContext::open(
                CallOptions::default().with_config_option("GDAL_SAFE_DROPPED", "YES"),
            )
            .unwrap();
        }
        assert_eq!(
            config::thread_local_config_option("GDAL_SAFE_DROPPED").unwrap(),
            None
        );
        let (opts, seen) = recording();
        with_context(opts, |_| emit(Severity::Warning, 1, "after drop")).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn outer_context_dropped_first() {
        let (inner_opts, inner_seen) = recording();
        let outer = ErrorContext::open(CallOptions::default().without_default_handler()).unwrap();
        let mut inner = ErrorContext::open(inner_opts).unwrap();
        drop(outer);

        emit(Severity::Error, 3, "while inner is open");
        assert_eq!(inner.diagnostics().len(), 1);
        assert!(inner.close().is_err());
        assert_eq!(inner_seen.borrow()[0].message, "while inner is open");

        let (opts, seen) = recording();
        with_context(opts, |_| emit(Severity::Warning, 1, "afterwards")).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn inner_context_closed_inside_outer() {
        let (outer_opts, outer_seen) = recording();
        let mut outer = ErrorContext::open(outer_opts).unwrap();
        let mut inner = ErrorContext::open(CallOptions::default().without_default_handler())
            .unwrap();
        inner.close().unwrap();

        emit(Severity::Error, 4, "back to outer");
        assert!(outer.close().is_err());
        assert_eq!(outer_seen.borrow().len(), 1);
        assert!(inner.diagnostics().is_empty());
    }
}
