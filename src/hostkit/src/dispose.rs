use std::error::Error;

use snafu::prelude::*;

use crate::util::display::AggregatedDisplayer;

/// The boxed error type surfaced by fallible hooks implemented outside this
/// crate, such as [`Dispose::dispose`] or a window's draw call.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A type that owns resources which must be released explicitly.
///
/// A service is only released by a [`ServiceRegistry`] if it was registered
/// as disposable and the registry owns its disposal. Since services are shared
/// through [`Arc`]s, releasing is done through a shared reference, and an
/// implementation should rely on interior mutability to record its state.
///
/// [`ServiceRegistry`]: crate::service::ServiceRegistry
/// [`Arc`]: std::sync::Arc
pub trait Dispose: Send + Sync + 'static {
    /// Releases the resources held by `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if some resource could not be released. The caller
    /// keeps releasing other objects regardless.
    fn dispose(&self) -> Result<(), BoxError>;
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DisposeError {
    #[snafu(display("could not release {target}"))]
    #[non_exhaustive]
    Release {
        target: &'static str,
        source: BoxError,
    },
    #[snafu(display("aggregated disposal errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<DisposeError> },
}

impl DisposeError {
    /// Returns all failures this error stands for, one per released object.
    pub fn failures(&self) -> Vec<&DisposeError> {
        match self {
            Self::Aggregated { errors } => errors.iter().flat_map(Self::failures).collect(),
            other => vec![other],
        }
    }
}

/// Collects the outcome of releasing a sequence of objects, so that teardown
/// goes on after a failure and reports everything at the end.
#[derive(Debug, Default)]
pub(crate) struct DisposeErrors {
    errors: Vec<DisposeError>,
}

impl DisposeErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn record(&mut self, target: &'static str, result: Result<(), BoxError>) {
        if let Err(source) = result {
            log::debug!("failed to release {target}: {source}");
            self.errors.push(DisposeError::Release { target, source });
        }
    }

    pub fn record_nested(&mut self, result: Result<(), DisposeError>) {
        match result {
            Ok(()) => {}
            Err(DisposeError::Aggregated { errors }) => self.errors.extend(errors),
            Err(err) => self.errors.push(err),
        }
    }

    pub fn finish(mut self) -> Result<(), DisposeError> {
        if self.errors.len() > 1 {
            Err(DisposeError::Aggregated {
                errors: self.errors,
            })
        } else {
            self.errors.pop().map_or(Ok(()), Err)
        }
    }
}
