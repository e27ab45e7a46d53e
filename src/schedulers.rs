//! Where pipeline stages run.
//!
//! A [`SchedulerProvider`] hands out runtime handles for three kinds of work.
//! [`SubscribeOnExt`] moves a future onto one of them, or runs it on a
//! worker handle and delivers the output on the UI handle.

use std::future::Future;

use tokio::runtime::Handle;

use crate::error::{Error, Result};

/// Supplies the runtimes pipeline stages are moved onto.
pub trait SchedulerProvider: Send + Sync {
    /// Handle for CPU-bound work.
    fn computation(&self) -> Handle;

    /// Handle for blocking or I/O-bound work.
    fn io(&self) -> Handle;

    /// Handle for work that must run on the caller's runtime.
    fn ui(&self) -> Handle;
}

/// Three caller-supplied handles.
#[derive(Debug, Clone)]
pub struct DefaultSchedulerProvider {
    computation: Handle,
    io: Handle,
    ui: Handle,
}

impl DefaultSchedulerProvider {
    /// Create a provider from one handle per kind of work.
    pub fn new(computation: Handle, io: Handle, ui: Handle) -> Self {
        Self {
            computation,
            io,
            ui,
        }
    }
}

impl SchedulerProvider for DefaultSchedulerProvider {
    fn computation(&self) -> Handle {
        self.computation.clone()
    }

    fn io(&self) -> Handle {
        self.io.clone()
    }

    fn ui(&self) -> Handle {
        self.ui.clone()
    }
}

/// Runs everything on the runtime of the caller.
///
/// # Panics
///
/// Every method panics when called outside of a tokio runtime, like
/// [`Handle::current`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentSchedulerProvider;

impl SchedulerProvider for CurrentSchedulerProvider {
    fn computation(&self) -> Handle {
        Handle::current()
    }

    fn io(&self) -> Handle {
        Handle::current()
    }

    fn ui(&self) -> Handle {
        Handle::current()
    }
}

/// One handle for all work, typically the test runtime.
#[derive(Debug, Clone)]
pub struct TestSchedulerProvider {
    handle: Handle,
}

impl TestSchedulerProvider {
    /// Use `handle` for every kind of work.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl SchedulerProvider for TestSchedulerProvider {
    fn computation(&self) -> Handle {
        self.handle.clone()
    }

    fn io(&self) -> Handle {
        self.handle.clone()
    }

    fn ui(&self) -> Handle {
        self.handle.clone()
    }
}

/// Run a future on a chosen runtime.
///
/// Nothing is spawned until the returned future is polled. A task that
/// panics or is cancelled surfaces as [`Error::Cancelled`].
///
/// # Example
///
/// ```rust
/// use tideline::schedulers::{CurrentSchedulerProvider, SubscribeOnExt};
///
/// # #[tokio::main]
/// # async fn main() {
/// let value = async { 6 * 7 }
///     .subscribe_on_io(&CurrentSchedulerProvider)
///     .await;
///
/// assert_eq!(value.unwrap(), 42);
/// # }
/// ```
pub trait SubscribeOnExt: Future + Send + Sized + 'static
where
    Self::Output: Send + 'static,
{
    /// Run on `handle`.
    fn subscribe_on(self, handle: &Handle) -> impl Future<Output = Result<Self::Output>> + Send {
        spawn_on(handle.clone(), self)
    }

    /// Run on the provider's I/O handle.
    fn subscribe_on_io<P>(self, provider: &P) -> impl Future<Output = Result<Self::Output>> + Send
    where
        P: SchedulerProvider + ?Sized,
    {
        spawn_on(provider.io(), self)
    }

    /// Run on the provider's computation handle.
    fn subscribe_on_computation<P>(
        self,
        provider: &P,
    ) -> impl Future<Output = Result<Self::Output>> + Send
    where
        P: SchedulerProvider + ?Sized,
    {
        spawn_on(provider.computation(), self)
    }

    /// Run on the provider's UI handle.
    fn subscribe_on_ui<P>(self, provider: &P) -> impl Future<Output = Result<Self::Output>> + Send
    where
        P: SchedulerProvider + ?Sized,
    {
        spawn_on(provider.ui(), self)
    }

    /// Run on the provider's I/O handle and deliver the output on its UI
    /// handle.
    fn apply_io_work_schedulers<P>(
        self,
        provider: &P,
    ) -> impl Future<Output = Result<Self::Output>> + Send
    where
        P: SchedulerProvider + ?Sized,
    {
        work_then_deliver(provider.io(), provider.ui(), self)
    }

    /// Run on the provider's computation handle and deliver the output on its
    /// UI handle.
    fn apply_cpu_work_schedulers<P>(
        self,
        provider: &P,
    ) -> impl Future<Output = Result<Self::Output>> + Send
    where
        P: SchedulerProvider + ?Sized,
    {
        work_then_deliver(provider.computation(), provider.ui(), self)
    }
}

impl<F> SubscribeOnExt for F
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
}

async fn spawn_on<F>(handle: Handle, future: F) -> Result<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    handle.spawn(future).await.map_err(|_join_error| {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %_join_error, "scheduled task did not complete");
        Error::Cancelled
    })
}

// The join on `work` is awaited by a task on `deliver`.
async fn work_then_deliver<F>(work: Handle, deliver: Handle, future: F) -> Result<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    spawn_on(deliver, spawn_on(work, future)).await?
}
