//! The build host's side of the emit hook.
//!
//! A host exposes a [`Compiler`] that plugins register emit handlers on.
//! Each build the host hands every handler a [`Compilation`] and a
//! single-use [`DoneSignal`], and waits for the signal before writing output.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::assets::AssetCollection;
use crate::error::EmitError;

/// Future returned by an emit handler.
pub type EmitFuture = Pin<Box<dyn Future<Output = Result<(), EmitError>> + Send>>;

/// Callback invoked once per build at emit time.
pub type EmitHandler = Box<dyn Fn(Compilation, DoneSignal) -> EmitFuture + Send + Sync>;

/// Wrap an async closure as an [`EmitHandler`].
pub fn emit_handler<F, Fut>(handler: F) -> EmitHandler
where
    F: Fn(Compilation, DoneSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EmitError>> + Send + 'static,
{
    Box::new(
        move |compilation: Compilation, done: DoneSignal| -> EmitFuture {
            Box::pin(handler(compilation, done))
        },
    )
}

/// Build state for a single build.
#[derive(Debug, Clone)]
pub struct Compilation {
    context: PathBuf,
    assets: AssetCollection,
    file_dependencies: Arc<Mutex<Vec<PathBuf>>>,
}

impl Compilation {
    pub fn new(context: impl Into<PathBuf>) -> Self {
        Self {
            context: context.into(),
            assets: AssetCollection::new(),
            file_dependencies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Base directory of the build.
    pub fn context(&self) -> &Path {
        &self.context
    }

    pub fn assets(&self) -> &AssetCollection {
        &self.assets
    }

    /// Watch `path` for changes that invalidate this build.
    pub async fn add_file_dependency(&self, path: impl Into<PathBuf>) {
        self.file_dependencies.lock().await.push(path.into());
    }

    /// Registered file dependencies, in registration order.
    pub async fn file_dependencies(&self) -> Vec<PathBuf> {
        self.file_dependencies.lock().await.clone()
    }
}

/// Single-use token a handler consumes to release the build.
#[derive(Debug)]
pub struct DoneSignal {
    sender: oneshot::Sender<()>,
}

/// The host's end of a [`DoneSignal`].
#[derive(Debug)]
pub struct DoneReceiver {
    receiver: oneshot::Receiver<()>,
}

impl DoneSignal {
    pub fn channel() -> (Self, DoneReceiver) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, DoneReceiver { receiver })
    }

    /// Signal that the handler has finished.
    pub fn done(self) {
        // The host may have stopped waiting.
        let _ = self.sender.send(());
    }
}

impl DoneReceiver {
    /// Wait for the signal. Fails if the signal was dropped unsent.
    pub async fn wait(self) -> Result<(), EmitError> {
        self.receiver.await.map_err(|_| EmitError::Abandoned)
    }
}

/// Hook registration point offered to plugins.
pub trait Compiler {
    /// Register a handler to run at emit time.
    fn on_emit(&mut self, handler: EmitHandler);
}

/// An in-process host that runs emit handlers in registration order.
pub struct BuildHost {
    context: PathBuf,
    handlers: Vec<EmitHandler>,
}

impl BuildHost {
    pub fn new(context: impl Into<PathBuf>) -> Self {
        Self {
            context: context.into(),
            handlers: Vec::new(),
        }
    }

    /// Fresh build state rooted at this host's context.
    pub fn compilation(&self) -> Compilation {
        Compilation::new(self.context.clone())
    }

    /// Run the emit phase for `compilation`.
    ///
    /// Returns once every handler has signalled done, or with the first
    /// handler error.
    pub async fn emit(&self, compilation: &Compilation) -> Result<(), EmitError> {
        for handler in &self.handlers {
            let (signal, receiver) = DoneSignal::channel();
            handler(compilation.clone(), signal).await?;
            receiver.wait().await?;
        }
        Ok(())
    }
}

impl Compiler for BuildHost {
    fn on_emit(&mut self, handler: EmitHandler) {
        self.handlers.push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn emit_waits_for_done() {
        let mut host = BuildHost::new("/project");
        host.on_emit(emit_handler(|compilation, done| async move {
            compilation.add_file_dependency("/project/a.html").await;
            done.done();
            Ok(())
        }));

        let compilation = host.compilation();
        assert_ok!(host.emit(&compilation).await);
        assert_eq!(
            compilation.file_dependencies().await,
            vec![PathBuf::from("/project/a.html")]
        );
    }

    #[tokio::test]
    async fn handler_that_never_signals_is_abandoned() {
        let mut host = BuildHost::new("/project");
        host.on_emit(emit_handler(|_, _done| async { Ok(()) }));

        let err = assert_err!(host.emit(&host.compilation()).await);
        assert!(matches!(err, EmitError::Abandoned));
    }

    #[tokio::test]
    async fn handler_error_stops_later_handlers() {
        let mut host = BuildHost::new("/project");
        host.on_emit(emit_handler(|_, _| async {
            Err(EmitError::NoTemplateMatch {
                asset: "main.js".into(),
            })
        }));
        host.on_emit(emit_handler(|compilation, done| async move {
            compilation.add_file_dependency("unreachable").await;
            done.done();
            Ok(())
        }));

        let compilation = host.compilation();
        assert_err!(host.emit(&compilation).await);
        assert!(compilation.file_dependencies().await.is_empty());
    }
}
