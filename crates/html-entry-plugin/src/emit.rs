//! The emit-phase plugin and the coordinator that drives each cycle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::assets::{output_key, AssetRegistrar};
use crate::error::EmitError;
use crate::host::{emit_handler, Compilation, Compiler};
use crate::observer::{EmitObserver, TracingObserver};
use crate::render::TemplateRenderer;
use crate::rules::{resolve, TemplateRule};

/// Plugin configuration.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Ordered rules; the first match wins
    pub templates: Vec<TemplateRule>,

    /// Directory prefix for emitted HTML entries
    pub output: PathBuf,
}

/// Work for one asset in one cycle.
#[derive(Debug)]
struct RenderJob {
    asset: String,
    template: PathBuf,
    file_name: String,
    output_path: String,
}

/// Runs one resolve, render and register job per asset.
pub struct EmitCoordinator {
    options: Arc<PluginOptions>,
    observer: Arc<dyn EmitObserver>,
}

impl EmitCoordinator {
    pub fn new(options: Arc<PluginOptions>, observer: Arc<dyn EmitObserver>) -> Self {
        Self { options, observer }
    }

    /// Run a single emit cycle over the assets currently in `compilation`.
    ///
    /// Jobs run concurrently. On the first failure the error is returned
    /// immediately; jobs already dispatched are detached and keep running.
    /// Returns the number of jobs that completed.
    pub async fn run(&self, compilation: &Compilation) -> Result<usize, EmitError> {
        self.observer.on_start();

        let assets = compilation.assets().keys().await;
        let mut jobs = JoinSet::new();

        for asset in assets {
            let job = match self.plan(asset) {
                Ok(job) => job,
                Err(err) => {
                    jobs.detach_all();
                    return Err(err);
                }
            };

            let template_path = compilation.context().join(&job.template);
            tracing::debug!(
                "Adding file dependency {} for {}",
                template_path.display(),
                job.asset
            );
            compilation.add_file_dependency(template_path.clone()).await;

            let compilation = compilation.clone();
            let observer = Arc::clone(&self.observer);
            jobs.spawn(async move {
                let html = TemplateRenderer::render(&template_path, &job.asset).await?;
                AssetRegistrar::register(compilation.assets(), job.output_path, html).await;
                observer.on_built(&job.file_name);
                Ok::<_, EmitError>(())
            });
        }

        let mut completed = 0;
        while let Some(joined) = jobs.join_next().await {
            let outcome = joined
                .map_err(EmitError::from)
                .and_then(|result| result);

            if let Err(err) = outcome {
                jobs.detach_all();
                return Err(err);
            }
            completed += 1;
        }

        self.observer.on_done();
        Ok(completed)
    }

    /// Resolve the template for `asset` and compute its output path.
    fn plan(&self, asset: String) -> Result<RenderJob, EmitError> {
        let template = resolve(&self.options.templates, &asset)?;
        let key = output_key(&self.options.output, template)?;

        Ok(RenderJob {
            asset,
            template: template.to_path_buf(),
            file_name: key.file_name,
            output_path: key.path,
        })
    }
}

/// Emits one HTML entry point per compiled asset.
pub struct HtmlEntryPlugin {
    options: PluginOptions,
    observer: Arc<dyn EmitObserver>,
}

impl HtmlEntryPlugin {
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default `tracing` progress reporter.
    pub fn with_observer(mut self, observer: Arc<dyn EmitObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register the plugin's emit handler with `compiler`.
    pub fn apply<C: Compiler + ?Sized>(self, compiler: &mut C) {
        let coordinator = Arc::new(EmitCoordinator::new(
            Arc::new(self.options),
            self.observer,
        ));

        compiler.on_emit(emit_handler(move |compilation, done| {
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator.run(&compilation).await?;
                done.done();
                Ok(())
            }
        }));
    }
}
