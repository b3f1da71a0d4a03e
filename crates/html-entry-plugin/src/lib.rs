//! Emit-phase build hook that renders an HTML entry point for each asset.
//!
//! For every asset in a build, the first matching [`TemplateRule`] picks a
//! template. The template's `{{asset}}` placeholder is replaced with the
//! asset name, and the result is registered in the build's assets under the
//! configured output directory.

pub mod assets;
pub mod emit;
pub mod error;
pub mod host;
pub mod observer;
pub mod render;
pub mod rules;

pub use assets::{output_key, AssetCollection, OutputKey, AssetRegistrar, OutputEntry, RawSource};
pub use emit::{EmitCoordinator, HtmlEntryPlugin, PluginOptions};
pub use error::EmitError;
pub use host::{
    emit_handler, BuildHost, Compilation, Compiler, DoneReceiver, DoneSignal, EmitFuture,
    EmitHandler,
};
pub use observer::{EmitObserver, TracingObserver};
pub use render::{TemplateRenderer, PLACEHOLDER};
pub use rules::{resolve, TemplateRule};
