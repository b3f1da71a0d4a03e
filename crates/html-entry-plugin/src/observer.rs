//! Progress events raised during an emit cycle.

/// Receives progress events from an emit cycle.
pub trait EmitObserver: Send + Sync {
    /// The cycle has started.
    fn on_start(&self);

    /// A template was rendered and registered.
    fn on_built(&self, file_name: &str);

    /// Every job finished successfully.
    fn on_done(&self);
}

/// Label that prefixes every progress line.
pub const LABEL: &str = "HTML";

fn progress_line(message: &str) -> String {
    format!("{LABEL} {message}")
}

/// Reports progress through `tracing`.
///
/// The label is part of the message so it survives subscribers that hide
/// targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EmitObserver for TracingObserver {
    fn on_start(&self) {
        tracing::info!(target: "html", "{}", progress_line("Start"));
    }

    fn on_built(&self, file_name: &str) {
        tracing::info!(target: "html", "{}", progress_line(&format!("Built: {file_name}")));
    }

    fn on_done(&self) {
        tracing::info!(target: "html", "{}", progress_line("Done"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_lines_carry_the_label() {
        assert_eq!(progress_line("Start"), "HTML Start");
        assert_eq!(progress_line("Built: main.tmpl"), "HTML Built: main.tmpl");
        assert_eq!(progress_line("Done"), "HTML Done");
    }
}
