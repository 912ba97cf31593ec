//! Parser trace hooks.
//!
//! The parser reports entry and exit of every grammar rule to a [`Tracer`].
//! The default [`NoopTracer`] does nothing and is compiled away; [`LogTracer`]
//! forwards the events to `tracing` at `trace` level, indented by nesting depth.

pub trait Tracer {
    /// Called before a grammar rule starts consuming tokens.
    fn enter(&mut self, _rule: &'static str, _depth: usize) {}

    /// Called after the rule has returned.
    fn exit(&mut self, _rule: &'static str, _depth: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn enter(&mut self, rule: &'static str, depth: usize) {
        tracing::trace!(target: "monkey::parser", "{}BEGIN {}", "  ".repeat(depth), rule);
    }

    fn exit(&mut self, rule: &'static str, depth: usize) {
        tracing::trace!(target: "monkey::parser", "{}END {}", "  ".repeat(depth), rule);
    }
}

/// Records every event; used by tests to observe the parse.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingTracer {
    pub events: Vec<(bool, &'static str, usize)>,
}

#[cfg(test)]
impl Tracer for RecordingTracer {
    fn enter(&mut self, rule: &'static str, depth: usize) {
        self.events.push((true, rule, depth));
    }

    fn exit(&mut self, rule: &'static str, depth: usize) {
        self.events.push((false, rule, depth));
    }
}
