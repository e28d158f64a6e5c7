//! Plain-text progress side channel.
//!
//! The pipeline reports what it is doing through an [`OutputSink`] supplied
//! by the caller. Messages are free text with no further structure.

/// Receives progress messages from the packaging pipeline.
///
/// # Examples
///
/// ```
/// use arcpack_core::OutputSink;
///
/// struct Stderr;
///
/// impl OutputSink for Stderr {
///     fn write_output(&mut self, text: &str) {
///         eprint!("{text}");
///     }
/// }
/// ```
pub trait OutputSink {
    /// Called with one message.
    fn write_output(&mut self, text: &str);
}

/// Sink that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write_output(&mut self, _text: &str) {}
}

/// Collects messages in order, mostly useful in tests.
impl OutputSink for Vec<String> {
    fn write_output(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_output(&mut self, text: &str) {
        (**self).write_output(text);
    }
}
