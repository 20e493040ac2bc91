//! An opaque correlation token threaded through recording calls.

/// An opaque token correlating recordings with an ambient operation.
///
/// Every recording call accepts a `Context` and passes it through to the
/// aggregation layer without interpreting it. The engine itself attaches no
/// meaning to the token; richer processors can use it to tie measurements to
/// the operation that produced them.
#[derive(Clone, Debug, Default)]
pub struct Context {
    _private: (),
}

impl Context {
    /// Create a new context token.
    pub fn new() -> Self {
        Context::default()
    }
}
