/// Default bound on nested interpreted calls before `Stack overflow.` is raised.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 255;

/// Interpreter tuning knobs. The CLI fills this from flags / environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of user-function calls active at once.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
