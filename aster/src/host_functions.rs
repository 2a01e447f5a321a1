//! Functions provided by the C environment.

/// Functions declared by the headers every generated file includes. Programs may call them
/// without declaring them.
pub const DEFAULT_HOST_FUNCTIONS: &[&str] = &["printf", "puts", "putchar"];

/// Returns the default host functions that should be used.
pub fn default_host_functions() -> Vec<String> {
    DEFAULT_HOST_FUNCTIONS
        .iter()
        .map(|name| name.to_string())
        .collect()
}
