#[derive(Clone, Copy, Debug)]
pub struct RegistryOptions {
    /// If true, privileged writes are logged with their value instead of a
    /// redacted length. Only meant for local debugging.
    pub log_values: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self { log_values: false }
    }
}
