use rustc_hash::FxHashSet;

/// Configuration for which validators run and how results are presented.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Record the reporting validator on every diagnostic
    pub debug_mode: bool,
    /// Checked-mode rules report errors; otherwise they degrade to warnings
    pub checked_mode: bool,
    disabled: FxHashSet<String>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a validator by name
    pub fn disable(&mut self, name: impl Into<String>) {
        self.disabled.insert(name.into());
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.contains(name)
    }

    pub fn with_debug_mode(mut self) -> Self {
        self.debug_mode = true;
        self
    }

    pub fn unchecked(mut self) -> Self {
        self.checked_mode = false;
        self
    }

    pub fn without(mut self, name: impl Into<String>) -> Self {
        self.disable(name);
        self
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            checked_mode: true,
            disabled: FxHashSet::default(),
        }
    }
}
