/// Parse bounds for one command line.
///
/// The bounds model a deliberately small shell: short lines, few segments,
/// few arguments. Exceeding any of them is a reported error, never silent
/// truncation.
pub struct Limits {
    pub max_line_len: usize,
    pub max_segments: usize,
    pub max_args: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_len: 256,
            max_segments: 8,
            max_args: 8,
        }
    }
}

impl Limits {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut limits = Self::default();
        limits.apply_env_overrides();
        limits
    }

    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_limit("PIPESHELL_MAX_LINE_LEN") {
            self.max_line_len = n;
        }
        if let Some(n) = env_limit("PIPESHELL_MAX_SEGMENTS") {
            self.max_segments = n;
        }
        if let Some(n) = env_limit("PIPESHELL_MAX_ARGS") {
            self.max_args = n;
        }
    }
}

/// Read a limit override from the environment. Unparsable or zero values are
/// ignored so a bad environment can never disable the bounds.
fn env_limit(var: &str) -> Option<usize> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
}
