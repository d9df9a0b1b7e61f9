use serde::{Deserialize, Serialize};
use tracing::info;

/// Optional signal parameter file (TOML).
///
/// Example `config/signal.toml`:
/// ```toml
/// [crossover]
/// fast = 20
/// slow = 60
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignalFileConfig {
    #[serde(default)]
    pub crossover: CrossoverParams,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CrossoverParams {
    #[serde(default = "default_fast")]
    pub fast: usize,
    #[serde(default = "default_slow")]
    pub slow: usize,
}

fn default_fast() -> usize {
    20
}

fn default_slow() -> usize {
    60
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            slow: default_slow(),
        }
    }
}

impl SignalFileConfig {
    /// Load from a TOML file. A missing file yields the defaults; a file
    /// that exists but does not parse is a startup error.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).unwrap_or_else(|e| {
                    panic!("Failed to parse signal config at '{path}': {e}")
                });
                info!(path, fast = cfg.crossover.fast, slow = cfg.crossover.slow, "Signal config loaded");
                cfg
            }
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = SignalFileConfig::load("/nonexistent/signal.toml");
        assert_eq!(cfg.crossover.fast, 20);
        assert_eq!(cfg.crossover.slow, 60);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg: SignalFileConfig = toml::from_str("[crossover]\nfast = 10\n").unwrap();
        assert_eq!(cfg.crossover.fast, 10);
        assert_eq!(cfg.crossover.slow, 60);
    }
}
