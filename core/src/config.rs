use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

// ── Detection thresholds ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Transfers with `amount >= high_amount_threshold` are suspicious.
    pub high_amount_threshold: f64,
    pub high_amount_points: u32,
    /// Transfers with `amount < smurfing_amount_ceiling` count as small.
    pub smurfing_amount_ceiling: f64,
    /// An account is smurfing when its small-transfer count is strictly above this.
    pub smurfing_min_count: usize,
    pub smurfing_points: u32,
    /// Cycle length window, in edges, inclusive on both ends.
    pub cycle_min_len: usize,
    pub cycle_max_len: usize,
    pub cycle_points: u32,
    pub critical_cutoff: u32,
    pub warning_cutoff: u32,
    pub parallel_cycle_search: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: 10_000.0,
            high_amount_points: 20,
            smurfing_amount_ceiling: 3_000.0,
            smurfing_min_count: 5,
            smurfing_points: 30,
            cycle_min_len: 3,
            cycle_max_len: 5,
            cycle_points: 50,
            critical_cutoff: 50,
            warning_cutoff: 20,
            parallel_cycle_search: true,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> GraphResult<()> {
        if !self.high_amount_threshold.is_finite() || !self.smurfing_amount_ceiling.is_finite() {
            return Err(GraphError::InvalidConfig("amount thresholds must be finite".into()));
        }
        if self.cycle_min_len < 2 {
            return Err(GraphError::InvalidConfig(format!(
                "cycle_min_len must be >= 2, got {}",
                self.cycle_min_len
            )));
        }
        if self.cycle_min_len > self.cycle_max_len {
            return Err(GraphError::InvalidConfig(format!(
                "cycle window is empty: {}..={}",
                self.cycle_min_len, self.cycle_max_len
            )));
        }
        if self.warning_cutoff > self.critical_cutoff {
            return Err(GraphError::InvalidConfig(format!(
                "warning_cutoff {} exceeds critical_cutoff {}",
                self.warning_cutoff, self.critical_cutoff
            )));
        }
        Ok(())
    }
}

// ── Ingestion ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { chunk_size: 1000 }
    }
}

// ── Subgraph extraction ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgraphConfig {
    pub min_hops: usize,
    pub max_hops: usize,
    pub max_paths: usize,
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            min_hops: 1,
            max_hops: 2,
            max_paths: 50,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub ingest: IngestConfig,
    pub subgraph: SubgraphConfig,
}

impl AppConfig {
    /// Load from `<data_dir>/config.json`.
    /// In tests, use AppConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GraphResult<()> {
        self.detection.validate()?;
        if self.ingest.chunk_size == 0 {
            return Err(GraphError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.subgraph.min_hops == 0 || self.subgraph.min_hops > self.subgraph.max_hops {
            return Err(GraphError::InvalidConfig(format!(
                "subgraph hop window is invalid: {}..={}",
                self.subgraph.min_hops, self.subgraph.max_hops
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "detection": { "high_amount_threshold": 5000.0 } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.detection.high_amount_threshold, 5000.0);
        assert_eq!(config.detection.cycle_max_len, 5);
        assert_eq!(config.ingest.chunk_size, 1000);
        assert_eq!(config.subgraph.max_paths, 50);
    }

    #[test]
    fn empty_cycle_window_rejected() {
        let mut config = AppConfig::default();
        config.detection.cycle_min_len = 6;
        assert!(matches!(config.validate(), Err(GraphError::InvalidConfig(_))));
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut config = AppConfig::default();
        config.ingest.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
