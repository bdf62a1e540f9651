//! Sampling configuration.

use crate::error::{Error, Result};

/// Configuration for how much of a file is sampled during analysis.
///
/// All configuration is passed explicitly per call; there is no process-wide
/// state. The effective sample size for a file is
/// `clamp(file_size * percentage_sample_size, min_sample_size, max_sample_size)`,
/// further clamped to the file size itself.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Floor on total sampled bytes. Files at or below this size are read
    /// whole (default: 1 MiB).
    pub min_sample_size: u64,
    /// Fraction of the file size used as the sampling target, in (0, 1]
    /// (default: 0.10).
    pub percentage_sample_size: f64,
    /// Optional hard ceiling on total sampled bytes; `None` means unbounded.
    pub max_sample_size: Option<u64>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            min_sample_size: 1024 * 1024,
            percentage_sample_size: 0.10,
            max_sample_size: None,
        }
    }
}

impl SampleConfig {
    /// Check parameter ranges. Called before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.min_sample_size == 0 {
            return Err(Error::Config("min_sample_size must be at least 1".into()));
        }
        if !(self.percentage_sample_size > 0.0 && self.percentage_sample_size <= 1.0) {
            return Err(Error::Config(format!(
                "percentage_sample_size must be in (0, 1], got {}",
                self.percentage_sample_size
            )));
        }
        if let Some(max) = self.max_sample_size {
            if max < self.min_sample_size {
                return Err(Error::Config(format!(
                    "max_sample_size ({}) is below min_sample_size ({})",
                    max, self.min_sample_size
                )));
            }
        }
        Ok(())
    }

    /// Effective number of bytes to sample from a file of `file_size` bytes.
    pub fn effective_sample_size(&self, file_size: u64) -> u64 {
        let target = (file_size as f64 * self.percentage_sample_size) as u64;
        let ceiling = self.max_sample_size.unwrap_or(file_size);
        target
            .max(self.min_sample_size)
            .min(ceiling)
            .min(file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SampleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_min() {
        let config = SampleConfig {
            min_sample_size: 0,
            ..SampleConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_percentage_out_of_range() {
        for pct in [0.0, -0.5, 1.5] {
            let config = SampleConfig {
                percentage_sample_size: pct,
                ..SampleConfig::default()
            };
            assert!(config.validate().is_err(), "percentage {} accepted", pct);
        }
    }

    #[test]
    fn test_rejects_max_below_min() {
        let config = SampleConfig {
            min_sample_size: 4096,
            max_sample_size: Some(1024),
            ..SampleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_small_file_sampled_whole() {
        let config = SampleConfig::default();
        assert_eq!(config.effective_sample_size(512), 512);
    }

    #[test]
    fn test_percentage_with_floor_and_ceiling() {
        let config = SampleConfig {
            min_sample_size: 1024,
            percentage_sample_size: 0.10,
            max_sample_size: Some(4096),
        };
        // 10% of 100 KiB is 10240, capped at 4096.
        assert_eq!(config.effective_sample_size(100 * 1024), 4096);
        // 10% of 2000 is 200, floored to 1024.
        assert_eq!(config.effective_sample_size(2000), 1024);
    }
}
