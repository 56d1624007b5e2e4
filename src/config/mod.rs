//! Workload configuration and dataset size resolution
//!
//! Size is a count of 32-bit integers:
//!   explicit size  -> must lie in [MIN_SIZE, MAX_SIZE]
//!   no size given  -> DEFAULT_SIZE, or forced to a bound by the size policy

use std::time::Duration;

use thiserror::Error;

/// Shift placing the random bits above the index bits of each key.
pub const SIZE_SHIFT: u32 = 22;

/// Smallest accepted dataset size (1 Ki integers).
pub const MIN_SIZE: u64 = 1024;

/// Largest accepted dataset size (4 Mi integers).
pub const MAX_SIZE: u64 = 1 << SIZE_SHIFT;

/// Dataset size used when none is supplied.
pub const DEFAULT_SIZE: u64 = 64 * 1024;

/// Errors raised while validating configuration, before any allocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Explicit dataset size outside the accepted range.
    #[error("tsearch-size {value} must be in the range {min} to {max}")]
    SizeOutOfRange {
        /// Rejected size
        value: u64,
        /// Lower bound (inclusive)
        min: u64,
        /// Upper bound (inclusive)
        max: u64,
    },

    /// At least one worker instance is required.
    #[error("instance count must be > 0")]
    NoInstances,
}

/// Override applied when no explicit size was supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizePolicy {
    /// Use [`DEFAULT_SIZE`].
    #[default]
    Default,
    /// Force [`MAX_SIZE`].
    Maximize,
    /// Force [`MIN_SIZE`].
    Minimize,
}

impl SizePolicy {
    /// Build a policy from the two harness flags. Minimize is applied last
    /// and therefore wins when both are set.
    pub fn from_flags(maximize: bool, minimize: bool) -> Self {
        if minimize {
            SizePolicy::Minimize
        } else if maximize {
            SizePolicy::Maximize
        } else {
            SizePolicy::Default
        }
    }
}

/// Check an explicit size against the accepted range.
pub fn check_size(value: u64) -> Result<u64, ConfigError> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&value) {
        return Err(ConfigError::SizeOutOfRange {
            value,
            min: MIN_SIZE,
            max: MAX_SIZE,
        });
    }
    Ok(value)
}

/// Resolve the final dataset size.
///
/// An explicit size always takes precedence over the policy; the policy only
/// applies when the option was left unset.
pub fn resolve_size(explicit: Option<u64>, policy: SizePolicy) -> Result<usize, ConfigError> {
    let size = match explicit {
        Some(value) => check_size(value)?,
        None => match policy {
            SizePolicy::Default => DEFAULT_SIZE,
            SizePolicy::Maximize => MAX_SIZE,
            SizePolicy::Minimize => MIN_SIZE,
        },
    };
    Ok(size as usize)
}

/// User-facing configuration for a stress invocation.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Explicit dataset size (count of 32-bit integers)
    pub size: Option<u64>,

    /// Override applied when `size` is unset
    pub size_policy: SizePolicy,

    /// Cross-check find/delete outcomes
    pub verify: bool,

    /// Base seed for the key source (entropy when unset)
    pub seed: Option<u64>,

    /// Stop after this many bogo-ops per instance
    pub max_ops: Option<u64>,

    /// Stop after this much wall-clock time
    pub timeout: Option<Duration>,

    /// Number of independent workers
    pub instances: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            size: None,
            size_policy: SizePolicy::Default,
            verify: false,
            seed: None,
            max_ops: None,
            timeout: None,
            instances: 1,
        }
    }
}

impl StressConfig {
    /// Configuration with an explicit dataset size.
    pub fn with_size(size: u64) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Set the size override policy.
    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.size_policy = policy;
        self
    }

    /// Enable or disable verification.
    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Fix the key source seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stop after `ops` completed cycles.
    pub fn with_max_ops(mut self, ops: u64) -> Self {
        self.max_ops = Some(ops);
        self
    }

    /// Stop after `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run `instances` independent workers.
    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    /// Validate and resolve into the values the engine consumes.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        if self.instances == 0 {
            return Err(ConfigError::NoInstances);
        }
        let size = resolve_size(self.size, self.size_policy)?;
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(ResolvedConfig {
            size,
            verify: self.verify,
            seed,
            max_ops: self.max_ops,
            timeout: self.timeout,
            instances: self.instances,
        })
    }
}

/// Validated configuration handed to the engine and harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Number of 32-bit integers in the dataset
    pub size: usize,
    /// Verification enabled
    pub verify: bool,
    /// Base seed
    pub seed: u64,
    /// Op limit per instance
    pub max_ops: Option<u64>,
    /// Wall-clock limit
    pub timeout: Option<Duration>,
    /// Worker count
    pub instances: usize,
}

impl ResolvedConfig {
    /// Seed for a given worker instance.
    ///
    /// Instance 0 uses the base seed unchanged so that a single-instance run
    /// is reproducible from the seed alone.
    pub fn instance_seed(&self, instance: usize) -> u64 {
        if instance == 0 {
            return self.seed;
        }
        // splitmix64 finaliser over (seed, instance)
        let mut z = self
            .seed
            .wrapping_add((instance as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size() {
        assert_eq!(resolve_size(None, SizePolicy::Default).unwrap(), 65_536);
    }

    #[test]
    fn test_policy_applies_only_without_explicit_size() {
        assert_eq!(resolve_size(None, SizePolicy::Maximize).unwrap(), 4_194_304);
        assert_eq!(resolve_size(None, SizePolicy::Minimize).unwrap(), 1024);
        assert_eq!(resolve_size(Some(2048), SizePolicy::Maximize).unwrap(), 2048);
        assert_eq!(resolve_size(Some(2048), SizePolicy::Minimize).unwrap(), 2048);
    }

    #[test]
    fn test_minimize_wins_over_maximize() {
        assert_eq!(SizePolicy::from_flags(true, true), SizePolicy::Minimize);
        assert_eq!(SizePolicy::from_flags(true, false), SizePolicy::Maximize);
        assert_eq!(SizePolicy::from_flags(false, false), SizePolicy::Default);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            resolve_size(Some(1023), SizePolicy::Default),
            Err(ConfigError::SizeOutOfRange {
                value: 1023,
                min: MIN_SIZE,
                max: MAX_SIZE
            })
        );
        assert!(resolve_size(Some(MAX_SIZE + 1), SizePolicy::Default).is_err());
        assert!(resolve_size(Some(0), SizePolicy::Minimize).is_err());
    }

    #[test]
    fn test_zero_instances_rejected() {
        let config = StressConfig::default().with_instances(0);
        assert_eq!(config.resolve(), Err(ConfigError::NoInstances));
    }

    #[test]
    fn test_instance_seeds_differ() {
        let resolved = StressConfig::with_size(1024).with_seed(7).resolve().unwrap();
        assert_eq!(resolved.instance_seed(0), 7);
        assert_ne!(resolved.instance_seed(1), resolved.instance_seed(2));
        assert_ne!(resolved.instance_seed(1), 7);
    }
}
