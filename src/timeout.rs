//! Timeout classes and policy tables
//!
//! Each tracked state maps to a named timeout class (`other-first`,
//! `other-multiple`, `other-bidir`). The duration behind each class comes from
//! an operator-supplied policy, optionally overridden per zone. Tables are
//! built once from configuration and shared read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ConfigError;

/// Largest accepted timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = u32::MAX as u64;

/// Named timeout class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeoutClass {
    /// Only packets in the original direction, exactly one seen
    OtherFirst,
    /// Several packets in the original direction, no reply
    OtherMultiple,
    /// Traffic seen in both directions
    OtherBidir,
}

impl TimeoutClass {
    /// Number of timeout classes.
    pub const COUNT: usize = 3;

    /// All classes, in table order.
    pub const ALL: [Self; Self::COUNT] = [Self::OtherFirst, Self::OtherMultiple, Self::OtherBidir];

    /// Operator-facing name of the class.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OtherFirst => "other-first",
            Self::OtherMultiple => "other-multiple",
            Self::OtherBidir => "other-bidir",
        }
    }

    /// Built-in default, in seconds.
    #[must_use]
    pub const fn default_secs(self) -> u64 {
        match self {
            Self::OtherFirst => 60,
            Self::OtherMultiple => 60,
            Self::OtherBidir => 30,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimeoutClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeoutClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.name() == s)
            .ok_or_else(|| ConfigError::validation(format!("Unknown timeout class: {s}")))
    }
}

/// Durations for every timeout class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    timeouts: [Duration; TimeoutClass::COUNT],
}

impl TimeoutPolicy {
    /// Policy with the built-in defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeouts: [
                Duration::from_secs(TimeoutClass::OtherFirst.default_secs()),
                Duration::from_secs(TimeoutClass::OtherMultiple.default_secs()),
                Duration::from_secs(TimeoutClass::OtherBidir.default_secs()),
            ],
        }
    }

    /// Build a policy from per-class seconds, falling back to `base` for
    /// classes that are not listed.
    #[must_use]
    pub fn from_secs(secs: &BTreeMap<TimeoutClass, u64>, base: &Self) -> Self {
        let mut policy = *base;
        for (&class, &value) in secs {
            policy.timeouts[class.index()] = Duration::from_secs(value);
        }
        policy
    }

    /// Replace the duration of a single class.
    #[must_use]
    pub fn with(mut self, class: TimeoutClass, timeout: Duration) -> Self {
        self.timeouts[class.index()] = timeout;
        self
    }

    /// Duration for a class.
    #[must_use]
    pub const fn get(&self, class: TimeoutClass) -> Duration {
        self.timeouts[class.index()]
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Global timeout policy plus per-zone overrides.
#[derive(Debug, Clone, Default)]
pub struct TimeoutPolicyTable {
    default: TimeoutPolicy,
    zones: HashMap<u16, TimeoutPolicy>,
}

impl TimeoutPolicyTable {
    /// Create a table with no zone overrides.
    #[must_use]
    pub fn new(default: TimeoutPolicy) -> Self {
        Self {
            default,
            zones: HashMap::new(),
        }
    }

    /// Attach a policy to a zone.
    #[must_use]
    pub fn with_zone(mut self, zone: u16, policy: TimeoutPolicy) -> Self {
        self.zones.insert(zone, policy);
        self
    }

    /// Build the table from a validated configuration.
    ///
    /// Zone entries only override the classes they name; the remaining
    /// classes inherit from the global policy.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let default = TimeoutPolicy::from_secs(&config.timeouts, &TimeoutPolicy::new());
        let zones = config
            .zones
            .iter()
            .map(|zone| (zone.zone, TimeoutPolicy::from_secs(&zone.timeouts, &default)))
            .collect();

        Self { default, zones }
    }

    /// Policy in effect for a zone.
    #[must_use]
    pub fn policy(&self, zone: u16) -> &TimeoutPolicy {
        self.zones.get(&zone).unwrap_or(&self.default)
    }

    /// Look up the duration of a class in a zone.
    #[must_use]
    pub fn lookup(&self, zone: u16, class: TimeoutClass) -> Duration {
        self.policy(zone).get(class)
    }

    /// Number of zones with their own policy.
    #[must_use]
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}
