// src/recording/probe.rs
//! Host resource probe
//!
//! Thin wrapper around `sysinfo` producing utilization percentages for the
//! sampling loop. CPU usage is computed against the previous refresh, so
//! the first sample after construction reads near zero.

use sysinfo::System;

/// One host utilization sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// Aggregate CPU utilization across all cores, 0-100
    pub cpu_percent: f64,

    /// Physical memory in use, 0-100
    pub mem_percent: f64,
}

/// Host CPU/memory probe
pub struct SystemProbe {
    system: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }

    /// Take a fresh utilization sample
    pub fn sample(&mut self) -> ResourceSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let cpu_percent = (self.system.global_cpu_info().cpu_usage() as f64).clamp(0.0, 100.0);

        let total = self.system.total_memory();
        let mem_percent = if total == 0 {
            0.0
        } else {
            self.system.used_memory() as f64 / total as f64 * 100.0
        };

        ResourceSample {
            cpu_percent,
            mem_percent,
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_in_range() {
        let mut probe = SystemProbe::new();
        let sample = probe.sample();

        assert!(sample.cpu_percent >= 0.0);
        assert!(sample.cpu_percent <= 100.0);
        assert!(sample.mem_percent >= 0.0);
        assert!(sample.mem_percent <= 100.0);
    }

    #[test]
    fn test_repeated_samples() {
        let mut probe = SystemProbe::new();
        for _ in 0..3 {
            let sample = probe.sample();
            assert!(sample.mem_percent.is_finite());
            assert!(sample.cpu_percent.is_finite());
        }
    }
}
