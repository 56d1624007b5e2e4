//! Stressor descriptor and help entries

use std::fmt;

/// Resource classes a stressor exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressorClass {
    /// CPU data/instruction caches
    CpuCache,
    /// CPU compute
    Cpu,
    /// Memory allocator and memory bandwidth
    Memory,
}

impl fmt::Display for StressorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StressorClass::CpuCache => "cpu-cache",
            StressorClass::Cpu => "cpu",
            StressorClass::Memory => "memory",
        })
    }
}

/// Whether a stressor can verify its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// No verification support
    None,
    /// Verification available on request
    Optional,
    /// Always verifies
    Always,
}

/// One line of option help.
#[derive(Debug, Clone, Copy)]
pub struct HelpEntry {
    /// Short option, if any
    pub short: Option<&'static str>,
    /// Long option with its argument
    pub long: &'static str,
    /// Description
    pub description: &'static str,
}

/// Static description of a stressor.
#[derive(Debug)]
pub struct StressorInfo {
    /// Stressor name
    pub name: &'static str,
    /// Resource classes exercised
    pub classes: &'static [StressorClass],
    /// Verification support
    pub verify: VerifyMode,
    /// Option help
    pub help: &'static [HelpEntry],
}

impl StressorInfo {
    /// Render the help table.
    pub fn render_help(&self) -> String {
        let width = self.help.iter().map(|e| e.long.len()).max().unwrap_or(0);
        let mut out = String::new();
        for entry in self.help {
            let short = entry.short.map(|s| format!("-{s},")).unwrap_or_default();
            out.push_str(&format!(
                "{:<4} --{:<width$}  {}\n",
                short,
                entry.long,
                entry.description,
                width = width
            ));
        }
        out
    }

    /// Render name, classes and verification support.
    pub fn describe(&self) -> String {
        let classes: Vec<String> = self.classes.iter().map(|c| c.to_string()).collect();
        format!(
            "{}\n  classes: {}\n  verify: {:?}\n\n{}",
            self.name,
            classes.join(", "),
            self.verify,
            self.render_help()
        )
    }
}

/// The tree-search stressor.
pub static STRESSOR: StressorInfo = StressorInfo {
    name: "tsearch",
    classes: &[
        StressorClass::CpuCache,
        StressorClass::Cpu,
        StressorClass::Memory,
    ],
    verify: VerifyMode::Optional,
    help: &[
        HelpEntry {
            short: None,
            long: "tsearch N",
            description: "start N workers that exercise a tree search",
        },
        HelpEntry {
            short: None,
            long: "tsearch-ops N",
            description: "stop after N tree search bogo operations",
        },
        HelpEntry {
            short: None,
            long: "tsearch-size N",
            description: "number of 32 bit integers to tsearch",
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_option() {
        let help = STRESSOR.render_help();
        assert_eq!(help.lines().count(), 3);
        assert!(help.contains("--tsearch-size N"));
        assert!(help.contains("number of 32 bit integers to tsearch"));
    }

    #[test]
    fn test_describe() {
        let text = STRESSOR.describe();
        assert!(text.starts_with("tsearch\n"));
        assert!(text.contains("cpu-cache, cpu, memory"));
        assert!(text.contains("Optional"));
    }
}
