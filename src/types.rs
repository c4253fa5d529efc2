//! Core types shared by the registry, ledger and resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Override precedence tier of a variable declaration.
///
/// Lower numeric value means higher precedence, so the derived ordering
/// reads as "`a < b` means `a` wins over `b`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Job-level `steps.env` override.
    Config = 1,
    /// Workflow `steps.env`.
    Workflow = 2,
    /// Chain `env` declaration.
    Chain = 3,
    /// Ref (leaf step) default.
    Step = 4,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Config => "config",
            Priority::Workflow => "workflow",
            Priority::Chain => "chain",
            Priority::Step => "step",
        }
    }

    /// Numeric tier value (1 = highest precedence).
    pub fn value(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a step-registry component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Workflow,
    Chain,
    Ref,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Workflow => "workflow",
            ComponentKind::Chain => "chain",
            ComponentKind::Ref => "ref",
        }
    }

    /// File name suffix used by the step registry, e.g. `-chain.yaml`.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ComponentKind::Workflow => "-workflow.yaml",
            ComponentKind::Chain => "-chain.yaml",
            ComponentKind::Ref => "-ref.yaml",
        }
    }

    /// Registry file name for a component of this kind.
    pub fn file_name(&self, name: &str) -> String {
        format!("{}{}", name, self.file_suffix())
    }

    /// Tier at which variables declared directly on this kind are merged.
    pub fn priority(&self) -> Priority {
        match self {
            ComponentKind::Workflow => Priority::Workflow,
            ComponentKind::Chain => Priority::Chain,
            ComponentKind::Ref => Priority::Step,
        }
    }

    /// Split a registry file name into `(name, kind)`.
    pub fn parse_file_name(file_name: &str) -> Option<(&str, ComponentKind)> {
        [
            ComponentKind::Workflow,
            ComponentKind::Chain,
            ComponentKind::Ref,
        ]
        .into_iter()
        .find_map(|kind| {
            file_name
                .strip_suffix(kind.file_suffix())
                .filter(|name| !name.is_empty())
                .map(|name| (name, kind))
        })
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow phase. Phases run in declaration order of [`Phase::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pre,
    Test,
    Post,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Pre, Phase::Test, Phase::Post];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Test => "test",
            Phase::Post => "post",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Config < Priority::Workflow);
        assert!(Priority::Workflow < Priority::Chain);
        assert!(Priority::Chain < Priority::Step);
        assert_eq!(Priority::Config.value(), 1);
        assert_eq!(Priority::Step.value(), 4);
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Priority::Workflow).unwrap(),
            "\"workflow\""
        );
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            ComponentKind::parse_file_name("ipi-aws-workflow.yaml"),
            Some(("ipi-aws", ComponentKind::Workflow))
        );
        assert_eq!(
            ComponentKind::parse_file_name("ipi-install-chain.yaml"),
            Some(("ipi-install", ComponentKind::Chain))
        );
        assert_eq!(
            ComponentKind::parse_file_name("ipi-conf-ref.yaml"),
            Some(("ipi-conf", ComponentKind::Ref))
        );
        assert_eq!(ComponentKind::parse_file_name("ipi-conf-commands.sh"), None);
        assert_eq!(ComponentKind::parse_file_name("-ref.yaml"), None);
        assert_eq!(ComponentKind::parse_file_name("OWNERS"), None);
    }

    #[test]
    fn test_file_name_roundtrip() {
        let file = ComponentKind::Chain.file_name("upgrade");
        assert_eq!(file, "upgrade-chain.yaml");
        assert_eq!(
            ComponentKind::parse_file_name(&file),
            Some(("upgrade", ComponentKind::Chain))
        );
    }
}
