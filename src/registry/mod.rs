//! Step registry access.
//!
//! A registry maps `(kind, name)` to a parsed [`Component`]. Lookups that find
//! nothing return `Ok(None)`: dangling references are skipped by the resolver,
//! never treated as failures.
//!
//! Two implementations are provided:
//! - [`FsRegistry`] indexes a ci-operator `step-registry/` directory tree
//! - [`MemoryRegistry`] holds components built in code

mod document;
pub mod fs;
pub mod memory;

pub(crate) use document::from_yaml;
pub use document::{parse_component, scalar_text};
pub use fs::FsRegistry;
pub use memory::MemoryRegistry;

use crate::error::EnvResult;
use crate::types::{ComponentKind, Phase};

/// A declared variable: name and literal value (a default, for refs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub name: String,
    pub value: String,
}

impl EnvEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Reference from a workflow or chain to another component.
///
/// Only the name is used for resolution; whether it is a chain or a ref is
/// decided by probing the registry (see [`Registry::classify`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRef {
    pub name: String,
    /// The `as` alias, defaulting to the name.
    pub alias: String,
}

impl StepRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

/// Ordered step lists of a workflow, one per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowPhases {
    pub pre: Vec<StepRef>,
    pub test: Vec<StepRef>,
    pub post: Vec<StepRef>,
}

impl WorkflowPhases {
    pub fn steps(&self, phase: Phase) -> &[StepRef] {
        match phase {
            Phase::Pre => &self.pre,
            Phase::Test => &self.test,
            Phase::Post => &self.post,
        }
    }

    fn steps_mut(&mut self, phase: Phase) -> &mut Vec<StepRef> {
        match phase {
            Phase::Pre => &mut self.pre,
            Phase::Test => &mut self.test,
            Phase::Post => &mut self.post,
        }
    }
}

/// Kind-specific part of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentBody {
    Workflow(WorkflowPhases),
    Chain(Vec<StepRef>),
    Ref,
}

/// A named, read-only unit of the step registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    /// Provenance identifier, the registry file name (e.g. `foo-chain.yaml`).
    pub source_id: String,
    pub env: Vec<EnvEntry>,
    pub body: ComponentBody,
}

impl Component {
    fn empty(name: &str, body: ComponentBody) -> Self {
        let mut component = Self {
            name: name.to_string(),
            source_id: String::new(),
            env: Vec::new(),
            body,
        };
        component.source_id = component.kind().file_name(name);
        component
    }

    pub fn workflow(name: &str) -> Self {
        Self::empty(name, ComponentBody::Workflow(WorkflowPhases::default()))
    }

    pub fn chain(name: &str) -> Self {
        Self::empty(name, ComponentBody::Chain(Vec::new()))
    }

    /// A leaf step (`ref`).
    pub fn step(name: &str) -> Self {
        Self::empty(name, ComponentBody::Ref)
    }

    pub fn kind(&self) -> ComponentKind {
        match self.body {
            ComponentBody::Workflow(_) => ComponentKind::Workflow,
            ComponentBody::Chain(_) => ComponentKind::Chain,
            ComponentBody::Ref => ComponentKind::Ref,
        }
    }

    /// Variables declared directly on this component, in declaration order.
    pub fn own_variables(&self) -> &[EnvEntry] {
        &self.env
    }

    /// Declare a variable. A repeated name keeps its position and takes the new value.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_env(name.into(), value.into());
        self
    }

    /// Append a step to a chain. No effect on other kinds.
    pub fn with_step(mut self, name: impl Into<String>) -> Self {
        if let ComponentBody::Chain(ref mut steps) = self.body {
            steps.push(StepRef::new(name));
        }
        self
    }

    /// Append a step to one phase of a workflow. No effect on other kinds.
    pub fn with_phase_step(mut self, phase: Phase, name: impl Into<String>) -> Self {
        if let ComponentBody::Workflow(ref mut phases) = self.body {
            phases.steps_mut(phase).push(StepRef::new(name));
        }
        self
    }

    pub(crate) fn push_env(&mut self, name: String, value: String) {
        match self.env.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.value = value,
            None => self.env.push(EnvEntry { name, value }),
        }
    }
}

/// Read-only lookup of step-registry components.
pub trait Registry {
    /// Load the component of `kind` named `name`, or `None` if absent.
    fn locate(&self, kind: ComponentKind, name: &str) -> EnvResult<Option<Component>>;

    /// Whether a component of `kind` named `name` exists, without loading it.
    fn contains(&self, kind: ComponentKind, name: &str) -> bool;

    /// Decide what a step reference points at: a chain if one exists under
    /// that name, else a ref, else nothing.
    fn classify(&self, name: &str) -> Option<ComponentKind> {
        [ComponentKind::Chain, ComponentKind::Ref]
            .into_iter()
            .find(|kind| self.contains(*kind, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_kind_and_source() {
        let w = Component::workflow("ipi-aws");
        assert_eq!(w.kind(), ComponentKind::Workflow);
        assert_eq!(w.source_id, "ipi-aws-workflow.yaml");

        let c = Component::chain("ipi-install");
        assert_eq!(c.kind(), ComponentKind::Chain);
        assert_eq!(c.source_id, "ipi-install-chain.yaml");

        let r = Component::step("ipi-conf");
        assert_eq!(r.kind(), ComponentKind::Ref);
        assert_eq!(r.source_id, "ipi-conf-ref.yaml");
    }

    #[test]
    fn test_repeated_env_keeps_position_takes_last_value() {
        let c = Component::step("a")
            .with_env("X", "1")
            .with_env("Y", "2")
            .with_env("X", "3");
        assert_eq!(
            c.own_variables(),
            &[EnvEntry::new("X", "3"), EnvEntry::new("Y", "2")]
        );
    }

    #[test]
    fn test_step_builders_respect_kind() {
        let w = Component::workflow("w")
            .with_phase_step(Phase::Pre, "setup")
            .with_phase_step(Phase::Test, "e2e")
            .with_step("ignored");
        let ComponentBody::Workflow(phases) = &w.body else {
            panic!("expected workflow body");
        };
        assert_eq!(phases.steps(Phase::Pre), &[StepRef::new("setup")]);
        assert_eq!(phases.steps(Phase::Test), &[StepRef::new("e2e")]);
        assert!(phases.steps(Phase::Post).is_empty());

        let c = Component::chain("c")
            .with_step("a")
            .with_phase_step(Phase::Pre, "ignored");
        assert_eq!(c.body, ComponentBody::Chain(vec![StepRef::new("a")]));
    }
}
