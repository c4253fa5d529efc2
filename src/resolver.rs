//! Effective-environment resolution.
//!
//! A resolution walks a job's workflow depth-first (workflow variables, then
//! phases `pre`, `test`, `post`, each step in declared order, recursing into
//! chains) and merges every declaration into a fresh [`Ledger`]. Job-level
//! overrides are merged last at [`Priority::Config`].
//!
//! All mutable state lives in a [`ResolveContext`] created per call, so one
//! [`Resolver`] can serve any number of resolutions, including concurrent ones
//! over a shared registry.

use crate::error::{EnvError, EnvResult};
use crate::job::JobConfig;
use crate::ledger::Ledger;
use crate::registry::{ComponentBody, Registry, StepRef};
use crate::types::{ComponentKind, Phase, Priority};
use std::collections::HashSet;
use tracing::{debug, info, trace, warn};

/// Per-resolution state: the ledger being built and the visited-set.
#[derive(Debug, Default)]
pub struct ResolveContext {
    ledger: Ledger,
    visited: HashSet<(ComponentKind, String)>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn is_visited(&self, kind: ComponentKind, name: &str) -> bool {
        self.visited.contains(&(kind, name.to_string()))
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Mark a component visited. Returns false if it already was.
    fn visit(&mut self, kind: ComponentKind, name: &str) -> bool {
        self.visited.insert((kind, name.to_string()))
    }
}

/// Result of a successful job resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub job_name: String,
    pub workflow: String,
    /// Source id of the job config (its file name).
    pub config_source: String,
    pub ledger: Ledger,
    /// Number of distinct components visited, found or not.
    pub components_visited: usize,
}

/// Resolves job environments against a registry.
pub struct Resolver<'r, R: Registry + ?Sized> {
    registry: &'r R,
}

impl<'r, R: Registry + ?Sized> Resolver<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self { registry }
    }

    /// Resolve the effective environment of `job_name` in `config`.
    ///
    /// Fails with `NoWorkflow` when the job is unknown or declares no
    /// workflow; no ledger is built in that case.
    pub fn resolve(&self, config: &JobConfig, job_name: &str) -> EnvResult<Resolution> {
        let Some(workflow) = config.workflow_name(job_name) else {
            warn!(job = job_name, config = config.source_id(), "Job has no workflow");
            return Err(EnvError::no_workflow(job_name, config.source_id()));
        };

        let mut ctx = ResolveContext::new();
        self.resolve_component(&mut ctx, workflow, ComponentKind::Workflow, Priority::Workflow)?;

        for entry in config.inline_env(job_name) {
            ctx.ledger.merge(
                &entry.name,
                &entry.value,
                Priority::Config,
                config.source_id(),
                false,
            );
        }

        let components_visited = ctx.visited_count();
        let ledger = ctx.into_ledger();
        info!(
            job = job_name,
            workflow,
            variables = ledger.len(),
            overridden = ledger.overridden_count(),
            components = components_visited,
            "Resolved job environment"
        );

        Ok(Resolution {
            job_name: job_name.to_string(),
            workflow: workflow.to_string(),
            config_source: config.source_id().to_string(),
            ledger,
            components_visited,
        })
    }

    /// Merge one component and everything reachable from it into `ctx`.
    ///
    /// Components already visited in `ctx` and components absent from the
    /// registry are skipped without error.
    pub fn resolve_component(
        &self,
        ctx: &mut ResolveContext,
        name: &str,
        kind: ComponentKind,
        priority: Priority,
    ) -> EnvResult<()> {
        if !ctx.visit(kind, name) {
            trace!(kind = %kind, name, "Component already visited");
            return Ok(());
        }

        let Some(component) = self.registry.locate(kind, name)? else {
            debug!(kind = %kind, name, "Component not found in registry, skipping");
            return Ok(());
        };
        debug!(kind = %kind, name, priority = %priority, "Resolving component");

        let is_default = kind == ComponentKind::Ref;
        for entry in component.own_variables() {
            ctx.ledger.merge(
                &entry.name,
                &entry.value,
                priority,
                &component.source_id,
                is_default,
            );
        }

        match &component.body {
            ComponentBody::Workflow(phases) => {
                for phase in Phase::ALL {
                    self.resolve_steps(ctx, phases.steps(phase))?;
                }
            }
            ComponentBody::Chain(steps) => self.resolve_steps(ctx, steps)?,
            ComponentBody::Ref => {}
        }
        Ok(())
    }

    fn resolve_steps(&self, ctx: &mut ResolveContext, steps: &[StepRef]) -> EnvResult<()> {
        for step in steps {
            match self.registry.classify(&step.name) {
                Some(kind) => self.resolve_component(ctx, &step.name, kind, kind.priority())?,
                None => debug!(
                    step = %step.name,
                    alias = %step.alias,
                    "Step is neither a chain nor a ref, skipping"
                ),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Component, MemoryRegistry};

    fn scenario_registry() -> MemoryRegistry {
        MemoryRegistry::new()
            .with(Component::step("a").with_env("X", "default1"))
            .with(Component::chain("c").with_env("Y", "chainval").with_step("a"))
            .with(
                Component::workflow("w")
                    .with_env("X", "workflowval")
                    .with_phase_step(Phase::Test, "c"),
            )
    }

    #[test]
    fn test_resolve_component_walks_workflow() {
        let registry = scenario_registry();
        let resolver = Resolver::new(&registry);
        let mut ctx = ResolveContext::new();
        resolver
            .resolve_component(&mut ctx, "w", ComponentKind::Workflow, Priority::Workflow)
            .unwrap();

        let x = ctx.ledger().get("X").unwrap();
        assert_eq!(x.value, "workflowval");
        assert_eq!(x.source_priority, Priority::Workflow);
        assert_eq!(x.source_id, "w-workflow.yaml");
        assert_eq!(x.default_value.as_deref(), Some("default1"));

        let y = ctx.ledger().get("Y").unwrap();
        assert_eq!(y.value, "chainval");
        assert_eq!(y.source_priority, Priority::Chain);
        assert_eq!(y.default_value, None);

        assert!(ctx.is_visited(ComponentKind::Workflow, "w"));
        assert!(ctx.is_visited(ComponentKind::Chain, "c"));
        assert!(ctx.is_visited(ComponentKind::Ref, "a"));
        assert_eq!(ctx.visited_count(), 3);
    }

    #[test]
    fn test_revisit_is_noop() {
        let registry = scenario_registry();
        let resolver = Resolver::new(&registry);
        let mut ctx = ResolveContext::new();
        resolver
            .resolve_component(&mut ctx, "a", ComponentKind::Ref, Priority::Step)
            .unwrap();
        let before = ctx.ledger().clone();
        resolver
            .resolve_component(&mut ctx, "a", ComponentKind::Ref, Priority::Config)
            .unwrap();
        assert_eq!(ctx.ledger(), &before);
    }

    #[test]
    fn test_missing_component_is_marked_visited() {
        let registry = MemoryRegistry::new();
        let resolver = Resolver::new(&registry);
        let mut ctx = ResolveContext::new();
        resolver
            .resolve_component(&mut ctx, "ghost", ComponentKind::Chain, Priority::Chain)
            .unwrap();
        assert!(ctx.ledger().is_empty());
        assert!(ctx.is_visited(ComponentKind::Chain, "ghost"));
    }

    #[test]
    fn test_step_kind_is_probed_not_declared() {
        // The workflow lists `shared` as a ref, but a chain of that name exists.
        let mut registry = MemoryRegistry::new()
            .with(Component::chain("shared").with_env("V", "from-chain"))
            .with(Component::step("shared").with_env("V", "from-ref"));
        registry
            .insert_yaml(
                ComponentKind::Workflow,
                "w",
                "workflow:\n  steps:\n    test:\n    - ref: shared\n",
            )
            .unwrap();

        let resolver = Resolver::new(&registry);
        let mut ctx = ResolveContext::new();
        resolver
            .resolve_component(&mut ctx, "w", ComponentKind::Workflow, Priority::Workflow)
            .unwrap();

        let v = ctx.ledger().get("V").unwrap();
        assert_eq!(v.value, "from-chain");
        assert_eq!(v.source_priority, Priority::Chain);
        assert_eq!(v.default_value, None);
        assert!(!ctx.is_visited(ComponentKind::Ref, "shared"));
    }

    #[test]
    fn test_dyn_registry() {
        let registry = scenario_registry();
        let dyn_registry: &dyn Registry = &registry;
        let resolver = Resolver::new(dyn_registry);
        let config = JobConfig::from_yaml_str(
            "tests:\n- as: job\n  steps:\n    workflow: w\n",
            "cfg.yaml",
        )
        .unwrap();
        let resolution = resolver.resolve(&config, "job").unwrap();
        assert_eq!(resolution.workflow, "w");
        assert_eq!(resolution.ledger.len(), 2);
        assert_eq!(resolution.components_visited, 3);
    }
}
