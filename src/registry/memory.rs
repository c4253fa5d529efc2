//! In-memory registry for embedders and tests.

use super::{Component, Registry, parse_component};
use crate::error::EnvResult;
use crate::types::ComponentKind;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    components: HashMap<ComponentKind, HashMap<String, Component>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, replacing any previous one of the same kind and name.
    pub fn insert(&mut self, component: Component) {
        self.components
            .entry(component.kind())
            .or_default()
            .insert(component.name.clone(), component);
    }

    /// Builder-style [`MemoryRegistry::insert`].
    pub fn with(mut self, component: Component) -> Self {
        self.insert(component);
        self
    }

    /// Parse registry YAML text and add the resulting component.
    pub fn insert_yaml(&mut self, kind: ComponentKind, name: &str, content: &str) -> EnvResult<()> {
        let component = parse_component(kind, name, content)?;
        self.insert(component);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Registry for MemoryRegistry {
    fn locate(&self, kind: ComponentKind, name: &str) -> EnvResult<Option<Component>> {
        Ok(self
            .components
            .get(&kind)
            .and_then(|by_name| by_name.get(name))
            .cloned())
    }

    fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        self.components
            .get(&kind)
            .is_some_and(|by_name| by_name.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_locate() {
        let registry = MemoryRegistry::new()
            .with(Component::chain("c").with_env("Y", "chainval"))
            .with(Component::step("a").with_env("X", "default1"));

        assert_eq!(registry.len(), 2);
        let chain = registry.locate(ComponentKind::Chain, "c").unwrap().unwrap();
        assert_eq!(chain.own_variables()[0].value, "chainval");
        assert!(registry.locate(ComponentKind::Ref, "c").unwrap().is_none());
    }

    #[test]
    fn test_insert_yaml() {
        let mut registry = MemoryRegistry::new();
        registry
            .insert_yaml(
                ComponentKind::Ref,
                "a",
                "ref:\n  env:\n  - name: X\n    default: d\n",
            )
            .unwrap();
        assert!(registry.contains(ComponentKind::Ref, "a"));
        assert_eq!(registry.classify("a"), Some(ComponentKind::Ref));
    }
}
