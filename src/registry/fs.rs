//! File-backed registry over a ci-operator `step-registry/` tree.
//!
//! The tree is indexed once on [`FsRegistry::open`]; documents are read and
//! parsed on each [`Registry::locate`] call. The registry is immutable after
//! opening and can be shared between threads.

use super::{Component, Registry, parse_component};
use crate::error::{EnvError, EnvResult};
use crate::types::ComponentKind;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct FsRegistry {
    root: PathBuf,
    index: HashMap<ComponentKind, HashMap<String, PathBuf>>,
}

impl FsRegistry {
    /// Index every `*-workflow.yaml`, `*-chain.yaml` and `*-ref.yaml` below `root`.
    ///
    /// A missing root yields an empty registry: every lookup is then absent and
    /// resolution degrades to job-level variables only.
    pub fn open(root: impl Into<PathBuf>) -> EnvResult<Self> {
        let root = root.into();
        let mut registry = Self {
            root,
            index: HashMap::new(),
        };

        if !registry.root.is_dir() {
            warn!(
                root = %registry.root.display(),
                "Step registry directory not found, all components will be absent"
            );
            return Ok(registry);
        }

        let root = registry.root.clone();
        registry.index_dir(&root)?;
        debug!(
            root = %registry.root.display(),
            components = registry.len(),
            "Indexed step registry"
        );
        Ok(registry)
    }

    fn index_dir(&mut self, dir: &Path) -> EnvResult<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| EnvError::io(dir, e))? {
            let entry = entry.map_err(|e| EnvError::io(dir, e))?;
            entries.push(entry.path());
        }
        // Sorted walk so duplicate names resolve the same way on every platform
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.index_dir(&path)?;
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((name, kind)) = ComponentKind::parse_file_name(file_name) else {
                continue;
            };
            let by_name = self.index.entry(kind).or_default();
            if let Some(first) = by_name.get(name) {
                warn!(
                    kind = %kind,
                    name,
                    kept = %first.display(),
                    ignored = %path.display(),
                    "Duplicate registry component"
                );
                continue;
            }
            by_name.insert(name.to_string(), path.clone());
        }
        Ok(())
    }

    /// Root directory the registry was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a component, if indexed.
    pub fn path_of(&self, kind: ComponentKind, name: &str) -> Option<&Path> {
        self.index
            .get(&kind)
            .and_then(|by_name| by_name.get(name))
            .map(PathBuf::as_path)
    }

    /// Total number of indexed components.
    pub fn len(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of indexed components of one kind, sorted.
    pub fn names(&self, kind: ComponentKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .index
            .get(&kind)
            .map(|by_name| by_name.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

impl Registry for FsRegistry {
    fn locate(&self, kind: ComponentKind, name: &str) -> EnvResult<Option<Component>> {
        let Some(path) = self.path_of(kind, name) else {
            return Ok(None);
        };
        let content = fs::read_to_string(path).map_err(|e| EnvError::io(path, e))?;
        parse_component(kind, name, &content)
            .map(Some)
            .map_err(|e| e.with_path(path))
    }

    fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        self.path_of(kind, name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_indexes_nested_tree() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "ipi/aws/ipi-aws-workflow.yaml",
            "workflow:\n  steps:\n    test:\n    - ref: e2e\n",
        );
        write(temp.path(), "ipi/install/ipi-install-chain.yaml", "chain: {}\n");
        write(temp.path(), "e2e/e2e-ref.yaml", "ref: {}\n");
        write(temp.path(), "e2e/e2e-commands.sh", "#!/bin/bash\n");
        write(temp.path(), "OWNERS", "approvers: []\n");

        let registry = FsRegistry::open(temp.path()).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(ComponentKind::Workflow, "ipi-aws"));
        assert!(registry.contains(ComponentKind::Chain, "ipi-install"));
        assert!(registry.contains(ComponentKind::Ref, "e2e"));
        assert!(!registry.contains(ComponentKind::Ref, "ipi-install"));
        assert_eq!(registry.names(ComponentKind::Ref), vec!["e2e"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let registry = FsRegistry::open(temp.path().join("nope")).unwrap();
        assert!(registry.is_empty());
        assert!(registry.locate(ComponentKind::Ref, "x").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_keeps_first_in_sorted_order() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "a/dup-ref.yaml",
            "ref:\n  env:\n  - name: X\n    default: from-a\n",
        );
        write(
            temp.path(),
            "b/dup-ref.yaml",
            "ref:\n  env:\n  - name: X\n    default: from-b\n",
        );

        let registry = FsRegistry::open(temp.path()).unwrap();
        let component = registry.locate(ComponentKind::Ref, "dup").unwrap().unwrap();
        assert_eq!(component.own_variables()[0].value, "from-a");
        assert!(registry.path_of(ComponentKind::Ref, "dup").unwrap().ends_with("a/dup-ref.yaml"));
    }

    #[test]
    fn test_classify_prefers_chain() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "both/both-chain.yaml", "chain: {}\n");
        write(temp.path(), "both/both-ref.yaml", "ref: {}\n");
        write(temp.path(), "leaf/leaf-ref.yaml", "ref: {}\n");

        let registry = FsRegistry::open(temp.path()).unwrap();
        assert_eq!(registry.classify("both"), Some(ComponentKind::Chain));
        assert_eq!(registry.classify("leaf"), Some(ComponentKind::Ref));
        assert_eq!(registry.classify("missing"), None);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "bad/bad-chain.yaml", "chain: [\n");

        let registry = FsRegistry::open(temp.path()).unwrap();
        let err = registry.locate(ComponentKind::Chain, "bad").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidDocument);
        assert!(err.path.unwrap().ends_with("bad-chain.yaml"));
    }
}
