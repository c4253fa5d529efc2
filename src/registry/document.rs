//! YAML document shapes of registry files.
//!
//! Only the fields the resolver reads are modelled; everything else in a
//! registry file (commands, resources, documentation) is ignored. Missing or
//! `null` sections are treated as empty.

use super::{Component, ComponentBody, StepRef, WorkflowPhases};
use crate::error::{EnvError, EnvResult};
use crate::types::ComponentKind;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

#[derive(Debug, Default, Deserialize)]
struct WorkflowDocument {
    #[serde(default)]
    workflow: Option<WorkflowSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowSpec {
    #[serde(default)]
    steps: Option<WorkflowStepsSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowStepsSpec {
    #[serde(default)]
    pre: Option<Vec<StepEntry>>,
    #[serde(default)]
    test: Option<Vec<StepEntry>>,
    #[serde(default)]
    post: Option<Vec<StepEntry>>,
    #[serde(default)]
    env: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize)]
struct ChainDocument {
    #[serde(default)]
    chain: Option<ChainSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct ChainSpec {
    #[serde(default)]
    steps: Option<Vec<StepEntry>>,
    #[serde(default)]
    env: Option<Vec<EnvItem>>,
}

#[derive(Debug, Default, Deserialize)]
struct RefDocument {
    #[serde(default, rename = "ref")]
    reference: Option<RefSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct RefSpec {
    #[serde(default)]
    env: Option<Vec<EnvItem>>,
}

/// One entry of a `steps` list. Literal inline steps carry neither `chain`
/// nor `ref` and are dropped.
#[derive(Debug, Default, Deserialize)]
struct StepEntry {
    #[serde(default)]
    chain: Option<String>,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default, rename = "as")]
    alias: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    default: Option<Value>,
}

/// Render a YAML scalar the way it would appear in a shell environment.
///
/// `null` becomes the empty string; collections fall back to their YAML text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Deserialize a document, treating an empty file as all-default.
pub(crate) fn from_yaml<T>(content: &str, source: &str) -> EnvResult<T>
where
    T: DeserializeOwned + Default,
{
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| EnvError::invalid_document(source, e))?;
    if value.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(value).map_err(|e| EnvError::invalid_document(source, e))
}

fn step_refs(entries: Option<Vec<StepEntry>>) -> Vec<StepRef> {
    entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let name = entry
                .chain
                .filter(|n| !n.is_empty())
                .or(entry.reference.filter(|n| !n.is_empty()))?;
            let alias = entry.alias.unwrap_or_else(|| name.clone());
            Some(StepRef { name, alias })
        })
        .collect()
}

fn push_env_items(component: &mut Component, items: Option<Vec<EnvItem>>) {
    for item in items.unwrap_or_default() {
        let Some(name) = item.name else {
            continue;
        };
        let value = item.default.as_ref().map(scalar_text).unwrap_or_default();
        component.push_env(name, value);
    }
}

/// Parse the YAML text of a registry file into a [`Component`].
pub fn parse_component(kind: ComponentKind, name: &str, content: &str) -> EnvResult<Component> {
    let source = kind.file_name(name);
    let component = match kind {
        ComponentKind::Workflow => {
            let doc: WorkflowDocument = from_yaml(content, &source)?;
            let steps = doc.workflow.and_then(|w| w.steps).unwrap_or_default();
            let mut component = Component::workflow(name);
            for (key, value) in steps.env.unwrap_or_default() {
                component.push_env(scalar_text(&key), scalar_text(&value));
            }
            component.body = ComponentBody::Workflow(WorkflowPhases {
                pre: step_refs(steps.pre),
                test: step_refs(steps.test),
                post: step_refs(steps.post),
            });
            component
        }
        ComponentKind::Chain => {
            let doc: ChainDocument = from_yaml(content, &source)?;
            let spec = doc.chain.unwrap_or_default();
            let mut component = Component::chain(name);
            push_env_items(&mut component, spec.env);
            component.body = ComponentBody::Chain(step_refs(spec.steps));
            component
        }
        ComponentKind::Ref => {
            let doc: RefDocument = from_yaml(content, &source)?;
            let mut component = Component::step(name);
            push_env_items(&mut component, doc.reference.unwrap_or_default().env);
            component
        }
    };
    Ok(component)
}
