//! package.json rendering

use super::deps::DependencyPlan;
use super::GenerateError;
use crate::versions::VersionSource;
use serde_json::{Map, Value};

/// Builder for a package.json whose key order is fixed
pub(crate) struct PackageJson {
    fields: Map<String, Value>,
    scripts: Map<String, Value>,
    dependencies: Map<String, Value>,
    dev_dependencies: Map<String, Value>,
    trailing: Map<String, Value>,
}

impl PackageJson {
    pub fn new(name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("version".to_string(), Value::from("0.1.0"));
        fields.insert("private".to_string(), Value::Bool(true));
        Self {
            fields,
            scripts: Map::new(),
            dependencies: Map::new(),
            dev_dependencies: Map::new(),
            trailing: Map::new(),
        }
    }

    /// Top-level field placed before `scripts`
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn script(mut self, name: &str, command: impl Into<String>) -> Self {
        self.scripts
            .insert(name.to_string(), Value::String(command.into()));
        self
    }

    /// Resolve every package of `plan` through `versions`
    pub fn dependencies(mut self, plan: &DependencyPlan, versions: &dyn VersionSource) -> Self {
        for name in &plan.dependencies {
            self.dependencies
                .insert(name.to_string(), Value::String(versions.version(name)));
        }
        for name in &plan.dev_dependencies {
            self.dev_dependencies
                .insert(name.to_string(), Value::String(versions.version(name)));
        }
        self
    }

    /// Tool configuration placed after the dependency maps (`jest`, `prettier`, ...)
    pub fn config_section(mut self, key: &str, value: Value) -> Self {
        self.trailing.insert(key.to_string(), value);
        self
    }

    pub fn render(self) -> Result<String, GenerateError> {
        let mut root = self.fields;
        if !self.scripts.is_empty() {
            root.insert("scripts".to_string(), Value::Object(self.scripts));
        }
        if !self.dependencies.is_empty() {
            root.insert("dependencies".to_string(), Value::Object(self.dependencies));
        }
        if !self.dev_dependencies.is_empty() {
            root.insert(
                "devDependencies".to_string(),
                Value::Object(self.dev_dependencies),
            );
        }
        root.extend(self.trailing);

        let mut text = serde_json::to_string_pretty(&Value::Object(root))?;
        text.push('\n');
        Ok(text)
    }
}
