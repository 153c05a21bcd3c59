//! Helpers shared by the integration tests

#![allow(dead_code)]

use stackforge_core::config::{FeatureConfig, RawAnswers};
use stackforge_core::FileTree;

pub fn build(raw: RawAnswers) -> FeatureConfig {
    FeatureConfig::build(raw).unwrap()
}

/// Every backend answer combination the configuration model accepts
pub fn backend_matrix(stack: &str) -> Vec<RawAnswers> {
    let mut all = Vec::new();
    let databases: [(&str, &[bool]); 4] = [
        ("none", &[true]),
        ("postgresql", &[true, false]),
        ("mongodb", &[true, false]),
        ("sqlite", &[true, false]),
    ];
    for (database, orm_choices) in databases {
        for &use_orm in orm_choices {
            let auth_choices: &[bool] = if database == "none" {
                &[false]
            } else {
                &[true, false]
            };
            for &include_auth in auth_choices {
                for include_api_docs in [true, false] {
                    for include_container in [true, false] {
                        all.push(RawAnswers {
                            database: Some(database.to_string()),
                            use_orm: Some(use_orm),
                            include_auth: Some(include_auth),
                            include_api_docs: Some(include_api_docs),
                            include_container: Some(include_container),
                            ..RawAnswers::for_stack("matrix-app", stack)
                        });
                    }
                }
            }
        }
    }
    all
}

pub fn is_script(path: &str) -> bool {
    path.ends_with(".ts") || path.ends_with(".tsx")
}

/// Module specifiers of every import/export-from/side-effect import in `source`
pub fn import_specifiers(source: &str) -> Vec<String> {
    let mut specifiers = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        let is_import_line = trimmed.starts_with("import ")
            || trimmed.starts_with("export ")
            || trimmed.starts_with('}');
        if !is_import_line {
            continue;
        }

        let rest = match trimmed.rfind(" from ") {
            Some(idx) => &trimmed[idx + " from ".len()..],
            // `import './styles.css';`
            None if trimmed.starts_with("import '") || trimmed.starts_with("import \"") => {
                &trimmed["import ".len()..]
            }
            None => continue,
        };
        let mut chars = rest.chars();
        let Some(quote) = chars.next().filter(|c| *c == '\'' || *c == '"') else {
            continue;
        };
        let specifier: String = chars.take_while(|c| *c != quote).collect();
        specifiers.push(specifier);
    }
    specifiers
}

/// Package name of a bare specifier: `@scope/pkg/sub` -> `@scope/pkg`
pub fn package_name(specifier: &str) -> String {
    let mut parts = specifier.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{}/{}", scope, name),
        (Some(name), _) => name.to_string(),
        _ => specifier.to_string(),
    }
}

/// Join a relative specifier onto the importing file's directory
fn join(from_file: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = from_file.split('/').collect();
    parts.pop();
    for segment in specifier.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Tree path a relative import points at, trying the rules of the
/// TypeScript toolchains the generated projects use
pub fn resolve(tree: &FileTree, from_file: &str, specifier: &str) -> Option<String> {
    let base = join(from_file, specifier);
    let mut candidates = vec![base.clone()];
    if let Some(stem) = base.strip_suffix(".js") {
        candidates.push(format!("{}.ts", stem));
        candidates.push(format!("{}.tsx", stem));
    }
    for ext in [".ts", ".tsx", ".d.ts"] {
        candidates.push(format!("{}{}", base, ext));
    }
    candidates.push(format!("{}/index.ts", base));
    candidates.push(format!("{}/index.tsx", base));

    candidates.into_iter().find(|c| tree.contains(c))
}

/// The package.json governing `path`: the one in the deepest enclosing directory
pub fn owning_manifest(tree: &FileTree, path: &str) -> Option<String> {
    let mut dir = path.rsplit_once('/').map(|(d, _)| d.to_string());
    loop {
        let candidate = match &dir {
            Some(d) => format!("{}/package.json", d),
            None => "package.json".to_string(),
        };
        if tree.contains(&candidate) {
            return Some(candidate);
        }
        dir = match dir {
            Some(d) => d.rsplit_once('/').map(|(parent, _)| parent.to_string()),
            None => return None,
        };
    }
}

pub fn manifest(tree: &FileTree, path: &str) -> serde_json::Value {
    serde_json::from_str(&tree.get(path).unwrap().content).unwrap()
}

/// Whether `name` appears in dependencies or devDependencies
pub fn declares(manifest: &serde_json::Value, name: &str) -> bool {
    ["dependencies", "devDependencies"]
        .iter()
        .any(|section| manifest[section].get(name).is_some())
}
