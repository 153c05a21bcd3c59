//! Ordered, independently gated emission steps
//!
//! A step's gate only reads the configuration, never another step's output.
//! Two files whose steps share a gate are therefore always emitted together,
//! which is what keeps cross-file references valid.

use crate::config::FeatureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    Manifest,
    EntryPoint,
    HealthRoute,
    ErrorHandling,
    Toolchain,
    TestScaffold,
    LintFormat,
    EnvLoader,
    Database,
    Auth,
    ApiDocs,
    Container,
    EnvTemplate,
    Gitignore,
    Readme,
}

pub struct Step {
    pub id: StepId,
    pub gate: fn(&FeatureConfig) -> bool,
}

fn always(_: &FeatureConfig) -> bool {
    true
}

/// Emission order
pub const STEPS: &[Step] = &[
    Step { id: StepId::Manifest, gate: always },
    Step { id: StepId::EntryPoint, gate: always },
    Step { id: StepId::HealthRoute, gate: always },
    Step { id: StepId::ErrorHandling, gate: always },
    Step { id: StepId::Toolchain, gate: always },
    Step { id: StepId::TestScaffold, gate: always },
    Step { id: StepId::LintFormat, gate: always },
    Step { id: StepId::EnvLoader, gate: FeatureConfig::needs_env_schema },
    Step { id: StepId::Database, gate: FeatureConfig::has_database },
    Step { id: StepId::Auth, gate: FeatureConfig::needs_auth_files },
    Step { id: StepId::ApiDocs, gate: FeatureConfig::include_api_docs },
    Step { id: StepId::Container, gate: FeatureConfig::include_container },
    Step { id: StepId::EnvTemplate, gate: always },
    Step { id: StepId::Gitignore, gate: always },
    Step { id: StepId::Readme, gate: always },
];

/// Steps whose gate passes for `config`, in emission order
pub fn active_steps(config: &FeatureConfig) -> impl Iterator<Item = StepId> + '_ {
    STEPS
        .iter()
        .filter(move |step| (step.gate)(config))
        .map(|step| step.id)
}
