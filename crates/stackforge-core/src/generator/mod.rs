//! File-tree generation for assembled stacks
//!
//! `generate` is pure: it turns a `FeatureConfig` and a `VersionSource` into
//! a `FileTree` without touching the disk. Generation walks the ordered
//! `STEPS`; each step whose gate passes is handed to the renderer of the
//! stack's profile, which decides what files that step means in its idiom
//! (a renderer may fold a step into a file another step emits).
//!
//! `write_tree` puts a finished tree on disk through the `FileSystem` trait.

pub mod deps;
mod client;
mod express;
mod fullstack;
mod manifest;
mod nest;
mod shared;
pub mod steps;
mod tree;
pub mod writer;

pub use deps::{dependency_plan, required_packages, workspace_plan, DependencyPlan};
pub use steps::{active_steps, Step, StepId, STEPS};
pub use tree::{FileKind, FileTree, GeneratedFile};
pub use writer::{staging_path, write_tree, FileSystem, TokioFs};

use crate::config::{FeatureConfig, Stack};
use crate::templates::{select_strategy, Layout, Profile, Strategy};
use crate::versions::VersionSource;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0} projects are created by an external tool, not generated")]
    Delegated(Stack),

    #[error("two generation steps produced {0}")]
    DuplicatePath(String),

    #[error("failed to render package.json: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("directory {} already exists", .0.display())]
    DestinationExists(PathBuf),

    #[error("found {} from an interrupted run, remove it and try again", .0.display())]
    StaleStaging(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a renderer gets to look at
pub struct RenderContext<'a> {
    pub config: &'a FeatureConfig,
    pub versions: &'a dyn VersionSource,
}

/// Turns gated steps into files for one profile
pub trait Renderer {
    fn profile(&self) -> Profile;

    /// Emit the files `step` stands for. Only called when the step's gate passed.
    fn render(
        &self,
        step: StepId,
        ctx: &RenderContext<'_>,
        tree: &mut FileTree,
    ) -> Result<(), GenerateError>;
}

fn renderer_for(profile: Profile) -> &'static dyn Renderer {
    match profile {
        Profile::ExpressApi => &express::ExpressRenderer,
        Profile::NestApi => &nest::NestRenderer,
        Profile::ViteClient => &client::ViteClientRenderer,
    }
}

/// Run every active step of `config` through the renderer for `profile`
pub fn generate_profile(
    profile: Profile,
    config: &FeatureConfig,
    versions: &dyn VersionSource,
) -> Result<FileTree, GenerateError> {
    let renderer = renderer_for(profile);
    let ctx = RenderContext { config, versions };
    let mut tree = FileTree::new();

    for step in active_steps(config) {
        log::debug!("{:?}: rendering {:?}", renderer.profile(), step);
        renderer.render(step, &ctx, &mut tree)?;
    }

    Ok(tree)
}

/// Generate the full project tree of an assembled stack
pub fn generate<V: VersionSource>(
    config: &FeatureConfig,
    versions: &V,
) -> Result<FileTree, GenerateError> {
    match select_strategy(config) {
        Strategy::Delegate(_) => Err(GenerateError::Delegated(config.stack())),
        Strategy::Assemble(assembly) => match assembly.layout {
            Layout::Single(profile) => generate_profile(profile, config, versions),
            Layout::MultiService { server, client } => {
                fullstack::compose(config, server, client, versions)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawAnswers;
    use crate::versions::PinnedVersions;

    #[test]
    fn test_delegated_stack_is_rejected() {
        let config = FeatureConfig::build(RawAnswers::for_stack("site", "nextjs")).unwrap();
        assert!(matches!(
            generate(&config, &PinnedVersions::bundled()),
            Err(GenerateError::Delegated(Stack::NextJs))
        ));
    }

    #[test]
    fn test_generation_is_deterministic() {
        for stack in ["express", "nest", "mern"] {
            let config = FeatureConfig::build(RawAnswers::for_stack("app", stack)).unwrap();
            let a = generate(&config, &PinnedVersions::bundled()).unwrap();
            let b = generate(&config, &PinnedVersions::bundled()).unwrap();
            assert_eq!(a, b, "{}", stack);
        }
    }
}
