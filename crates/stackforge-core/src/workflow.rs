//! Glue shared by every front end that creates projects
//!
//! Both the interactive prompts and the plain CLI go through these helpers, so
//! a project created either way resolves its destination, versions and tool
//! requirements identically.

use crate::config::FeatureConfig;
use crate::generator::required_packages;
use crate::product::ProductConfig;
use crate::runtime::Tool;
use crate::templates::{select_strategy, Strategy};
use crate::versions::{
    HttpFetcher, JsonFileStore, KeyValueStore, MemoryStore, PinnedVersions, ResolverOptions,
    VersionResolver,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolver over the persistent cache and the live registry
pub type DefaultResolver = VersionResolver<Box<dyn KeyValueStore>, HttpFetcher>;

/// Build the resolver a product uses, honoring its environment overrides
pub fn open_resolver<C: ProductConfig>(product: &C, offline: bool) -> Result<DefaultResolver> {
    let mut options = ResolverOptions::from_config(product)?;
    options.offline |= offline;

    let override_dir = std::env::var_os(product.cache_dir_env()).map(PathBuf::from);
    let store: Box<dyn KeyValueStore> =
        match JsonFileStore::default_dir(product.cache_namespace(), override_dir) {
            Some(dir) => {
                log::debug!("Version cache at {}", dir.display());
                Box::new(JsonFileStore::new(dir))
            }
            None => {
                log::warn!("No cache directory available, versions will not be cached");
                Box::new(MemoryStore::new())
            }
        };

    Ok(VersionResolver::new(
        store,
        HttpFetcher::new(product.user_agent()),
        options,
    ))
}

/// Resolve every version `config` needs in one concurrent batch
pub async fn pin_versions(resolver: &DefaultResolver, config: &FeatureConfig) -> PinnedVersions {
    let names = required_packages(config);
    if names.is_empty() {
        return PinnedVersions::default();
    }
    log::debug!("Resolving {} package versions", names.len());
    resolver.snapshot(names.iter().copied()).await
}

/// Where the project goes: `directory` if given, else `./<project name>`
pub fn destination(config: &FeatureConfig, directory: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(resolve_destination(&cwd, config, directory))
}

fn resolve_destination(cwd: &Path, config: &FeatureConfig, directory: Option<&Path>) -> PathBuf {
    match directory {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd.join(config.project_name().as_str()),
    }
}

/// Tools a run cannot do without, and tools it only reports on
pub fn required_tools(config: &FeatureConfig, install: bool) -> (Vec<Tool>, Vec<Tool>) {
    let pm = Tool::PackageManager(config.package_manager());
    let delegated = matches!(select_strategy(config), Strategy::Delegate(_));

    let mut required = vec![Tool::Node];
    let mut advisory = Vec::new();
    // Delegated tools are launched through the package manager's runner
    if install || delegated {
        required.push(pm);
    } else {
        advisory.push(pm);
    }
    if config.git() {
        advisory.push(Tool::Git);
    }
    (required, advisory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PackageManager, RawAnswers};

    fn config(raw: RawAnswers) -> FeatureConfig {
        FeatureConfig::build(raw).unwrap()
    }

    #[test]
    fn test_destination_defaults_to_project_name() {
        let cfg = config(RawAnswers::for_stack("api", "express"));
        let cwd = Path::new("/work");
        assert_eq!(resolve_destination(cwd, &cfg, None), PathBuf::from("/work/api"));
        assert_eq!(
            resolve_destination(cwd, &cfg, Some(Path::new("apps/api"))),
            PathBuf::from("/work/apps/api")
        );
        assert_eq!(
            resolve_destination(cwd, &cfg, Some(Path::new("/srv/api"))),
            PathBuf::from("/srv/api")
        );
    }

    #[test]
    fn test_required_tools() {
        let cfg = config(RawAnswers {
            package_manager: Some("pnpm".to_string()),
            ..RawAnswers::for_stack("api", "express")
        });
        let (required, advisory) = required_tools(&cfg, false);
        assert_eq!(required, vec![Tool::Node]);
        assert_eq!(
            advisory,
            vec![Tool::PackageManager(PackageManager::Pnpm), Tool::Git]
        );

        let cfg = config(RawAnswers {
            git: Some(false),
            ..RawAnswers::for_stack("site", "nextjs")
        });
        let (required, advisory) = required_tools(&cfg, false);
        assert_eq!(
            required,
            vec![Tool::Node, Tool::PackageManager(PackageManager::Npm)]
        );
        assert!(advisory.is_empty());
    }

    #[tokio::test]
    async fn test_pin_versions_for_delegated_stack_is_empty() {
        let cfg = config(RawAnswers::for_stack("site", "nextjs"));
        let resolver = VersionResolver::new(
            Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>,
            HttpFetcher::new("stackforge-test"),
            ResolverOptions {
                offline: true,
                ..ResolverOptions::new(url::Url::parse("https://registry.test").unwrap())
            },
        );
        assert_eq!(pin_versions(&resolver, &cfg).await, PinnedVersions::default());
    }
}
