//! Feature configuration
//!
//! `FeatureConfig` is the validated, immutable description of the project to
//! create. It is built once from `RawAnswers` and every later stage (template
//! selection, generation, post-generation steps, the final report) reads it
//! through the getters and derived predicates below.

mod answers;
mod error;
mod name;
mod options;

pub use answers::RawAnswers;
pub use error::{ConfigError, ConfigIssue, NameIssue};
pub use name::ProjectName;
pub use options::{
    Category, Database, DatabaseFamily, ExpoTemplate, PackageManager, Stack, Styling,
};

use std::str::FromStr;

/// Browser-side options (Next.js, T3, Vite, MERN client)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontendOptions {
    pub styling: Styling,
    pub typescript: bool,
    pub shadcn: bool,
}

/// Server-side options (Express, NestJS, MERN server)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOptions {
    pub database: Database,
    pub include_auth: bool,
    pub include_api_docs: bool,
    pub include_container: bool,
}

/// Expo options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileOptions {
    pub template: ExpoTemplate,
    pub nativewind: bool,
}

/// Validated project configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureConfig {
    project_name: ProjectName,
    stack: Stack,
    package_manager: PackageManager,
    git: bool,
    frontend: Option<FrontendOptions>,
    backend: Option<BackendOptions>,
    mobile: Option<MobileOptions>,
}

/// The two sub-projects of a multi-service stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePlan {
    pub server: FeatureConfig,
    pub client: FeatureConfig,
}

impl ServicePlan {
    pub const SERVER_DIR: &'static str = "server";
    pub const CLIENT_DIR: &'static str = "client";
}

/// Parse an optional enum answer, recording an issue for unknown values
fn parse_answer<T>(value: Option<&str>, issues: &mut Vec<ConfigIssue>) -> Option<T>
where
    T: FromStr<Err = ConfigIssue>,
{
    match value.map(T::from_str) {
        Some(Ok(parsed)) => Some(parsed),
        Some(Err(issue)) => {
            issues.push(issue);
            None
        }
        None => None,
    }
}

impl FeatureConfig {
    /// Validate answers and fill in defaults for everything left unanswered
    ///
    /// All problems are collected; the error lists every one of them.
    pub fn build(raw: RawAnswers) -> Result<FeatureConfig, ConfigError> {
        let mut issues = Vec::new();

        let project_name = match ProjectName::parse(raw.project_name.as_deref().unwrap_or("")) {
            Ok(name) => Some(name),
            Err(reasons) => {
                issues.extend(reasons.into_iter().map(ConfigIssue::InvalidProjectName));
                None
            }
        };

        let stack: Stack = parse_answer(raw.stack.as_deref(), &mut issues).unwrap_or(Stack::NextJs);
        let package_manager: PackageManager =
            parse_answer(raw.package_manager.as_deref(), &mut issues).unwrap_or_default();
        let family: Option<DatabaseFamily> = parse_answer(raw.database.as_deref(), &mut issues);
        let styling: Option<Styling> = parse_answer(raw.styling.as_deref(), &mut issues);
        let expo_template: Option<ExpoTemplate> =
            parse_answer(raw.expo_template.as_deref(), &mut issues);

        let backend = stack.has_backend().then(|| {
            let default_family = if stack == Stack::Mern {
                DatabaseFamily::Mongo
            } else {
                DatabaseFamily::Postgres
            };
            let database = Database::from_choice(
                family.unwrap_or(default_family),
                raw.use_orm.unwrap_or(true),
            );
            let include_auth = raw.include_auth.unwrap_or(!database.is_none());
            if include_auth && database.is_none() {
                issues.push(ConfigIssue::AuthRequiresDatabase { stack });
            }
            BackendOptions {
                database,
                include_auth,
                include_api_docs: raw.include_api_docs.unwrap_or(true),
                include_container: raw.include_container.unwrap_or(true),
            }
        });

        let wants_shadcn = raw.shadcn.unwrap_or(false);
        let frontend = stack.has_frontend().then(|| {
            let forced = stack == Stack::T3;
            let styling = if forced {
                Styling::Tailwind
            } else {
                styling.unwrap_or_default()
            };
            FrontendOptions {
                styling,
                typescript: forced || raw.typescript.unwrap_or(true),
                shadcn: wants_shadcn,
            }
        });
        if wants_shadcn {
            let supported = matches!(stack, Stack::NextJs | Stack::T3)
                && frontend.is_some_and(|f| f.styling == Styling::Tailwind);
            if !supported {
                issues.push(ConfigIssue::ShadcnRequiresTailwind);
            }
        }

        let mobile = (stack == Stack::Expo).then(|| MobileOptions {
            template: expo_template.unwrap_or_default(),
            nativewind: raw.nativewind.unwrap_or(false),
        });

        match project_name {
            Some(project_name) if issues.is_empty() => Ok(FeatureConfig {
                project_name,
                stack,
                package_manager,
                git: raw.git.unwrap_or(true),
                frontend,
                backend,
                mobile,
            }),
            _ => Err(ConfigError { issues }),
        }
    }

    pub fn project_name(&self) -> &ProjectName {
        &self.project_name
    }

    pub fn stack(&self) -> Stack {
        self.stack
    }

    pub fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    pub fn git(&self) -> bool {
        self.git
    }

    pub fn frontend(&self) -> Option<&FrontendOptions> {
        self.frontend.as_ref()
    }

    pub fn backend(&self) -> Option<&BackendOptions> {
        self.backend.as_ref()
    }

    pub fn mobile(&self) -> Option<&MobileOptions> {
        self.mobile.as_ref()
    }

    /// Database choice, `Database::None` for stacks without a backend
    pub fn database(&self) -> Database {
        self.backend.map(|b| b.database).unwrap_or_default()
    }

    pub fn has_database(&self) -> bool {
        !self.database().is_none()
    }

    pub fn uses_orm(&self) -> bool {
        self.database().uses_orm()
    }

    pub fn include_auth(&self) -> bool {
        self.backend.is_some_and(|b| b.include_auth)
    }

    pub fn include_api_docs(&self) -> bool {
        self.backend.is_some_and(|b| b.include_api_docs)
    }

    pub fn include_container(&self) -> bool {
        self.backend.is_some_and(|b| b.include_container)
    }

    /// Auth files are only emitted when there is a user store behind them
    pub fn needs_auth_files(&self) -> bool {
        self.include_auth() && self.has_database()
    }

    /// A validated environment schema is emitted when anything reads secrets
    pub fn needs_env_schema(&self) -> bool {
        self.include_auth() || self.has_database()
    }

    /// Whether generated code is TypeScript. Backends are always TypeScript.
    pub fn typescript(&self) -> bool {
        self.frontend.map(|f| f.typescript).unwrap_or(true)
    }

    pub fn styling(&self) -> Option<Styling> {
        self.frontend.map(|f| f.styling)
    }

    pub fn shadcn(&self) -> bool {
        self.frontend.is_some_and(|f| f.shadcn)
    }

    pub fn nativewind(&self) -> bool {
        self.mobile.is_some_and(|m| m.nativewind)
    }

    /// Split a multi-service stack into its server and client configurations
    pub fn services(&self) -> Option<ServicePlan> {
        if self.stack != Stack::Mern {
            return None;
        }

        let server = FeatureConfig {
            project_name: self.project_name.with_suffix(ServicePlan::SERVER_DIR),
            stack: Stack::Express,
            package_manager: self.package_manager,
            git: false,
            frontend: None,
            backend: self.backend,
            mobile: None,
        };
        let client = FeatureConfig {
            project_name: self.project_name.with_suffix(ServicePlan::CLIENT_DIR),
            stack: Stack::ReactVite,
            package_manager: self.package_manager,
            git: false,
            frontend: self.frontend.map(|f| FrontendOptions {
                typescript: true,
                ..f
            }),
            backend: None,
            mobile: None,
        };

        Some(ServicePlan { server, client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(raw: RawAnswers) -> FeatureConfig {
        FeatureConfig::build(raw).expect("valid config")
    }

    #[test]
    fn test_backend_defaults() {
        let config = build(RawAnswers::for_stack("api", "express"));
        assert_eq!(config.database(), Database::PostgresPrisma);
        assert!(config.include_auth());
        assert!(config.include_api_docs());
        assert!(config.include_container());
        assert!(config.frontend().is_none());
        assert!(config.git());
        assert_eq!(config.package_manager(), PackageManager::Npm);
    }

    #[test]
    fn test_auth_defaults_off_without_database() {
        let config = build(RawAnswers {
            database: Some("none".to_string()),
            ..RawAnswers::for_stack("api", "nest")
        });
        assert!(!config.include_auth());
        assert!(!config.needs_env_schema());
    }

    #[test]
    fn test_auth_without_database_is_rejected() {
        let err = FeatureConfig::build(RawAnswers {
            database: Some("none".to_string()),
            include_auth: Some(true),
            ..RawAnswers::for_stack("api", "express")
        })
        .unwrap_err();
        assert_eq!(
            err.issues,
            vec![ConfigIssue::AuthRequiresDatabase {
                stack: Stack::Express
            }]
        );
    }

    #[test]
    fn test_database_choice_folds_orm_answer() {
        let config = build(RawAnswers {
            database: Some("sqlite".to_string()),
            use_orm: Some(false),
            ..RawAnswers::for_stack("api", "express")
        });
        assert_eq!(config.database(), Database::SqliteRaw);
        assert!(!config.uses_orm());
        assert!(config.needs_auth_files());
    }

    #[test]
    fn test_inapplicable_options_are_dropped() {
        let config = build(RawAnswers {
            database: Some("postgresql".to_string()),
            include_auth: Some(true),
            ..RawAnswers::for_stack("site", "nextjs")
        });
        assert!(config.backend().is_none());
        assert!(!config.has_database());
        assert!(!config.include_auth());

        let config = build(RawAnswers {
            styling: Some("css-modules".to_string()),
            ..RawAnswers::for_stack("api", "express")
        });
        assert!(config.styling().is_none());
    }

    #[test]
    fn test_t3_forces_tailwind_and_typescript() {
        let config = build(RawAnswers {
            styling: Some("css-modules".to_string()),
            typescript: Some(false),
            ..RawAnswers::for_stack("site", "t3")
        });
        assert_eq!(config.styling(), Some(Styling::Tailwind));
        assert!(config.typescript());
    }

    #[test]
    fn test_shadcn_requires_tailwind() {
        let err = FeatureConfig::build(RawAnswers {
            styling: Some("css-modules".to_string()),
            shadcn: Some(true),
            ..RawAnswers::for_stack("site", "nextjs")
        })
        .unwrap_err();
        assert_eq!(err.issues, vec![ConfigIssue::ShadcnRequiresTailwind]);

        let err = FeatureConfig::build(RawAnswers {
            shadcn: Some(true),
            ..RawAnswers::for_stack("site", "react-vite")
        })
        .unwrap_err();
        assert_eq!(err.issues, vec![ConfigIssue::ShadcnRequiresTailwind]);

        let config = build(RawAnswers {
            shadcn: Some(true),
            ..RawAnswers::for_stack("site", "nextjs")
        });
        assert!(config.shadcn());
    }

    #[test]
    fn test_all_issues_are_collected() {
        let err = FeatureConfig::build(RawAnswers {
            project_name: Some("Bad Name".to_string()),
            stack: Some("express".to_string()),
            package_manager: Some("pip".to_string()),
            database: Some("none".to_string()),
            include_auth: Some(true),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err
            .issues
            .contains(&ConfigIssue::InvalidProjectName(NameIssue::Uppercase)));
        assert!(err.issues.contains(&ConfigIssue::UnknownValue {
            field: "package manager",
            value: "pip".to_string()
        }));
        assert!(err.issues.contains(&ConfigIssue::AuthRequiresDatabase {
            stack: Stack::Express
        }));
    }

    #[test]
    fn test_missing_name_is_an_issue() {
        let err = FeatureConfig::build(RawAnswers::default()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ConfigIssue::InvalidProjectName(NameIssue::Empty)]
        );
    }

    #[test]
    fn test_mern_service_plan() {
        let config = build(RawAnswers {
            typescript: Some(false),
            package_manager: Some("pnpm".to_string()),
            ..RawAnswers::for_stack("shop", "mern")
        });
        assert_eq!(config.database(), Database::MongoMongoose);

        let plan = config.services().expect("mern has services");
        assert_eq!(plan.server.stack(), Stack::Express);
        assert_eq!(plan.server.project_name().as_str(), "shop-server");
        assert_eq!(plan.server.database(), Database::MongoMongoose);
        assert_eq!(plan.client.stack(), Stack::ReactVite);
        assert_eq!(plan.client.project_name().as_str(), "shop-client");
        assert!(plan.client.typescript());
        assert_eq!(plan.client.package_manager(), PackageManager::Pnpm);
        assert!(plan.client.backend().is_none());
    }

    #[test]
    fn test_single_stacks_have_no_services() {
        let config = build(RawAnswers::for_stack("api", "express"));
        assert!(config.services().is_none());
    }

    #[test]
    fn test_expo_options() {
        let config = build(RawAnswers {
            expo_template: Some("blank".to_string()),
            nativewind: Some(true),
            ..RawAnswers::for_stack("mobile", "expo")
        });
        let mobile = config.mobile().unwrap();
        assert_eq!(mobile.template, ExpoTemplate::Blank);
        assert!(config.nativewind());
        assert!(config.frontend().is_none());
    }
}
