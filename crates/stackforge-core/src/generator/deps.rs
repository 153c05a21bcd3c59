//! Dependency sets per profile and feature
//!
//! A manifest's dependencies are the profile's base set plus the incremental
//! set of every enabled feature. These lists are the single source for both
//! manifest rendering and version prefetching.

use crate::config::{Database, FeatureConfig, Styling};
use crate::templates::{select_strategy, Layout, Profile, Strategy};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPlan {
    pub dependencies: BTreeSet<&'static str>,
    pub dev_dependencies: BTreeSet<&'static str>,
}

impl DependencyPlan {
    fn add(&mut self, deps: &[&'static str], dev: &[&'static str]) {
        self.dependencies.extend(deps.iter().copied());
        self.dev_dependencies.extend(dev.iter().copied());
    }

    /// Every package name, runtime and dev
    pub fn all(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .copied()
    }

    /// Whether `name` is declared in either set
    pub fn declares(&self, name: &str) -> bool {
        self.dependencies.contains(name) || self.dev_dependencies.contains(name)
    }
}

/// Database driver packages, shared by both server profiles
fn database_packages(plan: &mut DependencyPlan, database: Database) {
    match database {
        Database::None => {}
        Database::PostgresPrisma | Database::SqlitePrisma => {
            plan.add(&["@prisma/client"], &["prisma"])
        }
        Database::PostgresRaw => plan.add(&["pg"], &["@types/pg"]),
        Database::MongoMongoose => plan.add(&["mongoose"], &[]),
        Database::MongoRaw => plan.add(&["mongodb"], &[]),
        Database::SqliteRaw => plan.add(&["better-sqlite3"], &["@types/better-sqlite3"]),
    }
}

fn express_plan(config: &FeatureConfig) -> DependencyPlan {
    let mut plan = DependencyPlan::default();
    plan.add(
        &["express", "cors", "helmet", "dotenv"],
        &[
            "typescript",
            "tsx",
            "tsup",
            "vitest",
            "prettier",
            "@types/node",
            "@types/express",
            "@types/cors",
        ],
    );
    if config.needs_env_schema() {
        plan.add(&["zod"], &[]);
    }
    database_packages(&mut plan, config.database());
    if config.needs_auth_files() {
        plan.add(
            &["jsonwebtoken", "bcryptjs", "zod"],
            &["@types/jsonwebtoken", "@types/bcryptjs"],
        );
    }
    if config.include_api_docs() {
        plan.add(
            &["swagger-ui-express", "swagger-jsdoc"],
            &["@types/swagger-ui-express", "@types/swagger-jsdoc"],
        );
    }
    plan
}

fn nest_plan(config: &FeatureConfig) -> DependencyPlan {
    let mut plan = DependencyPlan::default();
    plan.add(
        &[
            "@nestjs/common",
            "@nestjs/core",
            "@nestjs/platform-express",
            "@nestjs/config",
            "class-validator",
            "class-transformer",
            "reflect-metadata",
            "rxjs",
        ],
        &[
            "@nestjs/cli",
            "@nestjs/schematics",
            "@nestjs/testing",
            "typescript",
            "ts-jest",
            "jest",
            "@types/jest",
            "@types/node",
            "@types/express",
            "supertest",
            "@types/supertest",
            "prettier",
        ],
    );
    if config.needs_env_schema() {
        plan.add(&["zod"], &[]);
    }
    database_packages(&mut plan, config.database());
    if config.database() == Database::MongoMongoose {
        plan.add(&["@nestjs/mongoose"], &[]);
    }
    if config.needs_auth_files() {
        plan.add(
            &[
                "@nestjs/jwt",
                "@nestjs/passport",
                "passport",
                "passport-jwt",
                "bcryptjs",
            ],
            &["@types/passport-jwt", "@types/bcryptjs"],
        );
    }
    if config.include_api_docs() {
        plan.add(&["@nestjs/swagger"], &[]);
    }
    plan
}

fn client_plan(config: &FeatureConfig) -> DependencyPlan {
    let mut plan = DependencyPlan::default();
    plan.add(
        &["react", "react-dom"],
        &[
            "vite",
            "@vitejs/plugin-react",
            "typescript",
            "@types/react",
            "@types/react-dom",
            "vitest",
            "prettier",
        ],
    );
    match config.styling() {
        Some(Styling::Tailwind) => plan.add(&[], &["tailwindcss", "@tailwindcss/vite"]),
        Some(Styling::StyledComponents) => plan.add(&["styled-components"], &[]),
        Some(Styling::CssModules) | None => {}
    }
    plan
}

/// Dependencies of a single-service manifest
pub fn dependency_plan(profile: Profile, config: &FeatureConfig) -> DependencyPlan {
    match profile {
        Profile::ExpressApi => express_plan(config),
        Profile::NestApi => nest_plan(config),
        Profile::ViteClient => client_plan(config),
    }
}

/// Dependencies of the root manifest of a multi-service workspace
pub fn workspace_plan() -> DependencyPlan {
    let mut plan = DependencyPlan::default();
    plan.add(&[], &["concurrently"]);
    plan
}

/// Every package name generating `config` will ask a version for
///
/// Delegated stacks manage their own manifests, so they need none.
pub fn required_packages(config: &FeatureConfig) -> BTreeSet<&'static str> {
    let mut names = BTreeSet::new();
    if let Strategy::Assemble(assembly) = select_strategy(config) {
        match assembly.layout {
            Layout::Single(profile) => names.extend(dependency_plan(profile, config).all()),
            Layout::MultiService { server, client } => {
                if let Some(plan) = config.services() {
                    names.extend(dependency_plan(server, &plan.server).all());
                    names.extend(dependency_plan(client, &plan.client).all());
                }
                names.extend(workspace_plan().all());
            }
        }
    }
    names
}
