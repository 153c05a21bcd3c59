//! Option enums making up a feature configuration
//!
//! Every enum has a stable kebab-case string form (used in answer files and CLI
//! flags), a human-readable display name, and a `FromStr` that accepts the
//! common aliases users type.

use super::error::ConfigIssue;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level application archetype
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Stack {
    #[value(name = "nextjs")]
    #[serde(rename = "nextjs")]
    NextJs,
    T3,
    ReactVite,
    Mern,
    Express,
    Nest,
    Expo,
}

/// Which prompt family a stack belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Website,
    Backend,
    Mobile,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Website => "Website",
            Category::Backend => "Backend API",
            Category::Mobile => "Mobile app",
        }
    }
}

impl Stack {
    pub const ALL: [Stack; 7] = [
        Stack::NextJs,
        Stack::T3,
        Stack::ReactVite,
        Stack::Mern,
        Stack::Express,
        Stack::Nest,
        Stack::Expo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stack::NextJs => "nextjs",
            Stack::T3 => "t3",
            Stack::ReactVite => "react-vite",
            Stack::Mern => "mern",
            Stack::Express => "express",
            Stack::Nest => "nest",
            Stack::Expo => "expo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stack::NextJs => "Next.js",
            Stack::T3 => "T3 Stack",
            Stack::ReactVite => "React + Vite",
            Stack::Mern => "MERN Stack",
            Stack::Express => "Express + TypeScript",
            Stack::Nest => "NestJS",
            Stack::Expo => "Expo React Native",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Stack::NextJs | Stack::T3 | Stack::ReactVite | Stack::Mern => Category::Website,
            Stack::Express | Stack::Nest => Category::Backend,
            Stack::Expo => Category::Mobile,
        }
    }

    /// Stacks that carry server-side options (database, auth, docs, container)
    pub fn has_backend(&self) -> bool {
        matches!(self, Stack::Express | Stack::Nest | Stack::Mern)
    }

    /// Stacks that carry browser-side options (styling, TypeScript, shadcn)
    pub fn has_frontend(&self) -> bool {
        matches!(
            self,
            Stack::NextJs | Stack::T3 | Stack::ReactVite | Stack::Mern
        )
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stack {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nextjs" | "next" | "next.js" | "nextjs-typescript-tailwind" => Ok(Stack::NextJs),
            "t3" | "t3-stack" => Ok(Stack::T3),
            "react-vite" | "vite" | "react" => Ok(Stack::ReactVite),
            "mern" | "mern-stack" => Ok(Stack::Mern),
            "express" | "express-api" => Ok(Stack::Express),
            "nest" | "nestjs" | "nestjs-api" => Ok(Stack::Nest),
            "expo" | "expo-react-native" => Ok(Stack::Expo),
            other => Err(ConfigIssue::unknown("stack", other)),
        }
    }
}

/// Package manager used for install and run commands
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [
        PackageManager::Npm,
        PackageManager::Pnpm,
        PackageManager::Yarn,
        PackageManager::Bun,
    ];

    /// Binary name, also the identifier used in answer files
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "Yarn",
            PackageManager::Bun => "Bun",
        }
    }

    /// Prefix for running a package.json script (`npm run dev`, `pnpm dev`, ...)
    pub fn run_prefix(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm run",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun run",
        }
    }

    /// Full command line for running a script
    pub fn run(&self, script: &str) -> String {
        format!("{} {}", self.run_prefix(), script)
    }

    /// Command line for installing dependencies
    pub fn install_command(&self) -> String {
        format!("{} install", self.as_str())
    }

    /// Program and leading arguments used to execute a one-off package binary
    pub fn launcher(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageManager::Npm | PackageManager::Yarn => ("npx", &["--yes"]),
            PackageManager::Pnpm => ("pnpm", &["dlx"]),
            PackageManager::Bun => ("bunx", &[]),
        }
    }

    /// Human-readable form of `launcher()`, e.g. `npx --yes`
    pub fn launcher_display(&self) -> String {
        let (program, args) = self.launcher();
        std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs `script` inside the sub-directory `dir` from a workspace root
    pub fn run_in(&self, dir: &str, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm --prefix {} run {}", dir, script),
            PackageManager::Pnpm => format!("pnpm --dir {} {}", dir, script),
            PackageManager::Yarn => format!("yarn --cwd {} {}", dir, script),
            PackageManager::Bun => format!("bun --cwd {} run {}", dir, script),
        }
    }

    /// Installs dependencies inside the sub-directory `dir`
    pub fn install_in(&self, dir: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm --prefix {} install", dir),
            PackageManager::Pnpm => format!("pnpm --dir {} install", dir),
            PackageManager::Yarn => format!("yarn --cwd {} install", dir),
            PackageManager::Bun => format!("bun --cwd {} install", dir),
        }
    }

    /// Subcommand and flags that add packages to an existing project
    pub fn add_args(&self, dev: bool) -> &'static [&'static str] {
        match (self, dev) {
            (PackageManager::Npm, false) => &["install"],
            (PackageManager::Npm, true) => &["install", "-D"],
            (_, false) => &["add"],
            (_, true) => &["add", "-D"],
        }
    }

    /// Command line adding `packages`, e.g. `pnpm add -D prisma`
    pub fn add_command(&self, packages: &[&str], dev: bool) -> String {
        std::iter::once(self.as_str())
            .chain(self.add_args(dev).iter().copied())
            .chain(packages.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lockfile written by this package manager
    pub fn lockfile(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Pnpm => "pnpm-lock.yaml",
            PackageManager::Yarn => "yarn.lock",
            PackageManager::Bun => "bun.lock",
        }
    }

    /// Container build line that makes the package manager available on a node image
    pub fn container_setup(&self) -> Option<&'static str> {
        match self {
            PackageManager::Npm => None,
            PackageManager::Pnpm | PackageManager::Yarn => Some("RUN corepack enable"),
            PackageManager::Bun => Some("RUN npm install -g bun"),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "pnpm" => Ok(PackageManager::Pnpm),
            "yarn" => Ok(PackageManager::Yarn),
            "bun" => Ok(PackageManager::Bun),
            other => Err(ConfigIssue::unknown("package manager", other)),
        }
    }
}

/// User-facing database choice, before the ORM question is folded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFamily {
    None,
    #[value(name = "postgresql", alias = "postgres")]
    #[serde(rename = "postgresql")]
    Postgres,
    #[value(name = "mongodb", alias = "mongo")]
    #[serde(rename = "mongodb")]
    Mongo,
    Sqlite,
}

impl DatabaseFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseFamily::None => "none",
            DatabaseFamily::Postgres => "postgresql",
            DatabaseFamily::Mongo => "mongodb",
            DatabaseFamily::Sqlite => "sqlite",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseFamily::None => "None",
            DatabaseFamily::Postgres => "PostgreSQL",
            DatabaseFamily::Mongo => "MongoDB",
            DatabaseFamily::Sqlite => "SQLite",
        }
    }

    /// Name of the ORM/ODM offered for this family
    pub fn orm_name(&self) -> Option<&'static str> {
        match self {
            DatabaseFamily::None => None,
            DatabaseFamily::Postgres | DatabaseFamily::Sqlite => Some("Prisma"),
            DatabaseFamily::Mongo => Some("Mongoose"),
        }
    }
}

impl FromStr for DatabaseFamily {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(DatabaseFamily::None),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseFamily::Postgres),
            "mongodb" | "mongo" => Ok(DatabaseFamily::Mongo),
            "sqlite" => Ok(DatabaseFamily::Sqlite),
            other => Err(ConfigIssue::unknown("database", other)),
        }
    }
}

/// Internal database choice: family and ORM usage folded into one value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Database {
    #[default]
    None,
    PostgresPrisma,
    PostgresRaw,
    MongoMongoose,
    MongoRaw,
    SqlitePrisma,
    SqliteRaw,
}

/// (family, use ORM) -> database. The only place the two answers are combined.
const DATABASE_TABLE: [(DatabaseFamily, bool, Database); 8] = [
    (DatabaseFamily::None, true, Database::None),
    (DatabaseFamily::None, false, Database::None),
    (DatabaseFamily::Postgres, true, Database::PostgresPrisma),
    (DatabaseFamily::Postgres, false, Database::PostgresRaw),
    (DatabaseFamily::Mongo, true, Database::MongoMongoose),
    (DatabaseFamily::Mongo, false, Database::MongoRaw),
    (DatabaseFamily::Sqlite, true, Database::SqlitePrisma),
    (DatabaseFamily::Sqlite, false, Database::SqliteRaw),
];

impl Database {
    pub const ALL: [Database; 7] = [
        Database::None,
        Database::PostgresPrisma,
        Database::PostgresRaw,
        Database::MongoMongoose,
        Database::MongoRaw,
        Database::SqlitePrisma,
        Database::SqliteRaw,
    ];

    pub fn from_choice(family: DatabaseFamily, use_orm: bool) -> Database {
        DATABASE_TABLE
            .iter()
            .find(|(f, orm, _)| *f == family && *orm == use_orm)
            .map(|(_, _, db)| *db)
            .unwrap_or_default()
    }

    pub fn family(&self) -> DatabaseFamily {
        DATABASE_TABLE
            .iter()
            .find(|(_, _, db)| db == self)
            .map(|(family, _, _)| *family)
            .unwrap_or(DatabaseFamily::None)
    }

    pub fn is_none(&self) -> bool {
        *self == Database::None
    }

    pub fn uses_prisma(&self) -> bool {
        matches!(self, Database::PostgresPrisma | Database::SqlitePrisma)
    }

    pub fn uses_orm(&self) -> bool {
        matches!(
            self,
            Database::PostgresPrisma | Database::SqlitePrisma | Database::MongoMongoose
        )
    }

    pub fn is_mongo(&self) -> bool {
        self.family() == DatabaseFamily::Mongo
    }

    /// Whether a separate database server is needed (and thus a compose service)
    pub fn needs_server(&self) -> bool {
        matches!(
            self.family(),
            DatabaseFamily::Postgres | DatabaseFamily::Mongo
        )
    }

    /// Environment variable carrying the connection string
    pub fn url_variable(&self) -> Option<&'static str> {
        match self.family() {
            DatabaseFamily::None => None,
            DatabaseFamily::Mongo => Some("MONGODB_URI"),
            DatabaseFamily::Postgres | DatabaseFamily::Sqlite => Some("DATABASE_URL"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Database::None => "none",
            Database::PostgresPrisma => "postgresql-prisma",
            Database::PostgresRaw => "postgresql-raw",
            Database::MongoMongoose => "mongodb-mongoose",
            Database::MongoRaw => "mongodb-raw",
            Database::SqlitePrisma => "sqlite-prisma",
            Database::SqliteRaw => "sqlite-raw",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Database::None => "No database",
            Database::PostgresPrisma => "PostgreSQL with Prisma ORM",
            Database::PostgresRaw => "PostgreSQL (node-postgres)",
            Database::MongoMongoose => "MongoDB with Mongoose",
            Database::MongoRaw => "MongoDB (native driver)",
            Database::SqlitePrisma => "SQLite with Prisma ORM",
            Database::SqliteRaw => "SQLite (better-sqlite3)",
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Styling approach for browser frontends
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Styling {
    #[default]
    Tailwind,
    CssModules,
    StyledComponents,
}

impl Styling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Styling::Tailwind => "tailwind",
            Styling::CssModules => "css-modules",
            Styling::StyledComponents => "styled-components",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Styling::Tailwind => "Tailwind CSS",
            Styling::CssModules => "CSS Modules",
            Styling::StyledComponents => "Styled Components",
        }
    }
}

impl FromStr for Styling {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tailwind" | "tailwindcss" => Ok(Styling::Tailwind),
            "css-modules" | "cssmodules" => Ok(Styling::CssModules),
            "styled-components" | "css-in-js" => Ok(Styling::StyledComponents),
            other => Err(ConfigIssue::unknown("styling", other)),
        }
    }
}

/// Starting template handed to create-expo-app
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExpoTemplate {
    #[default]
    Tabs,
    Blank,
}

impl ExpoTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpoTemplate::Tabs => "tabs",
            ExpoTemplate::Blank => "blank",
        }
    }
}

impl FromStr for ExpoTemplate {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tabs" => Ok(ExpoTemplate::Tabs),
            "blank" => Ok(ExpoTemplate::Blank),
            other => Err(ConfigIssue::unknown("expo template", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_table_is_a_bijection_outside_none() {
        for db in Database::ALL.iter().filter(|db| !db.is_none()) {
            assert_eq!(Database::from_choice(db.family(), db.uses_orm()), *db);
        }
        assert_eq!(
            Database::from_choice(DatabaseFamily::None, true),
            Database::None
        );
    }

    #[test]
    fn test_stack_aliases() {
        assert_eq!("express-api".parse::<Stack>().unwrap(), Stack::Express);
        assert_eq!("NestJS".parse::<Stack>().unwrap(), Stack::Nest);
        assert_eq!("t3-stack".parse::<Stack>().unwrap(), Stack::T3);
        assert!("rails".parse::<Stack>().is_err());
    }

    #[test]
    fn test_stack_round_trips_through_as_str() {
        for stack in Stack::ALL {
            assert_eq!(stack.as_str().parse::<Stack>().unwrap(), stack);
        }
    }

    #[test]
    fn test_package_manager_commands() {
        assert_eq!(PackageManager::Npm.run("dev"), "npm run dev");
        assert_eq!(PackageManager::Pnpm.run("dev"), "pnpm dev");
        assert_eq!(PackageManager::Bun.launcher(), ("bunx", &[][..]));
        assert_eq!(
            PackageManager::Yarn.run_in("server", "dev"),
            "yarn --cwd server dev"
        );
        assert_eq!(
            PackageManager::Npm.add_command(&["next-auth"], false),
            "npm install next-auth"
        );
        assert_eq!(
            PackageManager::Bun.add_command(&["prisma"], true),
            "bun add -D prisma"
        );
    }
}
