//! Stackforge CLI - Project scaffolding for web, backend and mobile stacks

mod commands;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::LevelFilter;
use stackforge_core::addon::Addon;
use stackforge_core::config::{DatabaseFamily, ExpoTemplate, PackageManager, Stack, Styling};
use stackforge_core::tui::CreateArgs;
use stackforge_core::{ProductConfig, RawAnswers};
use std::path::PathBuf;

/// Stackforge product configuration
#[derive(Clone)]
pub struct StackforgeConfig;

impl ProductConfig for StackforgeConfig {
    fn name(&self) -> &'static str {
        "stackforge"
    }

    fn display_name(&self) -> &'static str {
        "Stackforge"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding web, backend and mobile starter projects"
    }

    fn docs_url(&self) -> &'static str {
        "https://github.com/stackforge-dev/stackforge#readme"
    }

    fn registry_url_env(&self) -> &'static str {
        "STACKFORGE_REGISTRY_URL"
    }

    fn cache_dir_env(&self) -> &'static str {
        "STACKFORGE_CACHE_DIR"
    }

    fn offline_env(&self) -> &'static str {
        "STACKFORGE_OFFLINE"
    }

    fn user_agent(&self) -> &'static str {
        concat!("stackforge/", env!("CARGO_PKG_VERSION"))
    }
}

#[derive(Parser, Debug)]
#[command(name = "stackforge")]
#[command(about = "CLI for scaffolding web, backend and mobile starter projects")]
#[command(version)]
pub struct Args {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Create(CliCreateArgs),
    /// Show what a configuration would generate, without writing anything
    Preview(AnswerArgs),
    /// Add a feature to the project in the current directory
    Add(AddArgs),
    /// List the available stacks
    List,
    /// Inspect or manage the package version cache
    #[command(subcommand)]
    Versions(VersionsCommand),
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    /// Feature to add
    #[arg(value_enum)]
    pub feature: Addon,

    /// Project directory (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Package manager to use instead of the one the lockfile names
    #[arg(short = 'p', long, value_enum)]
    pub package_manager: Option<PackageManager>,
}

#[derive(Subcommand, Debug)]
pub enum VersionsCommand {
    /// Print the cached versions and their age
    Show,
    /// Look up the latest version of every known package
    Refresh,
    /// Delete the cache
    Clear,
}

/// Answers given on the command line; anything left out is asked for or defaulted
#[derive(ClapArgs, Debug, Default)]
pub struct AnswerArgs {
    /// Project name (also the package name)
    pub name: Option<String>,

    /// YAML file with answers; flags take precedence over it
    #[arg(long)]
    pub answers: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    pub stack: Option<Stack>,

    #[arg(short = 'p', long, value_enum)]
    pub package_manager: Option<PackageManager>,

    #[arg(long, value_enum)]
    pub database: Option<DatabaseFamily>,

    /// Use Prisma/Mongoose instead of the raw driver
    #[arg(long, value_name = "BOOL")]
    pub orm: Option<bool>,

    /// Include JWT authentication (needs a database)
    #[arg(long, value_name = "BOOL")]
    pub auth: Option<bool>,

    /// Include Swagger API docs
    #[arg(long, value_name = "BOOL")]
    pub api_docs: Option<bool>,

    /// Include Dockerfile and docker-compose.yml
    #[arg(long, value_name = "BOOL")]
    pub docker: Option<bool>,

    #[arg(long, value_enum)]
    pub styling: Option<Styling>,

    #[arg(long, value_name = "BOOL")]
    pub typescript: Option<bool>,

    /// Initialize shadcn/ui (Next.js and T3 with Tailwind)
    #[arg(long, value_name = "BOOL")]
    pub shadcn: Option<bool>,

    #[arg(long, value_enum)]
    pub expo_template: Option<ExpoTemplate>,

    /// Add NativeWind to an Expo app
    #[arg(long, value_name = "BOOL")]
    pub nativewind: Option<bool>,

    /// Do not initialize a git repository
    #[arg(long)]
    pub no_git: bool,
}

impl AnswerArgs {
    /// The answers file overlaid with every flag that was given
    pub fn to_raw(&self) -> Result<RawAnswers> {
        let mut raw = match &self.answers {
            Some(path) => RawAnswers::from_yaml_file(path)?,
            None => RawAnswers::default(),
        };
        raw.overlay(RawAnswers {
            project_name: self.name.clone(),
            stack: self.stack.map(|s| s.as_str().to_string()),
            package_manager: self.package_manager.map(|pm| pm.as_str().to_string()),
            git: self.no_git.then_some(false),
            database: self.database.map(|d| d.as_str().to_string()),
            use_orm: self.orm,
            include_auth: self.auth,
            include_api_docs: self.api_docs,
            include_container: self.docker,
            styling: self.styling.map(|s| s.as_str().to_string()),
            typescript: self.typescript,
            shadcn: self.shadcn,
            expo_template: self.expo_template.map(|t| t.as_str().to_string()),
            nativewind: self.nativewind,
        });
        Ok(raw)
    }
}

#[derive(ClapArgs, Debug, Default)]
pub struct CliCreateArgs {
    #[command(flatten)]
    pub answers: AnswerArgs,

    /// Project directory to create (defaults to ./<name>)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Skip dependency installation
    #[arg(long)]
    pub no_install: bool,

    /// Use cached or bundled versions instead of asking the registry
    #[arg(long)]
    pub offline: bool,

    /// Skip the Node.js / package manager / git check
    #[arg(long)]
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl CliCreateArgs {
    fn into_create_args(self) -> Result<CreateArgs> {
        Ok(CreateArgs {
            answers: self.answers.to_raw()?,
            directory: self.directory,
            install: !self.no_install,
            offline: self.offline,
            skip_tool_check: self.skip_tool_check,
            yes: self.yes,
        })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

async fn create(config: &StackforgeConfig, args: CliCreateArgs) -> Result<()> {
    let args = args.into_create_args()?;

    // Prompts need a terminal; piped runs behave like --yes
    if args.yes || !console::Term::stdout().is_term() {
        return commands::create_plain(config, args).await;
    }

    let result = stackforge_core::run(config, args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);
    log::debug!("CLI args: {:?}", args);

    let config = StackforgeConfig;

    match args.command {
        Some(Command::Create(create_args)) => create(&config, create_args).await,
        Some(Command::Preview(answers)) => commands::preview(&config, &answers.to_raw()?),
        Some(Command::Add(add_args)) => commands::add(add_args).await,
        Some(Command::List) => {
            commands::list();
            Ok(())
        }
        Some(Command::Versions(command)) => commands::versions(&config, command).await,
        // No subcommand provided, default to create behavior (interactive mode)
        None => create(&config, CliCreateArgs::default()).await,
    }
}
