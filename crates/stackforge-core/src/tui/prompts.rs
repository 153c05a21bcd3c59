//! Charm-style CLI prompts using cliclack

use crate::config::{
    Category, DatabaseFamily, ExpoTemplate, FeatureConfig, PackageManager, ProjectName,
    RawAnswers, Stack, Styling,
};
use crate::generator::TokioFs;
use crate::pipeline::{Pipeline, PipelineOptions, PipelineStep, Progress, StepStatus};
use crate::product::ProductConfig;
use crate::runtime::{check, TokioCommandRunner};
use crate::templates::by_category;
use crate::{report, workflow};
use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the create command
#[derive(Debug, Clone)]
pub struct CreateArgs {
    /// Answers already given through flags or an answers file
    pub answers: RawAnswers,

    /// Project directory to create (defaults to `./<project name>`)
    pub directory: Option<PathBuf>,

    /// Install dependencies after generation
    pub install: bool,

    /// Skip registry lookups and use cached or bundled versions
    pub offline: bool,

    /// Skip the Node.js / package manager / git check
    pub skip_tool_check: bool,

    /// Accept defaults for everything not answered (non-interactive mode)
    pub yes: bool,
}

impl Default for CreateArgs {
    fn default() -> Self {
        Self {
            answers: RawAnswers::default(),
            directory: None,
            install: true,
            offline: false,
            skip_tool_check: false,
            yes: false,
        }
    }
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(product: &C, args: CreateArgs) -> Result<()> {
    cliclack::intro(product.display_name())?;

    // Step 1: Gather answers
    let answers = if args.yes {
        args.answers.clone()
    } else {
        ask(args.answers.clone())?
    };

    // Step 2: Validate
    let config = match FeatureConfig::build(answers) {
        Ok(config) => config,
        Err(err) => {
            for issue in &err.issues {
                cliclack::log::error(issue.to_string())?;
            }
            cliclack::outro_cancel("Nothing was created.")?;
            return Err(err.into());
        }
    };

    // Step 3: Check tools
    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    } else {
        check_tools(&config, args.install)?;
    }

    // Step 4: Resolve versions
    let dest = workflow::destination(&config, args.directory.as_deref())?;
    let resolver = workflow::open_resolver(product, args.offline)?;
    let spinner = cliclack::spinner();
    spinner.start("Resolving package versions...");
    let versions = workflow::pin_versions(&resolver, &config).await;
    spinner.stop(format!("Resolved {} package versions", versions.iter().count()));

    // Step 5: Create the project
    cliclack::log::step(format!(
        "Creating {} project in {}",
        config.stack().display_name(),
        dest.display()
    ))?;
    let options = PipelineOptions {
        install: args.install,
        ..PipelineOptions::new(product.initial_commit_message())
    };
    let pipeline = Pipeline::plan(&config, &dest, options);
    let outcome = pipeline
        .run_with_progress(&TokioCommandRunner, &TokioFs, &versions, &mut ClackProgress)
        .await;
    let pipeline_report = match outcome {
        Ok(pipeline_report) => pipeline_report,
        Err(err) => {
            cliclack::log::error(format!("{:#}", anyhow::Error::from(err)))?;
            cliclack::outro_cancel("Project was not created.")?;
            anyhow::bail!("Setup failed.");
        }
    };

    // Step 6: Show the summary and next steps
    cliclack::note("Summary", report::render(&config, &dest))?;
    let warnings = pipeline_report.warnings().count();
    if warnings > 0 {
        cliclack::outro(format!(
            "Project created with {} warning{}. See above for details.",
            warnings,
            if warnings == 1 { "" } else { "s" }
        ))?;
    } else {
        cliclack::outro("Happy coding!")?;
    }

    Ok(())
}

/// Prints one line per pipeline step
struct ClackProgress;

impl Progress for ClackProgress {
    fn step_started(&mut self, step: PipelineStep) {
        // Steps that run external tools stream their output below this line
        if matches!(
            step,
            PipelineStep::Generate
                | PipelineStep::InstallDependencies
                | PipelineStep::SecondaryTool
        ) {
            let _ = cliclack::log::remark(format!("{}...", step));
        }
    }

    fn step_finished(&mut self, step: PipelineStep, status: &StepStatus) {
        let line = format!("{}: {}", step, status.message());
        let _ = match status {
            StepStatus::Done(_) => cliclack::log::success(line),
            StepStatus::Skipped(_) => cliclack::log::info(line),
            StepStatus::Warned(_) => cliclack::log::warning(line),
        };
    }
}

fn check_tools(config: &FeatureConfig, install: bool) -> Result<()> {
    let (required, advisory) = workflow::required_tools(config, install);

    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match check::check_runtimes_with_advisory(&required, &advisory) {
        Ok(runtimes) => {
            let info: Vec<String> = runtimes
                .iter()
                .map(|r| {
                    if r.available {
                        format!("{} ({})", r.name, r.version.as_deref().unwrap_or("unknown"))
                    } else {
                        format!("{} (not installed)", r.name)
                    }
                })
                .collect();
            spinner.stop(format!("Detected tools: {}", info.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

/// Ask for every answer `answers` leaves open
pub fn ask(mut answers: RawAnswers) -> Result<RawAnswers> {
    if answers.project_name.is_none() {
        let name: String = cliclack::input("Project name")
            .placeholder("my-app")
            .validate(|input: &String| match ProjectName::parse(input) {
                Ok(_) => Ok(()),
                Err(issues) => Err(issues
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")),
            })
            .interact()?;
        answers.project_name = Some(name);
    }

    let stack = match answers.stack.as_deref().map(Stack::from_str) {
        Some(Ok(stack)) => stack,
        // An unknown value is reported by validation with everything else
        Some(Err(_)) => return Ok(answers),
        None => {
            let stack = select_stack()?;
            answers.stack = Some(stack.as_str().to_string());
            stack
        }
    };

    if answers.package_manager.is_none() {
        let mut select = cliclack::select("Package manager");
        for pm in PackageManager::ALL {
            select = select.item(pm, pm.display_name(), "");
        }
        let pm: PackageManager = select.interact()?;
        answers.package_manager = Some(pm.as_str().to_string());
    }

    if stack.has_backend() {
        ask_backend(stack, &mut answers)?;
    }
    if stack.has_frontend() {
        ask_frontend(stack, &mut answers)?;
    }
    if stack == Stack::Expo {
        ask_mobile(&mut answers)?;
    }

    if answers.git.is_none() {
        answers.git = Some(
            cliclack::confirm("Initialize a git repository?")
                .initial_value(true)
                .interact()?,
        );
    }

    Ok(answers)
}

fn select_stack() -> Result<Stack> {
    let category: &str = cliclack::select("What are you building?")
        .item("website", Category::Website.display_name(), "")
        .item("backend", Category::Backend.display_name(), "")
        .item("mobile", Category::Mobile.display_name(), "")
        .interact()?;
    let category = match category {
        "backend" => Category::Backend,
        "mobile" => Category::Mobile,
        _ => Category::Website,
    };

    let entries = by_category(category);
    if let [only] = entries.as_slice() {
        cliclack::log::info(format!("Using {} - {}", only.name, only.description))?;
        return Ok(only.stack);
    }

    let mut select = cliclack::select("Select a stack");
    for entry in &entries {
        select = select.item(entry.stack, entry.name, entry.description);
    }
    Ok(select.interact()?)
}

fn ask_backend(stack: Stack, answers: &mut RawAnswers) -> Result<()> {
    let family = match answers.database.as_deref().map(DatabaseFamily::from_str) {
        Some(Ok(family)) => family,
        Some(Err(_)) => return Ok(()),
        None => {
            let default = if stack == Stack::Mern {
                DatabaseFamily::Mongo
            } else {
                DatabaseFamily::Postgres
            };
            let family: DatabaseFamily = cliclack::select("Database")
                .item(DatabaseFamily::Postgres, "PostgreSQL", "")
                .item(DatabaseFamily::Mongo, "MongoDB", "")
                .item(DatabaseFamily::Sqlite, "SQLite", "")
                .item(DatabaseFamily::None, "None", "")
                .initial_value(default)
                .interact()?;
            answers.database = Some(family.as_str().to_string());
            family
        }
    };

    if answers.use_orm.is_none() {
        if let Some(orm) = family.orm_name() {
            answers.use_orm = Some(
                cliclack::confirm(format!("Use {}?", orm))
                    .initial_value(true)
                    .interact()?,
            );
        }
    }

    // Auth stores users, so it is only offered with a database
    if answers.include_auth.is_none() && family != DatabaseFamily::None {
        answers.include_auth = Some(
            cliclack::confirm("Include JWT authentication?")
                .initial_value(true)
                .interact()?,
        );
    }
    if answers.include_api_docs.is_none() {
        answers.include_api_docs = Some(
            cliclack::confirm("Include Swagger API docs?")
                .initial_value(true)
                .interact()?,
        );
    }
    if answers.include_container.is_none() {
        answers.include_container = Some(
            cliclack::confirm("Include Docker setup?")
                .initial_value(true)
                .interact()?,
        );
    }
    Ok(())
}

fn ask_frontend(stack: Stack, answers: &mut RawAnswers) -> Result<()> {
    // T3 always uses TypeScript and Tailwind
    if stack == Stack::T3 {
        return ask_shadcn(answers, Styling::Tailwind);
    }

    if answers.typescript.is_none() && stack != Stack::Mern {
        answers.typescript = Some(
            cliclack::confirm("Use TypeScript?")
                .initial_value(true)
                .interact()?,
        );
    }

    let styling = match answers.styling.as_deref().map(Styling::from_str) {
        Some(Ok(styling)) => styling,
        Some(Err(_)) => return Ok(()),
        None => {
            let mut select = cliclack::select("Styling");
            for styling in [
                Styling::Tailwind,
                Styling::CssModules,
                Styling::StyledComponents,
            ] {
                select = select.item(styling, styling.display_name(), "");
            }
            let styling: Styling = select.interact()?;
            answers.styling = Some(styling.as_str().to_string());
            styling
        }
    };

    if stack == Stack::NextJs {
        ask_shadcn(answers, styling)?;
    }
    Ok(())
}

fn ask_shadcn(answers: &mut RawAnswers, styling: Styling) -> Result<()> {
    if answers.shadcn.is_none() && styling == Styling::Tailwind {
        answers.shadcn = Some(
            cliclack::confirm("Add shadcn/ui components?")
                .initial_value(false)
                .interact()?,
        );
    }
    Ok(())
}

fn ask_mobile(answers: &mut RawAnswers) -> Result<()> {
    if answers.expo_template.is_none() {
        let template: ExpoTemplate = cliclack::select("Expo template")
            .item(ExpoTemplate::Tabs, "Tabs", "Expo Router with a tab layout")
            .item(ExpoTemplate::Blank, "Blank", "Single screen, TypeScript")
            .interact()?;
        answers.expo_template = Some(template.as_str().to_string());
    }
    if answers.nativewind.is_none() {
        answers.nativewind = Some(
            cliclack::confirm("Add NativeWind (Tailwind for React Native)?")
                .initial_value(false)
                .interact()?,
        );
    }
    Ok(())
}
