//! Non-interactive commands: plain create, preview, add, list and version cache

use crate::{AddArgs, VersionsCommand};
use anyhow::{Context, Result};
use colored::Colorize;
use stackforge_core::config::Category;
use stackforge_core::pipeline::{PipelineStep, Progress, StepStatus};
use stackforge_core::runtime::check;
use stackforge_core::templates::{by_category, Strategy};
use stackforge_core::tui::CreateArgs;
use stackforge_core::versions::{JsonFileStore, LATEST};
use stackforge_core::{
    generate, report, select_strategy, workflow, FeatureConfig, Pipeline, PipelineOptions,
    ProductConfig, RawAnswers, TokioCommandRunner, TokioFs,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prints one line per pipeline step
struct PlainProgress;

impl Progress for PlainProgress {
    fn step_finished(&mut self, step: PipelineStep, status: &StepStatus) {
        let (marker, message) = match status {
            StepStatus::Done(m) => ("✓".green(), m.normal()),
            StepStatus::Skipped(m) => ("-".dimmed(), m.dimmed()),
            StepStatus::Warned(m) => ("!".yellow(), m.yellow()),
        };
        println!("  {} {}: {}", marker, step.display_name().bold(), message);
    }
}

fn build_config(raw: RawAnswers) -> Result<FeatureConfig> {
    FeatureConfig::build(raw).map_err(|err| {
        for issue in &err.issues {
            eprintln!("  {} {}", "✗".red(), issue);
        }
        anyhow::Error::from(err)
    })
}

/// `create` without prompts: every open answer takes its default
pub async fn create_plain<C: ProductConfig>(product: &C, args: CreateArgs) -> Result<()> {
    let config = build_config(args.answers)?;

    if !args.skip_tool_check {
        let (required, advisory) = workflow::required_tools(&config, args.install);
        check::check_runtimes_with_advisory(&required, &advisory)?;
    }

    let dest = workflow::destination(&config, args.directory.as_deref())?;
    let resolver = workflow::open_resolver(product, args.offline)?;
    let versions = workflow::pin_versions(&resolver, &config).await;

    println!(
        "{} {} project in {}",
        "Creating".bold(),
        config.stack().display_name(),
        dest.display()
    );
    let options = PipelineOptions {
        install: args.install,
        ..PipelineOptions::new(product.initial_commit_message())
    };
    let pipeline_report = Pipeline::plan(&config, &dest, options)
        .run_with_progress(&TokioCommandRunner, &TokioFs, &versions, &mut PlainProgress)
        .await
        .context("Project was not created")?;

    println!();
    println!("{}", report::render(&config, &dest));
    let warnings = pipeline_report.warnings().count();
    if warnings > 0 {
        println!(
            "{}",
            format!("Project created with {} warning(s), see above.", warnings).yellow()
        );
    }
    Ok(())
}

/// Print the strategy and file tree a configuration would produce
pub fn preview<C: ProductConfig>(product: &C, raw: &RawAnswers) -> Result<()> {
    let config = build_config(raw.clone())?;

    println!(
        "{} {} ({})",
        config.project_name().as_str().bold(),
        config.stack().display_name(),
        select_strategy(&config).kind().as_str()
    );

    match select_strategy(&config) {
        Strategy::Delegate(delegation) => {
            let pm = config.package_manager();
            println!("  would run: {}", delegation.invocation(pm, true).to_string().cyan());
            if let Some(secondary) = &delegation.secondary {
                println!(
                    "  then:      {} ({})",
                    secondary.invocation.to_string().cyan(),
                    secondary.name
                );
            }
        }
        Strategy::Assemble(_) => {
            // Cached answers only: preview never touches the network
            let resolver = workflow::open_resolver(product, true)?;
            let tree = generate(&config, &resolver)?;
            for file in tree.files() {
                println!(
                    "  {:<48} {:>7} B  {}",
                    file.path,
                    file.content.len(),
                    file.kind.as_str().dimmed()
                );
            }
            println!("  {} files", tree.len());
        }
    }
    Ok(())
}

/// Install and initialize a feature in an existing project
pub async fn add(args: AddArgs) -> Result<()> {
    let dir = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    println!("{} {} to {}", "Adding".bold(), args.feature, dir.display());
    let outcome = stackforge_core::add(
        &TokioCommandRunner,
        &TokioFs,
        &dir,
        args.feature,
        args.package_manager,
    )
    .await
    .with_context(|| format!("Failed to add {}", args.feature))?;

    println!(
        "  {} {} project, using {}",
        "✓".green(),
        outcome.kind,
        outcome.package_manager.display_name()
    );
    for command in &outcome.commands {
        println!("  {} {}", "✓".green(), command.dimmed());
    }
    println!();
    println!("{}", "Next steps:".bold());
    for (i, step) in outcome.next_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    Ok(())
}

pub fn list() {
    for category in [Category::Website, Category::Backend, Category::Mobile] {
        println!("{}", category.display_name().bold());
        for entry in by_category(category) {
            println!(
                "  {:<12} {:<22} {}  {}",
                entry.stack.as_str().green(),
                entry.name,
                entry.description,
                format!("[{}]", entry.kind.as_str()).dimmed()
            );
        }
        println!();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn format_age(millis: u64) -> String {
    let minutes = millis / 60_000;
    match minutes {
        0 => "just now".to_string(),
        m if m < 120 => format!("{} minutes ago", m),
        m => format!("{} hours ago", m / 60),
    }
}

pub async fn versions<C: ProductConfig>(product: &C, command: VersionsCommand) -> Result<()> {
    let resolver = workflow::open_resolver(product, false)?;

    match command {
        VersionsCommand::Show => {
            let override_dir =
                std::env::var_os(product.cache_dir_env()).map(std::path::PathBuf::from);
            if let Some(dir) = JsonFileStore::default_dir(product.cache_namespace(), override_dir)
            {
                println!("{} {}", "Cache:".bold(), dir.display());
            }
            let record = resolver.cache();
            if record.versions.is_empty() {
                println!("No cached versions. Run `{} versions refresh`.", product.name());
                return Ok(());
            }
            println!(
                "{} {}",
                "Refreshed:".bold(),
                format_age(record.age_millis(now_millis()))
            );
            for (name, version) in &record.versions {
                let version = if version == LATEST {
                    version.dimmed()
                } else {
                    version.normal()
                };
                println!("  {:<36} {}", name, version);
            }
        }
        VersionsCommand::Refresh => {
            if resolver.options().offline {
                anyhow::bail!(
                    "Offline mode is on ({} is set), cannot refresh",
                    product.offline_env()
                );
            }
            let refreshed = resolver.prefetch_common().await;
            println!("Refreshed {} package versions", refreshed);
        }
        VersionsCommand::Clear => {
            resolver.clear().context("Failed to clear the version cache")?;
            println!("Version cache cleared");
        }
    }
    Ok(())
}
