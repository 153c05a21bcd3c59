//! Mapping from a feature configuration to a generation strategy

use crate::config::{ExpoTemplate, FeatureConfig, PackageManager, Stack, Styling};
use crate::runtime::Invocation;

/// File layout family rendered by the in-repo generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Express, grouped by technical layer
    ExpressApi,
    /// NestJS, grouped by feature module
    NestApi,
    /// React + Vite client of a multi-service project
    ViteClient,
}

impl Profile {
    pub fn for_stack(stack: Stack) -> Option<Profile> {
        match stack {
            Stack::Express => Some(Profile::ExpressApi),
            Stack::Nest => Some(Profile::NestApi),
            Stack::ReactVite => Some(Profile::ViteClient),
            Stack::NextJs | Stack::T3 | Stack::Mern | Stack::Expo => None,
        }
    }

    /// Port the dev server listens on
    pub fn default_port(&self) -> u16 {
        match self {
            Profile::ExpressApi | Profile::NestApi => 3000,
            Profile::ViteClient => 5173,
        }
    }
}

/// Optional follow-up tool run inside the generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryTool {
    pub name: &'static str,
    pub invocation: Invocation,
}

/// Hand generation to an external create-* tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    /// Package to execute, e.g. `create-next-app@latest`
    pub tool: &'static str,
    /// Arguments in the tool's own flag vocabulary
    pub args: Vec<String>,
    /// The tool installs dependencies itself unless told not to
    pub installs_dependencies: bool,
    pub skip_install_flag: Option<&'static str>,
    pub secondary: Option<SecondaryTool>,
}

impl Delegation {
    /// Full command line, launched through the package manager's runner
    pub fn invocation(&self, pm: PackageManager, install: bool) -> Invocation {
        let (program, launcher_args) = pm.launcher();
        let mut invocation = Invocation::new(program)
            .args(launcher_args.iter().copied())
            .arg(self.tool)
            .args(self.args.iter().cloned());
        if !install && self.installs_dependencies {
            if let Some(flag) = self.skip_install_flag {
                invocation = invocation.arg(flag);
            }
        }
        invocation
    }

    /// Whether dependencies are already installed once the tool finishes
    pub fn will_install(&self, install: bool) -> bool {
        self.installs_dependencies && (install || self.skip_install_flag.is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Single(Profile),
    /// Server and client sub-trees plus a root workspace manifest
    MultiService { server: Profile, client: Profile },
}

/// Render the tree with the in-repo generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub layout: Layout,
    /// Directories (relative to the project root) that need an install
    pub install_dirs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Delegate(Delegation),
    Assemble(Assembly),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Delegated,
    Assembled,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Delegated => "delegated",
            StrategyKind::Assembled => "assembled",
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Delegate(_) => StrategyKind::Delegated,
            Strategy::Assemble(_) => StrategyKind::Assembled,
        }
    }
}

/// Strategy kind for a stack, independent of any other option
pub fn strategy_kind(stack: Stack) -> StrategyKind {
    match stack {
        Stack::NextJs | Stack::T3 | Stack::ReactVite | Stack::Expo => StrategyKind::Delegated,
        Stack::Express | Stack::Nest | Stack::Mern => StrategyKind::Assembled,
    }
}

/// One-off package binary run through the package manager's launcher
pub fn launch(pm: PackageManager, args: &[&str]) -> Invocation {
    let (program, launcher_args) = pm.launcher();
    Invocation::new(program)
        .args(launcher_args.iter().copied())
        .args(args.iter().copied())
}

pub(crate) fn shadcn_init(pm: PackageManager) -> SecondaryTool {
    SecondaryTool {
        name: "shadcn/ui",
        invocation: launch(pm, &["shadcn@latest", "init", "-y", "--defaults"]),
    }
}

fn nativewind_install(pm: PackageManager) -> SecondaryTool {
    SecondaryTool {
        name: "NativeWind",
        invocation: launch(pm, &["expo", "install", "nativewind", "tailwindcss"]),
    }
}

fn next_app(config: &FeatureConfig) -> Delegation {
    let pm = config.package_manager();
    let mut args = vec![config.project_name().to_string()];
    args.push(if config.typescript() { "--ts" } else { "--js" }.to_string());
    args.push(
        if config.styling() == Some(Styling::Tailwind) {
            "--tailwind"
        } else {
            "--no-tailwind"
        }
        .to_string(),
    );
    args.extend(
        [
            "--app",
            "--no-src-dir",
            "--import-alias",
            "@/*",
            "--eslint",
            "--no-git",
            "--yes",
        ]
        .map(String::from),
    );
    args.push(format!("--use-{}", pm.as_str()));

    Delegation {
        tool: "create-next-app@latest",
        args,
        installs_dependencies: true,
        skip_install_flag: Some("--skip-install"),
        secondary: config.shadcn().then(|| shadcn_init(pm)),
    }
}

fn t3_app(config: &FeatureConfig) -> Delegation {
    let mut args = vec![config.project_name().to_string()];
    args.extend(
        [
            "--CI",
            "--tailwind",
            "--trpc",
            "--prisma",
            "--nextAuth",
            "--appRouter",
            "--noGit",
        ]
        .map(String::from),
    );

    Delegation {
        tool: "create-t3-app@latest",
        args,
        installs_dependencies: true,
        skip_install_flag: Some("--noInstall"),
        secondary: config.shadcn().then(|| shadcn_init(config.package_manager())),
    }
}

fn vite_app(config: &FeatureConfig) -> Delegation {
    let template = if config.typescript() { "react-ts" } else { "react" };
    Delegation {
        tool: "create-vite@latest",
        args: vec![
            config.project_name().to_string(),
            "--template".to_string(),
            template.to_string(),
        ],
        installs_dependencies: false,
        skip_install_flag: None,
        secondary: None,
    }
}

fn expo_app(config: &FeatureConfig) -> Delegation {
    let template = config
        .mobile()
        .map(|m| m.template)
        .unwrap_or_default();
    let template = match template {
        ExpoTemplate::Tabs => "tabs",
        ExpoTemplate::Blank => "blank-typescript",
    };
    Delegation {
        tool: "create-expo-app@latest",
        args: vec![
            config.project_name().to_string(),
            "--template".to_string(),
            template.to_string(),
        ],
        installs_dependencies: true,
        skip_install_flag: Some("--no-install"),
        secondary: config
            .nativewind()
            .then(|| nativewind_install(config.package_manager())),
    }
}

/// Choose how a configuration gets generated
pub fn select_strategy(config: &FeatureConfig) -> Strategy {
    match config.stack() {
        Stack::NextJs => Strategy::Delegate(next_app(config)),
        Stack::T3 => Strategy::Delegate(t3_app(config)),
        Stack::ReactVite => Strategy::Delegate(vite_app(config)),
        Stack::Expo => Strategy::Delegate(expo_app(config)),
        Stack::Express => Strategy::Assemble(Assembly {
            layout: Layout::Single(Profile::ExpressApi),
            install_dirs: vec![".".to_string()],
        }),
        Stack::Nest => Strategy::Assemble(Assembly {
            layout: Layout::Single(Profile::NestApi),
            install_dirs: vec![".".to_string()],
        }),
        Stack::Mern => Strategy::Assemble(Assembly {
            layout: Layout::MultiService {
                server: Profile::ExpressApi,
                client: Profile::ViteClient,
            },
            install_dirs: vec![
                ".".to_string(),
                "server".to_string(),
                "client".to_string(),
            ],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawAnswers;

    fn config(raw: RawAnswers) -> FeatureConfig {
        FeatureConfig::build(raw).unwrap()
    }

    fn delegation(raw: RawAnswers) -> Delegation {
        match select_strategy(&config(raw)) {
            Strategy::Delegate(d) => d,
            other => panic!("expected delegation, got {:?}", other),
        }
    }

    #[test]
    fn test_every_stack_maps_to_its_kind() {
        for stack in Stack::ALL {
            let cfg = config(RawAnswers::for_stack("app", stack.as_str()));
            assert_eq!(select_strategy(&cfg).kind(), strategy_kind(stack), "{}", stack);
        }
    }

    #[test]
    fn test_next_flags_follow_config() {
        let d = delegation(RawAnswers {
            package_manager: Some("pnpm".to_string()),
            typescript: Some(false),
            styling: Some("css-modules".to_string()),
            ..RawAnswers::for_stack("site", "nextjs")
        });
        assert_eq!(d.tool, "create-next-app@latest");
        assert_eq!(d.args[0], "site");
        assert!(d.args.contains(&"--js".to_string()));
        assert!(d.args.contains(&"--no-tailwind".to_string()));
        assert!(d.args.contains(&"--use-pnpm".to_string()));
        assert!(d.secondary.is_none());
    }

    #[test]
    fn test_next_with_shadcn_gets_secondary_tool() {
        let d = delegation(RawAnswers {
            shadcn: Some(true),
            package_manager: Some("bun".to_string()),
            ..RawAnswers::for_stack("site", "nextjs")
        });
        let secondary = d.secondary.unwrap();
        assert_eq!(
            secondary.invocation.to_string(),
            "bunx shadcn@latest init -y --defaults"
        );
    }

    #[test]
    fn test_vite_template_flag() {
        let d = delegation(RawAnswers::for_stack("spa", "react-vite"));
        assert_eq!(d.args, vec!["spa", "--template", "react-ts"]);
        assert!(!d.installs_dependencies);
        assert!(!d.will_install(true));
    }

    #[test]
    fn test_invocation_uses_launcher_and_skip_flag() {
        let d = delegation(RawAnswers::for_stack("site", "t3"));
        let inv = d.invocation(PackageManager::Npm, false);
        assert_eq!(inv.program, "npx");
        assert_eq!(inv.args[0], "--yes");
        assert_eq!(inv.args[1], "create-t3-app@latest");
        assert_eq!(inv.args.last().map(String::as_str), Some("--noInstall"));
        assert!(!d.will_install(false));
        assert!(d.will_install(true));

        let inv = d.invocation(PackageManager::Pnpm, true);
        assert_eq!(inv.program, "pnpm");
        assert_eq!(inv.args[0], "dlx");
        assert!(!inv.args.contains(&"--noInstall".to_string()));
    }

    #[test]
    fn test_expo_template_and_nativewind() {
        let d = delegation(RawAnswers {
            expo_template: Some("blank".to_string()),
            nativewind: Some(true),
            ..RawAnswers::for_stack("mobile", "expo")
        });
        assert_eq!(d.args, vec!["mobile", "--template", "blank-typescript"]);
        assert_eq!(d.secondary.unwrap().name, "NativeWind");
    }

    #[test]
    fn test_mern_layout() {
        let cfg = config(RawAnswers::for_stack("shop", "mern"));
        match select_strategy(&cfg) {
            Strategy::Assemble(assembly) => {
                assert_eq!(
                    assembly.layout,
                    Layout::MultiService {
                        server: Profile::ExpressApi,
                        client: Profile::ViteClient
                    }
                );
                assert_eq!(assembly.install_dirs, vec![".", "server", "client"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
