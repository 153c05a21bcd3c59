//! Multi-service composition
//!
//! A multi-service project is two ordinary generations, one per service, moved
//! under their directories, plus a thin root: a manifest whose scripts fan out
//! to both services, a README and a `.gitignore`.

use super::deps::workspace_plan;
use super::manifest::PackageJson;
use super::tree::{Code, FileKind, FileTree};
use super::{generate_profile, GenerateError};
use crate::config::{FeatureConfig, ServicePlan};
use crate::report::{database_setup, default_port, endpoints};
use crate::templates::Profile;
use crate::versions::VersionSource;

const SERVER: &str = ServicePlan::SERVER_DIR;
const CLIENT: &str = ServicePlan::CLIENT_DIR;

pub(crate) fn compose(
    config: &FeatureConfig,
    server: Profile,
    client: Profile,
    versions: &dyn VersionSource,
) -> Result<FileTree, GenerateError> {
    // Only multi-service stacks split; anything else renders as the server alone
    let Some(plan) = config.services() else {
        return generate_profile(server, config, versions);
    };

    let mut tree = FileTree::new();
    tree.merge_under(SERVER, generate_profile(server, &plan.server, versions)?)?;
    tree.merge_under(CLIENT, generate_profile(client, &plan.client, versions)?)?;

    tree.add("package.json", FileKind::Manifest, root_manifest(config, versions)?)?;
    tree.add("README.md", FileKind::Documentation, root_readme(config, &plan))?;
    tree.add(".gitignore", FileKind::Config, ROOT_GITIGNORE)?;
    Ok(tree)
}

fn root_manifest(
    config: &FeatureConfig,
    versions: &dyn VersionSource,
) -> Result<String, GenerateError> {
    let pm = config.package_manager();
    let both = |script: &str| {
        format!(
            "{} && {}",
            pm.run_in(SERVER, script),
            pm.run_in(CLIENT, script)
        )
    };

    PackageJson::new(config.project_name().as_str())
        .script(
            "dev",
            format!(
                "concurrently -n {},{} -c blue,green \"{}\" \"{}\"",
                SERVER,
                CLIENT,
                pm.run_in(SERVER, "dev"),
                pm.run_in(CLIENT, "dev")
            ),
        )
        .script("build", both("build"))
        .script("start", pm.run_in(SERVER, "start"))
        .script("test", both("test"))
        .script(
            "setup",
            format!("{} && {}", pm.install_in(SERVER), pm.install_in(CLIENT)),
        )
        .dependencies(&workspace_plan(), versions)
        .render()
}

fn root_readme(config: &FeatureConfig, plan: &ServicePlan) -> String {
    let pm = config.package_manager();
    let mut code = Code::new();
    code.line(format!("# {}", config.project_name()))
        .blank()
        .line(format!(
            "Full-stack project: an Express API in `{}/` and a React client in `{}/`.",
            SERVER, CLIENT
        ))
        .blank()
        .line("## Getting started")
        .blank()
        .line("```bash")
        .line(pm.install_command())
        .line(pm.run("setup"))
        .line(format!("cp {0}/.env.example {0}/.env", SERVER));
    for step in database_setup(&plan.server, Some(SERVER)) {
        code.line(step);
    }
    code.line(pm.run("dev"))
        .line("```")
        .blank()
        .line(format!(
            "The client runs on http://localhost:{} and the API on http://localhost:{}.",
            Profile::ViteClient.default_port(),
            default_port(config.stack())
        ))
        .blank()
        .line("## API")
        .blank();
    for endpoint in endpoints(config) {
        code.line(format!(
            "- `{} {}`: {}",
            endpoint.method, endpoint.path, endpoint.description
        ));
    }
    code.finish()
}

const ROOT_GITIGNORE: &str = r#"node_modules/
.env
*.log
.DS_Store
"#;
