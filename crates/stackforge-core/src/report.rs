//! Post-creation summary
//!
//! Everything here is a pure function of the configuration and the project
//! path; printing is left to the caller.

use crate::config::{FeatureConfig, ServicePlan, Stack, Styling};
use std::path::Path;

pub const HEALTH_PATH: &str = "/api/health";
pub const DOCS_PATH: &str = "/api/docs";

/// Port the stack's dev server listens on
pub fn default_port(stack: Stack) -> u16 {
    match stack {
        Stack::ReactVite => 5173,
        Stack::Expo => 8081,
        Stack::NextJs | Stack::T3 | Stack::Mern | Stack::Express | Stack::Nest => 3000,
    }
}

/// One HTTP route a generated backend serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Routes served by the generated backend, empty for frontend-only stacks
pub fn endpoints(config: &FeatureConfig) -> Vec<Endpoint> {
    if !config.stack().has_backend() {
        return Vec::new();
    }

    let mut routes = vec![Endpoint {
        method: "GET",
        path: HEALTH_PATH,
        description: "Health check",
    }];
    if config.needs_auth_files() {
        routes.extend([
            Endpoint {
                method: "POST",
                path: "/api/auth/register",
                description: "Create an account",
            },
            Endpoint {
                method: "POST",
                path: "/api/auth/login",
                description: "Exchange credentials for a token",
            },
            Endpoint {
                method: "GET",
                path: "/api/auth/me",
                description: "Current user (requires a bearer token)",
            },
        ]);
    }
    if config.include_api_docs() {
        routes.push(Endpoint {
            method: "GET",
            path: DOCS_PATH,
            description: "Interactive API documentation",
        });
    }
    routes
}

/// Commands that start the database container and apply the Prisma schema,
/// in that order. `server_dir` is the sub-project holding `docker-compose.yml`
/// and `prisma/` when the commands run from a workspace root.
pub fn database_setup(config: &FeatureConfig, server_dir: Option<&str>) -> Vec<String> {
    let mut steps = Vec::new();
    if config.include_container() && config.database().needs_server() {
        steps.push(match server_dir {
            Some(dir) => format!("docker compose -f {}/docker-compose.yml up -d db", dir),
            None => "docker compose up -d db".to_string(),
        });
    }
    if config.database().uses_prisma() {
        let migrate = format!(
            "{} prisma migrate dev --name init",
            config.package_manager().launcher_display()
        );
        steps.push(match server_dir {
            Some(dir) => format!("(cd {} && {})", dir, migrate),
            None => migrate,
        });
    }
    steps
}

/// Install commands for a styling choice the delegated create-* tool does not
/// set up itself
pub fn styling_setup(config: &FeatureConfig) -> Vec<String> {
    let pm = config.package_manager();
    match (config.stack(), config.styling()) {
        (Stack::NextJs | Stack::ReactVite, Some(Styling::StyledComponents)) => {
            vec![pm.add_command(&["styled-components"], false)]
        }
        (Stack::ReactVite, Some(Styling::Tailwind)) => {
            vec![pm.add_command(&["tailwindcss", "@tailwindcss/vite"], true)]
        }
        _ => Vec::new(),
    }
}

/// What the user has to know about styling on a delegated stack
fn styling_note(config: &FeatureConfig) -> Option<&'static str> {
    match (config.stack(), config.styling()?) {
        (Stack::NextJs | Stack::ReactVite, Styling::CssModules) => {
            Some("CSS Modules (built in, name stylesheets *.module.css)")
        }
        (Stack::NextJs | Stack::ReactVite, Styling::StyledComponents) => {
            Some("Styled Components (installed by the step below)")
        }
        (Stack::ReactVite, Styling::Tailwind) => Some(
            "Tailwind CSS (install it below, then add tailwindcss() to the plugins in vite.config and @import \"tailwindcss\" to src/index.css)",
        ),
        _ => None,
    }
}

/// Shell commands to run after creation, in order
pub fn next_steps(config: &FeatureConfig, project_path: &Path) -> Vec<String> {
    let pm = config.package_manager();
    let mut steps = vec![format!("cd {}", project_path.display())];

    // MERN keeps its server-side assets in the server sub-project
    let server_dir = (config.stack() == Stack::Mern).then_some(ServicePlan::SERVER_DIR);

    if config.stack().has_backend() {
        steps.push(match server_dir {
            Some(dir) => format!("cp {0}/.env.example {0}/.env", dir),
            None => "cp .env.example .env".to_string(),
        });
        steps.extend(database_setup(config, server_dir));
    }
    steps.extend(styling_setup(config));

    let script = if config.stack() == Stack::Expo {
        "start"
    } else {
        "dev"
    };
    steps.push(pm.run(script));
    steps
}

/// Human-readable summary printed once the project exists
pub fn render(config: &FeatureConfig, project_path: &Path) -> String {
    let mut out = format!(
        "Created {} project {} at {}\n\n",
        config.stack().display_name(),
        config.project_name(),
        project_path.display()
    );

    let port = default_port(config.stack());
    match config.stack() {
        Stack::Mern => {
            let client_port = default_port(Stack::ReactVite);
            out.push_str(&format!("  Client:       http://localhost:{}\n", client_port));
            out.push_str(&format!("  API:          http://localhost:{}\n", port));
        }
        Stack::Expo => {
            out.push_str(&format!("  Metro:        http://localhost:{}\n", port));
        }
        _ => {
            out.push_str(&format!("  Dev server:   http://localhost:{}\n", port));
        }
    }

    if let Some(note) = styling_note(config) {
        out.push_str(&format!("  Styling:      {}\n", note));
    }

    if config.stack().has_backend() {
        out.push_str(&format!(
            "  Health check: http://localhost:{}{}\n",
            port, HEALTH_PATH
        ));
        if config.include_api_docs() {
            out.push_str(&format!(
                "  API docs:     http://localhost:{}{}\n",
                port, DOCS_PATH
            ));
        }
        if config.needs_auth_files() {
            let auth: Vec<String> = endpoints(config)
                .iter()
                .filter(|e| e.path.starts_with("/api/auth"))
                .map(|e| format!("{} {}", e.method, e.path))
                .collect();
            out.push_str(&format!("  Auth:         {}\n", auth.join(", ")));
        }
        if config.has_database() {
            out.push_str(&format!(
                "  Database:     {}\n",
                config.database().display_name()
            ));
        }
    }

    out.push_str("\nNext steps:\n");
    for (i, step) in next_steps(config, project_path).iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    out
}
