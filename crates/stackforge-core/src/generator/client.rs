//! React + Vite client renderer, used for the browser half of a
//! multi-service project
//!
//! The dev server proxies `/api` to the API so the client can call relative
//! URLs. Server-side steps (database, auth, docs, containers) never pass their
//! gates for a client configuration and render nothing here.

use super::deps::dependency_plan;
use super::manifest::PackageJson;
use super::shared;
use super::steps::StepId;
use super::tree::{Code, FileKind, FileTree};
use super::{GenerateError, RenderContext, Renderer};
use crate::config::{FeatureConfig, Styling};
use crate::report::HEALTH_PATH;
use crate::templates::Profile;
use serde_json::json;

pub(crate) struct ViteClientRenderer;

impl Renderer for ViteClientRenderer {
    fn profile(&self) -> Profile {
        Profile::ViteClient
    }

    fn render(
        &self,
        step: StepId,
        ctx: &RenderContext<'_>,
        tree: &mut FileTree,
    ) -> Result<(), GenerateError> {
        let config = ctx.config;
        let styling = config.styling().unwrap_or_default();
        match step {
            StepId::Manifest => tree.add("package.json", FileKind::Manifest, manifest(ctx)?),
            StepId::EntryPoint => {
                tree.add("index.html", FileKind::Source, index_html(config))?;
                tree.add("src/main.tsx", FileKind::Source, MAIN_TSX)?;
                tree.add("src/App.tsx", FileKind::Source, app_tsx(config, styling))?;
                tree.add("src/index.css", FileKind::Source, index_css(styling))?;
                if styling == Styling::CssModules {
                    tree.add("src/App.module.css", FileKind::Source, APP_MODULE_CSS)?;
                }
                Ok(())
            }
            StepId::HealthRoute => tree.add("src/api/health.ts", FileKind::Source, health_client()),
            StepId::ErrorHandling => tree.add(
                "src/components/ErrorBoundary.tsx",
                FileKind::Source,
                ERROR_BOUNDARY,
            ),
            StepId::Toolchain => {
                tree.add("vite.config.ts", FileKind::Config, vite_config(styling))?;
                tree.add("tsconfig.json", FileKind::Config, tsconfig()?)?;
                tree.add("src/vite-env.d.ts", FileKind::Source, VITE_ENV)
            }
            StepId::TestScaffold => {
                tree.add("src/api/health.test.ts", FileKind::Source, HEALTH_TEST)
            }
            StepId::LintFormat => {
                let mut text = serde_json::to_string_pretty(&shared::prettier_config())?;
                text.push('\n');
                tree.add(".prettierrc", FileKind::Config, text)
            }
            StepId::EnvLoader
            | StepId::Database
            | StepId::Auth
            | StepId::ApiDocs
            | StepId::Container => Ok(()),
            StepId::EnvTemplate => tree.add(
                ".env.example",
                FileKind::EnvironmentTemplate,
                Code::new()
                    .line("# Base URL of the API. Leave empty to go through the dev server proxy.")
                    .line("VITE_API_URL=")
                    .finish(),
            ),
            StepId::Gitignore => tree.add(
                ".gitignore",
                FileKind::Config,
                shared::gitignore(config, &["# vite", "*.local"]),
            ),
            StepId::Readme => tree.add("README.md", FileKind::Documentation, readme(config)),
        }
    }
}

fn manifest(ctx: &RenderContext<'_>) -> Result<String, GenerateError> {
    let plan = dependency_plan(Profile::ViteClient, ctx.config);
    PackageJson::new(ctx.config.project_name().as_str())
        .field("type", "module")
        .script("dev", "vite")
        .script("build", "tsc --noEmit && vite build")
        .script("preview", "vite preview")
        .script("test", "vitest run --passWithNoTests")
        .script("lint", "prettier --check src")
        .script("format", "prettier --write src")
        .dependencies(&plan, ctx.versions)
        .render()
}

fn index_html(config: &FeatureConfig) -> String {
    let mut code = Code::new();
    code.block(
        r#"
<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />"#,
    )
    .line(format!("    <title>{}</title>", config.project_name()))
    .block(
        r#"
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>"#,
    );
    code.finish()
}

const MAIN_TSX: &str = r#"import { StrictMode } from 'react';
import { createRoot } from 'react-dom/client';
import App from './App';
import { ErrorBoundary } from './components/ErrorBoundary';
import './index.css';

const root = document.getElementById('root');
if (!root) {
  throw new Error('Missing #root element');
}

createRoot(root).render(
  <StrictMode>
    <ErrorBoundary>
      <App />
    </ErrorBoundary>
  </StrictMode>,
);
"#;

fn app_tsx(config: &FeatureConfig, styling: Styling) -> String {
    let title = config.project_name().as_str();
    let mut code = Code::new();
    code.line("import { useEffect, useState } from 'react';");
    match styling {
        Styling::StyledComponents => {
            code.line("import styled from 'styled-components';");
        }
        Styling::CssModules | Styling::Tailwind => {}
    }
    code.line("import { fetchHealth, type HealthStatus } from './api/health';");
    if styling == Styling::CssModules {
        code.line("import styles from './App.module.css';");
    }
    code.blank();

    if styling == Styling::StyledComponents {
        code.block(
            r#"
const Main = styled.main`
  display: flex;
  min-height: 100vh;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  gap: 1rem;
  font-family: system-ui, sans-serif;
`;

const Title = styled.h1`
  font-size: 2.25rem;
  margin: 0;
`;

const Status = styled.p`
  color: #475569;
`;
"#,
        );
    }

    code.block(
        r#"
export default function App() {
  const [health, setHealth] = useState<HealthStatus | null>(null);
  const [error, setError] = useState<string | null>(null);

  useEffect(() => {
    const controller = new AbortController();
    fetchHealth(controller.signal)
      .then(setHealth)
      .catch((err: unknown) => {
        if (!controller.signal.aborted) {
          setError(err instanceof Error ? err.message : String(err));
        }
      });
    return () => controller.abort();
  }, []);

  const status = error
    ? `API unreachable: ${error}`
    : health
      ? `API status: ${health.status}`
      : 'Checking API...';

  return ("#,
    );
    match styling {
        Styling::Tailwind => {
            code.line("    <main className=\"flex min-h-screen flex-col items-center justify-center gap-4 bg-slate-50 text-slate-900\">")
                .line(format!("      <h1 className=\"text-4xl font-bold\">{}</h1>", title))
                .line("      <p className=\"text-slate-600\">{status}</p>")
                .line("    </main>");
        }
        Styling::CssModules => {
            code.line("    <main className={styles.main}>")
                .line(format!("      <h1 className={{styles.title}}>{}</h1>", title))
                .line("      <p className={styles.status}>{status}</p>")
                .line("    </main>");
        }
        Styling::StyledComponents => {
            code.line("    <Main>")
                .line(format!("      <Title>{}</Title>", title))
                .line("      <Status>{status}</Status>")
                .line("    </Main>");
        }
    }
    code.line("  );").line("}");
    code.finish()
}

fn index_css(styling: Styling) -> &'static str {
    match styling {
        Styling::Tailwind => "@import \"tailwindcss\";\n",
        Styling::CssModules | Styling::StyledComponents => {
            r#"*,
*::before,
*::after {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, sans-serif;
  background: #f8fafc;
  color: #0f172a;
}
"#
        }
    }
}

const APP_MODULE_CSS: &str = r#".main {
  display: flex;
  min-height: 100vh;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  gap: 1rem;
}

.title {
  font-size: 2.25rem;
  margin: 0;
}

.status {
  color: #475569;
}
"#;

fn health_client() -> String {
    let mut code = Code::new();
    code.line(format!("export const HEALTH_PATH = '{}';", HEALTH_PATH))
        .block(
            r#"

export interface HealthStatus {
  status: string;
  uptime: number;
  timestamp: string;
}

const baseUrl = import.meta.env.VITE_API_URL ?? '';

export async function fetchHealth(signal?: AbortSignal): Promise<HealthStatus> {
  const response = await fetch(`${baseUrl}${HEALTH_PATH}`, { signal });
  if (!response.ok) {
    throw new Error(`Health check failed with status ${response.status}`);
  }
  return (await response.json()) as HealthStatus;
}"#,
        );
    code.finish()
}

const HEALTH_TEST: &str = r#"import { afterEach, describe, expect, it, vi } from 'vitest';
import { fetchHealth, HEALTH_PATH } from './health';

describe('fetchHealth', () => {
  afterEach(() => {
    vi.unstubAllGlobals();
  });

  it('requests the health endpoint', async () => {
    const fetchMock = vi.fn().mockResolvedValue({
      ok: true,
      json: async () => ({ status: 'ok', uptime: 1, timestamp: '' }),
    });
    vi.stubGlobal('fetch', fetchMock);

    await expect(fetchHealth()).resolves.toMatchObject({ status: 'ok' });
    expect(fetchMock.mock.calls[0][0]).toContain(HEALTH_PATH);
  });
});
"#;

const ERROR_BOUNDARY: &str = r#"import { Component, type ErrorInfo, type ReactNode } from 'react';

interface Props {
  children: ReactNode;
}

interface State {
  error: Error | null;
}

export class ErrorBoundary extends Component<Props, State> {
  state: State = { error: null };

  static getDerivedStateFromError(error: Error): State {
    return { error };
  }

  componentDidCatch(error: Error, info: ErrorInfo): void {
    console.error(error, info.componentStack);
  }

  render() {
    if (this.state.error) {
      return (
        <div role="alert">
          <h1>Something went wrong</h1>
          <pre>{this.state.error.message}</pre>
        </div>
      );
    }
    return this.props.children;
  }
}
"#;

fn vite_config(styling: Styling) -> String {
    let tailwind = styling == Styling::Tailwind;
    let server_port = Profile::ExpressApi.default_port();

    let mut code = Code::new();
    code.line("import { defineConfig } from 'vite';")
        .line("import react from '@vitejs/plugin-react';")
        .line_if(tailwind, "import tailwindcss from '@tailwindcss/vite';")
        .blank()
        .line("export default defineConfig({");
    if tailwind {
        code.line("  plugins: [react(), tailwindcss()],");
    } else {
        code.line("  plugins: [react()],");
    }
    code.line("  server: {")
        .line(format!("    port: {},", Profile::ViteClient.default_port()))
        .line("    proxy: {")
        .line(format!("      '/api': 'http://localhost:{}',", server_port))
        .line("    },")
        .line("  },")
        .line("});");
    code.finish()
}

fn tsconfig() -> Result<String, GenerateError> {
    let value = json!({
        "compilerOptions": {
            "target": "ES2020",
            "useDefineForClassFields": true,
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "skipLibCheck": true,
            "moduleResolution": "bundler",
            "allowImportingTsExtensions": true,
            "isolatedModules": true,
            "moduleDetection": "force",
            "noEmit": true,
            "jsx": "react-jsx",
            "strict": true,
            "noUnusedLocals": true,
            "noUnusedParameters": true,
            "noFallthroughCasesInSwitch": true
        },
        "include": ["src"]
    });
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

const VITE_ENV: &str = r#"/// <reference types="vite/client" />

interface ImportMetaEnv {
  readonly VITE_API_URL?: string;
}

interface ImportMeta {
  readonly env: ImportMetaEnv;
}
"#;

fn readme(config: &FeatureConfig) -> String {
    let pm = config.package_manager();
    let mut code = Code::new();
    code.line(format!("# {}", config.project_name()))
        .blank()
        .line("React client built with Vite.")
        .blank()
        .line("```bash")
        .line(pm.install_command())
        .line(pm.run("dev"))
        .line("```")
        .blank()
        .line(format!(
            "The dev server runs on http://localhost:{} and forwards `/api` requests to the API on port {}.",
            Profile::ViteClient.default_port(),
            Profile::ExpressApi.default_port()
        ));
    code.finish()
}
