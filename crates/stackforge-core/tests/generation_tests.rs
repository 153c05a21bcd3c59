mod common;

use common::{
    backend_matrix, build, declares, import_specifiers, is_script, manifest, owning_manifest,
    package_name, resolve,
};
use semver::VersionReq;
use stackforge_core::config::{ConfigIssue, FeatureConfig, RawAnswers};
use stackforge_core::report::{database_setup, next_steps};
use stackforge_core::versions::{is_installable, PinnedVersions};
use stackforge_core::{generate, FileTree};
use std::collections::BTreeSet;
use std::path::Path;

fn generate_bundled(config: &FeatureConfig) -> FileTree {
    generate(config, &PinnedVersions::bundled()).unwrap()
}

fn every_configuration() -> Vec<FeatureConfig> {
    let mut configs: Vec<FeatureConfig> = ["express", "nest", "mern"]
        .iter()
        .flat_map(|stack| backend_matrix(stack))
        .map(build)
        .collect();
    for styling in ["tailwind", "css-modules", "styled-components"] {
        configs.push(build(RawAnswers {
            styling: Some(styling.to_string()),
            ..RawAnswers::for_stack("styled-shop", "mern")
        }));
    }
    configs
}

fn describe(config: &FeatureConfig) -> String {
    format!(
        "{} db={} auth={} docs={} container={}",
        config.stack(),
        config.database(),
        config.include_auth(),
        config.include_api_docs(),
        config.include_container()
    )
}

#[test]
fn generation_is_deterministic() {
    for config in every_configuration() {
        assert_eq!(
            generate_bundled(&config),
            generate_bundled(&config),
            "{}",
            describe(&config)
        );
    }
}

#[test]
fn relative_imports_resolve_inside_the_tree() {
    for config in every_configuration() {
        let tree = generate_bundled(&config);
        for file in tree.files().filter(|f| is_script(&f.path)) {
            for specifier in import_specifiers(&file.content) {
                if !specifier.starts_with('.') {
                    continue;
                }
                assert!(
                    resolve(&tree, &file.path, &specifier).is_some(),
                    "{}: {} imports missing {}",
                    describe(&config),
                    file.path,
                    specifier
                );
            }
        }
    }
}

#[test]
fn bare_imports_are_declared_in_the_owning_manifest() {
    for config in every_configuration() {
        let tree = generate_bundled(&config);
        for file in tree.files().filter(|f| is_script(&f.path)) {
            let manifest_path = owning_manifest(&tree, &file.path)
                .unwrap_or_else(|| panic!("{} has no package.json", file.path));
            let pkg = manifest(&tree, &manifest_path);

            for specifier in import_specifiers(&file.content) {
                if specifier.starts_with('.') || specifier.starts_with("node:") {
                    continue;
                }
                let name = package_name(&specifier);
                assert!(
                    declares(&pkg, &name),
                    "{}: {} imports {} which {} does not declare",
                    describe(&config),
                    file.path,
                    name,
                    manifest_path
                );
            }
        }
    }
}

#[test]
fn manifest_versions_are_installable_ranges() {
    for config in every_configuration() {
        let tree = generate_bundled(&config);
        let manifests: Vec<String> = tree
            .paths()
            .filter(|p| p.ends_with("package.json"))
            .map(String::from)
            .collect();
        for path in manifests {
            let pkg = manifest(&tree, &path);
            for section in ["dependencies", "devDependencies"] {
                let Some(deps) = pkg[section].as_object() else {
                    continue;
                };
                for (name, range) in deps {
                    let range = range.as_str().unwrap();
                    assert!(
                        is_installable(range),
                        "{} {} has {}",
                        path,
                        name,
                        range
                    );
                    assert!(VersionReq::parse(range).is_ok(), "{} {}", name, range);
                }
            }
        }
    }
}

#[test]
fn script_entry_points_exist() {
    for config in every_configuration() {
        let tree = generate_bundled(&config);
        let paths: Vec<String> = tree.paths().map(String::from).collect();
        let prefix = |dir: &str| {
            if config.services().is_some() {
                format!("{}/", dir)
            } else {
                String::new()
            }
        };

        match config.stack().as_str() {
            "express" | "mern" => {
                let root = prefix("server");
                let pkg = manifest(&tree, &format!("{}package.json", root));
                assert_eq!(pkg["main"], "dist/index.js");
                assert_eq!(pkg["scripts"]["start"], "node dist/index.js");
                let dev = pkg["scripts"]["dev"].as_str().unwrap();
                let entry = dev.rsplit(' ').next().unwrap();
                assert!(
                    tree.contains(&format!("{}{}", root, entry)),
                    "{}: dev script points at {}",
                    describe(&config),
                    entry
                );
            }
            "nest" => {
                let pkg = manifest(&tree, "package.json");
                assert_eq!(pkg["scripts"]["start"], "node dist/main");
                assert!(tree.contains("src/main.ts"));
                assert!(tree.contains("nest-cli.json"));
            }
            other => panic!("unexpected stack {}", other),
        }

        if config.services().is_some() {
            let html = &tree.get("client/index.html").unwrap().content;
            assert!(html.contains("src=\"/src/main.tsx\""));
            assert!(paths.contains(&"client/src/main.tsx".to_string()));
        }
    }
}

#[test]
fn gated_files_only_appear_with_their_feature() {
    for config in every_configuration() {
        let tree = generate_bundled(&config);
        let paths: Vec<&str> = tree.paths().collect();
        let any = |needles: &[&str]| {
            paths
                .iter()
                .any(|p| needles.iter().any(|n| p.contains(n)))
        };
        let label = describe(&config);

        assert_eq!(any(&["auth"]), config.needs_auth_files(), "{}", label);
        assert_eq!(any(&["swagger"]), config.include_api_docs(), "{}", label);
        assert_eq!(
            any(&["Dockerfile", "docker-compose.yml", ".dockerignore"]),
            config.include_container(),
            "{}",
            label
        );
        if !config.has_database() {
            assert!(
                !any(&["prisma", "db/", "database", "models/", "schemas/", "users/"]),
                "{}",
                label
            );
        }
        if !config.needs_env_schema() {
            assert!(!any(&["config/env"]), "{}", label);
        }
    }
}

#[test]
fn auth_without_database_is_rejected() {
    for stack in ["express", "nest", "mern"] {
        let err = FeatureConfig::build(RawAnswers {
            database: Some("none".to_string()),
            include_auth: Some(true),
            ..RawAnswers::for_stack("app", stack)
        })
        .unwrap_err();
        assert!(
            err.issues
                .iter()
                .any(|i| matches!(i, ConfigIssue::AuthRequiresDatabase { .. })),
            "{}",
            stack
        );
    }
}

#[test]
fn auth_defaults_to_off_without_database() {
    let config = build(RawAnswers {
        database: Some("none".to_string()),
        ..RawAnswers::for_stack("app", "express")
    });
    assert!(!config.include_auth());
    assert!(!config.needs_auth_files());
}

#[test]
fn minimal_express_scenario() {
    let config = build(RawAnswers {
        database: Some("none".to_string()),
        include_auth: Some(false),
        include_api_docs: Some(false),
        include_container: Some(false),
        ..RawAnswers::for_stack("tiny-api", "express")
    });
    let tree = generate_bundled(&config);

    let paths: Vec<&str> = tree.paths().collect();
    assert_eq!(
        paths,
        vec![
            ".env.example",
            ".gitignore",
            "README.md",
            "package.json",
            "src/index.ts",
            "src/routes/health.ts",
        ]
    );
}

#[test]
fn full_express_scenario() {
    let minimal = generate_bundled(&build(RawAnswers {
        database: Some("none".to_string()),
        include_auth: Some(false),
        include_api_docs: Some(false),
        include_container: Some(false),
        ..RawAnswers::for_stack("shop-api", "express")
    }));
    let config = build(RawAnswers {
        database: Some("postgresql".to_string()),
        use_orm: Some(true),
        include_auth: Some(true),
        include_api_docs: Some(true),
        include_container: Some(true),
        ..RawAnswers::for_stack("shop-api", "express")
    });
    let tree = generate_bundled(&config);

    for path in minimal.paths() {
        assert!(tree.contains(path), "full tree lacks {}", path);
    }
    for path in [
        "src/config/env.ts",
        "src/db/client.ts",
        "prisma/schema.prisma",
        "src/middleware/auth.middleware.ts",
        "src/controllers/auth.controller.ts",
        "src/routes/auth.routes.ts",
        "src/validators/auth.validators.ts",
        "src/docs/swagger.ts",
        "Dockerfile",
        "docker-compose.yml",
        ".dockerignore",
    ] {
        assert!(tree.contains(path), "full tree lacks {}", path);
    }

    let pkg = manifest(&tree, "package.json");
    for name in [
        "express",
        "@prisma/client",
        "jsonwebtoken",
        "bcryptjs",
        "zod",
        "swagger-ui-express",
    ] {
        let range = pkg["dependencies"][name].as_str().unwrap();
        assert!(VersionReq::parse(range).is_ok(), "{} = {}", name, range);
    }
    assert!(pkg["devDependencies"].get("prisma").is_some());
    let readme = &tree.get("README.md").unwrap().content;
    assert!(readme.contains("npx --yes prisma migrate dev"));

    let env = &tree.get(".env.example").unwrap().content;
    assert!(env.contains("DATABASE_URL="));
    assert!(env.contains("JWT_SECRET="));
}

#[test]
fn pinned_versions_flow_into_manifests() {
    let config = build(RawAnswers::for_stack("pinned", "express"));
    let versions = PinnedVersions::bundled().with("express", "^9.9.9");
    let tree = generate(&config, &versions).unwrap();
    assert_eq!(manifest(&tree, "package.json")["dependencies"]["express"], "^9.9.9");
}

fn script_names(tree: &FileTree, path: &str) -> BTreeSet<String> {
    manifest(tree, path)["scripts"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn script_names_are_fixed_per_stack() {
    for (stack, manifests) in [
        ("express", &["package.json"][..]),
        ("nest", &["package.json"][..]),
        ("mern", &["package.json", "server/package.json", "client/package.json"][..]),
    ] {
        let configs: Vec<FeatureConfig> = backend_matrix(stack).into_iter().map(build).collect();
        let first = generate_bundled(&configs[0]);
        for path in manifests {
            let expected = script_names(&first, path);
            for config in &configs[1..] {
                let tree = generate_bundled(config);
                assert_eq!(
                    script_names(&tree, path),
                    expected,
                    "{}: {}",
                    describe(config),
                    path
                );
            }
        }
    }
}

#[test]
fn next_steps_start_the_database_before_migrating() {
    for config in every_configuration() {
        let steps = next_steps(&config, Path::new("app"));
        let position = |needle: &str| steps.iter().position(|s| s.contains(needle));
        let label = describe(&config);

        let dev = steps
            .iter()
            .position(|s| s.ends_with(" dev"))
            .unwrap_or_else(|| panic!("{}: no dev step", label));
        assert_eq!(dev, steps.len() - 1, "{}", label);
        if let Some(migrate) = position("prisma migrate") {
            assert!(migrate < dev, "{}", label);
            if let Some(up) = position("up -d db") {
                assert!(up < migrate, "{}", label);
            }
        }
        assert!(
            !steps.iter().any(|s| s.ends_with("up -d")),
            "{}: starts the app container next to the dev server",
            label
        );
    }
}

#[test]
fn readme_lists_the_same_database_setup_as_next_steps() {
    for config in every_configuration() {
        let tree = generate_bundled(&config);
        let readme = &tree.get("README.md").unwrap().content;
        let setup = match config.services() {
            Some(plan) => database_setup(&plan.server, Some("server")),
            None => database_setup(&config, None),
        };

        let steps = next_steps(&config, Path::new("app"));
        let mut from = 0;
        for command in &setup {
            assert!(steps.contains(command), "{}: {}", describe(&config), command);
            let found = readme[from..]
                .find(command.as_str())
                .unwrap_or_else(|| panic!("{}: README lacks {}", describe(&config), command));
            from += found + command.len();
        }
    }
}
