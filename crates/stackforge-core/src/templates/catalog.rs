//! Listing of every stack the tool can create

use super::strategy::{strategy_kind, StrategyKind};
use crate::config::{Category, Stack};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub stack: Stack,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub kind: StrategyKind,
}

fn description(stack: Stack) -> &'static str {
    match stack {
        Stack::NextJs => "Next.js App Router with optional Tailwind CSS and shadcn/ui",
        Stack::T3 => "Next.js, tRPC, Prisma, NextAuth and Tailwind CSS",
        Stack::ReactVite => "Single-page React app built with Vite",
        Stack::Mern => "Express API and React client in one workspace",
        Stack::Express => "Express REST API with optional database, JWT auth, Swagger and Docker",
        Stack::Nest => "Modular NestJS API with optional database, JWT auth, Swagger and Docker",
        Stack::Expo => "Cross-platform mobile app with Expo Router",
    }
}

/// Every stack in display order
pub fn catalog() -> Vec<CatalogEntry> {
    Stack::ALL
        .iter()
        .map(|stack| CatalogEntry {
            stack: *stack,
            name: stack.display_name(),
            description: description(*stack),
            category: stack.category(),
            kind: strategy_kind(*stack),
        })
        .collect()
}

/// Catalog entries of one category
pub fn by_category(category: Category) -> Vec<CatalogEntry> {
    catalog()
        .into_iter()
        .filter(|entry| entry.category == category)
        .collect()
}
