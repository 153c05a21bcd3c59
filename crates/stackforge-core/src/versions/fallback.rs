//! Bundled version table used when neither the registry nor the cache can answer
//!
//! Refresh these periodically; they only need to be installable, not latest.

const FALLBACK_VERSIONS: &[(&str, &str)] = &[
    // Express
    ("express", "^4.21.2"),
    ("helmet", "^8.0.0"),
    ("cors", "^2.8.5"),
    ("dotenv", "^16.4.7"),
    ("zod", "^3.24.1"),
    ("@types/express", "^4.17.21"),
    ("@types/node", "^22.10.5"),
    ("@types/cors", "^2.8.17"),
    ("typescript", "^5.7.3"),
    ("tsx", "^4.19.2"),
    ("tsup", "^8.3.5"),
    ("vitest", "^2.1.8"),
    ("jest", "^29.7.0"),
    ("@types/jest", "^29.5.14"),
    ("prettier", "^3.4.2"),
    ("supertest", "^7.0.0"),
    ("@types/supertest", "^6.0.2"),
    // Databases
    ("@prisma/client", "^6.2.1"),
    ("prisma", "^6.2.1"),
    ("mongoose", "^8.9.3"),
    ("pg", "^8.13.1"),
    ("@types/pg", "^8.11.10"),
    ("mongodb", "^6.12.0"),
    ("better-sqlite3", "^11.8.1"),
    ("@types/better-sqlite3", "^7.6.12"),
    // Auth
    ("jsonwebtoken", "^9.0.2"),
    ("bcryptjs", "^2.4.3"),
    ("@types/jsonwebtoken", "^9.0.7"),
    ("@types/bcryptjs", "^2.4.6"),
    // API docs
    ("swagger-ui-express", "^5.0.1"),
    ("swagger-jsdoc", "^6.2.8"),
    ("@types/swagger-ui-express", "^4.1.6"),
    ("@types/swagger-jsdoc", "^6.0.4"),
    // NestJS
    ("@nestjs/common", "^10.4.15"),
    ("@nestjs/core", "^10.4.15"),
    ("@nestjs/platform-express", "^10.4.15"),
    ("@nestjs/config", "^3.3.0"),
    ("@nestjs/cli", "^10.4.9"),
    ("@nestjs/schematics", "^10.2.3"),
    ("@nestjs/testing", "^10.4.15"),
    ("@nestjs/mongoose", "^10.1.0"),
    ("@nestjs/passport", "^10.0.3"),
    ("@nestjs/jwt", "^10.2.0"),
    ("@nestjs/swagger", "^8.0.7"),
    ("class-validator", "^0.14.1"),
    ("class-transformer", "^0.5.1"),
    ("reflect-metadata", "^0.2.2"),
    ("rxjs", "^7.8.1"),
    ("ts-jest", "^29.2.5"),
    ("passport", "^0.7.0"),
    ("passport-jwt", "^4.0.1"),
    ("@types/passport-jwt", "^4.0.1"),
    // React client
    ("react", "^18.3.1"),
    ("react-dom", "^18.3.1"),
    ("@types/react", "^18.3.18"),
    ("@types/react-dom", "^18.3.5"),
    ("vite", "^6.0.7"),
    ("@vitejs/plugin-react", "^4.3.4"),
    ("tailwindcss", "^4.0.0"),
    ("@tailwindcss/vite", "^4.0.0"),
    ("styled-components", "^6.1.14"),
    // Workspace
    ("concurrently", "^9.1.2"),
];

/// Bundled version range for `name`, if the table knows it
pub fn fallback_version(name: &str) -> Option<&'static str> {
    FALLBACK_VERSIONS
        .iter()
        .find(|(package, _)| *package == name)
        .map(|(_, version)| *version)
}

/// Every package name the table covers, in table order
pub fn bundled_names() -> impl Iterator<Item = &'static str> {
    FALLBACK_VERSIONS.iter().map(|(name, _)| *name)
}
