//! Express API renderer
//!
//! Layered layout under `src/`: config, db, models, services, validators,
//! middleware, controllers, routes and docs. The project is an ES module,
//! so relative imports carry a `.js` suffix that resolves to the `.ts` source.
//! Error handling, the toolchain, tests and formatting live in `src/index.ts`
//! and `package.json` rather than in files of their own.

use super::deps::dependency_plan;
use super::manifest::PackageJson;
use super::shared;
use super::steps::StepId;
use super::tree::{Code, FileKind, FileTree};
use super::{GenerateError, RenderContext, Renderer};
use crate::config::{Database, FeatureConfig};
use crate::templates::Profile;
use serde_json::json;

const ENTRY: &str = "src/index.ts";

pub(crate) struct ExpressRenderer;

impl Renderer for ExpressRenderer {
    fn profile(&self) -> Profile {
        Profile::ExpressApi
    }

    fn render(
        &self,
        step: StepId,
        ctx: &RenderContext<'_>,
        tree: &mut FileTree,
    ) -> Result<(), GenerateError> {
        let config = ctx.config;
        let port = self.profile().default_port();
        match step {
            StepId::Manifest => tree.add("package.json", FileKind::Manifest, manifest(ctx)?),
            StepId::EntryPoint => tree.add(ENTRY, FileKind::Source, entry_point(config, port)),
            StepId::HealthRoute => {
                tree.add("src/routes/health.ts", FileKind::Source, health_route(config))
            }
            StepId::ErrorHandling
            | StepId::Toolchain
            | StepId::TestScaffold
            | StepId::LintFormat => Ok(()),
            StepId::EnvLoader => {
                let vars = shared::env_vars(config, port);
                tree.add("src/config/env.ts", FileKind::Source, env_loader(&vars))
            }
            StepId::Database => database(config, tree),
            StepId::Auth => auth(config, tree),
            StepId::ApiDocs => tree.add("src/docs/swagger.ts", FileKind::Source, swagger(config)),
            StepId::Container => {
                tree.add(
                    "Dockerfile",
                    FileKind::Config,
                    shared::dockerfile(config, "dist/index.js", port),
                )?;
                tree.add(
                    "docker-compose.yml",
                    FileKind::Config,
                    shared::docker_compose(config, port),
                )?;
                tree.add(".dockerignore", FileKind::Config, shared::dockerignore())
            }
            StepId::EnvTemplate => tree.add(
                ".env.example",
                FileKind::EnvironmentTemplate,
                shared::env_example(&shared::env_vars(config, port)),
            ),
            StepId::Gitignore => tree.add(".gitignore", FileKind::Config, shared::gitignore(config, &[])),
            StepId::Readme => tree.add(
                "README.md",
                FileKind::Documentation,
                shared::server_readme(config, "Express", SCRIPTS),
            ),
        }
    }
}

/// The script set is the same for every Express project; database tooling is
/// documented in the README instead
const SCRIPTS: &[(&str, &str)] = &[
    ("dev", "start the API with reload on change"),
    ("build", "bundle to dist/"),
    ("start", "run the bundled API"),
    ("test", "run the test suite"),
    ("lint", "check formatting"),
    ("format", "rewrite files with prettier"),
];

fn manifest(ctx: &RenderContext<'_>) -> Result<String, GenerateError> {
    let config = ctx.config;
    let plan = dependency_plan(Profile::ExpressApi, config);

    PackageJson::new(config.project_name().as_str())
        .field("type", "module")
        .field("main", "dist/index.js")
        .script("dev", format!("tsx watch {}", ENTRY))
        .script("build", format!("tsup {} --format esm --clean", ENTRY))
        .script("start", "node dist/index.js")
        .script("test", "vitest run --passWithNoTests")
        .script("lint", "prettier --check src")
        .script("format", "prettier --write src")
        .dependencies(&plan, ctx.versions)
        .config_section("engines", json!({ "node": ">=20" }))
        .config_section("prettier", shared::prettier_config())
        .render()
}

fn entry_point(config: &FeatureConfig, port: u16) -> String {
    let env = config.needs_env_schema();
    let db = config.has_database();
    let auth = config.needs_auth_files();
    let docs = config.include_api_docs();

    let mut code = Code::new();
    code.line("import 'dotenv/config';")
        .line("import express, { type NextFunction, type Request, type Response } from 'express';")
        .line("import cors from 'cors';")
        .line("import helmet from 'helmet';")
        .line_if(env, "import { env } from './config/env.js';")
        .line_if(db, "import { connectDatabase } from './db/client.js';")
        .line("import { healthRouter } from './routes/health.js';")
        .line_if(auth, "import { authRouter } from './routes/auth.routes.js';")
        .line_if(docs, "import { setupSwagger } from './docs/swagger.js';")
        .blank()
        .line("const app = express();");
    if env {
        code.line("const port = env.PORT;");
    } else {
        code.line(format!("const port = Number(process.env.PORT ?? {});", port));
    }
    code.blank()
        .line("app.use(helmet());")
        .line("app.use(cors());")
        .line("app.use(express.json());")
        .blank()
        .line("app.use('/api/health', healthRouter);")
        .line_if(auth, "app.use('/api/auth', authRouter);")
        .line_if(docs, "setupSwagger(app);")
        .blank()
        .block(
            r#"
app.use((req: Request, res: Response) => {
  res.status(404).json({ error: 'Not found', path: req.originalUrl });
});

app.use((err: Error, _req: Request, res: Response, _next: NextFunction) => {
  console.error(err);
  res.status(500).json({ error: 'Internal server error' });
});

async function start(): Promise<void> {"#,
        )
        .line_if(db, "  await connectDatabase();")
        .block(
            r#"
  app.listen(port, () => {
    console.log(`Server listening on http://localhost:${port}`);
  });
}

start().catch((err) => {
  console.error('Failed to start server', err);
  process.exit(1);
});

export default app;"#,
        );
    code.finish()
}

fn health_route(config: &FeatureConfig) -> String {
    let mut code = Code::new();
    code.line("import { Router } from 'express';")
        .blank()
        .line("export const healthRouter = Router();")
        .blank();
    code.block_if(
        config.include_api_docs(),
        r#"
/**
 * @openapi
 * /api/health:
 *   get:
 *     summary: Health check
 *     tags: [Health]
 *     responses:
 *       200:
 *         description: Service is up
 */"#,
    );
    code.block(
        r#"
healthRouter.get('/', (_req, res) => {
  res.json({
    status: 'ok',
    uptime: process.uptime(),
    timestamp: new Date().toISOString(),
  });
});"#,
    );
    code.finish()
}

fn env_loader(vars: &[shared::EnvVar]) -> String {
    let mut code = Code::new();
    code.line("import { z } from 'zod';")
        .blank()
        .line("const schema = z.object({")
        .block(&shared::zod_fields(vars))
        .line("});")
        .block(
            r#"

const parsed = schema.safeParse(process.env);

if (!parsed.success) {
  console.error('Invalid environment variables', parsed.error.flatten().fieldErrors);
  process.exit(1);
}

export const env = parsed.data;
export type Env = z.infer<typeof schema>;"#,
        );
    code.finish()
}

fn database(config: &FeatureConfig, tree: &mut FileTree) -> Result<(), GenerateError> {
    let database = config.database();
    tree.add("src/db/client.ts", FileKind::Source, db_client(database))?;
    match database {
        Database::PostgresPrisma | Database::SqlitePrisma => {
            tree.add("prisma/schema.prisma", FileKind::Config, shared::prisma_schema(database))?
        }
        Database::PostgresRaw => tree.add("db/schema.sql", FileKind::Config, shared::POSTGRES_SCHEMA)?,
        Database::MongoMongoose => {
            tree.add("src/models/user.model.ts", FileKind::Source, MONGOOSE_MODEL)?
        }
        Database::MongoRaw | Database::SqliteRaw | Database::None => {}
    }
    Ok(())
}

const MONGOOSE_MODEL: &str = r#"import { Schema, model } from 'mongoose';

export interface IUser {
  email: string;
  password: string;
  name?: string;
  createdAt: Date;
  updatedAt: Date;
}

const userSchema = new Schema<IUser>(
  {
    email: { type: String, required: true, unique: true, lowercase: true, trim: true },
    password: { type: String, required: true },
    name: { type: String },
  },
  { timestamps: true },
);

export const User = model<IUser>('User', userSchema);
"#;

fn db_client(database: Database) -> &'static str {
    match database {
        Database::PostgresPrisma | Database::SqlitePrisma => {
            r#"import { PrismaClient } from '@prisma/client';

export const prisma = new PrismaClient();

export async function connectDatabase(): Promise<void> {
  await prisma.$connect();
  console.log('Database connected');
}

export async function disconnectDatabase(): Promise<void> {
  await prisma.$disconnect();
}
"#
        }
        Database::PostgresRaw => {
            r#"import pg from 'pg';
import { env } from '../config/env.js';

export const pool = new pg.Pool({ connectionString: env.DATABASE_URL });

export async function connectDatabase(): Promise<void> {
  const client = await pool.connect();
  try {
    await client.query(`
      CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        name TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
      )
    `);
    console.log('Database connected');
  } finally {
    client.release();
  }
}

export async function disconnectDatabase(): Promise<void> {
  await pool.end();
}
"#
        }
        Database::MongoMongoose => {
            r#"import mongoose from 'mongoose';
import { env } from '../config/env.js';

export async function connectDatabase(): Promise<void> {
  await mongoose.connect(env.MONGODB_URI);
  console.log('Database connected');
}

export async function disconnectDatabase(): Promise<void> {
  await mongoose.disconnect();
}
"#
        }
        Database::MongoRaw => {
            r#"import { MongoClient, type Db } from 'mongodb';
import { env } from '../config/env.js';

const client = new MongoClient(env.MONGODB_URI);
let database: Db | undefined;

export async function connectDatabase(): Promise<void> {
  await client.connect();
  database = client.db();
  console.log('Database connected');
}

export function getDb(): Db {
  if (!database) {
    throw new Error('Database not connected');
  }
  return database;
}

export async function disconnectDatabase(): Promise<void> {
  await client.close();
}
"#
        }
        Database::SqliteRaw | Database::None => {
            r#"import Database from 'better-sqlite3';
import { env } from '../config/env.js';

export const db = new Database(env.DATABASE_URL);

export async function connectDatabase(): Promise<void> {
  db.pragma('journal_mode = WAL');
  db.exec(`
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      email TEXT NOT NULL UNIQUE,
      password TEXT NOT NULL,
      name TEXT,
      created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
  `);
}

export async function disconnectDatabase(): Promise<void> {
  db.close();
}
"#
        }
    }
}

fn auth(config: &FeatureConfig, tree: &mut FileTree) -> Result<(), GenerateError> {
    tree.add(
        "src/validators/auth.validators.ts",
        FileKind::Source,
        AUTH_VALIDATORS,
    )?;
    tree.add(
        "src/services/user.repository.ts",
        FileKind::Source,
        user_repository(config.database()),
    )?;
    tree.add(
        "src/middleware/auth.middleware.ts",
        FileKind::Source,
        AUTH_MIDDLEWARE,
    )?;
    tree.add(
        "src/controllers/auth.controller.ts",
        FileKind::Source,
        AUTH_CONTROLLER,
    )?;
    tree.add(
        "src/routes/auth.routes.ts",
        FileKind::Source,
        auth_routes(config.include_api_docs()),
    )
}

const AUTH_VALIDATORS: &str = r#"import type { NextFunction, Request, Response } from 'express';
import { z, type ZodSchema } from 'zod';

export const registerSchema = z.object({
  email: z.string().email(),
  password: z.string().min(8),
  name: z.string().min(1).optional(),
});

export const loginSchema = z.object({
  email: z.string().email(),
  password: z.string().min(1),
});

export type RegisterInput = z.infer<typeof registerSchema>;
export type LoginInput = z.infer<typeof loginSchema>;

export function validate(schema: ZodSchema) {
  return (req: Request, res: Response, next: NextFunction): void => {
    const result = schema.safeParse(req.body);
    if (!result.success) {
      res.status(400).json({ error: 'Validation failed', details: result.error.flatten().fieldErrors });
      return;
    }
    req.body = result.data;
    next();
  };
}
"#;

const AUTH_MIDDLEWARE: &str = r#"import type { NextFunction, Request, Response } from 'express';
import jwt from 'jsonwebtoken';
import { env } from '../config/env.js';

export interface AuthPayload {
  sub: string;
  email: string;
}

declare global {
  namespace Express {
    interface Request {
      user?: AuthPayload;
    }
  }
}

export function requireAuth(req: Request, res: Response, next: NextFunction): void {
  const header = req.headers.authorization;
  if (!header?.startsWith('Bearer ')) {
    res.status(401).json({ error: 'Missing bearer token' });
    return;
  }

  try {
    req.user = jwt.verify(header.slice('Bearer '.length), env.JWT_SECRET) as AuthPayload;
    next();
  } catch {
    res.status(401).json({ error: 'Invalid or expired token' });
  }
}
"#;

const AUTH_CONTROLLER: &str = r#"import type { Request, Response } from 'express';
import bcrypt from 'bcryptjs';
import jwt, { type SignOptions } from 'jsonwebtoken';
import { env } from '../config/env.js';
import {
  createUser,
  findUserByEmail,
  findUserById,
  type UserRecord,
} from '../services/user.repository.js';
import type { LoginInput, RegisterInput } from '../validators/auth.validators.js';

function issueToken(user: UserRecord): string {
  const options = { expiresIn: env.JWT_EXPIRES_IN } as SignOptions;
  return jwt.sign({ sub: user.id, email: user.email }, env.JWT_SECRET, options);
}

function publicUser(user: UserRecord) {
  return { id: user.id, email: user.email, name: user.name };
}

export async function register(req: Request, res: Response): Promise<void> {
  const input = req.body as RegisterInput;
  if (await findUserByEmail(input.email)) {
    res.status(409).json({ error: 'Email already registered' });
    return;
  }

  const passwordHash = await bcrypt.hash(input.password, 10);
  const user = await createUser({ email: input.email, passwordHash, name: input.name });
  res.status(201).json({ user: publicUser(user), token: issueToken(user) });
}

export async function login(req: Request, res: Response): Promise<void> {
  const input = req.body as LoginInput;
  const user = await findUserByEmail(input.email);
  if (!user || !(await bcrypt.compare(input.password, user.passwordHash))) {
    res.status(401).json({ error: 'Invalid credentials' });
    return;
  }

  res.json({ user: publicUser(user), token: issueToken(user) });
}

export async function me(req: Request, res: Response): Promise<void> {
  const user = req.user ? await findUserById(req.user.sub) : null;
  if (!user) {
    res.status(404).json({ error: 'User not found' });
    return;
  }

  res.json({ user: publicUser(user) });
}
"#;

fn auth_routes(docs: bool) -> String {
    let mut code = Code::new();
    code.block(
        r#"
import { Router, type NextFunction, type Request, type Response } from 'express';
import { login, me, register } from '../controllers/auth.controller.js';
import { requireAuth } from '../middleware/auth.middleware.js';
import { loginSchema, registerSchema, validate } from '../validators/auth.validators.js';

type AsyncHandler = (req: Request, res: Response) => Promise<void>;

const wrap = (handler: AsyncHandler) => (req: Request, res: Response, next: NextFunction) => {
  handler(req, res).catch(next);
};

export const authRouter = Router();
"#,
    );
    code.blank();
    code.block_if(
        docs,
        r#"
/**
 * @openapi
 * /api/auth/register:
 *   post:
 *     summary: Create an account
 *     tags: [Auth]
 *     requestBody:
 *       required: true
 *       content:
 *         application/json:
 *           schema:
 *             type: object
 *             required: [email, password]
 *             properties:
 *               email: { type: string, format: email }
 *               password: { type: string, minLength: 8 }
 *               name: { type: string }
 *     responses:
 *       201: { description: Account created }
 *       409: { description: Email already registered }
 */"#,
    );
    code.line("authRouter.post('/register', validate(registerSchema), wrap(register));")
        .blank();
    code.block_if(
        docs,
        r#"
/**
 * @openapi
 * /api/auth/login:
 *   post:
 *     summary: Exchange credentials for a token
 *     tags: [Auth]
 *     requestBody:
 *       required: true
 *       content:
 *         application/json:
 *           schema:
 *             type: object
 *             required: [email, password]
 *             properties:
 *               email: { type: string, format: email }
 *               password: { type: string }
 *     responses:
 *       200: { description: Signed in }
 *       401: { description: Invalid credentials }
 */"#,
    );
    code.line("authRouter.post('/login', validate(loginSchema), wrap(login));")
        .blank();
    code.block_if(
        docs,
        r#"
/**
 * @openapi
 * /api/auth/me:
 *   get:
 *     summary: Current user
 *     tags: [Auth]
 *     security:
 *       - bearerAuth: []
 *     responses:
 *       200: { description: The signed-in user }
 *       401: { description: Missing or invalid token }
 */"#,
    );
    code.line("authRouter.get('/me', requireAuth, wrap(me));");
    code.finish()
}

fn user_repository(database: Database) -> String {
    let mut code = Code::new();
    code.block(
        r#"
export interface UserRecord {
  id: string;
  email: string;
  name: string | null;
  passwordHash: string;
}

export interface NewUser {
  email: string;
  passwordHash: string;
  name?: string;
}
"#,
    );
    let body = match database {
        Database::PostgresPrisma | Database::SqlitePrisma => {
            r#"
import type { User } from '@prisma/client';
import { prisma } from '../db/client.js';

function toRecord(user: User): UserRecord {
  return { id: user.id, email: user.email, name: user.name, passwordHash: user.password };
}

export async function findUserByEmail(email: string): Promise<UserRecord | null> {
  const user = await prisma.user.findUnique({ where: { email } });
  return user ? toRecord(user) : null;
}

export async function findUserById(id: string): Promise<UserRecord | null> {
  const user = await prisma.user.findUnique({ where: { id } });
  return user ? toRecord(user) : null;
}

export async function createUser(input: NewUser): Promise<UserRecord> {
  const user = await prisma.user.create({
    data: { email: input.email, password: input.passwordHash, name: input.name },
  });
  return toRecord(user);
}"#
        }
        Database::PostgresRaw => {
            r#"
import { pool } from '../db/client.js';

interface UserRow {
  id: number;
  email: string;
  name: string | null;
  password: string;
}

function toRecord(row: UserRow): UserRecord {
  return { id: String(row.id), email: row.email, name: row.name, passwordHash: row.password };
}

export async function findUserByEmail(email: string): Promise<UserRecord | null> {
  const { rows } = await pool.query<UserRow>(
    'SELECT id, email, name, password FROM users WHERE email = $1',
    [email],
  );
  return rows[0] ? toRecord(rows[0]) : null;
}

export async function findUserById(id: string): Promise<UserRecord | null> {
  const { rows } = await pool.query<UserRow>(
    'SELECT id, email, name, password FROM users WHERE id = $1',
    [Number(id)],
  );
  return rows[0] ? toRecord(rows[0]) : null;
}

export async function createUser(input: NewUser): Promise<UserRecord> {
  const { rows } = await pool.query<UserRow>(
    'INSERT INTO users (email, password, name) VALUES ($1, $2, $3) RETURNING id, email, name, password',
    [input.email, input.passwordHash, input.name ?? null],
  );
  return toRecord(rows[0]);
}"#
        }
        Database::MongoMongoose => {
            r#"
import { isValidObjectId, type HydratedDocument } from 'mongoose';
import { User, type IUser } from '../models/user.model.js';

function toRecord(user: HydratedDocument<IUser>): UserRecord {
  return {
    id: user._id.toString(),
    email: user.email,
    name: user.name ?? null,
    passwordHash: user.password,
  };
}

export async function findUserByEmail(email: string): Promise<UserRecord | null> {
  const user = await User.findOne({ email: email.toLowerCase() });
  return user ? toRecord(user) : null;
}

export async function findUserById(id: string): Promise<UserRecord | null> {
  if (!isValidObjectId(id)) {
    return null;
  }
  const user = await User.findById(id);
  return user ? toRecord(user) : null;
}

export async function createUser(input: NewUser): Promise<UserRecord> {
  const user = await User.create({
    email: input.email,
    password: input.passwordHash,
    name: input.name,
  });
  return toRecord(user);
}"#
        }
        Database::MongoRaw => {
            r#"
import { ObjectId, type WithId } from 'mongodb';
import { getDb } from '../db/client.js';

interface UserDocument {
  email: string;
  password: string;
  name: string | null;
  createdAt: Date;
}

const users = () => getDb().collection<UserDocument>('users');

function toRecord(user: WithId<UserDocument>): UserRecord {
  return {
    id: user._id.toHexString(),
    email: user.email,
    name: user.name,
    passwordHash: user.password,
  };
}

export async function findUserByEmail(email: string): Promise<UserRecord | null> {
  const user = await users().findOne({ email: email.toLowerCase() });
  return user ? toRecord(user) : null;
}

export async function findUserById(id: string): Promise<UserRecord | null> {
  if (!ObjectId.isValid(id)) {
    return null;
  }
  const user = await users().findOne({ _id: new ObjectId(id) });
  return user ? toRecord(user) : null;
}

export async function createUser(input: NewUser): Promise<UserRecord> {
  const document: UserDocument = {
    email: input.email.toLowerCase(),
    password: input.passwordHash,
    name: input.name ?? null,
    createdAt: new Date(),
  };
  const result = await users().insertOne(document);
  return toRecord({ _id: result.insertedId, ...document });
}"#
        }
        Database::SqliteRaw | Database::None => {
            r#"
import { db } from '../db/client.js';

interface UserRow {
  id: number;
  email: string;
  name: string | null;
  password: string;
}

function toRecord(row: UserRow): UserRecord {
  return { id: String(row.id), email: row.email, name: row.name, passwordHash: row.password };
}

export async function findUserByEmail(email: string): Promise<UserRecord | null> {
  const row = db
    .prepare('SELECT id, email, name, password FROM users WHERE email = ?')
    .get(email) as UserRow | undefined;
  return row ? toRecord(row) : null;
}

export async function findUserById(id: string): Promise<UserRecord | null> {
  const row = db
    .prepare('SELECT id, email, name, password FROM users WHERE id = ?')
    .get(Number(id)) as UserRow | undefined;
  return row ? toRecord(row) : null;
}

export async function createUser(input: NewUser): Promise<UserRecord> {
  const info = db
    .prepare('INSERT INTO users (email, password, name) VALUES (?, ?, ?)')
    .run(input.email, input.passwordHash, input.name ?? null);
  return {
    id: String(info.lastInsertRowid),
    email: input.email,
    name: input.name ?? null,
    passwordHash: input.passwordHash,
  };
}"#
        }
    };
    // imports first, then the shared record types
    let shared_types = code.finish();
    let (imports, rest) = split_imports(body);
    let mut out = Code::new();
    out.block(imports).blank().block(&shared_types).block(rest);
    out.finish()
}

/// Split a leading run of `import` lines from the rest of a chunk
fn split_imports(chunk: &str) -> (&str, &str) {
    let chunk = chunk.trim_start_matches('\n');
    let mut end = 0;
    for line in chunk.split_inclusive('\n') {
        if !line.starts_with("import ") {
            break;
        }
        end += line.len();
    }
    (&chunk[..end], &chunk[end..])
}

fn swagger(config: &FeatureConfig) -> String {
    let mut code = Code::new();
    code.block(
        r#"
import type { Express } from 'express';
import swaggerJsdoc from 'swagger-jsdoc';
import swaggerUi from 'swagger-ui-express';

const spec = swaggerJsdoc({
  definition: {
    openapi: '3.0.3',
    info: {"#,
    )
    .line(format!("      title: '{}',", config.project_name()))
    .line("      version: '0.1.0',")
    .line("    },");
    code.block_if(
        config.needs_auth_files(),
        r#"
    components: {
      securitySchemes: {
        bearerAuth: { type: 'http', scheme: 'bearer', bearerFormat: 'JWT' },
      },
    },"#,
    );
    code.block(
        r#"
  },
  apis: ['./src/routes/*.ts'],
});

export function setupSwagger(app: Express): void {
  app.use('/api/docs', swaggerUi.serve, swaggerUi.setup(spec));
  app.get('/api/docs.json', (_req, res) => {
    res.json(spec);
  });
}"#,
    );
    code.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawAnswers;
    use crate::generator::generate_profile;
    use crate::versions::PinnedVersions;

    fn tree(raw: RawAnswers) -> FileTree {
        let config = FeatureConfig::build(raw).unwrap();
        generate_profile(Profile::ExpressApi, &config, &PinnedVersions::bundled()).unwrap()
    }

    fn minimal() -> RawAnswers {
        RawAnswers {
            database: Some("none".to_string()),
            include_auth: Some(false),
            include_api_docs: Some(false),
            include_container: Some(false),
            ..RawAnswers::for_stack("api", "express")
        }
    }

    #[test]
    fn test_minimal_tree() {
        let tree = tree(minimal());
        let paths: Vec<&str> = tree.paths().collect();
        assert_eq!(
            paths,
            vec![
                ".env.example",
                ".gitignore",
                "README.md",
                "package.json",
                "src/index.ts",
                "src/routes/health.ts"
            ]
        );
        let index = &tree.get("src/index.ts").unwrap().content;
        assert!(index.contains("Number(process.env.PORT ?? 3000)"));
        assert!(!index.contains("connectDatabase"));
    }

    #[test]
    fn test_full_tree_wires_every_feature() {
        let tree = tree(RawAnswers::for_stack("api", "express"));
        for path in [
            "prisma/schema.prisma",
            "src/config/env.ts",
            "src/db/client.ts",
            "src/routes/auth.routes.ts",
            "src/controllers/auth.controller.ts",
            "src/middleware/auth.middleware.ts",
            "src/validators/auth.validators.ts",
            "src/services/user.repository.ts",
            "src/docs/swagger.ts",
            "Dockerfile",
            "docker-compose.yml",
        ] {
            assert!(tree.contains(path), "missing {}", path);
        }
        let index = &tree.get("src/index.ts").unwrap().content;
        assert!(index.contains("app.use('/api/auth', authRouter);"));
        assert!(index.contains("setupSwagger(app);"));
        assert!(index.contains("  await connectDatabase();"));
    }

    #[test]
    fn test_repository_imports_come_first() {
        let tree = tree(RawAnswers {
            database: Some("mongodb".to_string()),
            use_orm: Some(false),
            ..RawAnswers::for_stack("api", "express")
        });
        let repo = &tree.get("src/services/user.repository.ts").unwrap().content;
        assert!(repo.starts_with("import { ObjectId, type WithId } from 'mongodb';\n"));
        assert!(repo.contains("export interface UserRecord"));
    }

    #[test]
    fn test_manifest_is_an_esm_package() {
        let tree = tree(minimal());
        let manifest: serde_json::Value =
            serde_json::from_str(&tree.get("package.json").unwrap().content).unwrap();
        assert_eq!(manifest["type"], "module");
        assert_eq!(manifest["scripts"]["start"], "node dist/index.js");
        assert_eq!(manifest["dependencies"]["express"], "^4.21.2");
        assert!(manifest["dependencies"].get("zod").is_none());
    }

    #[test]
    fn test_split_imports() {
        let (imports, rest) = split_imports("\nimport a from 'a';\nimport b from 'b';\n\nconst x = 1;\n");
        assert_eq!(imports, "import a from 'a';\nimport b from 'b';\n");
        assert_eq!(rest, "\nconst x = 1;\n");
    }
}
