//! NestJS API renderer
//!
//! Feature-module layout: `health/`, `database/`, `users/` and `auth/` each
//! bring their own module class, wired together in `app.module.ts`. The
//! project compiles to CommonJS with the Nest CLI, so relative imports carry
//! no extension.

use super::deps::dependency_plan;
use super::manifest::PackageJson;
use super::shared;
use super::steps::StepId;
use super::tree::{Code, FileKind, FileTree};
use super::{GenerateError, RenderContext, Renderer};
use crate::config::{Database, FeatureConfig};
use crate::templates::Profile;
use serde_json::{json, Value};

pub(crate) struct NestRenderer;

impl Renderer for NestRenderer {
    fn profile(&self) -> Profile {
        Profile::NestApi
    }

    fn render(
        &self,
        step: StepId,
        ctx: &RenderContext<'_>,
        tree: &mut FileTree,
    ) -> Result<(), GenerateError> {
        let config = ctx.config;
        let port = self.profile().default_port();
        let docs = config.include_api_docs();
        match step {
            StepId::Manifest => tree.add("package.json", FileKind::Manifest, manifest(ctx)?),
            StepId::EntryPoint => {
                tree.add("src/main.ts", FileKind::Source, main_ts(config, port))?;
                tree.add("src/app.module.ts", FileKind::Source, app_module(config))
            }
            StepId::HealthRoute => {
                tree.add(
                    "src/health/health.controller.ts",
                    FileKind::Source,
                    health_controller(docs),
                )?;
                tree.add("src/health/health.module.ts", FileKind::Source, HEALTH_MODULE)
            }
            StepId::ErrorHandling => tree.add(
                "src/common/filters/http-exception.filter.ts",
                FileKind::Source,
                EXCEPTION_FILTER,
            ),
            StepId::Toolchain => {
                tree.add("tsconfig.json", FileKind::Config, json_file(&tsconfig())?)?;
                tree.add(
                    "tsconfig.build.json",
                    FileKind::Config,
                    json_file(&json!({
                        "extends": "./tsconfig.json",
                        "exclude": ["node_modules", "test", "dist", "**/*spec.ts"]
                    }))?,
                )?;
                tree.add(
                    "nest-cli.json",
                    FileKind::Config,
                    json_file(&json!({
                        "$schema": "https://json.schemastore.org/nest-cli",
                        "collection": "@nestjs/schematics",
                        "sourceRoot": "src",
                        "compilerOptions": { "deleteOutDir": true }
                    }))?,
                )
            }
            StepId::TestScaffold => {
                tree.add(
                    "src/health/health.controller.spec.ts",
                    FileKind::Source,
                    HEALTH_SPEC,
                )?;
                tree.add("test/app.e2e-spec.ts", FileKind::Source, E2E_SPEC)
            }
            StepId::LintFormat => tree.add(
                ".prettierrc",
                FileKind::Config,
                json_file(&shared::prettier_config())?,
            ),
            StepId::EnvLoader => tree.add(
                "src/config/env.validation.ts",
                FileKind::Source,
                env_validation(&shared::env_vars(config, port)),
            ),
            StepId::Database => database(config.database(), tree),
            StepId::Auth => auth(docs, tree),
            StepId::ApiDocs => tree.add("src/swagger.ts", FileKind::Source, swagger(config)),
            StepId::Container => {
                tree.add(
                    "Dockerfile",
                    FileKind::Config,
                    shared::dockerfile(config, "dist/main.js", port),
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
            StepId::Gitignore => tree.add(
                ".gitignore",
                FileKind::Config,
                shared::gitignore(config, &[]),
            ),
            StepId::Readme => tree.add(
                "README.md",
                FileKind::Documentation,
                shared::server_readme(config, "NestJS", SCRIPTS),
            ),
        }
    }
}

fn json_file(value: &Value) -> Result<String, GenerateError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

fn tsconfig() -> Value {
    json!({
        "compilerOptions": {
            "module": "commonjs",
            "declaration": true,
            "removeComments": true,
            "emitDecoratorMetadata": true,
            "experimentalDecorators": true,
            "allowSyntheticDefaultImports": true,
            "esModuleInterop": true,
            "target": "ES2021",
            "sourceMap": true,
            "outDir": "./dist",
            "baseUrl": "./",
            "incremental": true,
            "skipLibCheck": true,
            "strictNullChecks": true,
            "noImplicitAny": true,
            "forceConsistentCasingInFileNames": true
        }
    })
}

const SCRIPTS: &[(&str, &str)] = &[
    ("dev", "start the API in watch mode"),
    ("build", "compile to dist/"),
    ("start", "run the compiled API"),
    ("test", "run unit tests"),
    ("test:e2e", "run end-to-end tests"),
    ("lint", "check formatting"),
    ("format", "rewrite files with prettier"),
];

fn manifest(ctx: &RenderContext<'_>) -> Result<String, GenerateError> {
    let config = ctx.config;
    let plan = dependency_plan(Profile::NestApi, config);

    PackageJson::new(config.project_name().as_str())
        .script("dev", "nest start --watch")
        .script("build", "nest build")
        .script("start", "node dist/main")
        .script("test", "jest")
        .script("test:e2e", "jest --testRegex '.e2e-spec.ts$'")
        .script("lint", "prettier --check \"src/**/*.ts\" \"test/**/*.ts\"")
        .script("format", "prettier --write \"src/**/*.ts\" \"test/**/*.ts\"")
        .dependencies(&plan, ctx.versions)
        .config_section("engines", json!({ "node": ">=20" }))
        .config_section(
            "jest",
            json!({
                "moduleFileExtensions": ["js", "json", "ts"],
                "rootDir": ".",
                "testRegex": ".*\\.spec\\.ts$",
                "transform": { "^.+\\.(t|j)s$": "ts-jest" },
                "testEnvironment": "node"
            }),
        )
        .render()
}

fn main_ts(config: &FeatureConfig, port: u16) -> String {
    let docs = config.include_api_docs();

    let mut code = Code::new();
    code.line("import { Logger, ValidationPipe } from '@nestjs/common';")
        .line("import { ConfigService } from '@nestjs/config';")
        .line("import { NestFactory } from '@nestjs/core';")
        .line("import { AppModule } from './app.module';")
        .line("import { HttpExceptionFilter } from './common/filters/http-exception.filter';")
        .line_if(docs, "import { setupSwagger } from './swagger';")
        .block(
            r#"

async function bootstrap(): Promise<void> {
  const app = await NestFactory.create(AppModule);
  app.setGlobalPrefix('api');
  app.enableCors();
  app.useGlobalPipes(new ValidationPipe({ whitelist: true, forbidNonWhitelisted: true, transform: true }));
  app.useGlobalFilters(new HttpExceptionFilter());"#,
        )
        .line_if(docs, "  setupSwagger(app);")
        .blank()
        .line(format!(
            "  const port = app.get(ConfigService).get<number>('PORT', {});",
            port
        ))
        .block(
            r#"
  await app.listen(port);
  Logger.log(`Server listening on http://localhost:${port}`, 'Bootstrap');
}

void bootstrap();"#,
        );
    code.finish()
}

fn app_module(config: &FeatureConfig) -> String {
    let env = config.needs_env_schema();
    let db = config.has_database();
    let auth = config.needs_auth_files();

    let mut code = Code::new();
    code.line("import { Module } from '@nestjs/common';")
        .line("import { ConfigModule } from '@nestjs/config';")
        .line_if(auth, "import { AuthModule } from './auth/auth.module';")
        .line_if(env, "import { validateEnv } from './config/env.validation';")
        .line_if(db, "import { DatabaseModule } from './database/database.module';")
        .line("import { HealthModule } from './health/health.module';")
        .line_if(db, "import { UsersModule } from './users/users.module';")
        .blank()
        .line("@Module({")
        .line("  imports: [");
    if env {
        code.line("    ConfigModule.forRoot({ isGlobal: true, validate: validateEnv }),");
    } else {
        code.line("    ConfigModule.forRoot({ isGlobal: true }),");
    }
    code.line_if(db, "    DatabaseModule,")
        .line("    HealthModule,")
        .line_if(db, "    UsersModule,")
        .line_if(auth, "    AuthModule,")
        .line("  ],")
        .line("})")
        .line("export class AppModule {}");
    code.finish()
}

fn health_controller(docs: bool) -> String {
    let mut code = Code::new();
    code.line("import { Controller, Get } from '@nestjs/common';")
        .line_if(docs, "import { ApiOkResponse, ApiTags } from '@nestjs/swagger';")
        .blank()
        .line_if(docs, "@ApiTags('health')")
        .line("@Controller('health')")
        .line("export class HealthController {")
        .line("  @Get()")
        .line_if(docs, "  @ApiOkResponse({ description: 'Service is up' })")
        .block(
            r#"
  check() {
    return {
      status: 'ok',
      uptime: process.uptime(),
      timestamp: new Date().toISOString(),
    };
  }
}"#,
        );
    code.finish()
}

const HEALTH_MODULE: &str = r#"import { Module } from '@nestjs/common';
import { HealthController } from './health.controller';

@Module({
  controllers: [HealthController],
})
export class HealthModule {}
"#;

const HEALTH_SPEC: &str = r#"import { Test } from '@nestjs/testing';
import { HealthController } from './health.controller';

describe('HealthController', () => {
  let controller: HealthController;

  beforeEach(async () => {
    const moduleRef = await Test.createTestingModule({
      controllers: [HealthController],
    }).compile();
    controller = moduleRef.get(HealthController);
  });

  it('reports ok', () => {
    expect(controller.check().status).toBe('ok');
  });
});
"#;

const E2E_SPEC: &str = r#"import { INestApplication } from '@nestjs/common';
import { Test } from '@nestjs/testing';
import request from 'supertest';
import { HealthModule } from '../src/health/health.module';

describe('Health (e2e)', () => {
  let app: INestApplication;

  beforeAll(async () => {
    const moduleRef = await Test.createTestingModule({
      imports: [HealthModule],
    }).compile();
    app = moduleRef.createNestApplication();
    app.setGlobalPrefix('api');
    await app.init();
  });

  afterAll(async () => {
    await app.close();
  });

  it('GET /api/health', () => {
    return request(app.getHttpServer())
      .get('/api/health')
      .expect(200)
      .expect((res) => {
        expect(res.body.status).toBe('ok');
      });
  });
});
"#;

const EXCEPTION_FILTER: &str = r#"import {
  ArgumentsHost,
  Catch,
  ExceptionFilter,
  HttpException,
  HttpStatus,
  Logger,
} from '@nestjs/common';

interface HttpResponse {
  status(code: number): HttpResponse;
  json(body: unknown): void;
}

interface HttpRequest {
  url: string;
}

@Catch()
export class HttpExceptionFilter implements ExceptionFilter {
  private readonly logger = new Logger(HttpExceptionFilter.name);

  catch(exception: unknown, host: ArgumentsHost): void {
    const ctx = host.switchToHttp();
    const response = ctx.getResponse<HttpResponse>();
    const request = ctx.getRequest<HttpRequest>();

    const status =
      exception instanceof HttpException ? exception.getStatus() : HttpStatus.INTERNAL_SERVER_ERROR;
    const body =
      exception instanceof HttpException
        ? exception.getResponse()
        : { message: 'Internal server error' };

    if (status >= HttpStatus.INTERNAL_SERVER_ERROR) {
      this.logger.error(exception);
    }

    response.status(status).json({
      statusCode: status,
      path: request.url,
      timestamp: new Date().toISOString(),
      ...(typeof body === 'string' ? { message: body } : body),
    });
  }
}
"#;

fn env_validation(vars: &[shared::EnvVar]) -> String {
    let mut code = Code::new();
    code.line("import { z } from 'zod';")
        .blank()
        .line("const schema = z.object({")
        .block(&shared::zod_fields(vars))
        .line("});")
        .block(
            r#"

export type Env = z.infer<typeof schema>;

export function validateEnv(config: Record<string, unknown>): Env {
  const parsed = schema.safeParse(config);
  if (!parsed.success) {
    const details = JSON.stringify(parsed.error.flatten().fieldErrors);
    throw new Error(`Invalid environment variables: ${details}`);
  }
  return parsed.data;
}"#,
        );
    code.finish()
}

fn database(database: Database, tree: &mut FileTree) -> Result<(), GenerateError> {
    match database {
        Database::PostgresPrisma | Database::SqlitePrisma => {
            tree.add(
                "prisma/schema.prisma",
                FileKind::Config,
                shared::prisma_schema(database),
            )?;
            tree.add("src/database/prisma.service.ts", FileKind::Source, PRISMA_SERVICE)?;
            tree.add(
                "src/database/database.module.ts",
                FileKind::Source,
                PRISMA_MODULE,
            )?;
        }
        Database::MongoMongoose => {
            tree.add(
                "src/database/database.module.ts",
                FileKind::Source,
                MONGOOSE_MODULE,
            )?;
            tree.add(
                "src/users/schemas/user.schema.ts",
                FileKind::Source,
                MONGOOSE_SCHEMA,
            )?;
        }
        Database::PostgresRaw => {
            tree.add("db/schema.sql", FileKind::Config, shared::POSTGRES_SCHEMA)?;
            tree.add(
                "src/database/database.constants.ts",
                FileKind::Source,
                DATABASE_TOKEN,
            )?;
            tree.add("src/database/database.module.ts", FileKind::Source, PG_MODULE)?;
        }
        Database::MongoRaw => {
            tree.add(
                "src/database/database.constants.ts",
                FileKind::Source,
                MONGO_TOKENS,
            )?;
            tree.add(
                "src/database/database.module.ts",
                FileKind::Source,
                MONGO_MODULE,
            )?;
        }
        Database::SqliteRaw => {
            tree.add(
                "src/database/database.constants.ts",
                FileKind::Source,
                DATABASE_TOKEN,
            )?;
            tree.add(
                "src/database/database.module.ts",
                FileKind::Source,
                SQLITE_MODULE,
            )?;
        }
        Database::None => return Ok(()),
    }

    let users_module = if database == Database::MongoMongoose {
        USERS_MODULE_MONGOOSE
    } else {
        USERS_MODULE
    };
    tree.add("src/users/users.module.ts", FileKind::Source, users_module)?;
    tree.add(
        "src/users/users.service.ts",
        FileKind::Source,
        users_service(database),
    )
}

const PRISMA_SERVICE: &str = r#"import { Injectable, OnModuleDestroy, OnModuleInit } from '@nestjs/common';
import { PrismaClient } from '@prisma/client';

@Injectable()
export class PrismaService extends PrismaClient implements OnModuleInit, OnModuleDestroy {
  async onModuleInit(): Promise<void> {
    await this.$connect();
  }

  async onModuleDestroy(): Promise<void> {
    await this.$disconnect();
  }
}
"#;

const PRISMA_MODULE: &str = r#"import { Global, Module } from '@nestjs/common';
import { PrismaService } from './prisma.service';

@Global()
@Module({
  providers: [PrismaService],
  exports: [PrismaService],
})
export class DatabaseModule {}
"#;

const MONGOOSE_MODULE: &str = r#"import { Module } from '@nestjs/common';
import { ConfigService } from '@nestjs/config';
import { MongooseModule } from '@nestjs/mongoose';

@Module({
  imports: [
    MongooseModule.forRootAsync({
      inject: [ConfigService],
      useFactory: (config: ConfigService) => ({
        uri: config.getOrThrow<string>('MONGODB_URI'),
      }),
    }),
  ],
})
export class DatabaseModule {}
"#;

const MONGOOSE_SCHEMA: &str = r#"import { Prop, Schema, SchemaFactory } from '@nestjs/mongoose';
import type { HydratedDocument } from 'mongoose';

@Schema({ timestamps: true })
export class User {
  @Prop({ required: true, unique: true, lowercase: true, trim: true })
  email!: string;

  @Prop({ required: true })
  password!: string;

  @Prop()
  name?: string;
}

export type UserDocument = HydratedDocument<User>;
export const UserSchema = SchemaFactory.createForClass(User);
"#;

const DATABASE_TOKEN: &str = r#"export const DATABASE = Symbol('DATABASE');
"#;

const MONGO_TOKENS: &str = r#"export const MONGO_CLIENT = Symbol('MONGO_CLIENT');
export const DATABASE = Symbol('DATABASE');
"#;

const PG_MODULE: &str = r#"import { Global, Inject, Module, OnApplicationShutdown } from '@nestjs/common';
import { ConfigService } from '@nestjs/config';
import { Pool } from 'pg';
import { DATABASE } from './database.constants';

@Global()
@Module({
  providers: [
    {
      provide: DATABASE,
      inject: [ConfigService],
      useFactory: (config: ConfigService) =>
        new Pool({ connectionString: config.getOrThrow<string>('DATABASE_URL') }),
    },
  ],
  exports: [DATABASE],
})
export class DatabaseModule implements OnApplicationShutdown {
  constructor(@Inject(DATABASE) private readonly pool: Pool) {}

  async onApplicationShutdown(): Promise<void> {
    await this.pool.end();
  }
}
"#;

const MONGO_MODULE: &str = r#"import { Global, Inject, Module, OnApplicationShutdown } from '@nestjs/common';
import { ConfigService } from '@nestjs/config';
import { MongoClient } from 'mongodb';
import { DATABASE, MONGO_CLIENT } from './database.constants';

@Global()
@Module({
  providers: [
    {
      provide: MONGO_CLIENT,
      inject: [ConfigService],
      useFactory: async (config: ConfigService) => {
        const client = new MongoClient(config.getOrThrow<string>('MONGODB_URI'));
        await client.connect();
        return client;
      },
    },
    {
      provide: DATABASE,
      inject: [MONGO_CLIENT],
      useFactory: (client: MongoClient) => client.db(),
    },
  ],
  exports: [DATABASE],
})
export class DatabaseModule implements OnApplicationShutdown {
  constructor(@Inject(MONGO_CLIENT) private readonly client: MongoClient) {}

  async onApplicationShutdown(): Promise<void> {
    await this.client.close();
  }
}
"#;

const SQLITE_MODULE: &str = r#"import { Global, Inject, Module, OnApplicationShutdown } from '@nestjs/common';
import { ConfigService } from '@nestjs/config';
import Database from 'better-sqlite3';
import { DATABASE } from './database.constants';

@Global()
@Module({
  providers: [
    {
      provide: DATABASE,
      inject: [ConfigService],
      useFactory: (config: ConfigService) => {
        const db = new Database(config.getOrThrow<string>('DATABASE_URL'));
        db.pragma('journal_mode = WAL');
        return db;
      },
    },
  ],
  exports: [DATABASE],
})
export class DatabaseModule implements OnApplicationShutdown {
  constructor(@Inject(DATABASE) private readonly db: Database.Database) {}

  onApplicationShutdown(): void {
    this.db.close();
  }
}
"#;

const USERS_MODULE: &str = r#"import { Module } from '@nestjs/common';
import { UsersService } from './users.service';

@Module({
  providers: [UsersService],
  exports: [UsersService],
})
export class UsersModule {}
"#;

const USERS_MODULE_MONGOOSE: &str = r#"import { Module } from '@nestjs/common';
import { MongooseModule } from '@nestjs/mongoose';
import { User, UserSchema } from './schemas/user.schema';
import { UsersService } from './users.service';

@Module({
  imports: [MongooseModule.forFeature([{ name: User.name, schema: UserSchema }])],
  providers: [UsersService],
  exports: [UsersService],
})
export class UsersModule {}
"#;

const USER_TYPES: &str = r#"
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
"#;

fn users_service(database: Database) -> String {
    let (imports, body) = match database {
        Database::PostgresPrisma | Database::SqlitePrisma => (
            r#"import { Injectable } from '@nestjs/common';
import type { User } from '@prisma/client';
import { PrismaService } from '../database/prisma.service';
"#,
            r#"
function toRecord(user: User): UserRecord {
  return { id: user.id, email: user.email, name: user.name, passwordHash: user.password };
}

@Injectable()
export class UsersService {
  constructor(private readonly prisma: PrismaService) {}

  async findByEmail(email: string): Promise<UserRecord | null> {
    const user = await this.prisma.user.findUnique({ where: { email } });
    return user ? toRecord(user) : null;
  }

  async findById(id: string): Promise<UserRecord | null> {
    const user = await this.prisma.user.findUnique({ where: { id } });
    return user ? toRecord(user) : null;
  }

  async create(input: NewUser): Promise<UserRecord> {
    const user = await this.prisma.user.create({
      data: { email: input.email, password: input.passwordHash, name: input.name },
    });
    return toRecord(user);
  }
}
"#,
        ),
        Database::MongoMongoose => (
            r#"import { Injectable } from '@nestjs/common';
import { InjectModel } from '@nestjs/mongoose';
import { isValidObjectId, Model } from 'mongoose';
import { User, type UserDocument } from './schemas/user.schema';
"#,
            r#"
function toRecord(user: UserDocument): UserRecord {
  return {
    id: user._id.toString(),
    email: user.email,
    name: user.name ?? null,
    passwordHash: user.password,
  };
}

@Injectable()
export class UsersService {
  constructor(@InjectModel(User.name) private readonly users: Model<User>) {}

  async findByEmail(email: string): Promise<UserRecord | null> {
    const user = await this.users.findOne({ email: email.toLowerCase() });
    return user ? toRecord(user) : null;
  }

  async findById(id: string): Promise<UserRecord | null> {
    if (!isValidObjectId(id)) {
      return null;
    }
    const user = await this.users.findById(id);
    return user ? toRecord(user) : null;
  }

  async create(input: NewUser): Promise<UserRecord> {
    const user = await this.users.create({
      email: input.email,
      password: input.passwordHash,
      name: input.name,
    });
    return toRecord(user);
  }
}
"#,
        ),
        Database::PostgresRaw => (
            r#"import { Inject, Injectable, OnModuleInit } from '@nestjs/common';
import { Pool } from 'pg';
import { DATABASE } from '../database/database.constants';
"#,
            r#"
interface UserRow {
  id: number;
  email: string;
  name: string | null;
  password: string;
}

function toRecord(row: UserRow): UserRecord {
  return { id: String(row.id), email: row.email, name: row.name, passwordHash: row.password };
}

@Injectable()
export class UsersService implements OnModuleInit {
  constructor(@Inject(DATABASE) private readonly pool: Pool) {}

  async onModuleInit(): Promise<void> {
    await this.pool.query(`
      CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        name TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
      )
    `);
  }

  async findByEmail(email: string): Promise<UserRecord | null> {
    const { rows } = await this.pool.query<UserRow>(
      'SELECT id, email, name, password FROM users WHERE email = $1',
      [email],
    );
    return rows[0] ? toRecord(rows[0]) : null;
  }

  async findById(id: string): Promise<UserRecord | null> {
    const { rows } = await this.pool.query<UserRow>(
      'SELECT id, email, name, password FROM users WHERE id = $1',
      [Number(id)],
    );
    return rows[0] ? toRecord(rows[0]) : null;
  }

  async create(input: NewUser): Promise<UserRecord> {
    const { rows } = await this.pool.query<UserRow>(
      'INSERT INTO users (email, password, name) VALUES ($1, $2, $3) RETURNING id, email, name, password',
      [input.email, input.passwordHash, input.name ?? null],
    );
    return toRecord(rows[0]);
  }
}
"#,
        ),
        Database::MongoRaw => (
            r#"import { Inject, Injectable } from '@nestjs/common';
import { Db, ObjectId, type WithId } from 'mongodb';
import { DATABASE } from '../database/database.constants';
"#,
            r#"
interface UserDocument {
  email: string;
  password: string;
  name: string | null;
  createdAt: Date;
}

function toRecord(user: WithId<UserDocument>): UserRecord {
  return {
    id: user._id.toHexString(),
    email: user.email,
    name: user.name,
    passwordHash: user.password,
  };
}

@Injectable()
export class UsersService {
  constructor(@Inject(DATABASE) private readonly db: Db) {}

  private get users() {
    return this.db.collection<UserDocument>('users');
  }

  async findByEmail(email: string): Promise<UserRecord | null> {
    const user = await this.users.findOne({ email: email.toLowerCase() });
    return user ? toRecord(user) : null;
  }

  async findById(id: string): Promise<UserRecord | null> {
    if (!ObjectId.isValid(id)) {
      return null;
    }
    const user = await this.users.findOne({ _id: new ObjectId(id) });
    return user ? toRecord(user) : null;
  }

  async create(input: NewUser): Promise<UserRecord> {
    const document: UserDocument = {
      email: input.email.toLowerCase(),
      password: input.passwordHash,
      name: input.name ?? null,
      createdAt: new Date(),
    };
    const result = await this.users.insertOne(document);
    return toRecord({ _id: result.insertedId, ...document });
  }
}
"#,
        ),
        Database::SqliteRaw | Database::None => (
            r#"import { Inject, Injectable, OnModuleInit } from '@nestjs/common';
import Database from 'better-sqlite3';
import { DATABASE } from '../database/database.constants';
"#,
            r#"
interface UserRow {
  id: number;
  email: string;
  name: string | null;
  password: string;
}

function toRecord(row: UserRow): UserRecord {
  return { id: String(row.id), email: row.email, name: row.name, passwordHash: row.password };
}

@Injectable()
export class UsersService implements OnModuleInit {
  constructor(@Inject(DATABASE) private readonly db: Database.Database) {}

  onModuleInit(): void {
    this.db.exec(`
      CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        name TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
      )
    `);
  }

  async findByEmail(email: string): Promise<UserRecord | null> {
    const row = this.db
      .prepare('SELECT id, email, name, password FROM users WHERE email = ?')
      .get(email) as UserRow | undefined;
    return row ? toRecord(row) : null;
  }

  async findById(id: string): Promise<UserRecord | null> {
    const row = this.db
      .prepare('SELECT id, email, name, password FROM users WHERE id = ?')
      .get(Number(id)) as UserRow | undefined;
    return row ? toRecord(row) : null;
  }

  async create(input: NewUser): Promise<UserRecord> {
    const info = this.db
      .prepare('INSERT INTO users (email, password, name) VALUES (?, ?, ?)')
      .run(input.email, input.passwordHash, input.name ?? null);
    return {
      id: String(info.lastInsertRowid),
      email: input.email,
      name: input.name ?? null,
      passwordHash: input.passwordHash,
    };
  }
}
"#,
        ),
    };

    let mut code = Code::new();
    code.block(imports)
        .blank()
        .block(USER_TYPES)
        .blank()
        .block(body);
    code.finish()
}

fn auth(docs: bool, tree: &mut FileTree) -> Result<(), GenerateError> {
    tree.add("src/auth/auth.module.ts", FileKind::Source, AUTH_MODULE)?;
    tree.add("src/auth/auth.service.ts", FileKind::Source, AUTH_SERVICE)?;
    tree.add(
        "src/auth/auth.controller.ts",
        FileKind::Source,
        auth_controller(docs),
    )?;
    tree.add("src/auth/jwt.strategy.ts", FileKind::Source, JWT_STRATEGY)?;
    tree.add("src/auth/jwt-auth.guard.ts", FileKind::Source, JWT_GUARD)?;
    tree.add(
        "src/auth/dto/register.dto.ts",
        FileKind::Source,
        register_dto(docs),
    )?;
    tree.add("src/auth/dto/login.dto.ts", FileKind::Source, login_dto(docs))
}

const AUTH_MODULE: &str = r#"import { Module } from '@nestjs/common';
import { ConfigService } from '@nestjs/config';
import { JwtModule } from '@nestjs/jwt';
import { PassportModule } from '@nestjs/passport';
import { UsersModule } from '../users/users.module';
import { AuthController } from './auth.controller';
import { AuthService } from './auth.service';
import { JwtStrategy } from './jwt.strategy';

@Module({
  imports: [
    UsersModule,
    PassportModule,
    JwtModule.registerAsync({
      inject: [ConfigService],
      useFactory: (config: ConfigService) => ({
        secret: config.getOrThrow<string>('JWT_SECRET'),
        signOptions: { expiresIn: config.get<string>('JWT_EXPIRES_IN', '1d') },
      }),
    }),
  ],
  controllers: [AuthController],
  providers: [AuthService, JwtStrategy],
})
export class AuthModule {}
"#;

const AUTH_SERVICE: &str = r#"import {
  ConflictException,
  Injectable,
  NotFoundException,
  UnauthorizedException,
} from '@nestjs/common';
import { JwtService } from '@nestjs/jwt';
import * as bcrypt from 'bcryptjs';
import { UsersService, type UserRecord } from '../users/users.service';
import { LoginDto } from './dto/login.dto';
import { RegisterDto } from './dto/register.dto';

@Injectable()
export class AuthService {
  constructor(
    private readonly users: UsersService,
    private readonly jwt: JwtService,
  ) {}

  async register(dto: RegisterDto) {
    if (await this.users.findByEmail(dto.email)) {
      throw new ConflictException('Email already registered');
    }
    const passwordHash = await bcrypt.hash(dto.password, 10);
    const user = await this.users.create({ email: dto.email, passwordHash, name: dto.name });
    return this.session(user);
  }

  async login(dto: LoginDto) {
    const user = await this.users.findByEmail(dto.email);
    if (!user || !(await bcrypt.compare(dto.password, user.passwordHash))) {
      throw new UnauthorizedException('Invalid credentials');
    }
    return this.session(user);
  }

  async profile(userId: string) {
    const user = await this.users.findById(userId);
    if (!user) {
      throw new NotFoundException('User not found');
    }
    return { user: this.toPublic(user) };
  }

  private session(user: UserRecord) {
    const token = this.jwt.sign({ sub: user.id, email: user.email });
    return { user: this.toPublic(user), token };
  }

  private toPublic(user: UserRecord) {
    return { id: user.id, email: user.email, name: user.name };
  }
}
"#;

fn auth_controller(docs: bool) -> String {
    let mut code = Code::new();
    code.line("import { Body, Controller, Get, HttpCode, HttpStatus, Post, Req, UseGuards } from '@nestjs/common';")
        .line_if(docs, "import { ApiBearerAuth, ApiTags } from '@nestjs/swagger';")
        .block(
            r#"
import { AuthService } from './auth.service';
import { LoginDto } from './dto/login.dto';
import { RegisterDto } from './dto/register.dto';
import { JwtAuthGuard } from './jwt-auth.guard';
import type { JwtPayload } from './jwt.strategy';

"#,
        )
        .line_if(docs, "@ApiTags('auth')")
        .block(
            r#"
@Controller('auth')
export class AuthController {
  constructor(private readonly auth: AuthService) {}

  @Post('register')
  register(@Body() dto: RegisterDto) {
    return this.auth.register(dto);
  }

  @Post('login')
  @HttpCode(HttpStatus.OK)
  login(@Body() dto: LoginDto) {
    return this.auth.login(dto);
  }

"#,
        )
        .line_if(docs, "  @ApiBearerAuth()")
        .block(
            r#"
  @UseGuards(JwtAuthGuard)
  @Get('me')
  me(@Req() req: { user: JwtPayload }) {
    return this.auth.profile(req.user.sub);
  }
}"#,
        );
    code.finish()
}

const JWT_STRATEGY: &str = r#"import { Injectable } from '@nestjs/common';
import { ConfigService } from '@nestjs/config';
import { PassportStrategy } from '@nestjs/passport';
import { ExtractJwt, Strategy } from 'passport-jwt';

export interface JwtPayload {
  sub: string;
  email: string;
}

@Injectable()
export class JwtStrategy extends PassportStrategy(Strategy) {
  constructor(config: ConfigService) {
    super({
      jwtFromRequest: ExtractJwt.fromAuthHeaderAsBearerToken(),
      ignoreExpiration: false,
      secretOrKey: config.getOrThrow<string>('JWT_SECRET'),
    });
  }

  validate(payload: JwtPayload): JwtPayload {
    return payload;
  }
}
"#;

const JWT_GUARD: &str = r#"import { Injectable } from '@nestjs/common';
import { AuthGuard } from '@nestjs/passport';

@Injectable()
export class JwtAuthGuard extends AuthGuard('jwt') {}
"#;

fn register_dto(docs: bool) -> String {
    let mut code = Code::new();
    code.line_if(docs, "import { ApiProperty, ApiPropertyOptional } from '@nestjs/swagger';")
        .line("import { IsEmail, IsOptional, IsString, MinLength } from 'class-validator';")
        .blank()
        .line("export class RegisterDto {")
        .line_if(docs, "  @ApiProperty({ example: 'ada@example.com' })")
        .line("  @IsEmail()")
        .line("  email!: string;")
        .blank()
        .line_if(docs, "  @ApiProperty({ minLength: 8 })")
        .line("  @IsString()")
        .line("  @MinLength(8)")
        .line("  password!: string;")
        .blank()
        .line_if(docs, "  @ApiPropertyOptional({ example: 'Ada Lovelace' })")
        .line("  @IsOptional()")
        .line("  @IsString()")
        .line("  name?: string;")
        .line("}");
    code.finish()
}

fn login_dto(docs: bool) -> String {
    let mut code = Code::new();
    code.line_if(docs, "import { ApiProperty } from '@nestjs/swagger';")
        .line("import { IsEmail, IsString, MinLength } from 'class-validator';")
        .blank()
        .line("export class LoginDto {")
        .line_if(docs, "  @ApiProperty({ example: 'ada@example.com' })")
        .line("  @IsEmail()")
        .line("  email!: string;")
        .blank()
        .line_if(docs, "  @ApiProperty()")
        .line("  @IsString()")
        .line("  @MinLength(1)")
        .line("  password!: string;")
        .line("}");
    code.finish()
}

fn swagger(config: &FeatureConfig) -> String {
    let mut code = Code::new();
    code.block(
        r#"
import type { INestApplication } from '@nestjs/common';
import { DocumentBuilder, SwaggerModule } from '@nestjs/swagger';

export function setupSwagger(app: INestApplication): void {
  const config = new DocumentBuilder()"#,
    )
    .line(format!("    .setTitle('{}')", config.project_name()))
    .line("    .setVersion('0.1.0')")
    .line_if(config.needs_auth_files(), "    .addBearerAuth()")
    .block(
        r#"
    .build();
  const document = SwaggerModule.createDocument(app, config);
  SwaggerModule.setup('api/docs', app, document);
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
        generate_profile(Profile::NestApi, &config, &PinnedVersions::bundled()).unwrap()
    }

    #[test]
    fn test_minimal_nest_has_no_feature_modules() {
        let tree = tree(RawAnswers {
            database: Some("none".to_string()),
            include_api_docs: Some(false),
            include_container: Some(false),
            ..RawAnswers::for_stack("api", "nest")
        });
        assert!(tree.contains("src/main.ts"));
        assert!(tree.contains("src/health/health.controller.ts"));
        assert!(tree.contains("src/common/filters/http-exception.filter.ts"));
        assert!(tree.contains("tsconfig.json"));
        assert!(tree.contains("test/app.e2e-spec.ts"));
        assert!(tree.paths().all(|p| !p.starts_with("src/auth")
            && !p.starts_with("src/users")
            && !p.starts_with("src/database")));
        let app_module = &tree.get("src/app.module.ts").unwrap().content;
        assert!(app_module.contains("ConfigModule.forRoot({ isGlobal: true }),"));
        assert!(!app_module.contains("AuthModule"));
        let health = &tree.get("src/health/health.controller.ts").unwrap().content;
        assert!(!health.contains("@nestjs/swagger"));
    }

    #[test]
    fn test_full_nest_wires_modules() {
        let tree = tree(RawAnswers::for_stack("api", "nest"));
        for path in [
            "prisma/schema.prisma",
            "src/database/prisma.service.ts",
            "src/users/users.service.ts",
            "src/auth/auth.controller.ts",
            "src/auth/dto/register.dto.ts",
            "src/swagger.ts",
            "src/config/env.validation.ts",
            "Dockerfile",
        ] {
            assert!(tree.contains(path), "missing {}", path);
        }
        let app_module = &tree.get("src/app.module.ts").unwrap().content;
        assert!(app_module.contains("validate: validateEnv"));
        assert!(app_module.contains("    AuthModule,"));
        let main = &tree.get("src/main.ts").unwrap().content;
        assert!(main.contains("  setupSwagger(app);"));
        let dockerfile = &tree.get("Dockerfile").unwrap().content;
        assert!(dockerfile.contains("dist/main.js"));
    }

    #[test]
    fn test_mongoose_schema_lives_with_users() {
        let tree = tree(RawAnswers {
            database: Some("mongodb".to_string()),
            ..RawAnswers::for_stack("api", "nest")
        });
        assert!(tree.contains("src/users/schemas/user.schema.ts"));
        let module = &tree.get("src/users/users.module.ts").unwrap().content;
        assert!(module.contains("MongooseModule.forFeature"));
    }

    #[test]
    fn test_dto_decorators_follow_docs() {
        assert!(register_dto(true).contains("@ApiProperty"));
        assert!(!register_dto(false).contains("@nestjs/swagger"));
        assert!(!login_dto(false).contains("ApiProperty"));
    }

    #[test]
    fn test_manifest_carries_jest_config() {
        let tree = tree(RawAnswers::for_stack("api", "nest"));
        let manifest: Value =
            serde_json::from_str(&tree.get("package.json").unwrap().content).unwrap();
        assert_eq!(manifest["jest"]["transform"]["^.+\\.(t|j)s$"], "ts-jest");
        assert_eq!(manifest["scripts"]["build"], "nest build");
        assert!(manifest["dependencies"].get("@nestjs/swagger").is_some());
    }
}
