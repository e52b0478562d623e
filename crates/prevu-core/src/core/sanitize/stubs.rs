//! File bodies injected when a sandbox-incompatible package is stripped.
//! Each stand-in keeps the original entry points so generated imports keep
//! resolving; none of them talks to anything real.

pub const MANIFEST_PATH: &str = "package.json";
pub const PRISMA_CLIENT_PATH: &str = "lib/prisma.ts";
pub const BCRYPT_STUB_PATH: &str = "lib/bcrypt.ts";
pub const BCRYPT_ALIAS: &str = "@/lib/bcrypt";
pub const TSCONFIG_PATH: &str = "tsconfig.json";
pub const NEXT_CONFIG_PATH: &str = "next.config.mjs";

pub const PINNED_NEXT: &str = "^14.2.5";
pub const PINNED_REACT: &str = "^18.3.1";

/// Stand-in for the generated Prisma client. Every model property resolves
/// to query methods returning empty/zero/echo results without a database.
pub const PRISMA_CLIENT_STUB: &str = r#"// Sandbox stand-in for the generated Prisma client. Query methods resolve
// with empty results so pages render without a database.
const EMPTY_RESULTS: Record<string, unknown> = {
  findMany: [],
  findFirst: null,
  findUnique: null,
  delete: null,
  deleteMany: { count: 0 },
  updateMany: { count: 0 },
  createMany: { count: 0 },
  count: 0,
  aggregate: {},
  groupBy: [],
};

const modelHandler: ProxyHandler<Record<string, unknown>> = {
  get(_target, method: string) {
    return async (args?: { data?: unknown }) => {
      if (method === "create" || method === "update" || method === "upsert") {
        return { id: "preview-id", ...(args?.data ?? {}) };
      }
      if (method in EMPTY_RESULTS) {
        return EMPTY_RESULTS[method];
      }
      return null;
    };
  },
};

const clientHandler: ProxyHandler<Record<string, unknown>> = {
  get(_target, prop: string) {
    if (prop === "$connect" || prop === "$disconnect") {
      return async () => undefined;
    }
    if (prop === "$transaction") {
      return async (input: unknown) =>
        Array.isArray(input)
          ? Promise.all(input)
          : (input as (tx: unknown) => unknown)(prisma);
    }
    return new Proxy({}, modelHandler);
  },
};

export const prisma: any = new Proxy({}, clientHandler);

export class PrismaClient {
  constructor() {
    return prisma;
  }
}

export default prisma;
"#;

/// Pure-logic bcrypt replacement. Not secure; preview rendering only.
pub const BCRYPT_STUB: &str = r#"// Sandbox stand-in for the native bcrypt addon. Not secure; preview only.
export async function hash(password: string, _saltOrRounds?: string | number): Promise<string> {
  return `preview$${password}`;
}

export async function compare(password: string, hashed: string): Promise<boolean> {
  return hashed === `preview$${password}`;
}

export function hashSync(password: string, _saltOrRounds?: string | number): string {
  return `preview$${password}`;
}

export function compareSync(password: string, hashed: string): boolean {
  return hashed === `preview$${password}`;
}

export async function genSalt(_rounds?: number): Promise<string> {
  return "preview-salt";
}

export function genSaltSync(_rounds?: number): string {
  return "preview-salt";
}

export default { hash, compare, hashSync, compareSync, genSalt, genSaltSync };
"#;

pub const TSCONFIG_STUB: &str = r#"{
  "compilerOptions": {
    "target": "ES2017",
    "lib": ["dom", "dom.iterable", "esnext"],
    "allowJs": true,
    "skipLibCheck": true,
    "strict": false,
    "noEmit": true,
    "esModuleInterop": true,
    "module": "esnext",
    "moduleResolution": "bundler",
    "resolveJsonModule": true,
    "isolatedModules": true,
    "jsx": "preserve",
    "incremental": true,
    "plugins": [{ "name": "next" }],
    "paths": { "@/*": ["./*"] }
  },
  "include": ["next-env.d.ts", "**/*.ts", "**/*.tsx", ".next/types/**/*.ts"],
  "exclude": ["node_modules"]
}
"#;

pub const NEXT_CONFIG_STUB: &str = r#"/** @type {import('next').NextConfig} */
const nextConfig = {
  reactStrictMode: true,
  eslint: { ignoreDuringBuilds: true },
  typescript: { ignoreBuildErrors: true },
};

export default nextConfig;
"#;
