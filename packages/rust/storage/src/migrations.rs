//! SQL migration definitions for the ToolScout catalogue database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as one batch.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: tools, analysis_runs",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Catalogue entries
CREATE TABLE IF NOT EXISTS tools (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    slug              TEXT NOT NULL UNIQUE,
    name              TEXT NOT NULL,
    link              TEXT,
    category          TEXT,
    overview          TEXT,
    description       TEXT,
    target_audience   TEXT,
    key_features      TEXT,
    tags              TEXT,
    meta_title        TEXT,
    meta_description  TEXT,
    seo_keywords      TEXT,
    quality_score     REAL,
    is_active         INTEGER NOT NULL DEFAULT 1,
    featured          INTEGER NOT NULL DEFAULT 0,
    view_count        INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    last_checked_at   TEXT,
    last_optimized_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_tools_category ON tools(category);
CREATE INDEX IF NOT EXISTS idx_tools_created_at ON tools(created_at);

-- Enrichment history, one row per pipeline run
CREATE TABLE IF NOT EXISTS analysis_runs (
    id            TEXT PRIMARY KEY,
    tool_id       INTEGER REFERENCES tools(id) ON DELETE CASCADE,
    url           TEXT NOT NULL,
    source        TEXT NOT NULL,
    content_hash  TEXT NOT NULL,
    analysis_json TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_analysis_runs_tool_id ON analysis_runs(tool_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Index featured tools",
            sql: r#"
CREATE INDEX IF NOT EXISTS idx_tools_featured ON tools(featured, is_active);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}
