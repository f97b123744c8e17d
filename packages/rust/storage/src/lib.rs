//! Turso Embedded / libSQL storage layer for the tool catalogue.
//!
//! The [`Storage`] struct wraps a libSQL database holding catalogue entries
//! ([`Tool`]) and the history of enrichment runs ([`AnalysisRun`]).
//!
//! **Access rules:**
//! - CLI and catalogue handlers: read-write via [`Storage::open`]
//! - Reporting/export tools: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::params::Params;
use libsql::{Connection, Database, Value, params};
use tracing::{debug, info};
use uuid::Uuid;

use toolscout_shared::{
    NewTool, Result, Tool, ToolPage, ToolQuery, ToolScoutError, ToolUpdate, total_pages,
};

/// Column list shared by every `SELECT` that builds a [`Tool`].
const TOOL_COLUMNS: &str = "id, slug, name, link, category, overview, description, \
     target_audience, key_features, tags, meta_title, meta_description, seo_keywords, \
     quality_score, is_active, featured, view_count, created_at, updated_at, \
     last_checked_at, last_optimized_at";

fn db_err(e: libsql::Error) -> ToolScoutError {
    ToolScoutError::Storage(e.to_string())
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ToolScoutError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;
        let conn = db.connect().map_err(db_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .await
            .map_err(db_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;
        let conn = db.connect().map_err(db_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        ToolScoutError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(ToolScoutError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tool operations
    // -----------------------------------------------------------------------

    /// Insert a new catalogue entry and return it as stored.
    ///
    /// Fails with a validation error when the slug or name is blank or the
    /// slug is already taken.
    pub async fn insert_tool(&self, tool: &NewTool) -> Result<Tool> {
        self.check_writable()?;
        if tool.slug.trim().is_empty() || tool.name.trim().is_empty() {
            return Err(ToolScoutError::validation("tool slug and name are required"));
        }
        if self.get_tool_by_slug(&tool.slug).await?.is_some() {
            return Err(ToolScoutError::validation(format!(
                "a tool with slug '{}' already exists",
                tool.slug
            )));
        }

        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO tools (slug, name, link, category, overview, description,
                     target_audience, key_features, tags, meta_title, meta_description,
                     seo_keywords, quality_score, featured, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    tool.slug.as_str(),
                    tool.name.as_str(),
                    tool.link.as_deref(),
                    tool.category.as_deref(),
                    tool.overview.as_deref(),
                    tool.description.as_deref(),
                    tool.target_audience.as_deref(),
                    tool.key_features.as_deref(),
                    tool.tags.as_deref(),
                    tool.meta_title.as_deref(),
                    tool.meta_description.as_deref(),
                    tool.seo_keywords.as_deref(),
                    tool.quality_score,
                    i64::from(tool.featured),
                    now.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;

        let id = self.conn.last_insert_rowid();
        debug!(id, slug = %tool.slug, "tool inserted");
        self.get_tool_by_id(id)
            .await?
            .ok_or_else(|| ToolScoutError::not_found("tool", id))
    }

    /// Get a tool by its numeric ID.
    pub async fn get_tool_by_id(&self, id: i64) -> Result<Option<Tool>> {
        let sql = format!("SELECT {TOOL_COLUMNS} FROM tools WHERE id = ?1");
        let mut rows = self.conn.query(&sql, params![id]).await.map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_tool(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Get a tool by its unique slug.
    pub async fn get_tool_by_slug(&self, slug: &str) -> Result<Option<Tool>> {
        let sql = format!("SELECT {TOOL_COLUMNS} FROM tools WHERE slug = ?1");
        let mut rows = self.conn.query(&sql, params![slug]).await.map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_tool(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// List tools, newest first, with filters and pagination.
    pub async fn list_tools(&self, query: &ToolQuery) -> Result<ToolPage> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(category) = &query.category {
            clauses.push("category = ?");
            values.push(Value::Text(category.clone()));
        }
        if query.active_only {
            clauses.push("is_active = 1");
        }
        if query.featured_only {
            clauses.push("featured = 1");
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let total = {
            let sql = format!("SELECT COUNT(*) FROM tools{where_sql}");
            let mut rows = self
                .conn
                .query(&sql, Params::Positional(values.clone()))
                .await
                .map_err(db_err)?;
            match rows.next().await.map_err(db_err)? {
                Some(row) => row.get::<i64>(0).map_err(db_err)?.max(0) as u64,
                None => 0,
            }
        };

        let (limit, offset) = query.window();
        let sql = format!(
            "SELECT {TOOL_COLUMNS} FROM tools{where_sql}
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        values.push(Value::Integer(i64::from(limit)));
        values.push(Value::Integer(i64::from(offset)));
        let mut rows = self
            .conn
            .query(&sql, Params::Positional(values))
            .await
            .map_err(db_err)?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            items.push(row_to_tool(&row)?);
        }

        Ok(ToolPage {
            items,
            total,
            page: query.page.max(1),
            per_page: limit,
            total_pages: total_pages(total, limit),
        })
    }

    /// Apply a partial update and return the updated tool.
    ///
    /// An empty update changes nothing (not even `updated_at`).
    pub async fn update_tool(&self, id: i64, update: &ToolUpdate) -> Result<Tool> {
        self.check_writable()?;
        if update.is_empty() {
            return self
                .get_tool_by_id(id)
                .await?
                .ok_or_else(|| ToolScoutError::not_found("tool", id));
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        let text_columns = [
            ("name = ?", &update.name),
            ("link = ?", &update.link),
            ("category = ?", &update.category),
            ("overview = ?", &update.overview),
            ("description = ?", &update.description),
            ("target_audience = ?", &update.target_audience),
            ("key_features = ?", &update.key_features),
            ("tags = ?", &update.tags),
            ("meta_title = ?", &update.meta_title),
            ("meta_description = ?", &update.meta_description),
            ("seo_keywords = ?", &update.seo_keywords),
        ];
        for (set, value) in text_columns {
            if let Some(v) = value {
                sets.push(set);
                values.push(Value::Text(v.clone()));
            }
        }
        if let Some(score) = update.quality_score {
            sets.push("quality_score = ?");
            values.push(Value::Real(score));
        }
        for (set, flag) in [
            ("is_active = ?", update.is_active),
            ("featured = ?", update.featured),
        ] {
            if let Some(flag) = flag {
                sets.push(set);
                values.push(Value::Integer(i64::from(flag)));
            }
        }
        for (set, at) in [
            ("last_checked_at = ?", update.last_checked_at),
            ("last_optimized_at = ?", update.last_optimized_at),
        ] {
            if let Some(at) = at {
                sets.push(set);
                values.push(Value::Text(at.to_rfc3339()));
            }
        }

        sets.push("updated_at = ?");
        values.push(Value::Text(Utc::now().to_rfc3339()));
        values.push(Value::Integer(id));

        let sql = format!("UPDATE tools SET {} WHERE id = ?", sets.join(", "));
        let changed = self
            .conn
            .execute(&sql, Params::Positional(values))
            .await
            .map_err(db_err)?;
        if changed == 0 {
            return Err(ToolScoutError::not_found("tool", id));
        }

        debug!(id, columns = sets.len() - 1, "tool updated");
        self.get_tool_by_id(id)
            .await?
            .ok_or_else(|| ToolScoutError::not_found("tool", id))
    }

    /// Activate or deactivate (soft-delete) a tool.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE tools SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                params![i64::from(active), now.as_str(), id],
            )
            .await
            .map_err(db_err)?;
        if changed == 0 {
            return Err(ToolScoutError::not_found("tool", id));
        }
        Ok(())
    }

    /// Permanently delete a tool and its analysis history.
    pub async fn delete_tool(&self, id: i64) -> Result<()> {
        self.check_writable()?;
        let changed = self
            .conn
            .execute("DELETE FROM tools WHERE id = ?1", params![id])
            .await
            .map_err(db_err)?;
        if changed == 0 {
            return Err(ToolScoutError::not_found("tool", id));
        }
        info!(id, "tool deleted");
        Ok(())
    }

    /// Bump a tool's view counter.
    pub async fn increment_view_count(&self, id: i64) -> Result<()> {
        self.check_writable()?;
        let changed = self
            .conn
            .execute(
                "UPDATE tools SET view_count = view_count + 1 WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(db_err)?;
        if changed == 0 {
            return Err(ToolScoutError::not_found("tool", id));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Analysis run operations
    // -----------------------------------------------------------------------

    /// Record one enrichment run. Returns the generated run ID.
    pub async fn record_analysis_run(
        &self,
        tool_id: Option<i64>,
        url: &str,
        source: &str,
        content_hash: &str,
        analysis_json: &str,
    ) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO analysis_runs (id, tool_id, url, source, content_hash, analysis_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.as_str(),
                    tool_id,
                    url,
                    source,
                    content_hash,
                    analysis_json,
                    now.as_str()
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(id)
    }

    /// List a tool's analysis runs, newest first.
    pub async fn list_analysis_runs(&self, tool_id: i64) -> Result<Vec<AnalysisRun>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, tool_id, url, source, content_hash, analysis_json, created_at
                 FROM analysis_runs WHERE tool_id = ?1 ORDER BY created_at DESC, id DESC",
                params![tool_id],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(AnalysisRun {
                id: row.get::<String>(0).map_err(db_err)?,
                tool_id: row.get::<i64>(1).ok(),
                url: row.get::<String>(2).map_err(db_err)?,
                source: row.get::<String>(3).map_err(db_err)?,
                content_hash: row.get::<String>(4).map_err(db_err)?,
                analysis_json: row.get::<String>(5).map_err(db_err)?,
                created_at: parse_date(&row.get::<String>(6).map_err(db_err)?)?,
            });
        }
        Ok(results)
    }
}

/// One recorded enrichment run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    /// UUID v7.
    pub id: String,
    pub tool_id: Option<i64>,
    pub url: String,
    /// `"ai"` or `"heuristic"`.
    pub source: String,
    pub content_hash: String,
    /// The serialized `ToolAnalysis`.
    pub analysis_json: String,
    pub created_at: DateTime<Utc>,
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ToolScoutError::Storage(format!("invalid date: {e}")))
}

fn optional_date(row: &libsql::Row, idx: i32) -> Result<Option<DateTime<Utc>>> {
    row.get::<String>(idx).ok().as_deref().map(parse_date).transpose()
}

/// Convert a database row (selected with [`TOOL_COLUMNS`]) to a [`Tool`].
fn row_to_tool(row: &libsql::Row) -> Result<Tool> {
    Ok(Tool {
        id: row.get::<i64>(0).map_err(db_err)?,
        slug: row.get::<String>(1).map_err(db_err)?,
        name: row.get::<String>(2).map_err(db_err)?,
        link: row.get::<String>(3).ok(),
        category: row.get::<String>(4).ok(),
        overview: row.get::<String>(5).ok(),
        description: row.get::<String>(6).ok(),
        target_audience: row.get::<String>(7).ok(),
        key_features: row.get::<String>(8).ok(),
        tags: row.get::<String>(9).ok(),
        meta_title: row.get::<String>(10).ok(),
        meta_description: row.get::<String>(11).ok(),
        seo_keywords: row.get::<String>(12).ok(),
        quality_score: row.get::<f64>(13).ok(),
        is_active: row.get::<i64>(14).map_err(db_err)? != 0,
        featured: row.get::<i64>(15).map_err(db_err)? != 0,
        view_count: row.get::<i64>(16).map_err(db_err)?,
        created_at: parse_date(&row.get::<String>(17).map_err(db_err)?)?,
        updated_at: parse_date(&row.get::<String>(18).map_err(db_err)?)?,
        last_checked_at: optional_date(row, 19)?,
        last_optimized_at: optional_date(row, 20)?,
    })
}
