use camino::Utf8Path;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::domain::StagingRelation;
use crate::error::QcError;

/// Restricts catalog matching to one entity type and a set of accepted
/// source databases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogScope {
    pub entity_type: i64,
    pub source_databases: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub accession_id: String,
    pub entity_type: i64,
    pub source_database: i64,
    pub is_preferred: bool,
}

/// One database session shared by the staging load and both reporters.
/// Rows copied in with `copy_in` must be visible to the queries issued
/// afterwards on the same session.
pub trait CatalogSession {
    fn copy_in(&mut self, relation: &StagingRelation, rows: &[String]) -> Result<usize, QcError>;
    /// Whether `relation` resolves to a table on this session, whoever
    /// loaded it.
    fn has_relation(&self, relation: &StagingRelation) -> Result<bool, QcError>;
    fn secondary_ids(
        &self,
        relation: &StagingRelation,
        scope: &CatalogScope,
    ) -> Result<Vec<String>, QcError>;
    fn invalid_ids(
        &self,
        relation: &StagingRelation,
        scope: &CatalogScope,
    ) -> Result<Vec<String>, QcError>;
    fn release(self) -> Result<(), QcError>
    where
        Self: Sized;
}

pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn open(path: &Utf8Path) -> Result<Self, QcError> {
        // No SQLITE_OPEN_CREATE: a missing catalog is an error, not an empty one.
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path.as_std_path(), flags)
            .map_err(|_| QcError::CatalogOpen(path.to_path_buf()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, QcError> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self { conn };
        catalog.ensure_schema()?;
        Ok(catalog)
    }

    pub fn ensure_schema(&self) -> Result<(), QcError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS acc_accession (
              accession_id TEXT NOT NULL,
              entity_type INTEGER NOT NULL,
              source_database INTEGER NOT NULL,
              preferred INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_acc_accession_lower_id
              ON acc_accession(lower(accession_id));
            ",
        )?;
        Ok(())
    }

    pub fn insert_entry(&self, entry: &CatalogEntry) -> Result<(), QcError> {
        self.conn.execute(
            "INSERT INTO acc_accession (accession_id, entity_type, source_database, preferred)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.accession_id,
                entry.entity_type,
                entry.source_database,
                entry.is_preferred
            ],
        )?;
        Ok(())
    }

    fn scoped_ids(&self, sql: &str, scope: &CatalogScope) -> Result<Vec<String>, QcError> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = std::iter::once(scope.entity_type)
            .chain(scope.source_databases.iter().copied());
        let rows = stmt.query_map(params_from_iter(values), |row| row.get::<_, String>(0))?;
        let ids = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

impl CatalogSession for SqliteCatalog {
    fn copy_in(&mut self, relation: &StagingRelation, rows: &[String]) -> Result<usize, QcError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "CREATE TEMP TABLE IF NOT EXISTS {relation} (seq_id TEXT)"
        ))?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {relation} (seq_id) VALUES (?1)"))?;
            for row in rows {
                stmt.execute(params![row])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn has_relation(&self, relation: &StagingRelation) -> Result<bool, QcError> {
        let sql = match relation.schema() {
            Some(schema) => format!(
                "SELECT 1 FROM {schema}.sqlite_master
                 WHERE type = 'table' AND name = ?1 COLLATE NOCASE"
            ),
            None => "SELECT 1 FROM sqlite_temp_master
                     WHERE type = 'table' AND name = ?1 COLLATE NOCASE
                     UNION ALL
                     SELECT 1 FROM sqlite_master
                     WHERE type = 'table' AND name = ?1 COLLATE NOCASE"
                .to_string(),
        };
        let found = self
            .conn
            .query_row(&sql, params![relation.table()], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn secondary_ids(
        &self,
        relation: &StagingRelation,
        scope: &CatalogScope,
    ) -> Result<Vec<String>, QcError> {
        let sql = format!(
            "SELECT tmp.seq_id
             FROM {relation} tmp, acc_accession a
             WHERE tmp.seq_id IS NOT NULL
               AND lower(tmp.seq_id) = lower(a.accession_id)
               AND a.entity_type = ?1
               AND a.source_database IN ({})
               AND a.preferred = 0
             ORDER BY lower(tmp.seq_id), tmp.rowid",
            source_placeholders(scope)
        );
        self.scoped_ids(&sql, scope)
    }

    fn invalid_ids(
        &self,
        relation: &StagingRelation,
        scope: &CatalogScope,
    ) -> Result<Vec<String>, QcError> {
        let sql = format!(
            "SELECT tmp.seq_id
             FROM {relation} tmp
             WHERE tmp.seq_id IS NOT NULL
               AND NOT EXISTS (
                 SELECT 1 FROM acc_accession a
                 WHERE lower(a.accession_id) = lower(tmp.seq_id)
                   AND a.entity_type = ?1
                   AND a.source_database IN ({})
               )
             ORDER BY lower(tmp.seq_id), tmp.rowid",
            source_placeholders(scope)
        );
        self.scoped_ids(&sql, scope)
    }

    fn release(self) -> Result<(), QcError> {
        self.conn.close().map_err(|(_, err)| QcError::from(err))
    }
}

// ?1 is the entity type; source databases follow from ?2.
fn source_placeholders(scope: &CatalogScope) -> String {
    (0..scope.source_databases.len())
        .map(|idx| format!("?{}", idx + 2))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_entity_type() {
        let scope = CatalogScope {
            entity_type: 19,
            source_databases: vec![9, 27, 41],
        };
        assert_eq!(source_placeholders(&scope), "?2, ?3, ?4");
    }
}
