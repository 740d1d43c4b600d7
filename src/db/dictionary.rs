//! Dictionary database operations

use super::{is_foreign_key_violation, AppState, DeleteOutcome};
use crate::dictionary::models::{DictionaryEntry, DictionaryKind};

impl AppState {
    pub async fn list_dictionary(
        &self,
        kind: DictionaryKind,
    ) -> Result<Vec<DictionaryEntry>, sqlx::Error> {
        let sql = if kind.has_code() {
            format!(
                "SELECT id, name, code, created_at FROM {} WHERE is_active = 1 ORDER BY name",
                kind.table()
            )
        } else {
            format!(
                "SELECT id, name, NULL AS code, created_at FROM {} ORDER BY name",
                kind.table()
            )
        };
        sqlx::query_as::<_, DictionaryEntry>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn insert_dictionary_entry(
        &self,
        kind: DictionaryKind,
        name: &str,
        code: Option<&str>,
    ) -> Result<DictionaryEntry, sqlx::Error> {
        if kind.has_code() {
            let sql = format!(
                "INSERT INTO {} (name, code) VALUES (?, ?) RETURNING id, name, code, created_at",
                kind.table()
            );
            sqlx::query_as::<_, DictionaryEntry>(&sql)
                .bind(name)
                .bind(code)
                .fetch_one(&self.pool)
                .await
        } else {
            let sql = format!(
                "INSERT INTO {} (name) VALUES (?) RETURNING id, name, NULL AS code, created_at",
                kind.table()
            );
            sqlx::query_as::<_, DictionaryEntry>(&sql)
                .bind(name)
                .fetch_one(&self.pool)
                .await
        }
    }

    /// Hard delete, refused while employees, vehicles, norms or shift
    /// requests still point at the entry.
    pub async fn delete_dictionary_entry(
        &self,
        kind: DictionaryKind,
        id: i64,
    ) -> Result<DeleteOutcome, sqlx::Error> {
        let references = self.count_dictionary_references(kind, id).await?;
        if references > 0 {
            return Ok(DeleteOutcome::InUse(references));
        }

        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        match sqlx::query(&sql).bind(id).execute(&self.pool).await {
            Ok(result) if result.rows_affected() == 0 => Ok(DeleteOutcome::NotFound),
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(e) if is_foreign_key_violation(&e) => Ok(DeleteOutcome::InUse(1)),
            Err(e) => Err(e),
        }
    }

    async fn count_dictionary_references(
        &self,
        kind: DictionaryKind,
        id: i64,
    ) -> Result<i64, sqlx::Error> {
        let sql = match kind {
            DictionaryKind::Departments => {
                "SELECT (SELECT COUNT(*) FROM employees WHERE department_id = ?1) \
                 + (SELECT COUNT(*) FROM vehicles WHERE department_id = ?1)"
            }
            DictionaryKind::Positions => {
                "SELECT (SELECT COUNT(*) FROM employees WHERE position_id = ?1) \
                 + (SELECT COUNT(*) FROM position_uniforms WHERE position_id = ?1)"
            }
            DictionaryKind::Cities => "SELECT COUNT(*) FROM employees WHERE city_id = ?1",
            DictionaryKind::VehicleTypes => {
                "SELECT COUNT(*) FROM vehicles WHERE vehicle_type_id = ?1"
            }
            DictionaryKind::VehicleCategories => {
                "SELECT COUNT(*) FROM vehicles WHERE vehicle_category_id = ?1"
            }
            DictionaryKind::Airports => {
                "SELECT COUNT(*) FROM shift_requests \
                 WHERE departure_airport_id = ?1 OR arrival_airport_id = ?1"
            }
        };
        sqlx::query_scalar::<_, i64>(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn dictionary_names(
        &self,
        kind: DictionaryKind,
        ids: &[i64],
    ) -> Result<Vec<String>, sqlx::Error> {
        let sql = format!("SELECT name FROM {} WHERE id = ?", kind.table());
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(name) = sqlx::query_scalar::<_, String>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            {
                names.push(name);
            }
        }
        Ok(names)
    }
}
