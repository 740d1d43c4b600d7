//! Posts, contracts, INNs and agreement persons.
//!
//! These rows are referenced by requests, so they are soft deleted
//! (`is_active = 0`) and only once nothing points at them any more.

use super::{AppState, DeleteOutcome};
use crate::reference::models::{
    AgreementPerson, Contract, CreateAgreementPersonRequest, CreateInnRequest, CreatePostRequest,
    NewContract, OrganizationInn, Post,
};
use crate::validators::non_empty;

const POST_USAGE: &str = "SELECT COUNT(*) FROM pass_requests, json_each(pass_requests.post_ids) \
     WHERE json_each.value = ?1";
const CONTRACT_USAGE: &str = "SELECT (SELECT COUNT(*) FROM pass_requests WHERE contract_id = ?1) \
     + (SELECT COUNT(*) FROM shift_requests WHERE contract_id = ?1)";
const INN_USAGE: &str = "SELECT COUNT(*) FROM pass_requests WHERE inn_id = ?1";
const AGREEMENT_PERSON_USAGE: &str =
    "SELECT COUNT(*) FROM pass_requests WHERE agreement_person_id = ?1";

impl AppState {
    pub async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE is_active = 1 ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn insert_post(&self, request: &CreatePostRequest) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (name, description) VALUES (?, ?) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(non_empty(&request.description))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_post(&self, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        self.soft_delete("posts", POST_USAGE, id).await
    }

    pub async fn post_names(&self, ids: &[i64]) -> Result<Vec<String>, sqlx::Error> {
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(name) =
                sqlx::query_scalar::<_, String>("SELECT name FROM posts WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub async fn list_contracts(&self) -> Result<Vec<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE is_active = 1 ORDER BY start_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_contract(&self, contract: &NewContract) -> Result<Contract, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (number, name, start_date, end_date, customer)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&contract.number)
        .bind(&contract.name)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(&contract.customer)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_contract(&self, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        self.soft_delete("contracts", CONTRACT_USAGE, id).await
    }

    pub async fn list_inns(&self) -> Result<Vec<OrganizationInn>, sqlx::Error> {
        sqlx::query_as::<_, OrganizationInn>(
            "SELECT * FROM organization_inns WHERE is_active = 1 ORDER BY organization_name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_inn(
        &self,
        request: &CreateInnRequest,
    ) -> Result<OrganizationInn, sqlx::Error> {
        sqlx::query_as::<_, OrganizationInn>(
            r#"
            INSERT INTO organization_inns (inn, organization_name, contact_person, phone, email)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.inn.trim())
        .bind(request.organization_name.trim())
        .bind(non_empty(&request.contact_person))
        .bind(non_empty(&request.phone))
        .bind(non_empty(&request.email))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_inn(&self, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        self.soft_delete("organization_inns", INN_USAGE, id).await
    }

    pub async fn list_agreement_persons(&self) -> Result<Vec<AgreementPerson>, sqlx::Error> {
        sqlx::query_as::<_, AgreementPerson>(
            "SELECT * FROM agreement_persons WHERE is_active = 1 ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_agreement_person(
        &self,
        request: &CreateAgreementPersonRequest,
    ) -> Result<AgreementPerson, sqlx::Error> {
        sqlx::query_as::<_, AgreementPerson>(
            r#"
            INSERT INTO agreement_persons (full_name, organization, position, phone, email)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.full_name.trim())
        .bind(non_empty(&request.organization))
        .bind(non_empty(&request.position))
        .bind(non_empty(&request.phone))
        .bind(non_empty(&request.email))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_agreement_person(&self, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
        self.soft_delete("agreement_persons", AGREEMENT_PERSON_USAGE, id)
            .await
    }

    /// Deactivates an active row unless `usage_sql` (bound to the id) counts
    /// references to it.
    async fn soft_delete(
        &self,
        table: &str,
        usage_sql: &str,
        id: i64,
    ) -> Result<DeleteOutcome, sqlx::Error> {
        let exists_sql = format!("SELECT COUNT(*) FROM {} WHERE id = ? AND is_active = 1", table);
        let exists: i64 = sqlx::query_scalar(&exists_sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if exists == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        let usage: i64 = sqlx::query_scalar(usage_sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if usage > 0 {
            return Ok(DeleteOutcome::InUse(usage));
        }

        let sql = format!(
            "UPDATE {} SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            table
        );
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(DeleteOutcome::Deleted)
    }
}
