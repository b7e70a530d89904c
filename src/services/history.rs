//! Validation history: append records and list them scoped by role.

use std::collections::HashMap;

use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::history::{HistoryEntry, ValidationRecord};
use crate::models::page::{Page, PageQuery};
use crate::models::user::UserRole;
use crate::repository::{HistoryRepository, UserRepository};

/// Shown for records whose author is missing from the user store. Postgres
/// forbids such rows through the `user_id` foreign key, so only stores
/// without that constraint (`MemoryRepository`) produce them.
const UNKNOWN_USER: &str = "Unknown";

/// Append a record to the history log.
pub async fn record<R>(repo: &R, record: &ValidationRecord) -> Result<ValidationRecord, AppError>
where
    R: HistoryRepository + ?Sized,
{
    let stored = repo.append_record(record).await?;
    tracing::info!(
        record_id = %stored.id,
        user_id = %stored.user_id,
        is_valid = stored.is_valid,
        method = ?stored.validation_method,
        "Validation recorded"
    );
    Ok(stored)
}

/// List history visible to `viewer`: admins see every record with usernames,
/// staff only their own.
pub async fn list_for<R>(
    repo: &R,
    viewer: &CurrentUser,
    query: &PageQuery,
) -> Result<Page<HistoryEntry>, AppError>
where
    R: HistoryRepository + UserRepository + ?Sized,
{
    let scope = match viewer.role {
        UserRole::Admin => None,
        UserRole::Staff => Some(viewer.id),
    };

    let (records, total) = repo
        .list_records(scope, query.limit(), query.offset())
        .await?;

    let entries = match viewer.role {
        UserRole::Admin => {
            let usernames: HashMap<Uuid, String> = repo
                .list_users()
                .await?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect();
            records
                .into_iter()
                .map(|record| {
                    let username = usernames
                        .get(&record.user_id)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_USER.to_string());
                    HistoryEntry {
                        record,
                        username: Some(username),
                    }
                })
                .collect()
        }
        UserRole::Staff => records
            .into_iter()
            .map(|record| HistoryEntry {
                record,
                username: None,
            })
            .collect(),
    };

    Ok(Page::new(entries, total, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::history::ValidationMethod;
    use crate::models::user::NewUser;
    use crate::repository::MemoryRepository;
    use chrono::Utc;

    fn entry(user_id: Uuid, batch: &str) -> ValidationRecord {
        ValidationRecord {
            id: Uuid::new_v4(),
            user_id,
            product_id: None,
            product_name: Some("Juice".to_string()),
            batch_format: Some("NNS".to_string()),
            extracted_barcode: "1".to_string(),
            extracted_batch: batch.to_string(),
            is_valid: true,
            validation_method: ValidationMethod::Manual,
            image_sha256: None,
            image_mime_type: None,
            extracted_production_date: None,
            extracted_expiry_date: None,
            extracted_price: None,
            created_at: Utc::now(),
        }
    }

    fn page() -> PageQuery {
        PageQuery {
            page: None,
            per_page: None,
        }
    }

    async fn add_user(repo: &MemoryRepository, name: &str, role: UserRole) -> CurrentUser {
        let user = repo
            .create_user(&NewUser {
                username: name.to_string(),
                password_hash: "h".to_string(),
                role,
            })
            .await
            .unwrap();
        CurrentUser {
            id: user.id,
            username: user.username,
            role,
        }
    }

    #[tokio::test]
    async fn staff_sees_only_own_records() {
        let repo = MemoryRepository::new();
        let staff = add_user(&repo, "operator", UserRole::Staff).await;
        let other = add_user(&repo, "other", UserRole::Staff).await;
        record(&repo, &entry(staff.id, "12A")).await.unwrap();
        record(&repo, &entry(other.id, "34B")).await.unwrap();

        let result = list_for(&repo, &staff, &page()).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].record.extracted_batch, "12A");
        assert!(result.items[0].username.is_none());
    }

    #[tokio::test]
    async fn admin_sees_everything_with_usernames() {
        let repo = MemoryRepository::new();
        let admin = add_user(&repo, "admin", UserRole::Admin).await;
        let staff = add_user(&repo, "operator", UserRole::Staff).await;
        record(&repo, &entry(staff.id, "12A")).await.unwrap();
        record(&repo, &entry(Uuid::new_v4(), "99C")).await.unwrap();

        let result = list_for(&repo, &admin, &page()).await.unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.items[0].username.as_deref(), Some(UNKNOWN_USER));
        assert_eq!(result.items[1].username.as_deref(), Some("operator"));
    }
}
