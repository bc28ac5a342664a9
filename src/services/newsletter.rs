use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use tracing::info;

use crate::entities::{newsletter_signups, prelude::*};
use crate::error::ServiceError;
use crate::models::newsletter::NewsletterRequest;

/// Subscribe an address; signing up again only refreshes the name.
pub async fn subscribe(db: &DatabaseConnection, req: NewsletterRequest) -> Result<(), ServiceError> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();
    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let existing = NewsletterSignups::find()
        .filter(newsletter_signups::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(signup) => {
            if name.is_some() && name != signup.name {
                let mut active = signup.into_active_model();
                active.name = Set(name);
                active.update(db).await?;
            }
            info!(email = %email, "Newsletter signup refreshed");
        }
        None => {
            newsletter_signups::ActiveModel {
                email: Set(email.clone()),
                name: Set(name),
                created_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(email = %email, "Newsletter signup created");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn signup(name: Option<&str>) -> newsletter_signups::Model {
        newsletter_signups::Model {
            id: 7,
            name: name.map(str::to_string),
            email: "reader@example.com".to_string(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = subscribe(
            &db,
            NewsletterRequest {
                email: "not-an-email".to_string(),
                name: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref f) if f.contains("email")));
    }

    #[tokio::test]
    async fn test_resubscribe_without_name_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![signup(Some("Ana"))]])
            .into_connection();
        subscribe(
            &db,
            NewsletterRequest {
                email: "Reader@Example.com".to_string(),
                name: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_resubscribe_updates_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![signup(None)]])
            .append_query_results([vec![signup(Some("Ana"))]])
            .into_connection();
        subscribe(
            &db,
            NewsletterRequest {
                email: "reader@example.com".to_string(),
                name: Some("Ana".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(db.into_transaction_log().len(), 2);
    }
}
