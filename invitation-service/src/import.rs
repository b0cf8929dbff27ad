//! Bulk user import from tabulated rows.

use invitecard_shared::models::{now_str, ImportRow, User};
use invitecard_shared::store::UserStore;
use log::info;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::normalize_email;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// Every user in the store once the import has been applied
    pub users: Vec<User>,
}

/// Rejects the whole batch if any row lacks a name or a valid e-mail.
pub fn validate_rows(rows: &[ImportRow]) -> Result<()> {
    for (index, row) in rows.iter().enumerate() {
        if row.name.trim().is_empty() || row.email.trim().is_empty() {
            return Err(AppError::bad_request(format!(
                "Row {}: email and name are required fields",
                index + 1
            )));
        }
        if normalize_email(&row.email).is_none() {
            return Err(AppError::bad_request(format!(
                "Row {}: invalid email address {}",
                index + 1,
                row.email.trim()
            )));
        }
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn merge_into(existing: &mut User, row: ImportRow) {
    let name = row.name.trim();
    if !name.is_empty() {
        existing.name = name.to_string();
    }
    if let Some(company_id) = non_empty(row.company_id) {
        existing.company_id = company_id;
    }
    if let Some(room_number) = non_empty(row.room_number) {
        existing.room_number = room_number;
    }
    if let Some(designation) = non_empty(row.designation) {
        existing.designation = Some(designation);
    }
    if let Some(state) = non_empty(row.state) {
        existing.state = Some(state);
    }
    if let Some(mobile_number) = non_empty(row.mobile_number) {
        existing.mobile_number = Some(mobile_number);
    }
    if let Some(photo_url) = non_empty(row.photo_url) {
        existing.photo_url = Some(photo_url);
    }
    existing.updated_at = now_str();
}

fn new_user(row: ImportRow) -> User {
    let mut user = User::new(
        row.name.trim().to_string(),
        row.email.trim().to_string(),
        non_empty(row.company_id).unwrap_or_default(),
        non_empty(row.room_number).unwrap_or_default(),
    );
    user.access_level = row.access_level.unwrap_or_default();
    user.designation = non_empty(row.designation);
    user.state = non_empty(row.state);
    user.mobile_number = non_empty(row.mobile_number);
    user.photo_url = non_empty(row.photo_url);
    user
}

/// Creates users for unknown e-mails and updates the rest. Existing users
/// keep their access level.
pub async fn apply_import<S>(store: &S, rows: Vec<ImportRow>) -> Result<ImportSummary>
where
    S: UserStore,
{
    validate_rows(&rows)?;

    let mut created = 0;
    let mut updated = 0;
    for row in rows {
        let email = row.email.trim().to_lowercase();
        match store.get_user_by_email(&email).await? {
            Some(mut existing) => {
                merge_into(&mut existing, row);
                store.update_user(existing).await?;
                updated += 1;
            }
            None => {
                store.create_user(new_user(row)).await?;
                created += 1;
            }
        }
    }

    info!("Import applied: {} created, {} updated", created, updated);

    Ok(ImportSummary {
        created,
        updated,
        users: store.list_users().await?,
    })
}
