use invitecard_scanner::ScanError;
use invitecard_shared::models::{now_str, AccessLevel, AttendeeGroup, ImportRow, User};
use email_address::EmailAddress;
use serde::{Deserialize, Deserializer, Serialize};

// Request DTOs
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub attendee_info: Option<AttendeeGroup>,
}

/// A PATCH field that can be set to a value or explicitly cleared with `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionalField<T> {
    Value(T),
    Null,
}

impl<T> OptionalField<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            OptionalField::Value(v) => Some(v),
            OptionalField::Null => None,
        }
    }
}

fn optional_field<'de, D, T>(deserializer: D) -> Result<Option<OptionalField<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(match Option::<T>::deserialize(deserializer)? {
        Some(value) => OptionalField::Value(value),
        None => OptionalField::Null,
    }))
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company_id: Option<String>,
    pub room_number: Option<String>,
    pub access_level: Option<AccessLevel>,
    #[serde(default, deserialize_with = "optional_field")]
    pub designation: Option<OptionalField<String>>,
    #[serde(default, deserialize_with = "optional_field")]
    pub state: Option<OptionalField<String>>,
    #[serde(default, deserialize_with = "optional_field")]
    pub mobile_number: Option<OptionalField<String>>,
    #[serde(default, deserialize_with = "optional_field")]
    pub photo_url: Option<OptionalField<String>>,
    #[serde(default, deserialize_with = "optional_field")]
    pub attendee_info: Option<OptionalField<AttendeeGroup>>,
}

/// `GET /users?q=` filter, matched against name, e-mail, company and room.
#[derive(Deserialize, Debug, Default)]
pub struct UserQuery {
    pub q: Option<String>,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        let needle = match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return true,
        };
        [&user.name, &user.email, &user.company_id, &user.room_number]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Deserialize, Debug)]
pub struct ImportRequest {
    pub users: Vec<ImportRow>,
}

#[derive(Deserialize, Debug)]
pub struct VerifyRequest {
    pub payload: String,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QrFormat {
    #[default]
    Png,
    Svg,
}

impl QrFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            QrFormat::Png => "png",
            QrFormat::Svg => "svg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Svg => "image/svg+xml",
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct QrQuery {
    #[serde(default)]
    pub format: QrFormat,
}

// Response DTOs
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub user: User,
    pub payload: String,
    /// PNG data URL of the QR code
    pub qr_code: String,
    pub download_name: String,
}

/// What the last finished scan produced.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: String,
}

impl ScanReport {
    pub fn from_result(result: &Result<User, ScanError>) -> Self {
        match result {
            Ok(user) => Self {
                outcome: "found".to_string(),
                user: Some(user.clone()),
                error: None,
                finished_at: now_str(),
            },
            Err(e) => Self {
                outcome: e.kind().to_string(),
                user: None,
                error: Some(e.to_string()),
                finished_at: now_str(),
            },
        }
    }
}

/// Trimmed, lower-cased address, or `None` when it is not a valid e-mail.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    EmailAddress::is_valid(&email).then_some(email)
}

/// File name offered when downloading an invitation image.
pub fn download_name(user_name: &str, format: QrFormat) -> String {
    let slug = user_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("invitation-{}.{}", slug, format.extension())
}
