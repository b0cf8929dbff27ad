use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Access tag carried by every user record.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Admin,
    #[default]
    User,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::User => "user",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeType {
    Single,
    Couple,
    Family,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// People accompanying the invited user. Order of `attendees` is preserved.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AttendeeGroup {
    #[serde(rename = "type")]
    pub group_type: AttendeeType,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// A user as stored by the admin side and shown on the invitation card.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company_id: String,
    pub room_number: String,
    pub access_level: AccessLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_info: Option<AttendeeGroup>,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Builds a fresh record with a new id and creation timestamps.
    pub fn new(name: String, email: String, company_id: String, room_number: String) -> Self {
        let now = now_str();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email: email.to_lowercase(),
            company_id,
            room_number,
            access_level: AccessLevel::User,
            designation: None,
            state: None,
            mobile_number: None,
            photo_url: None,
            attendee_info: None,
            last_login: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.access_level == AccessLevel::Admin
    }
}

/// One tabulated row of a bulk user import.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Current time as an RFC 3339 string.
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// The users the service ships with when demo seeding is enabled.
pub fn demo_users() -> Vec<User> {
    let now = now_str();
    let demo = |id: &str,
                name: &str,
                email: &str,
                company_id: &str,
                room_number: &str,
                designation: &str,
                access_level: AccessLevel| User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        company_id: company_id.to_string(),
        room_number: room_number.to_string(),
        access_level,
        designation: Some(designation.to_string()),
        state: None,
        mobile_number: None,
        photo_url: None,
        attendee_info: None,
        last_login: None,
        created_at: now.clone(),
        updated_at: now.clone(),
    };

    vec![
        demo(
            "1",
            "Admin User",
            "admin@example.com",
            "ADMIN",
            "001",
            "System Administrator",
            AccessLevel::Admin,
        ),
        demo(
            "2",
            "John Doe",
            "john@example.com",
            "COMP001",
            "101",
            "Sales Manager",
            AccessLevel::User,
        ),
        demo(
            "3",
            "Jane Smith",
            "jane@example.com",
            "COMP002",
            "102",
            "Marketing Specialist",
            AccessLevel::User,
        ),
    ]
}
