//! Text payload embedded in invitation QR codes.
//!
//! The payload is a JSON object holding the non-temporal fields of a [`User`]
//! plus its optional attendee group. Timestamps are never written, so a
//! decoded record always carries decode-time `createdAt`/`updatedAt` values
//! and no `lastLogin`.
//!
//! When the codec is built with a signing key, an HMAC-SHA256 tag over the
//! serialized body travels in the `sig` field and is required on decode.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::hmac;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{now_str, AccessLevel, AttendeeGroup, User};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Payload is not a valid invitation record: {0}")]
    Malformed(String),

    #[error("Payload is missing its signature")]
    MissingSignature,

    #[error("Payload signature does not match its contents")]
    InvalidSignature,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PayloadBody {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    company_id: String,
    #[serde(default)]
    room_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
    #[serde(default)]
    access_level: AccessLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attendee_info: Option<AttendeeGroup>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(flatten)]
    body: PayloadBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sig: Option<String>,
}

impl From<&User> for PayloadBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            company_id: user.company_id.clone(),
            room_number: user.room_number.clone(),
            designation: user.designation.clone(),
            state: user.state.clone(),
            mobile_number: user.mobile_number.clone(),
            photo_url: user.photo_url.clone(),
            access_level: user.access_level,
            attendee_info: user.attendee_info.clone(),
        }
    }
}

impl PayloadBody {
    fn into_user(self) -> User {
        let now = now_str();
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            company_id: self.company_id,
            room_number: self.room_number,
            access_level: self.access_level,
            designation: self.designation,
            state: self.state,
            mobile_number: self.mobile_number,
            photo_url: self.photo_url,
            attendee_info: self.attendee_info,
            last_login: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Encodes users into QR payloads and decodes scanned payloads back.
#[derive(Clone, Default)]
pub struct PayloadCodec {
    key: Option<hmac::Key>,
}

impl std::fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCodec")
            .field("signed", &self.key.is_some())
            .finish()
    }
}

impl PayloadCodec {
    pub fn new(signing_key: Option<&[u8]>) -> Self {
        Self {
            key: signing_key.map(|k| hmac::Key::new(hmac::HMAC_SHA256, k)),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.key.is_some()
    }

    pub fn encode(&self, user: &User) -> Result<String, PayloadError> {
        let body = PayloadBody::from(user);
        let sig = match &self.key {
            Some(key) => Some(sign(key, &body)?),
            None => None,
        };

        serde_json::to_string(&Envelope { body, sig })
            .map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    pub fn decode(&self, raw: &str) -> Result<User, PayloadError> {
        let envelope: Envelope =
            serde_json::from_str(raw.trim()).map_err(|e| PayloadError::Malformed(e.to_string()))?;

        if let Some(key) = &self.key {
            let sig = envelope.sig.as_deref().ok_or(PayloadError::MissingSignature)?;
            let tag = URL_SAFE_NO_PAD
                .decode(sig)
                .map_err(|_| PayloadError::InvalidSignature)?;
            let message = canonical_bytes(&envelope.body)?;
            hmac::verify(key, &message, &tag).map_err(|_| PayloadError::InvalidSignature)?;
        }

        Ok(envelope.body.into_user())
    }
}

fn canonical_bytes(body: &PayloadBody) -> Result<Vec<u8>, PayloadError> {
    serde_json::to_vec(body).map_err(|e| PayloadError::Malformed(e.to_string()))
}

fn sign(key: &hmac::Key, body: &PayloadBody) -> Result<String, PayloadError> {
    let message = canonical_bytes(body)?;
    Ok(URL_SAFE_NO_PAD.encode(hmac::sign(key, &message).as_ref()))
}
