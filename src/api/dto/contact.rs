//! DTOs for the contact form and newsletter endpoints.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::NewContact;

/// Digits, spaces and the usual phone punctuation.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().-]*$").unwrap());

/// Request body for `POST /api/contacts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[validate(length(max = 20))]
    #[validate(regex(path = "*PHONE_REGEX", message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1 to 200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl From<CreateContactRequest> for NewContact {
    fn from(req: CreateContactRequest) -> Self {
        NewContact {
            name: req.name,
            phone: req.phone,
            email: req.email,
            subject: req.subject,
            message: req.message,
        }
    }
}

/// Request body for `PATCH /api/contacts/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub is_read: Option<bool>,
    pub is_archived: Option<bool>,
}

/// Body for subscribe, unsubscribe and reactivate.
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Request body for `PATCH /api/newsletter/subscribers/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubscriberRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub is_active: Option<bool>,
}

/// Short confirmation with the affected address.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearDeletedResponse {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(phone: Option<&str>, email: &str) -> CreateContactRequest {
        CreateContactRequest {
            name: "Ann".to_string(),
            phone: phone.map(String::from),
            email: email.to_string(),
            subject: "Hello".to_string(),
            message: "Hi".to_string(),
        }
    }

    #[test]
    fn test_valid_contact() {
        assert!(contact(Some("+1 (555) 010-0000"), "ann@example.com")
            .validate()
            .is_ok());
        assert!(contact(None, "ann@example.com").validate().is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert!(contact(None, "not-an-email").validate().is_err());
    }

    #[test]
    fn test_phone_rules() {
        assert!(contact(Some("call me"), "ann@example.com")
            .validate()
            .is_err());
        assert!(contact(Some("123456789012345678901"), "ann@example.com")
            .validate()
            .is_err());
    }
}
