//! Wire types for the web auth API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of the signed-in user returned by the web auth endpoints.
///
/// The backend calls this `WebResponseDto`. It is replaced wholesale on every
/// successful auth call and never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub email: String,
    pub role: String,
    pub masked_name: String,
    pub authenticated: bool,
}

/// Login form payload
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Signup form payload
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDto>,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("ssn", &self.ssn.as_ref().map(|_| "<redacted>"))
            .field("address", &self.address)
            .finish()
    }
}

/// Postal address attached to a signup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
}

/// Password change payload
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChangeRequest {
    /// Whether the new password and its confirmation agree
    pub fn is_confirmed(&self) -> bool {
        self.new_password == self.confirm_password
    }
}

impl fmt::Debug for PasswordChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChangeRequest")
            .finish_non_exhaustive()
    }
}

/// Error body returned by the backend on failed requests
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_summary_uses_camel_case() {
        let user: UserSummary = serde_json::from_value(json!({
            "email": "a@b.com",
            "role": "USER",
            "maskedName": "A**",
            "authenticated": true
        }))
        .unwrap();

        assert_eq!(user.masked_name, "A**");
        assert_eq!(
            serde_json::to_value(&user).unwrap()["maskedName"],
            json!("A**")
        );
    }

    #[test]
    fn test_signup_omits_absent_optionals() {
        let request = SignupRequest {
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
            password: "secret".to_string(),
            phone: "010-0000-0000".to_string(),
            ..Default::default()
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("ssn").is_none());
        assert!(value.get("address").is_none());
    }

    #[test]
    fn test_password_change_wire_names() {
        let request = PasswordChangeRequest {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
            confirm_password: "new".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["currentPassword"], "old");
        assert_eq!(value["confirmPassword"], "new");
        assert!(request.is_confirmed());
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let login = LoginRequest::new("a@b.com", "hunter2");
        let rendered = format!("{login:?}");
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
