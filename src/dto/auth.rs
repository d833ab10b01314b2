use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::User;

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 255))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirmation: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    #[validate(length(min = 11, max = 255))]
    pub phone_number: String,
    pub is_marketing: Option<bool>,
    /// Id of an uploaded file.
    pub avatar: Option<Uuid>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Deserialize, Debug, Default, ToSchema, Validate)]
#[validate(schema(function = "validate_password_change"))]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 255))]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 11, max = 255))]
    pub phone_number: Option<String>,
    pub is_marketing: Option<bool>,
    pub avatar: Option<Uuid>,
}

/// A new password must come with a matching confirmation.
fn validate_password_change(req: &UpdateUserRequest) -> Result<(), ValidationError> {
    match &req.password {
        Some(password) if req.password_confirmation.as_ref() != Some(password) => {
            let mut err = ValidationError::new("must_match");
            err.message = Some("passwords do not match".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithToken {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForgotPasswordResponse {
    pub reset_token: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 255))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UserRequest {
        UserRequest {
            first_name: "Robin".into(),
            last_name: "Doe".into(),
            email: "robin@example.com".into(),
            password: "userpassword".into(),
            password_confirmation: "userpassword".into(),
            address: "12 Kennel Road".into(),
            phone_number: "+4412345678901".into(),
            is_marketing: None,
            avatar: None,
        }
    }

    #[test]
    fn well_formed_user_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_reported_on_the_confirmation_field() {
        let mut req = request();
        req.password_confirmation = "something-else".into();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirmation"));
    }

    #[test]
    fn short_password_and_bad_email_are_rejected() {
        let mut req = request();
        req.password = "short".into();
        req.password_confirmation = "short".into();
        req.email = "not-an-email".into();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateUserRequest::default().validate().is_ok());
    }

    #[test]
    fn password_change_needs_a_matching_confirmation() {
        let missing = UpdateUserRequest {
            password: Some("new-password".into()),
            ..Default::default()
        };
        assert!(missing.validate().is_err());

        let mismatched = UpdateUserRequest {
            password: Some("new-password".into()),
            password_confirmation: Some("other-password".into()),
            ..Default::default()
        };
        assert!(mismatched.validate().is_err());

        let matching = UpdateUserRequest {
            password: Some("new-password".into()),
            password_confirmation: Some("new-password".into()),
            ..Default::default()
        };
        assert!(matching.validate().is_ok());
    }
}
