use serde_json::{json, Value};

use crate::app::api::client::{decode_field, envelope_message, ApiFailure, LinkClient};
use crate::app::api::endpoints;
use crate::app::models::LoginUser;

/// Outcome of the device-verification step that gates signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceVerification {
    pub status: String,
    pub message: String,
}

impl DeviceVerification {
    /// Signup may proceed only for a transmitter the server knows but nobody
    /// has claimed yet.
    pub fn allows_signup(&self) -> bool {
        self.status.eq_ignore_ascii_case("unregistered")
    }
}

#[derive(Debug, Clone)]
pub struct RegisterPayload {
    pub full_name: String,
    pub contact: String,
    pub email: String,
    pub password: String,
    pub device_id: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub user_id: i64,
    pub full_name: String,
    pub contact: String,
    /// Base64 of the raw image bytes, when the user picked a new picture.
    pub profile_picture: Option<String>,
}

impl LinkClient {
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, LoginUser), ApiFailure> {
        let body = json!({ "email": email, "password": password });
        let value = self.post_json(endpoints::LOGIN, &body).await?;
        let message = envelope_message(&value).unwrap_or_default();
        let user: LoginUser = decode_field(&value, "user")?;
        Ok((message, user))
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<String, ApiFailure> {
        let params = [
            ("full_name", payload.full_name.clone()),
            ("contact", payload.contact.clone()),
            ("email", payload.email.clone()),
            ("password", payload.password.clone()),
            ("device_id", payload.device_id.clone()),
        ];
        let value = self.post_form(endpoints::REGISTER, &params).await?;
        Ok(success_message(&value, "Account created"))
    }

    pub async fn verify_device(&self, device_id: &str) -> Result<DeviceVerification, ApiFailure> {
        let params = [("device_id", device_id.to_string())];
        let value = self.post_form(endpoints::VERIFY_DEVICE, &params).await?;
        let status: String = decode_field(&value, "status")?;
        let message = success_message(&value, "Device verified");
        Ok(DeviceVerification { status, message })
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, ApiFailure> {
        let body = json!({
            "user_id": user_id,
            "old_password": old_password,
            "new_password": new_password,
            "confirm_password": confirm_password,
        });
        let value = self.post_json(endpoints::CHANGE_PASSWORD, &body).await?;
        Ok(success_message(&value, "Password changed"))
    }

    /// Returns the server-side path of the stored picture, when one was
    /// uploaded and the server echoed it back.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Option<String>, ApiFailure> {
        let mut body = json!({
            "user_id": update.user_id,
            "full_name": update.full_name,
            "contact": update.contact,
        });
        if let Some(picture) = &update.profile_picture {
            body["profile_picture"] = Value::String(picture.clone());
        }
        let value = self.post_json(endpoints::UPDATE_PROFILE, &body).await?;
        let saved = value
            .get("profile")
            .and_then(|profile| profile.get("profile_picture"))
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
            .map(|path| path.to_string());
        Ok(saved)
    }
}

fn success_message(value: &Value, fallback: &str) -> String {
    envelope_message(value).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_status_allows_signup() {
        let verification = DeviceVerification {
            status: "Unregistered".into(),
            message: "Device found".into(),
        };
        assert!(verification.allows_signup());

        let taken = DeviceVerification {
            status: "registered".into(),
            message: "Device already has an owner".into(),
        };
        assert!(!taken.allows_signup());
    }
}
