use serde_json::Value;

use crate::app::api::client::{decode_field, envelope_message, ApiFailure, LinkClient};
use crate::app::api::endpoints;
use crate::app::models::FamilyMember;

/// Input for add/update; the record id is supplied separately on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMemberInput {
    pub full_name: String,
    pub relationship: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
}

impl LinkClient {
    pub async fn family_members(&self, user_id: i64) -> Result<Vec<FamilyMember>, ApiFailure> {
        let params = [("user_id", user_id.to_string())];
        let value = self.post_form(endpoints::GET_FAMILY_MEMBERS, &params).await?;
        decode_field(&value, "members")
    }

    pub async fn add_family_member(
        &self,
        user_id: i64,
        input: &FamilyMemberInput,
    ) -> Result<String, ApiFailure> {
        let params = [
            ("user_id", user_id.to_string()),
            ("full_name", input.full_name.clone()),
            ("relationship", input.relationship.clone()),
            ("contact_number", input.contact_number.clone()),
            ("email", input.email.clone()),
            ("address", input.address.clone()),
        ];
        let value = self.post_form(endpoints::ADD_FAMILY_MEMBER, &params).await?;
        Ok(saved_message(&value, "Family member added"))
    }

    pub async fn update_family_member(
        &self,
        member_id: i64,
        input: &FamilyMemberInput,
    ) -> Result<String, ApiFailure> {
        let params = [
            ("id", member_id.to_string()),
            ("full_name", input.full_name.clone()),
            ("relationship", input.relationship.clone()),
            ("contact_number", input.contact_number.clone()),
            ("email", input.email.clone()),
            ("address", input.address.clone()),
        ];
        let value = self
            .post_form(endpoints::UPDATE_FAMILY_MEMBER, &params)
            .await?;
        Ok(saved_message(&value, "Family member updated"))
    }

    pub async fn delete_family_member(&self, member_id: i64) -> Result<String, ApiFailure> {
        let params = [("id", member_id.to_string())];
        let value = self
            .post_form(endpoints::DELETE_FAMILY_MEMBER, &params)
            .await?;
        Ok(saved_message(&value, "Family member removed"))
    }
}

fn saved_message(value: &Value, fallback: &str) -> String {
    envelope_message(value).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_payload_decodes_with_optional_fields() {
        let value: Value = serde_json::from_str(
            r#"{
                "success": true,
                "members": [
                    {
                        "id": 1,
                        "full_name": "Ana Reyes",
                        "relationship": "Daughter",
                        "contact_number": "0917-555-0100",
                        "email": "ana@example.com",
                        "address": "Quezon City"
                    },
                    {
                        "id": 2,
                        "full_name": "Ben Reyes",
                        "relationship": "Son",
                        "contact_number": "0917-555-0101"
                    }
                ]
            }"#,
        )
        .unwrap();

        let members: Vec<FamilyMember> = decode_field(&value, "members").expect("members");
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].email, "");
        assert_eq!(members[1].address, "");
    }
}
