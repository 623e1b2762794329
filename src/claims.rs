use serde::{Deserialize, Serialize};

/// Claims returned by the identity provider for a validated token.
///
/// Every field is optional; absent claims stay absent in the mapped identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ClaimsPayload {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    #[serde(rename = "cognito:username")]
    pub username: Option<String>,
    #[serde(rename = "cognito:groups")]
    pub groups: Option<Vec<String>>,
    pub phone_number: Option<String>,
    pub phone_number_verified: Option<bool>,
}

/// User record derived from a [`ClaimsPayload`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(rename = "phonenumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(rename = "phonenumberVerified", skip_serializing_if = "Option::is_none")]
    pub phone_number_verified: Option<bool>,
}

impl From<ClaimsPayload> for UserIdentity {
    fn from(payload: ClaimsPayload) -> Self {
        Self {
            email: payload.email,
            email_verified: payload.email_verified,
            external_user_identifier: payload.username,
            groups: payload.groups,
            phone_number: payload.phone_number,
            phone_number_verified: payload.phone_number_verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_cognito_claims_field_by_field() {
        let payload: ClaimsPayload = serde_json::from_value(json!({
            "email": "a@b.com",
            "email_verified": true,
            "cognito:username": "u1",
            "cognito:groups": ["g1"],
            "phone_number": "+1",
            "phone_number_verified": false,
            "token_use": "id"
        }))
        .unwrap();

        let identity = UserIdentity::from(payload);

        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            json!({
                "email": "a@b.com",
                "emailVerified": true,
                "externalUserIdentifier": "u1",
                "groups": ["g1"],
                "phonenumber": "+1",
                "phonenumberVerified": false
            })
        );
    }

    #[test]
    fn missing_claims_stay_absent() {
        let payload: ClaimsPayload =
            serde_json::from_value(json!({ "cognito:username": "u1" })).unwrap();

        let identity = UserIdentity::from(payload);

        assert_eq!(identity.external_user_identifier.as_deref(), Some("u1"));
        assert_eq!(identity.email, None);
        assert_eq!(identity.groups, None);
        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            json!({ "externalUserIdentifier": "u1" })
        );
    }
}
