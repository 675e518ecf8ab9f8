use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Plain acknowledgement returned by endpoints that have nothing else to say.
#[derive(Debug, Serialize, Deserialize)]
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

pub mod auth {
    use super::*;

    /// Missing fields deserialize as empty strings so the engine can reject
    /// them with a single message.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RegisterRequest {
        #[serde(default)]
        pub username: String,
        #[serde(default)]
        pub email: String,
        #[serde(default)]
        pub password: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LoginRequest {
        #[serde(default)]
        pub email: String,
        #[serde(default)]
        pub password: String,
    }

    /// Returned by register and login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub id: i32,
        pub username: String,
        pub email: String,
        /// Bearer token for the `Authorization` header.
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub username: String,
        pub email: String,
        pub profile_picture: Option<String>,
    }

    /// `None` or a blank path resets the picture.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfilePictureUpdate {
        pub profile_picture: Option<String>,
    }
}

pub mod friends {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FriendRequestNew {
        pub recipient_id: i32,
    }

    /// Body of accept and reject.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FriendRequestAnswer {
        pub sender_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FriendRemove {
        pub friend_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendView {
        pub id: i32,
        pub username: String,
        pub profile_picture: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRequestView {
        /// Id of the friendship row.
        pub id: i32,
        pub sender_id: i32,
        pub username: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserSearch {
        pub query: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSearchResult {
        pub id: i32,
        pub username: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Must be > 0.
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        /// RFC3339 timestamp. If absent, server uses now().
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    /// Partial update: only the provided fields change.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub user_id: i32,
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Weekly,
        #[default]
        Monthly,
        Yearly,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpsert {
        pub category: Option<String>,
        pub amount_minor: Option<i64>,
        /// Defaults to `monthly`.
        pub period: Option<BudgetPeriod>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: i32,
        pub category: String,
        pub amount_minor: i64,
        pub period: BudgetPeriod,
    }

    /// One budget row of the current month summary.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSummaryRow {
        pub category: String,
        pub period: BudgetPeriod,
        pub budget_amount_minor: i64,
        pub total_spent_minor: i64,
        pub remaining_amount_minor: i64,
    }
}

pub mod leaderboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LeaderboardEntry {
        pub id: i32,
        pub username: String,
        pub profile_picture: Option<String>,
        pub total_budget_minor: i64,
        pub total_spending_minor: i64,
        /// Share of the monthly budget left, `null` when the user has no budget.
        pub savings_percentage: Option<f64>,
    }
}

pub mod post {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PostNew {
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub image_url: Option<String>,
        pub location_name: Option<String>,
        pub location_address: Option<String>,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub place_id: Option<String>,
    }

    /// Partial update: only the provided fields change. An explicit `null`
    /// clears a numeric field; a blank string clears a text field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PostUpdate {
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        pub amount_minor: Option<Option<i64>>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub image_url: Option<String>,
        pub location_name: Option<String>,
        pub location_address: Option<String>,
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        pub latitude: Option<Option<f64>>,
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        pub longitude: Option<Option<f64>>,
        pub place_id: Option<String>,
    }

    /// Tells a field sent as `null` (`Some(None)`) from a missing one (`None`).
    fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PostView {
        pub id: i32,
        pub user_id: i32,
        pub username: String,
        pub profile_picture: Option<String>,
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub image_url: Option<String>,
        pub location_name: Option<String>,
        pub location_address: Option<String>,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub place_id: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friend_bodies_use_camel_case() {
        let body: friends::FriendRequestNew =
            serde_json::from_str(r#"{"recipientId": 7}"#).unwrap();
        assert_eq!(body.recipient_id, 7);

        let body: friends::FriendRequestAnswer =
            serde_json::from_str(r#"{"senderId": 3}"#).unwrap();
        assert_eq!(body.sender_id, 3);
    }

    #[test]
    fn register_missing_fields_default_to_empty() {
        let body: auth::RegisterRequest =
            serde_json::from_str(r#"{"email": "a@example.com"}"#).unwrap();
        assert_eq!(body.email, "a@example.com");
        assert!(body.username.is_empty());
        assert!(body.password.is_empty());
    }

    #[test]
    fn budget_period_defaults_to_monthly() {
        let body: budget::BudgetUpsert =
            serde_json::from_str(r#"{"category": "Groceries", "amount_minor": 20000}"#).unwrap();
        assert_eq!(body.period.unwrap_or_default(), budget::BudgetPeriod::Monthly);

        let period: budget::BudgetPeriod = serde_json::from_str(r#""weekly""#).unwrap();
        assert_eq!(period, budget::BudgetPeriod::Weekly);
    }

    #[test]
    fn post_update_tells_null_from_missing() {
        let body: post::PostUpdate =
            serde_json::from_str(r#"{"amount_minor": null, "latitude": 45.5}"#).unwrap();
        assert_eq!(body.amount_minor, Some(None));
        assert_eq!(body.latitude, Some(Some(45.5)));
        assert_eq!(body.longitude, None);
    }
}
