use clipvault_api::state::AppState;
use uuid::Uuid;

/// A caller with a valid bearer token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

pub fn register_test_user(state: &AppState) -> TestUser {
    let user_id = Uuid::new_v4();
    let token = state
        .jwt
        .issue_token(user_id)
        .expect("Failed to issue test token");
    TestUser { user_id, token }
}

pub fn bearer(user: &TestUser) -> String {
    format!("Bearer {}", user.token)
}
