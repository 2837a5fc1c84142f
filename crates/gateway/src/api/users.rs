use serde::{Deserialize, Serialize};

use claimdesk_core::domain::user::{EmployeeProfile, RoleCode, User, UserId, UserStatus};
use claimdesk_core::paging::{Page, PageRequest};

use crate::error::GatewayResult;
use crate::http::HttpGateway;

/// Account creation payload. The backend assigns the id and timestamps.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub role_code: RoleCode,
    pub profile: EmployeeProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserSearchBody<'a> {
    #[serde(flatten)]
    page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleBody {
    role_code: RoleCode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    status: UserStatus,
}

impl HttpGateway {
    pub async fn fetch_user(&self, id: &UserId) -> GatewayResult<User> {
        self.get(&format!("/users/{id}")).await
    }

    pub async fn create_user(&self, new_user: &NewUser) -> GatewayResult<User> {
        self.post("/users", new_user).await
    }

    /// Profile edits are a separate surface from account/role changes.
    pub async fn update_profile(
        &self,
        id: &UserId,
        profile: &EmployeeProfile,
    ) -> GatewayResult<User> {
        self.put(&format!("/users/{id}/profile"), profile).await
    }

    pub async fn set_user_role(&self, id: &UserId, role_code: RoleCode) -> GatewayResult<User> {
        self.post(&format!("/users/{id}/role"), &RoleBody { role_code }).await
    }

    pub async fn set_user_status(&self, id: &UserId, status: UserStatus) -> GatewayResult<User> {
        self.post(&format!("/users/{id}/status"), &StatusBody { status }).await
    }

    pub async fn search_users(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> GatewayResult<Page<User>> {
        let body = UserSearchBody { page, keyword };
        self.post("/users/search", &body).await
    }
}
