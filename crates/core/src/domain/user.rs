use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role determining which claim operations are authorized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleCode {
    Admin,
    Finance,
    Approver,
    Member,
}

impl RoleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Finance => "Finance",
            Self::Approver => "Approver",
            Self::Member => "Member",
        }
    }
}

impl std::fmt::Display for RoleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleCode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "finance" => Ok(Self::Finance),
            "approver" | "pm" => Ok(Self::Approver),
            "member" | "claimer" => Ok(Self::Member),
            other => Err(format!(
                "unknown role code `{other}` (expected admin|finance|approver|member)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Locked,
}

/// Denormalized employee profile, edited separately from the account fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role_code: RoleCode,
    pub status: UserStatus,
    pub profile: EmployeeProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
