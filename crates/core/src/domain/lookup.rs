use serde::{Deserialize, Serialize};

/// A backend code-table entry (departments, job ranks, contract types, roles).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeItem {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Departments,
    JobRanks,
    ContractTypes,
    Roles,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Departments => "departments",
            Self::JobRanks => "job-ranks",
            Self::ContractTypes => "contract-types",
            Self::Roles => "roles",
        }
    }
}
