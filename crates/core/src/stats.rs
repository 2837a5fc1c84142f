use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;

use crate::domain::claim::{Claim, ClaimStatus};
use crate::domain::lookup::CodeItem;
use crate::domain::user::{User, UserId};

/// Fixed English month labels for the month-bucketed chart axis.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Resolves a claim's staff member to a department display name.
#[derive(Clone, Debug, Default)]
pub struct DepartmentIndex {
    department_names: HashMap<String, String>,
    staff_departments: HashMap<UserId, String>,
}

impl DepartmentIndex {
    pub fn new(departments: &[CodeItem], users: &[User]) -> Self {
        let department_names = departments
            .iter()
            .map(|item| (item.code.clone(), item.name.clone()))
            .collect();
        let staff_departments = users
            .iter()
            .filter_map(|user| {
                user.profile
                    .department_code
                    .as_ref()
                    .map(|code| (user.id.clone(), code.clone()))
            })
            .collect();

        Self { department_names, staff_departments }
    }

    pub fn department_of(&self, staff_id: &UserId) -> Option<&str> {
        let code = self.staff_departments.get(staff_id)?;
        Some(self.department_names.get(code).map(String::as_str).unwrap_or(code))
    }
}

/// Recomputed from scratch on every call. Collections are small (hundreds of
/// rows), so there is no incremental maintenance.
pub fn count_by_status(claims: &[Claim]) -> BTreeMap<ClaimStatus, usize> {
    let mut counts = BTreeMap::new();
    for claim in claims {
        *counts.entry(claim.status).or_insert(0) += 1;
    }
    counts
}

pub fn count_by_department(claims: &[Claim], index: &DepartmentIndex) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for claim in claims {
        let department = index
            .department_of(&claim.staff_id)
            .unwrap_or(UNKNOWN_DEPARTMENT)
            .to_string();
        *counts.entry(department).or_insert(0) += 1;
    }
    counts
}

/// Buckets by the calendar month of `claim_start_date`. Returns all twelve
/// months so chart axes stay stable when a month has no claims.
pub fn count_by_month(claims: &[Claim]) -> Vec<(&'static str, usize)> {
    let mut counts = [0usize; 12];
    for claim in claims {
        let month0 = claim.claim_start_date.month0() as usize;
        counts[month0] += 1;
    }

    MONTH_NAMES.iter().copied().zip(counts).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{count_by_department, count_by_month, count_by_status, DepartmentIndex};
    use crate::domain::claim::{Claim, ClaimId, ClaimStatus};
    use crate::domain::lookup::CodeItem;
    use crate::domain::project::ProjectId;
    use crate::domain::user::{EmployeeProfile, RoleCode, User, UserId, UserStatus};

    fn claim(id: &str, staff: &str, status: ClaimStatus, start: NaiveDate) -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId(id.to_string()),
            staff_id: UserId(staff.to_string()),
            approval_id: UserId("u-approver".to_string()),
            updated_by: None,
            claim_name: format!("claim {id}"),
            project_id: ProjectId("P-1".to_string()),
            claim_start_date: start,
            claim_end_date: start,
            total_work_time: Decimal::new(8, 0),
            remark: None,
            status,
            audit_trail: Vec::new(),
            staff_name: None,
            staff_email: None,
            project_name: None,
            approver_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: &str, department: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: UserId(id.to_string()),
            email: format!("{id}@example.com"),
            role_code: RoleCode::Member,
            status: UserStatus::Active,
            profile: EmployeeProfile {
                full_name: id.to_string(),
                department_code: department.map(str::to_string),
                job_rank: None,
                salary: None,
                contract_type: None,
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn counts_by_status() {
        let claims = vec![
            claim("1", "a", ClaimStatus::PendingApproval, jan(1)),
            claim("2", "a", ClaimStatus::PendingApproval, jan(2)),
            claim("3", "b", ClaimStatus::Approved, jan(3)),
            claim("4", "b", ClaimStatus::Paid, jan(4)),
        ];

        let counts = count_by_status(&claims);
        assert_eq!(counts.get(&ClaimStatus::PendingApproval), Some(&2));
        assert_eq!(counts.get(&ClaimStatus::Approved), Some(&1));
        assert_eq!(counts.get(&ClaimStatus::Paid), Some(&1));
        assert_eq!(counts.get(&ClaimStatus::Draft), None);
    }

    #[test]
    fn counts_by_department_with_unknown_bucket() {
        let departments =
            vec![CodeItem { code: "ENG".to_string(), name: "Engineering".to_string() }];
        let users = vec![user("a", Some("ENG")), user("b", None)];
        let index = DepartmentIndex::new(&departments, &users);

        let claims = vec![
            claim("1", "a", ClaimStatus::Draft, jan(1)),
            claim("2", "a", ClaimStatus::Draft, jan(2)),
            claim("3", "b", ClaimStatus::Draft, jan(3)),
            claim("4", "nobody", ClaimStatus::Draft, jan(4)),
        ];

        let counts = count_by_department(&claims, &index);
        assert_eq!(counts.get("Engineering"), Some(&2));
        assert_eq!(counts.get("Unknown"), Some(&2));
    }

    #[test]
    fn unmapped_department_code_falls_back_to_the_code() {
        let index = DepartmentIndex::new(&[], &[user("a", Some("OPS"))]);
        assert_eq!(index.department_of(&UserId("a".to_string())), Some("OPS"));
    }

    #[test]
    fn counts_by_month_keep_all_twelve_buckets() {
        let claims = vec![
            claim("1", "a", ClaimStatus::Draft, jan(5)),
            claim("2", "a", ClaimStatus::Draft, jan(20)),
            claim("3", "a", ClaimStatus::Draft, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()),
        ];

        let counts = count_by_month(&claims);
        assert_eq!(counts.len(), 12);
        assert_eq!(counts[0], ("January", 2));
        assert_eq!(counts[1], ("February", 0));
        assert_eq!(counts[2], ("March", 1));
    }
}
