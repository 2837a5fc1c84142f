use serde::{Deserialize, Serialize};

use crate::domain::claim::{Claim, ClaimStatus};

/// Backend pagination convention: requests carry `pageNum`/`pageSize`,
/// responses carry `pageData` plus `pageInfo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_num: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn first(page_size: u32) -> Self {
        Self { page_num: 1, page_size: page_size.max(1) }
    }

    pub fn page(page_num: u32, page_size: u32) -> Self {
        Self { page_num: page_num.max(1), page_size: page_size.max(1) }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_items: u64,
    pub total_pages: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_data: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { page_data: Vec::new(), page_info: PageInfo::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.page_data.is_empty()
    }
}

/// Client-side filtering over an already-fetched collection, for callers
/// whose backend search variant cannot filter server-side. Assumes a bounded
/// collection (hundreds of rows); this deliberately does not scale to
/// unbounded backends.
pub fn filter_claims(
    claims: &[Claim],
    status: Option<ClaimStatus>,
    keyword: Option<&str>,
) -> Vec<Claim> {
    claims
        .iter()
        .filter(|claim| status.map_or(true, |wanted| claim.status == wanted))
        .filter(|claim| keyword.map_or(true, |word| claim.matches_keyword(word)))
        .cloned()
        .collect()
}

/// Client-side pagination over a filtered collection.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let page_size = request.page_size.max(1) as usize;
    let page_num = request.page_num.max(1) as usize;

    let total_items = items.len() as u64;
    let total_pages = items.len().div_ceil(page_size) as u32;

    let start = (page_num - 1).saturating_mul(page_size);
    let page_data = items.iter().skip(start).take(page_size).cloned().collect();

    Page { page_data, page_info: PageInfo { total_items, total_pages } }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{filter_claims, paginate, PageRequest};
    use crate::domain::claim::{Claim, ClaimId, ClaimStatus};
    use crate::domain::project::ProjectId;
    use crate::domain::user::UserId;

    fn claim(id: &str, status: ClaimStatus) -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId(id.to_string()),
            staff_id: UserId("u-1".to_string()),
            approval_id: UserId("u-2".to_string()),
            updated_by: None,
            claim_name: format!("claim {id}"),
            project_id: ProjectId("P-1".to_string()),
            claim_start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            claim_end_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
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

    fn seven_claims() -> Vec<Claim> {
        vec![
            claim("1", ClaimStatus::PendingApproval),
            claim("2", ClaimStatus::PendingApproval),
            claim("3", ClaimStatus::PendingApproval),
            claim("4", ClaimStatus::Approved),
            claim("5", ClaimStatus::Approved),
            claim("6", ClaimStatus::Rejected),
            claim("7", ClaimStatus::Paid),
        ]
    }

    #[test]
    fn status_filter_is_independent_of_page_size() {
        let claims = seven_claims();
        let approved = filter_claims(&claims, Some(ClaimStatus::Approved), None);
        assert_eq!(approved.len(), 2);

        for page_size in [1, 2, 5, 50] {
            let page = paginate(&approved, PageRequest::first(page_size));
            assert_eq!(page.page_info.total_items, 2, "page_size {page_size}");
        }
    }

    #[test]
    fn keyword_filter_narrows_matches() {
        let claims = seven_claims();
        let hits = filter_claims(&claims, None, Some("claim 6"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.0, "6");

        let none = filter_claims(&claims, None, Some("vacation"));
        assert!(none.is_empty());
    }

    #[test]
    fn pagination_slices_and_counts() {
        let claims = seven_claims();
        let page = paginate(&claims, PageRequest::page(2, 3));

        assert_eq!(page.page_data.len(), 3);
        assert_eq!(page.page_data[0].id.0, "4");
        assert_eq!(page.page_info.total_items, 7);
        assert_eq!(page.page_info.total_pages, 3);

        let past_end = paginate(&claims, PageRequest::page(5, 3));
        assert!(past_end.is_empty());
        assert_eq!(past_end.page_info.total_items, 7);
    }

    #[test]
    fn page_request_serializes_camel_case() {
        let json = serde_json::to_value(PageRequest::page(2, 20)).unwrap();
        assert_eq!(json["pageNum"], 2);
        assert_eq!(json["pageSize"], 20);
    }
}
