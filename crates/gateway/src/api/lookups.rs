use claimdesk_core::domain::lookup::{CodeItem, LookupKind};

use crate::error::GatewayResult;
use crate::http::HttpGateway;

impl HttpGateway {
    /// Code tables (departments, job ranks, contract types, roles) used for
    /// display names and the department aggregation.
    pub async fn fetch_lookup(&self, kind: LookupKind) -> GatewayResult<Vec<CodeItem>> {
        self.get(&format!("/lookups/{}", kind.as_str())).await
    }
}
