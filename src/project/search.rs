//! Project lookup by metadata field

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Metadata field a project search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchField {
    ContractNumber,
    ContractingParty,
    Contractor,
    Object,
    ServiceOrder,
}

impl SearchField {
    fn value<'a>(&self, details: &'a ProjectDetails) -> &'a str {
        match self {
            SearchField::ContractNumber => &details.contract_number,
            SearchField::ContractingParty => &details.contracting_party,
            SearchField::Contractor => &details.contractor,
            SearchField::Object => &details.object,
            SearchField::ServiceOrder => details.service_order.as_deref().unwrap_or(""),
        }
    }

    /// Case-insensitive substring match; an empty term matches nothing
    pub fn matches(&self, details: &ProjectDetails, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        !term.is_empty() && self.value(details).to_lowercase().contains(&term)
    }
}
