//! Account reference data used to fill the subject section of a report

use serde::{Deserialize, Serialize};

/// Customer account, read-only from the screening engine's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub holder_name: String,
    pub address: String,
    /// Date of birth as recorded by onboarding (e.g. `1980-01-01`)
    pub date_of_birth: String,
}

impl Account {
    pub fn new(
        account_id: impl Into<String>,
        holder_name: impl Into<String>,
        address: impl Into<String>,
        date_of_birth: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            holder_name: holder_name.into(),
            address: address.into(),
            date_of_birth: date_of_birth.into(),
        }
    }
}
