// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the GitHub repository listing.

use ghbackup_core::RepositoryDescriptor;
use serde::Deserialize;

/// One element of `GET /orgs/{org}/repos`. Unused fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    pub full_name: String,
    pub owner: ApiOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOwner {
    pub login: String,
}

impl From<ApiRepository> for RepositoryDescriptor {
    fn from(repo: ApiRepository) -> Self {
        RepositoryDescriptor::new(repo.full_name, repo.owner.login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_listing_entry() {
        let json = r#"[{"id":1,"full_name":"acme/a","private":true,"owner":{"login":"acme","id":9}}]"#;
        let page: Vec<ApiRepository> = serde_json::from_str(json).unwrap();
        let descriptor = RepositoryDescriptor::from(page[0].clone());
        assert_eq!(descriptor.full_name, "acme/a");
        assert_eq!(descriptor.owner_login, "acme");
    }
}
