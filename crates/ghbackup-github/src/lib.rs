// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub collaborators for ghbackup.
//!
//! [`GithubClient`] discovers the repositories of an organization through
//! the paginated REST listing. [`GitCloner`] materializes one repository
//! with a shallow `git clone`.

pub mod client;
pub mod clone;
pub mod link;
pub mod types;

pub use client::GithubClient;
pub use clone::GitCloner;
