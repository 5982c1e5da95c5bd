// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// The pipeline steps, used as the `step` field in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Clone,
    Archive,
    Persist,
    Cleanup,
}

impl StepKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Archive => "archive",
            Self::Persist => "persist",
            Self::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
