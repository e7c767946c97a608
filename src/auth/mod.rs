//! Caller identity and anti-forgery tokens

mod token;

pub use token::{TokenAction, TokenIssuer};

use std::collections::BTreeSet;

/// Capability held by administrators
pub const ADMIN_CAPABILITY: &str = "manage_options";

/// The authenticated user behind a request, as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Caller {
    pub user_id: u64,
    capabilities: BTreeSet<String>,
}

impl Caller {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            capabilities: BTreeSet::new(),
        }
    }

    /// An administrator holding [`ADMIN_CAPABILITY`]
    pub fn admin(user_id: u64) -> Self {
        Self::new(user_id).with_capability(ADMIN_CAPABILITY)
    }

    /// A logged-out visitor with no capabilities
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Grant a capability
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Check whether the caller holds `capability`
    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}
