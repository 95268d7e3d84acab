//! Proposals
//!
//! A proposal is immutable once submitted; screening and voting consume
//! it but never change it.

use crate::access::level::ResourceCategory;
use crate::agent::role::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An agent's suggested course of action, up for a binding decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub author: AgentRole,
    pub title: String,
    pub description: String,
    /// Resource categories the proposal would touch if approved. The
    /// author needs write access to each before the cycle proceeds.
    pub resources_touched: BTreeSet<ResourceCategory>,
}

impl Proposal {
    pub fn new(
        id: impl Into<String>,
        author: AgentRole,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author,
            title: title.into(),
            description: description.into(),
            resources_touched: BTreeSet::new(),
        }
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceCategory>) -> Self {
        self.resources_touched = resources.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_builder() {
        let proposal = Proposal::new("p-1", AgentRole::Cto, "Title", "Description")
            .with_resources([ResourceCategory::TechnicalTasks, ResourceCategory::Board]);

        assert_eq!(proposal.author, AgentRole::Cto);
        assert_eq!(proposal.resources_touched.len(), 2);
    }
}
