//! Edit Permissions
//!
//! Client-side guard consulted before any write. The remote store enforces
//! its own rules; this only keeps the UI from issuing writes it knows will
//! be refused.

use super::scope::{BranchId, Scope};

pub trait EditPolicy {
    /// May this session change a record owned by `owner`?
    fn can_edit(&self, scope: &Scope, owner: &BranchId) -> bool;

    /// May this session create records?
    fn can_create(&self, scope: &Scope) -> bool;
}

/// Super admins edit everything, branch admins edit their own branch.
/// Only a concrete branch can create, since new records need an owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchEditPolicy;

impl EditPolicy for BranchEditPolicy {
    fn can_edit(&self, scope: &Scope, owner: &BranchId) -> bool {
        scope.covers(owner)
    }

    fn can_create(&self, scope: &Scope) -> bool {
        !scope.is_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_policy() {
        let policy = BranchEditPolicy;
        let own = BranchId::new("12001");
        let other = BranchId::new("12002");
        let branch = Scope::Branch(own.clone());

        assert!(policy.can_edit(&branch, &own));
        assert!(!policy.can_edit(&branch, &other));
        assert!(policy.can_edit(&Scope::All, &other));

        assert!(policy.can_create(&branch));
        assert!(!policy.can_create(&Scope::All));
    }
}
