use super::{Owned, Principal};

/// The set of resources a principal may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every resource. Superusers get this scope.
    All,
    /// Only resources owned by the given user id.
    OwnedBy(i32),
}

impl Scope {
    pub fn for_principal(principal: &Principal) -> Self {
        if principal.is_superuser {
            Scope::All
        } else {
            Scope::OwnedBy(principal.user_id)
        }
    }

    /// The owner id a query must be restricted to, or `None` for an unrestricted query.
    pub fn owner_filter(&self) -> Option<i32> {
        match self {
            Scope::All => None,
            Scope::OwnedBy(owner_id) => Some(*owner_id),
        }
    }

    pub fn admits<R: Owned + ?Sized>(&self, resource: &R) -> bool {
        match self {
            Scope::All => true,
            Scope::OwnedBy(owner_id) => resource.owner_id() == Some(*owner_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(Option<i32>);

    impl Owned for Thing {
        fn owner_id(&self) -> Option<i32> {
            self.0
        }
    }

    #[test]
    fn test_superuser_scope_is_unrestricted() {
        let scope = Scope::for_principal(&Principal::new(1, true));
        assert_eq!(scope, Scope::All);
        assert_eq!(scope.owner_filter(), None);
        assert!(scope.admits(&Thing(Some(2))));
        assert!(scope.admits(&Thing(None)));
    }

    #[test]
    fn test_regular_scope_is_owned_resources() {
        let scope = Scope::for_principal(&Principal::new(1, false));
        assert_eq!(scope, Scope::OwnedBy(1));
        assert_eq!(scope.owner_filter(), Some(1));
        assert!(scope.admits(&Thing(Some(1))));
        assert!(!scope.admits(&Thing(Some(2))));
        assert!(!scope.admits(&Thing(None)));
    }
}
