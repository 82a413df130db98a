//! Session Scope
//!
//! The authorization boundary of a console session: one branch, or every
//! branch for super admins. Resolved once from the cached login payload.

use serde::{Deserialize, Serialize};

use super::error::{LiveResult, LiveViewError};

/// Sentinel stored in the session payload for super admins
pub const ALL_BRANCHES: &str = "all";

/// Branch identifier (UPC code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(String);

impl BranchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which branches a session may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Branch(BranchId),
}

impl Scope {
    /// Parse the raw session value. Blank means "not known yet".
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw == ALL_BRANCHES {
            Some(Scope::All)
        } else {
            Some(Scope::Branch(BranchId::new(raw)))
        }
    }

    pub fn branch(&self) -> Option<&BranchId> {
        match self {
            Scope::All => None,
            Scope::Branch(id) => Some(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    /// Whether records owned by `owner` fall inside this scope
    pub fn covers(&self, owner: &BranchId) -> bool {
        match self {
            Scope::All => true,
            Scope::Branch(id) => id == owner,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Scope::All => ALL_BRANCHES,
            Scope::Branch(id) => id.as_str(),
        }
    }
}

fn default_name() -> String {
    "User".to_string()
}

/// Non-sensitive profile cached at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub upc: String,
    #[serde(default)]
    pub avatar: String,
}

impl SessionContext {
    pub fn new(name: impl Into<String>, upc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upc: upc.into(),
            avatar: String::new(),
        }
    }

    pub fn from_json(raw: &str) -> LiveResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| LiveViewError::Validation(format!("session payload: {}", e)))
    }
}

/// Read-only access to the cached session
pub trait SessionCache {
    fn read(&self) -> Option<SessionContext>;
}

/// A session cache holding a fixed value
impl SessionCache for Option<SessionContext> {
    fn read(&self) -> Option<SessionContext> {
        self.clone()
    }
}

/// Resolves the session scope exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeResolver {
    scope: Option<Scope>,
}

impl ScopeResolver {
    pub fn resolve(cache: &dyn SessionCache) -> Self {
        let session = cache.read();
        Self::from_session(session.as_ref())
    }

    pub fn from_session(session: Option<&SessionContext>) -> Self {
        let scope = session.and_then(|s| Scope::parse(&s.upc));
        match &scope {
            Some(scope) => log::info!("[SCOPE] Session scope resolved: {}", scope.label()),
            None => log::info!("[SCOPE] No session scope available"),
        }
        Self { scope }
    }

    /// `None` until a login has been cached
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse("all"), Some(Scope::All));
        assert_eq!(Scope::parse(" 12001 "), Some(Scope::Branch(BranchId::new("12001"))));
        assert_eq!(Scope::parse("   "), None);
    }

    #[test]
    fn test_resolver_reads_cached_login() {
        let cache = Some(SessionContext::from_json(r#"{"name":"Sari","upc":"12001","avatar":""}"#).unwrap());
        let resolver = ScopeResolver::resolve(&cache);
        assert_eq!(resolver.scope(), Some(&Scope::Branch(BranchId::new("12001"))));
    }

    #[test]
    fn test_resolver_without_session_is_unresolved() {
        let cache: Option<SessionContext> = None;
        assert!(ScopeResolver::resolve(&cache).scope().is_none());

        let blank = SessionContext::from_json(r#"{"name":"Sari"}"#).unwrap();
        assert_eq!(blank.upc, "");
        assert!(ScopeResolver::from_session(Some(&blank)).scope().is_none());
    }

    #[test]
    fn test_scope_covers() {
        let branch = BranchId::new("12001");
        assert!(Scope::All.covers(&branch));
        assert!(Scope::Branch(branch.clone()).covers(&branch));
        assert!(!Scope::Branch(BranchId::new("12002")).covers(&branch));
    }
}
