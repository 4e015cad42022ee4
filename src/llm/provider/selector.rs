//! Provider selection
//!
//! Picks the one provider that answers for the whole process lifetime. The
//! choice depends only on which credentials are present; nothing is probed
//! over the network.

use tracing::{debug, warn};

use crate::config::{Credentials, ProviderKind};

/// Live tiers in the order they are tried when no preference applies.
pub const DEFAULT_PRIORITY: [ProviderKind; 2] = [ProviderKind::Secondary, ProviderKind::Primary];

/// Chooses the active provider.
///
/// A `preferred` provider wins when its credential is present (`Static` always
/// wins). Otherwise the first credentialed tier of [`DEFAULT_PRIORITY`] is
/// used, and `Static` when there is none.
pub fn select_provider(credentials: &Credentials, preferred: Option<ProviderKind>) -> ProviderKind {
    if let Some(kind) = preferred {
        if credentials.has(kind) {
            debug!("Using preferred provider '{}'", kind);
            return kind;
        }
        warn!(
            "Preferred provider '{}' has no credential, using default priority",
            kind
        );
    }

    DEFAULT_PRIORITY
        .into_iter()
        .find(|kind| credentials.has(*kind))
        .unwrap_or(ProviderKind::Static)
}

/// Provider bound at startup. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveProvider {
    kind: ProviderKind,
}

impl ActiveProvider {
    pub fn select(credentials: &Credentials, preferred: Option<ProviderKind>) -> Self {
        Self {
            kind: select_provider(credentials, preferred),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// `false` only when bound to the static provider.
    pub fn is_live(&self) -> bool {
        self.kind.is_live()
    }
}

impl From<ProviderKind> for ActiveProvider {
    fn from(kind: ProviderKind) -> Self {
        Self { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn creds(kinds: &[ProviderKind]) -> Credentials {
        kinds
            .iter()
            .fold(Credentials::none(), |c, kind| c.with_key(*kind, "key"))
    }

    #[test]
    fn test_no_credentials_selects_static() {
        let active = ActiveProvider::select(&Credentials::none(), None);
        assert_eq!(active.kind(), ProviderKind::Static);
        assert!(!active.is_live());
        assert_eq!(active.name(), "static");
    }

    #[test]
    fn test_secondary_beats_primary() {
        let credentials = creds(&[ProviderKind::Primary, ProviderKind::Secondary]);
        assert_eq!(select_provider(&credentials, None), ProviderKind::Secondary);
    }

    #[test]
    fn test_primary_alone() {
        let credentials = creds(&[ProviderKind::Primary]);
        assert_eq!(select_provider(&credentials, None), ProviderKind::Primary);
    }

    #[test]
    fn test_tertiary_is_not_selected_by_default() {
        let credentials = creds(&[ProviderKind::Tertiary]);
        assert_eq!(select_provider(&credentials, None), ProviderKind::Static);
    }

    #[test]
    fn test_preferred_with_credential() {
        let credentials = creds(&[ProviderKind::Secondary, ProviderKind::Tertiary]);
        assert_eq!(
            select_provider(&credentials, Some(ProviderKind::Tertiary)),
            ProviderKind::Tertiary
        );
    }

    #[test]
    fn test_preferred_without_credential_uses_priority() {
        let credentials = creds(&[ProviderKind::Primary]);
        assert_eq!(
            select_provider(&credentials, Some(ProviderKind::Secondary)),
            ProviderKind::Primary
        );
    }

    #[test]
    fn test_preferred_static_forces_offline() {
        let credentials = creds(&[ProviderKind::Primary, ProviderKind::Secondary]);
        let active = ActiveProvider::select(&credentials, Some(ProviderKind::Static));
        assert!(!active.is_live());
    }

    #[test]
    fn test_blank_key_is_absent() {
        let credentials = Credentials::none().with_key(ProviderKind::Secondary, "   ");
        assert_eq!(select_provider(&credentials, None), ProviderKind::Static);
    }
}
