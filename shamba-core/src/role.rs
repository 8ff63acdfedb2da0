use serde::{Deserialize, Serialize};

/// Canonical operator authority levels.
///
/// Whatever role string the backend hands out is folded into one of
/// these tags exactly once, in [`RoleTag::parse`]; everything downstream
/// matches on the tag instead of re-comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleTag {
    Admin,
    Tech,
    Farmer,
    /// The backend sent a role this console does not know. Routed to a
    /// diagnostic view, never to a working dashboard.
    Unknown,
}

impl RoleTag {
    /// Normalize a raw role string: trim, uppercase, fold the legacy
    /// synonym `TECHNOLOGY` into `TECH`, map everything unrecognized to
    /// [`RoleTag::Unknown`]. Total and idempotent: feeding a canonical
    /// form back in returns the same tag.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => RoleTag::Admin,
            "TECH" | "TECHNOLOGY" => RoleTag::Tech,
            "FARMER" => RoleTag::Farmer,
            _ => RoleTag::Unknown,
        }
    }

    /// Like [`RoleTag::parse`], but an absent role falls back to the
    /// least-privileged working role. Callers that want missing input
    /// surfaced instead should match on the `Option` themselves.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => Self::parse(raw),
            None => RoleTag::Farmer,
        }
    }

    /// Canonical upper-case form.
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleTag::Admin => "ADMIN",
            RoleTag::Tech => "TECH",
            RoleTag::Farmer => "FARMER",
            RoleTag::Unknown => "UNKNOWN",
        }
    }

    /// Derive the capability set for this role.
    ///
    /// Always recomputed at the point of use; capabilities are never
    /// stored next to a session where they could go stale.
    pub const fn capabilities(self) -> Capabilities {
        Capabilities {
            is_admin: matches!(self, RoleTag::Admin),
            is_tech: matches!(self, RoleTag::Admin | RoleTag::Tech),
            is_farmer: matches!(self, RoleTag::Farmer),
        }
    }
}

/// Boolean permissions derived from a [`RoleTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Full administrative access.
    pub is_admin: bool,
    /// Technician-level access; admins count as technicians.
    pub is_tech: bool,
    /// Field-operator access. Admins are not farmers.
    pub is_farmer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_idempotent() {
        let inputs = [
            "admin", " ADMIN ", "tech", "technology", "Farmer", "FARMER",
            "", "operator", "TECHNOLOGY", "unknown", "UNKNOWN", "root",
        ];
        for raw in inputs {
            let once = RoleTag::parse(raw);
            assert_eq!(RoleTag::parse(once.as_str()), once, "input {raw:?}");
        }
    }

    #[test]
    fn technology_synonym_folds_to_tech() {
        assert_eq!(RoleTag::parse("technology"), RoleTag::Tech);
        assert_eq!(RoleTag::parse(" Technology "), RoleTag::Tech);
        assert_eq!(RoleTag::parse("TECH"), RoleTag::Tech);
    }

    #[test]
    fn unrecognized_roles_map_to_unknown() {
        assert_eq!(RoleTag::parse("superuser"), RoleTag::Unknown);
        assert_eq!(RoleTag::parse(""), RoleTag::Unknown);
        assert_eq!(RoleTag::parse("   "), RoleTag::Unknown);
    }

    #[test]
    fn absent_role_defaults_to_farmer() {
        assert_eq!(RoleTag::parse_or_default(None), RoleTag::Farmer);
        assert_eq!(RoleTag::parse_or_default(Some("admin")), RoleTag::Admin);
    }

    #[test]
    fn capability_derivation() {
        assert!(RoleTag::Admin.capabilities().is_admin);
        assert!(RoleTag::Admin.capabilities().is_tech);
        assert!(!RoleTag::Admin.capabilities().is_farmer);

        assert!(!RoleTag::Tech.capabilities().is_admin);
        assert!(RoleTag::Tech.capabilities().is_tech);

        assert!(RoleTag::Farmer.capabilities().is_farmer);
        assert!(!RoleTag::Farmer.capabilities().is_tech);

        let none = RoleTag::Unknown.capabilities();
        assert!(!none.is_admin && !none.is_tech && !none.is_farmer);
    }
}
