use shamba_core::RoleTag;

/// Dashboard variant an operator is routed to.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewKind {
    Admin,
    Tech,
    Farmer,
    /// Unrecognized role. Deliberately not a working dashboard: the
    /// mismatch between what the backend sent and what this console
    /// understands is surfaced for support instead of papered over.
    Diagnostic {
        raw: Box<str>,
        normalized: RoleTag,
    },
}

/// Map a normalized role to its view. `raw_role` is only used by the
/// diagnostic fallback, which shows both forms side by side.
pub fn route(role: RoleTag, raw_role: &str) -> ViewKind {
    match role {
        RoleTag::Admin => ViewKind::Admin,
        RoleTag::Tech => ViewKind::Tech,
        RoleTag::Farmer => ViewKind::Farmer,
        RoleTag::Unknown => ViewKind::Diagnostic {
            raw: raw_role.into(),
            normalized: role,
        },
    }
}
