//! Role derivation.
//!
//! Three booleans drive every access decision in the marketplace:
//!
//! - `is_authenticated`: a session exists and it is not anonymous
//! - `is_seller`: authenticated and owning at least one product
//! - `is_pro_user`: the profile's pro flag, false when the profile is missing
//!
//! The inputs load independently (the session first, then the profile and
//! the product count for real accounts only). [`RoleGate`] holds them until
//! they have all settled so that no caller ever sees roles computed from a
//! half-loaded state. An input that failed to load settles as absent, which
//! always yields the less privileged answer.

use serde::{Deserialize, Serialize};

use crate::types::Uid;

/// Who is looking at the page, as far as the session knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub uid: Uid,
    pub is_anonymous: bool,
}

impl Viewer {
    #[must_use]
    pub const fn account(uid: Uid) -> Self {
        Self {
            uid,
            is_anonymous: false,
        }
    }

    #[must_use]
    pub const fn anonymous(uid: Uid) -> Self {
        Self {
            uid,
            is_anonymous: true,
        }
    }
}

/// Load state of a single role input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Input<T> {
    #[default]
    Pending,
    Ready(T),
    Failed,
}

impl<T> Input<T> {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The loaded value, or `None` if the load failed or never finished.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for Input<T> {
    fn from(result: Result<T, E>) -> Self {
        result.map_or(Self::Failed, Self::Ready)
    }
}

/// Derived role booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roles {
    pub is_authenticated: bool,
    pub is_seller: bool,
    pub is_pro_user: bool,
}

impl Roles {
    /// Roles of an absent or anonymous session.
    pub const GUEST: Self = Self {
        is_authenticated: false,
        is_seller: false,
        is_pro_user: false,
    };

    /// Pure derivation from already-loaded inputs.
    ///
    /// `is_pro` is the profile's flag (`None` when there is no profile) and
    /// `product_count` the number of products the viewer sells (`None` when
    /// unknown). Both are ignored for guests.
    #[must_use]
    pub fn derive(viewer: Option<Viewer>, is_pro: Option<bool>, product_count: Option<u64>) -> Self {
        let is_authenticated = viewer.is_some_and(|v| !v.is_anonymous);
        if !is_authenticated {
            return Self::GUEST;
        }
        Self {
            is_authenticated,
            is_seller: product_count.unwrap_or(0) > 0,
            is_pro_user: is_pro.unwrap_or(false),
        }
    }

    /// Whether the pro-only seller tools are visible.
    #[must_use]
    pub const fn is_pro_seller(&self) -> bool {
        self.is_authenticated && self.is_seller && self.is_pro_user
    }
}

/// Collects role inputs and releases [`Roles`] only once all of them settled.
///
/// ```
/// use marche_core::access::{Input, RoleGate, Viewer};
/// use marche_core::Uid;
///
/// let viewer = Viewer::account(Uid::generate());
/// let gate = RoleGate::new().with_session(Input::Ready(Some(viewer)));
/// assert!(gate.settle().is_none()); // profile and product count still loading
///
/// let roles = gate
///     .with_profile(Input::Ready(Some(true)))
///     .with_product_count(Input::Ready(2))
///     .settle()
///     .unwrap();
/// assert!(roles.is_pro_seller());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleGate {
    session: Input<Option<Viewer>>,
    is_pro: Input<Option<bool>>,
    product_count: Input<u64>,
}

impl RoleGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: Input::Pending,
            is_pro: Input::Pending,
            product_count: Input::Pending,
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: Input<Option<Viewer>>) -> Self {
        self.session = session;
        self
    }

    /// Profile input: `Some(is_pro)` when a profile exists, `None` otherwise.
    #[must_use]
    pub fn with_profile(mut self, is_pro: Input<Option<bool>>) -> Self {
        self.is_pro = is_pro;
        self
    }

    #[must_use]
    pub fn with_product_count(mut self, count: Input<u64>) -> Self {
        self.product_count = count;
        self
    }

    /// The account whose profile and product count must still be fetched.
    ///
    /// `None` for anonymous or absent sessions: nothing else is loaded for
    /// them.
    #[must_use]
    pub fn account_to_load(&self) -> Option<Uid> {
        match self.session {
            Input::Ready(Some(viewer)) if !viewer.is_anonymous => Some(viewer.uid),
            _ => None,
        }
    }

    /// Derived roles, or `None` while a required input is still pending.
    #[must_use]
    pub fn settle(&self) -> Option<Roles> {
        let viewer = match self.session {
            Input::Pending => return None,
            // The identity provider failing counts as no session.
            Input::Failed => return Some(Roles::GUEST),
            Input::Ready(viewer) => viewer,
        };

        match viewer {
            Some(v) if !v.is_anonymous => {
                if self.is_pro.is_pending() || self.product_count.is_pending() {
                    return None;
                }
                Some(Roles::derive(
                    viewer,
                    self.is_pro.ready().flatten(),
                    self.product_count.ready(),
                ))
            }
            _ => Some(Roles::GUEST),
        }
    }
}
