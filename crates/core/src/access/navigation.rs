//! Primary menu composition.

use serde::Serialize;

use super::roles::Roles;

/// Icon shown next to a menu entry. Names follow the lucide icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavIcon {
    LayoutGrid,
    Megaphone,
    ShoppingBag,
    Bell,
    User,
    Gem,
    Radio,
    List,
    PlusSquare,
    BarChart,
    LogIn,
    LogOut,
}

impl NavIcon {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LayoutGrid => "layout-grid",
            Self::Megaphone => "megaphone",
            Self::ShoppingBag => "shopping-bag",
            Self::Bell => "bell",
            Self::User => "user",
            Self::Gem => "gem",
            Self::Radio => "radio",
            Self::List => "list",
            Self::PlusSquare => "plus-square",
            Self::BarChart => "bar-chart",
            Self::LogIn => "log-in",
            Self::LogOut => "log-out",
        }
    }
}

/// One entry of the primary menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: NavIcon,
    /// Marks entries reserved to pro subscribers.
    pub pro: bool,
}

impl NavLink {
    const fn new(href: &'static str, label: &'static str, icon: NavIcon) -> Self {
        Self {
            href,
            label,
            icon,
            pro: false,
        }
    }

    /// Whether this entry should be highlighted for `path`.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        path.starts_with(self.href)
    }
}

const BASE_LINKS: [NavLink; 2] = [
    NavLink::new("/products", "Produits", NavIcon::LayoutGrid),
    NavLink::new("/strategie", "Stratégie", NavIcon::Megaphone),
];

const AUTHENTICATED_LINKS: [NavLink; 4] = [
    NavLink::new("/orders", "Mes commandes", NavIcon::ShoppingBag),
    NavLink::new("/notifications", "Notifications", NavIcon::Bell),
    NavLink::new("/profile", "Profil", NavIcon::User),
    NavLink::new("/subscription", "Devenir Pro", NavIcon::Gem),
];

const SELLER_LINKS: [NavLink; 3] = [
    NavLink::new("/live", "Live", NavIcon::Radio),
    NavLink::new("/vendeur/mes-produits", "Mes Produits", NavIcon::List),
    NavLink::new("/vendeur/ajouter-produit", "Ajouter un produit", NavIcon::PlusSquare),
];

const PRO_LINKS: [NavLink; 1] = [NavLink {
    href: "/vendeur/ad-optimizer",
    label: "Optimiseur de pub",
    icon: NavIcon::BarChart,
    pro: true,
}];

const UNAUTHENTICATED_LINKS: [NavLink; 1] = [NavLink::new("/login", "Connexion", NavIcon::LogIn)];

/// Logout entry, rendered apart from the links for authenticated sessions.
pub const LOGOUT_LINK: NavLink = NavLink::new("/logout", "Déconnexion", NavIcon::LogOut);

/// Number of skeleton rows shown while roles are unsettled.
pub const SKELETON_ROWS: usize = 8;

/// Ordered menu entries for settled roles.
///
/// Order is fixed: base, then authenticated, then seller, then pro. Guests
/// get the base entries followed by the login entry and nothing else.
#[must_use]
pub fn compose(roles: Roles) -> Vec<NavLink> {
    let mut links = BASE_LINKS.to_vec();

    if !roles.is_authenticated {
        links.extend(UNAUTHENTICATED_LINKS);
        return links;
    }

    links.extend(AUTHENTICATED_LINKS);
    if roles.is_seller {
        links.extend(SELLER_LINKS);
        if roles.is_pro_user {
            links.extend(PRO_LINKS);
        }
    }
    links
}

/// What the menu area renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavMenu {
    /// Roles are not settled yet.
    Loading { rows: usize },
    Ready {
        links: Vec<NavLink>,
        logout: Option<NavLink>,
    },
}

/// Menu for roles that may still be loading.
#[must_use]
pub fn menu(roles: Option<Roles>) -> NavMenu {
    roles.map_or(NavMenu::Loading { rows: SKELETON_ROWS }, |roles| NavMenu::Ready {
        links: compose(roles),
        logout: roles.is_authenticated.then_some(LOGOUT_LINK),
    })
}
