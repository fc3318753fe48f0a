//! Compiled-in navigation menu.
//!
//! Menu entries carry an [`IconId`], never a renderable icon: the presentation
//! layer maps identifiers to glyphs.

use serde::Serialize;

use adminhub_core::RoutePath;

/// Stable icon identifier (serialized kebab-case, e.g. `"bar-chart"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconId {
    LayoutDashboard,
    Building,
    Users,
    BarChart,
    Puzzle,
    Shield,
    ScrollText,
    Settings,
}

impl IconId {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconId::LayoutDashboard => "layout-dashboard",
            IconId::Building => "building",
            IconId::Users => "users",
            IconId::BarChart => "bar-chart",
            IconId::Puzzle => "puzzle",
            IconId::Shield => "shield",
            IconId::ScrollText => "scroll-text",
            IconId::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    pub url: RoutePath,
    pub icon: IconId,
}

impl MenuItem {
    pub const fn new(title: &'static str, url: &'static str, icon: IconId) -> Self {
        Self {
            title,
            url: RoutePath::from_static(url),
            icon,
        }
    }
}

/// Canonical navigation order. The first allowed entry is also the fallback
/// target when a route is denied.
pub static MENU: [MenuItem; 8] = [
    MenuItem::new("Dashboard", "/dashboard", IconId::LayoutDashboard),
    MenuItem::new("Companies", "/companies", IconId::Building),
    MenuItem::new("Users", "/users", IconId::Users),
    MenuItem::new("Reports", "/reports", IconId::BarChart),
    MenuItem::new("Modules", "/modules", IconId::Puzzle),
    MenuItem::new("Permissions", "/permissions", IconId::Shield),
    MenuItem::new("Audit Logs", "/audit-logs", IconId::ScrollText),
    MenuItem::new("Settings", "/settings", IconId::Settings),
];

/// Routes of `menu`, in declaration order.
pub fn menu_routes(menu: &[MenuItem]) -> impl Iterator<Item = &RoutePath> {
    menu.iter().map(|item| &item.url)
}
