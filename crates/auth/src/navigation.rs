//! Sidebar navigation filtering.

use crate::{AllowedRoutes, MenuItem};

/// Keep the entries of `menu` whose route is allowed, in declaration order.
pub fn filter_menu(menu: &[MenuItem], allowed: &AllowedRoutes) -> Vec<MenuItem> {
    menu.iter()
        .filter(|item| allowed.contains(&item.url))
        .cloned()
        .collect()
}

/// Sidebar presentation state. Collapsing only changes rendering, never which
/// entries are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sidebar {
    pub collapsed: bool,
}

impl Sidebar {
    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub fn visible_items(&self, menu: &[MenuItem], allowed: &AllowedRoutes) -> Vec<MenuItem> {
        filter_menu(menu, allowed)
    }
}

#[cfg(test)]
mod tests {
    use adminhub_core::RoutePath;
    use proptest::prelude::*;

    use super::*;
    use crate::MENU;

    fn allowed(routes: &[&'static str]) -> AllowedRoutes {
        routes.iter().map(|r| RoutePath::from_static(*r)).collect()
    }

    #[test]
    fn keeps_menu_order_not_allowed_order() {
        let visible = filter_menu(&MENU, &allowed(&["/settings", "/reports", "/dashboard"]));
        let urls: Vec<&str> = visible.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["/dashboard", "/reports", "/settings"]);
    }

    #[test]
    fn ignores_allowed_routes_missing_from_menu() {
        let visible = filter_menu(&MENU, &allowed(&["/hidden", "/users"]));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Users");
    }

    #[test]
    fn collapsed_state_does_not_change_items() {
        let routes = allowed(&["/dashboard", "/audit-logs"]);
        let mut sidebar = Sidebar::default();
        let expanded = sidebar.visible_items(&MENU, &routes);
        sidebar.toggle();
        assert!(sidebar.collapsed);
        assert_eq!(sidebar.visible_items(&MENU, &routes), expanded);
    }

    proptest! {
        /// The result is always an order-preserving subsequence of the menu.
        #[test]
        fn output_is_ordered_subsequence(mask in prop::collection::vec(any::<bool>(), MENU.len())) {
            let routes: AllowedRoutes = MENU
                .iter()
                .zip(&mask)
                .filter(|(_, keep)| **keep)
                .map(|(item, _)| item.url.clone())
                .collect();

            let visible = filter_menu(&MENU, &routes);

            let mut cursor = 0;
            for item in &visible {
                let pos = MENU[cursor..].iter().position(|m| m == item);
                prop_assert!(pos.is_some());
                cursor += pos.unwrap_or(0) + 1;
                prop_assert!(routes.contains(&item.url));
            }
            prop_assert_eq!(visible.len(), mask.iter().filter(|k| **k).count());
        }
    }
}
