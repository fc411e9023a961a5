//! Client-side route trees.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use api_types::{
    Platform,
    navigation::{LocationState, Toast},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// Overwrite the current history entry instead of pushing a new one.
    pub replace: bool,
    pub state: LocationState,
}

/// Target of client-side navigation.
pub trait Navigator: Send + Sync {
    /// State of the current location.
    fn location_state(&self) -> LocationState;

    /// Navigates to `path`; `"."` is the current location.
    fn navigate(&self, path: &str, options: NavigateOptions);

    /// Navigates to `path` with the current state overlaid by `patch`.
    ///
    /// Reading the current state and navigating must happen atomically, so
    /// that concurrent callers never overwrite each other's keys.
    fn navigate_merged(&self, path: &str, replace: bool, patch: LocationState);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub path: String,
    pub state: LocationState,
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    fn current(&self) -> &Location {
        &self.entries[self.index]
    }
}

/// In-memory route tree with browser-like history.
#[derive(Debug)]
pub struct RouteTree {
    platform: Platform,
    history: Mutex<History>,
}

impl RouteTree {
    pub fn new(platform: Platform, initial_path: &str) -> Self {
        Self {
            platform,
            history: Mutex::new(History {
                entries: vec![Location {
                    path: initial_path.to_string(),
                    state: LocationState::default(),
                }],
                index: 0,
            }),
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform, "/")
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn current(&self) -> Location {
        self.history().current().clone()
    }

    pub fn history_len(&self) -> usize {
        self.history().entries.len()
    }

    /// Moves one entry back. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut history = self.history();
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        true
    }

    /// Removes and returns the toast of the current location.
    pub fn take_toast(&self) -> Option<Toast> {
        let mut history = self.history();
        let index = history.index;
        history.entries[index].state.toast.take()
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resolve(current: &str, path: &str) -> String {
    match path {
        "" | "." => current.to_string(),
        absolute if absolute.starts_with('/') => absolute.to_string(),
        relative => format!(
            "{}/{}",
            current.trim_end_matches('/'),
            relative.trim_start_matches("./")
        ),
    }
}

impl RouteTree {
    fn apply(&self, history: &mut History, path: &str, options: NavigateOptions) {
        let location = Location {
            path: resolve(&history.current().path, path),
            state: options.state,
        };
        tracing::debug!(
            platform = self.platform.as_str(),
            path = %location.path,
            replace = options.replace,
            "navigate"
        );

        if options.replace {
            let index = history.index;
            history.entries[index] = location;
        } else {
            let next = history.index + 1;
            history.entries.truncate(next);
            history.entries.push(location);
            history.index = next;
        }
    }
}

impl Navigator for RouteTree {
    fn location_state(&self) -> LocationState {
        self.history().current().state.clone()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) {
        let mut history = self.history();
        self.apply(&mut history, path, options);
    }

    fn navigate_merged(&self, path: &str, replace: bool, patch: LocationState) {
        let mut history = self.history();
        let state = history.current().state.clone().merge(patch);
        self.apply(&mut history, path, NavigateOptions { replace, state });
    }
}

/// Route trees of both platforms.
#[derive(Debug, Clone)]
pub struct Routes {
    pub gestao: Arc<RouteTree>,
    pub sellers: Arc<RouteTree>,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            gestao: Arc::new(RouteTree::for_platform(Platform::Gestao)),
            sellers: Arc::new(RouteTree::for_platform(Platform::Sellers)),
        }
    }
}

impl Routes {
    pub fn select(&self, platform: Platform) -> Arc<RouteTree> {
        match platform {
            Platform::Gestao => self.gestao.clone(),
            Platform::Sellers => self.sellers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use api_types::navigation::{Outcome, ToastStatus};
    use serde_json::json;

    use super::*;

    fn state_with(key: &str, value: serde_json::Value) -> LocationState {
        let mut state = LocationState::default();
        state.extra.insert(key.to_string(), value);
        state
    }

    #[test]
    fn resolves_paths() {
        assert_eq!(resolve("/orders", "."), "/orders");
        assert_eq!(resolve("/orders", "/login"), "/login");
        assert_eq!(resolve("/orders/", "12"), "/orders/12");
    }

    #[test]
    fn replace_overwrites_current_entry() {
        let tree = RouteTree::new(Platform::Gestao, "/orders");
        tree.navigate(
            ".",
            NavigateOptions {
                replace: true,
                state: state_with("tab", json!("open")),
            },
        );

        assert_eq!(tree.history_len(), 1);
        let current = tree.current();
        assert_eq!(current.path, "/orders");
        assert_eq!(current.state.extra.get("tab"), Some(&json!("open")));
    }

    #[test]
    fn push_discards_forward_entries() {
        let tree = RouteTree::for_platform(Platform::Sellers);
        tree.navigate("/a", NavigateOptions::default());
        tree.navigate("/b", NavigateOptions::default());
        assert!(tree.back());
        tree.navigate("/c", NavigateOptions::default());

        assert_eq!(tree.history_len(), 3);
        assert_eq!(tree.current().path, "/c");
        assert!(tree.back());
        assert_eq!(tree.current().path, "/a");
    }

    #[test]
    fn back_stops_at_first_entry() {
        let tree = RouteTree::for_platform(Platform::Gestao);
        assert!(!tree.back());
    }

    #[test]
    fn take_toast_consumes_it() {
        let tree = RouteTree::for_platform(Platform::Gestao);
        tree.navigate(
            ".",
            NavigateOptions {
                replace: true,
                state: Outcome::Success {
                    description: "Saved".to_string(),
                }
                .into_state(),
            },
        );

        let toast = tree.take_toast().unwrap();
        assert_eq!(toast.status, ToastStatus::Success);
        assert_eq!(tree.take_toast(), None);
    }

    #[test]
    fn merged_navigation_keeps_existing_keys() {
        let tree = RouteTree::new(Platform::Gestao, "/orders");
        tree.navigate(
            ".",
            NavigateOptions {
                replace: true,
                state: state_with("tab", json!("open")),
            },
        );
        tree.navigate_merged(".", true, Outcome::AuthRequired.into_state());

        assert_eq!(tree.history_len(), 1);
        let state = tree.location_state();
        assert_eq!(state.extra.get("tab"), Some(&json!("open")));
        assert_eq!(state.auth_required, Some(true));
    }

    #[test]
    fn select_picks_the_platform_tree() {
        let routes = Routes::default();
        assert_eq!(routes.select(Platform::Gestao).platform(), Platform::Gestao);
        assert_eq!(routes.select(Platform::Sellers).platform(), Platform::Sellers);
    }
}
