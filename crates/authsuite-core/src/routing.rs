//! Client route table.
//!
//! Three routes: `/` (home, or the login form when signed out), `/settings`
//! (signed-in only) and a catch-all not-found page. While startup work is
//! in flight every path shows the loading screen.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Settings,
    NotFound,
}

impl Route {
    /// Match a path, ignoring query, fragment and trailing slashes.
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        match path {
            "" => Route::Root,
            "/settings" => Route::Settings,
            _ => Route::NotFound,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Loading,
    Login,
    Home,
    Settings,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(Page),
    Redirect(&'static str),
}

/// Decide what to show for `path`.
pub fn resolve(path: &str, authenticated: bool, loading: bool) -> Resolution {
    if loading {
        return Resolution::Render(Page::Loading);
    }

    let route = Route::parse(path);
    if route.is_protected() && !authenticated {
        return Resolution::Redirect("/");
    }

    Resolution::Render(match route {
        Route::Root if authenticated => Page::Home,
        Route::Root => Page::Login,
        Route::Settings => Page::Settings,
        Route::NotFound => Page::NotFound,
    })
}
