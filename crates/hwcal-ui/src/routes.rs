/// The two navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Admin,
}

impl Route {
    /// Map a path or hash fragment to a view. Unknown paths show Home.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.strip_prefix('#').unwrap_or(path);
        let path = path.trim_end_matches('/');

        match path {
            "/admin" | "admin" => Route::Admin,
            _ => Route::Home,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Admin => "/admin",
        }
    }
}
