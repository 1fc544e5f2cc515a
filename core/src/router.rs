//! Static route table mapping URL paths to views.
//!
//! The table is fixed at startup: no nesting, guards or catch-all. A path
//! that matches no route resolves to `None` and the host decides what to
//! show.

/// Where the host should send the user once the server rejects the session.
pub const LOGIN_PATH: &str = "/login";

/// Views the host can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Post,
    Profile,
}

/// Browser history flavour. Only plain path history is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    #[default]
    Web,
}

/// A static rule mapping a URL pattern to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Segments starting with `:` capture one path segment.
    pub pattern: &'static str,
    pub name: &'static str,
    pub view: View,
    /// Whether captured segments are handed to the view as inputs.
    pub forwards_params: bool,
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub view: View,
    pub params: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

const STANDARD_ROUTES: &[Route] = &[
    Route { pattern: "/", name: "Home", view: View::Home, forwards_params: false },
    Route { pattern: "/login", name: "Login", view: View::Login, forwards_params: false },
    Route { pattern: "/register", name: "Register", view: View::Register, forwards_params: false },
    Route { pattern: "/post/:id", name: "Post", view: View::Post, forwards_params: true },
    Route { pattern: "/profile", name: "Profile", view: View::Profile, forwards_params: false },
    Route { pattern: "/user/:id", name: "User", view: View::Profile, forwards_params: true },
];

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    history: HistoryMode,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    /// The application's route table.
    pub fn standard() -> Self {
        Self::new(STANDARD_ROUTES.to_vec())
    }

    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            history: HistoryMode::default(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn history(&self) -> HistoryMode {
        self.history
    }

    /// Resolve a location to the first matching route.
    ///
    /// Query string and fragment are ignored and one trailing slash is
    /// tolerated.
    pub fn resolve(&self, location: &str) -> Option<RouteMatch> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments = split_path(path);
        self.routes.iter().find_map(|route| {
            let captured = match_segments(route.pattern, &segments)?;
            Some(RouteMatch {
                name: route.name,
                view: route.view,
                params: if route.forwards_params { captured } else { Vec::new() },
            })
        })
    }

    /// Build the concrete path for a named route.
    ///
    /// Returns `None` for an unknown name or a missing parameter.
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let route = self.routes.iter().find(|route| route.name == name)?;
        let mut path = String::new();
        for segment in split_path(route.pattern) {
            let value = match segment.strip_prefix(':') {
                Some(param) => params
                    .iter()
                    .find(|(key, _)| *key == param)
                    .map(|(_, value)| *value)
                    .filter(|value| !value.is_empty())
                    .map(urlencoding::encode)?,
                None => segment.into(),
            };
            path.push('/');
            path.push_str(&value);
        }
        if path.is_empty() {
            path.push('/');
        }
        Some(path)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Params are forwarded decoded. A segment that does not decode to UTF-8
/// is forwarded as written.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn match_segments(pattern: &str, segments: &[&str]) -> Option<Vec<(String, String)>> {
    let expected = split_path(pattern);
    if expected.len() != segments.len() {
        return None;
    }
    let mut captured = Vec::new();
    for (want, got) in expected.iter().zip(segments) {
        match want.strip_prefix(':') {
            Some(param) => captured.push((param.to_string(), decode_segment(got))),
            None if want == got => {}
            None => return None,
        }
    }
    Some(captured)
}
