//! Information about the currently dispatched request handler.

/// Exposes the names of the controller and action handling the current
/// request. Only consulted to derive a default page title.
pub trait RouteInfo {
    fn controller_name(&self) -> &str;
    fn action_name(&self) -> &str;

    /// Derives a page title of the form `Controller | Action` from the
    /// unqualified controller name and the capitalized action name.
    fn default_title(&self) -> String {
        let controller = self
            .controller_name()
            .rsplit(|c| c == '\\' || c == '/' || c == ':')
            .find(|segment| !segment.is_empty())
            .unwrap_or("");
        format!("{} | {}", controller, capitalize(self.action_name()))
    }
}

/// A fixed controller/action pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticRoute {
    controller: String,
    action: String,
}

impl StaticRoute {
    /// Constructor.
    pub fn new<C, A>(controller: C, action: A) -> Self
    where
        C: AsRef<str>,
        A: AsRef<str>,
    {
        Self {
            controller: controller.as_ref().to_string(),
            action: action.as_ref().to_string(),
        }
    }
}

impl std::str::FromStr for StaticRoute {
    type Err = std::convert::Infallible;

    /// Parses `Controller::action`. Without an action, `index` is assumed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.rsplit_once("::") {
            Some((controller, action)) => Self::new(controller, action),
            None => Self::new(s, "index"),
        })
    }
}

impl RouteInfo for StaticRoute {
    fn controller_name(&self) -> &str {
        &self.controller
    }

    fn action_name(&self) -> &str {
        &self.action
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
