use serde::Deserialize;

/// Form posted to `/MainController`. Absent fields read as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ControllerForm {
    #[serde(default)]
    pub action: String,
    #[serde(default, rename = "txtEmail")]
    pub email: String,
    #[serde(default, rename = "txtPassword")]
    pub password: String,
}

/// Actions the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
}

impl Action {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Login" => Some(Action::Login),
            _ => None,
        }
    }
}
