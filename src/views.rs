use anyhow::Context as _;
use axum::response::Html;
use tera::{Context, Tera};

use crate::users::User;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/home";

const LOGIN_TEMPLATE: &str = "login.html";
const HOME_TEMPLATE: &str = "home.html";

/// Page templates, compiled once at startup. `.html` names keep tera's
/// autoescaping on, so interpolated user data is escaped.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (LOGIN_TEMPLATE, include_str!("../templates/login.html")),
            (HOME_TEMPLATE, include_str!("../templates/home.html")),
        ])
        .context("load page templates")?;
        Ok(Self { tera })
    }

    pub fn login_page(&self, error: Option<&str>) -> anyhow::Result<Html<String>> {
        let mut ctx = Context::new();
        ctx.insert("error", &error);
        self.render(LOGIN_TEMPLATE, &ctx)
    }

    pub fn home_page(&self, user: &User) -> anyhow::Result<Html<String>> {
        let mut ctx = Context::new();
        ctx.insert("full_name", &user.full_name);
        ctx.insert("email", &user.email);
        self.render(HOME_TEMPLATE, &ctx)
    }

    fn render(&self, name: &str, ctx: &Context) -> anyhow::Result<Html<String>> {
        let body = self
            .tera
            .render(name, ctx)
            .with_context(|| format!("render {name}"))?;
        Ok(Html(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::user_row;

    #[test]
    fn login_page_shows_error_only_when_given() {
        let views = Views::new().unwrap();
        let Html(plain) = views.login_page(None).unwrap();
        assert!(!plain.contains(r#"class="error""#));
        assert!(plain.contains(r#"name="txtEmail""#));
        assert!(plain.contains(r#"value="Login""#));

        let Html(with_error) = views.login_page(Some("Invalid email or password")).unwrap();
        assert!(with_error.contains(r#"<p class="error">Invalid email or password</p>"#));
    }

    #[test]
    fn home_page_escapes_user_fields() {
        let views = Views::new().unwrap();
        let mut user = user_row("x@example.com", "h", "ACTIVE");
        user.full_name = "<script>alert(1)</script>".into();
        let Html(body) = views.home_page(&user).unwrap();
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
        assert!(body.contains("x@example.com"));
    }

    #[test]
    fn login_error_is_escaped() {
        let views = Views::new().unwrap();
        let Html(body) = views.login_page(Some(r#"<b onclick="x">"#)).unwrap();
        assert!(body.contains("&lt;b onclick=&quot;x&quot;&gt;"));
        assert!(!body.contains("<b onclick"));
    }
}
