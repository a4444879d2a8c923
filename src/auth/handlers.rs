use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::{
        dto::{Action, ControllerForm},
        services,
    },
    session::CurrentSession,
    state::AppState,
    views::{HOME_PATH, LOGIN_PATH},
};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn controller_routes() -> Router<AppState> {
    Router::new().route("/MainController", post(main_controller))
}

pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_view))
        .route(HOME_PATH, get(home_view))
}

/// POST /MainController: dispatches on the `action` field. Actions other than
/// `Login` get an empty 200 and leave the session alone.
#[instrument(skip_all)]
pub async fn main_controller(
    State(state): State<AppState>,
    CurrentSession(current): CurrentSession,
    Form(form): Form<ControllerForm>,
) -> Result<Response, (StatusCode, String)> {
    match Action::parse(&form.action) {
        Some(Action::Login) => login(&state, current.map(|s| s.id), form).await,
        None => {
            debug!(action = %form.action, "unrecognised action ignored");
            Ok(StatusCode::OK.into_response())
        }
    }
}

async fn login(
    state: &AppState,
    session_id: Option<uuid::Uuid>,
    form: ControllerForm,
) -> Result<Response, (StatusCode, String)> {
    let user = match services::login(state.users.as_ref(), &form.email, &form.password).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "login lookup failed");
            return Err(internal(e));
        }
    };

    let Some(user) = user else {
        warn!(email = %form.email, "login rejected");
        let page = state.views.login_page(Some(INVALID_CREDENTIALS)).map_err(internal)?;
        return Ok(page.into_response());
    };

    let user_id = user.id;
    let (session, created) = state.sessions.store_login_user(session_id, user);
    info!(user_id, session_id = %session.id, "user logged in");

    let redirect = Redirect::to(HOME_PATH);
    if created {
        let cookie = state.sessions.cookie_for(&session);
        Ok(([(header::SET_COOKIE, cookie)], redirect).into_response())
    } else {
        Ok(redirect.into_response())
    }
}

pub async fn login_view(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, String)> {
    state.views.login_page(None).map_err(internal)
}

pub async fn home_view(
    State(state): State<AppState>,
    CurrentSession(current): CurrentSession,
) -> Result<Response, (StatusCode, String)> {
    match current.and_then(|s| s.login_user) {
        Some(user) => Ok(state.views.home_page(&user).map_err(internal)?.into_response()),
        None => Ok(Redirect::to(LOGIN_PATH).into_response()),
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
