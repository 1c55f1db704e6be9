//! Login form and the root redirect.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;

use vizboard_common::Notice;
use vizboard_security::{AccessGate, LoginOutcome};

use crate::error::Result;
use crate::session::CurrentSession;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn index(current: CurrentSession) -> Response {
    let target = if current.session.is_logged_in() { "/dashboard" } else { "/login" };
    (current.jar, Redirect::to(target)).into_response()
}

pub async fn login_page(
    State(state): State<SharedState>,
    current: CurrentSession,
) -> Result<Response> {
    if current.session.is_logged_in() {
        return Ok((current.jar, Redirect::to("/dashboard")).into_response());
    }
    let html = render_login(&state, &[], "")?;
    Ok((current.jar, Html(html)).into_response())
}

pub async fn login_submit(
    State(state): State<SharedState>,
    current: CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let mut flag = current.session.flag;
    let outcome = AccessGate::login(&mut flag, &form.username, &form.password);

    match outcome {
        LoginOutcome::Authenticated => {
            state
                .sessions
                .update(current.id, |s| {
                    s.flag = flag;
                    s.flash.push(Notice::success(outcome.message()));
                })
                .await;
            Ok((current.jar, Redirect::to("/dashboard")).into_response())
        }
        LoginOutcome::InvalidCredentials => {
            let html = render_login(&state, &[Notice::error(outcome.message())], &form.username)?;
            Ok((current.jar, Html(html)).into_response())
        }
    }
}

fn render_login(state: &SharedState, notices: &[Notice], username: &str) -> Result<String> {
    state
        .templates
        .render("login.html", context! { notices => notices, username => username })
}
