//! Login, signup and logout.
//!
//! Forms post back to the same path. On success the session id is cycled
//! and the anonymous identity is replaced by the account's; the cart stays.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use marche_core::access::HOME_PATH;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{CurrentUser, UserAccount, session_keys};
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub ctx: PageContext,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn login_page(ctx: PageContext) -> impl IntoResponse {
    LoginTemplate {
        ctx,
        email: String::new(),
        error: None,
    }
}

#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.auth().login(&form.email, &form.password).await {
        Ok(account) => {
            sign_in(&session, &account).await?;
            info!(uid = %account.uid, "User logged in");
            Ok(Redirect::to(HOME_PATH).into_response())
        }
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => {
            warn!(error = %err, "Login rejected");
            Ok(form_error(
                &err,
                LoginTemplate {
                    ctx,
                    email: form.email,
                    error: Some(err.user_message()),
                },
            ))
        }
    }
}

pub async fn signup_page(ctx: PageContext) -> impl IntoResponse {
    SignupTemplate {
        ctx,
        name: String::new(),
        email: String::new(),
        error: None,
    }
}

#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    match state
        .auth()
        .signup(&form.name, &form.email, &form.password)
        .await
    {
        Ok(account) => {
            sign_in(&session, &account).await?;
            info!(uid = %account.uid, "User signed up");
            Ok(Redirect::to(HOME_PATH).into_response())
        }
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => Ok(form_error(
            &err,
            SignupTemplate {
                ctx,
                name: form.name,
                email: form.email,
                error: Some(err.user_message()),
            },
        )),
    }
}

/// Drop the session; the next request gets a fresh anonymous identity.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to(HOME_PATH))
}

async fn sign_in(session: &Session, account: &UserAccount) -> Result<()> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(account))
        .await?;
    set_sentry_user(&account.uid, Some(account.email.as_str()));
    Ok(())
}

fn form_error(err: &AuthError, page: impl IntoResponse) -> Response {
    (err.status(), page).into_response()
}
