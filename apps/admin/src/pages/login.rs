//! `/login`

use rental_core::{FormErrors, FormState, LoginForm};
use tracing::{info, warn};

use super::{failure_message, form_errors, PageContext};
use crate::error::{AppError, AppResult};
use crate::navigation::Route;

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Debug)]
pub struct LoginPage {
    ctx: PageContext,
    form: FormState<LoginForm>,
    redirect: Option<String>,
}

impl LoginPage {
    /// `redirect` comes from `/login?redirect=...`.
    pub fn new(ctx: PageContext, redirect: Option<String>) -> Self {
        LoginPage {
            ctx,
            form: FormState::new(LoginForm::default()),
            redirect,
        }
    }

    /// Builds the page for a parsed login route.
    pub fn for_route(ctx: PageContext, route: &Route) -> Self {
        let redirect = match route {
            Route::Login { redirect } => redirect.clone(),
            _ => None,
        };
        Self::new(ctx, redirect)
    }

    pub fn form(&self) -> &FormState<LoginForm> {
        &self.form
    }

    pub fn edit(&mut self) -> AppResult<&mut LoginForm> {
        Ok(self.form.edit()?)
    }

    /// Fills both fields at once.
    pub fn fill(&mut self, email: &str, password: &str) -> AppResult<()> {
        *self.edit()? = LoginForm::new(email, password);
        Ok(())
    }

    /// Validates, signs in, stores the session and moves on.
    ///
    /// Returns the route the user landed on. On failure the form keeps the
    /// typed email and shows the banner; the route does not change.
    pub async fn submit(&mut self) -> AppResult<Route> {
        let request = self.form.submit()?;

        let response = match self.ctx.hooks.api().auth.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                let message = failure_message(&e, LOGIN_FAILED);
                warn!(error = %e, "Login failed");
                self.form.fail(message.clone(), form_errors(&e, &[]))?;
                self.ctx.toast_error("Login Failed", message).await;
                return Err(AppError::from(e));
            }
        };

        let welcome = format!("Welcome back, {}!", response.user.display_name());
        if let Err(e) = self.ctx.auth.login(response).await {
            warn!(error = %e, "Could not store the session");
            self.form.fail(LOGIN_FAILED, FormErrors::new())?;
            self.ctx.toast_error("Login Failed", LOGIN_FAILED).await;
            return Err(AppError::from(e));
        }
        self.form.succeed()?;
        info!("Signed in");
        self.ctx.toast_success("Login Successful", welcome).await;

        let target = Route::Login {
            redirect: self.redirect.clone(),
        };
        self.ctx.navigate(target);
        self.ctx
            .current_route()
            .ok_or_else(|| AppError::internal("Navigation did not record a route"))
    }
}
