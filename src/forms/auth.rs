//! Login and registration forms

use super::{track, FormError, Submitted};
use crate::app::App;
use crate::models::{LoginCredentials, User, UserCreate};
use crate::pages::Route;

/// Longest password the API accepts
pub const PASSWORD_MAX_LEN: usize = 72;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Warn once the password is this close to the limit
const PASSWORD_WARNING_MARGIN: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<LoginCredentials, FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::invalid("email", "Email is required"));
        }
        if self.password.is_empty() {
            return Err(FormError::invalid("password", "Password is required"));
        }
        if self.password.chars().count() > PASSWORD_MAX_LEN {
            return Err(FormError::invalid(
                "password",
                format!("Password must be at most {} characters", PASSWORD_MAX_LEN),
            ));
        }
        Ok(LoginCredentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    /// Log in through the session store; success leads to the dashboard
    pub async fn submit(&mut self, app: &App) -> Result<Submitted<User>, FormError> {
        let checked = self.validate();
        let credentials = track(&mut self.error, checked)?;

        self.submitting = true;
        let result = app.session.login(&app.client, &credentials).await;
        self.submitting = false;

        // a 401 here means bad credentials, not an expired session
        let result = result
            .map(|user| Submitted {
                value: user,
                next: Route::Dashboard,
            })
            .map_err(|e| FormError::Server(e.user_message("Login failed")));
        track(&mut self.error, result)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub prenom: String,
    pub nom: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl RegisterForm {
    /// Notice shown while the password nears the length limit
    pub fn password_warning(&self) -> Option<String> {
        let len = self.password.chars().count();
        (len >= PASSWORD_MAX_LEN - PASSWORD_WARNING_MARGIN).then(|| {
            format!(
                "Password is close to the {} character limit ({}/{})",
                PASSWORD_MAX_LEN, len, PASSWORD_MAX_LEN
            )
        })
    }

    fn validate(&self) -> Result<UserCreate, FormError> {
        let required = [
            ("prenom", &self.prenom, "First name is required"),
            ("nom", &self.nom, "Last name is required"),
            ("email", &self.email, "Email is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                return Err(FormError::invalid(field, message));
            }
        }

        let len = self.password.chars().count();
        if len < PASSWORD_MIN_LEN {
            return Err(FormError::invalid(
                "password",
                format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
            ));
        }
        if len > PASSWORD_MAX_LEN {
            return Err(FormError::invalid(
                "password",
                format!("Password must be at most {} characters", PASSWORD_MAX_LEN),
            ));
        }
        if self.password != self.confirm_password {
            return Err(FormError::invalid("confirm_password", "Passwords do not match"));
        }

        Ok(UserCreate {
            nom: self.nom.trim().to_string(),
            prenom: self.prenom.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: None,
        })
    }

    /// Create the account and log into it; success leads to the dashboard
    pub async fn submit(&mut self, app: &App) -> Result<Submitted<User>, FormError> {
        let checked = self.validate();
        let user = track(&mut self.error, checked)?;

        self.submitting = true;
        let result = app.session.register(&app.client, &user).await;
        self.submitting = false;

        let result = result
            .map(|user| Submitted {
                value: user,
                next: Route::Dashboard,
            })
            .map_err(|e| FormError::Server(e.user_message("Registration failed")));
        track(&mut self.error, result)
    }
}
