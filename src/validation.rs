//! # Form Validation
//!
//! Client-side checks run before a form is submitted. They mirror the rules
//! the backend applies, so most mistakes are reported inline without a round
//! trip. Every check produces a [`FieldErrors`] map keyed by the wire field
//! name; an empty map means the form may be submitted.
//!
//! ## Registration Rules
//!
//! - `username`: 4–20 latin letters or digits, starting with a letter
//! - `full_name`: required
//! - `email`: required, `local@domain.tld` shape
//! - `password`: at least 6 characters with an uppercase letter, a digit and
//!   a special character; every unmet rule is reported

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::FieldErrors;
use crate::models::RegisterRequest;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]{3,19}$").expect("valid username pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

pub const PASSWORD_MIN_LEN: usize = 6;

/// Validation entry points for the forms the client submits.
pub struct FormValidation;

impl FormValidation {
    /// Validates a registration form.
    ///
    /// Leading and trailing whitespace is ignored for every field except the
    /// password.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mycloud_client::models::RegisterRequest;
    /// use mycloud_client::validation::FormValidation;
    ///
    /// let errors = FormValidation::validate_registration(&RegisterRequest {
    ///     username: "alice".into(),
    ///     full_name: "Alice Liddell".into(),
    ///     email: "alice@example.com".into(),
    ///     password: "Secret1!".into(),
    /// });
    /// assert!(errors.is_empty());
    /// ```
    pub fn validate_registration(form: &RegisterRequest) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let username = form.username.trim();
        if username.is_empty() {
            errors.insert("username".into(), vec!["Username is required".into()]);
        } else if !USERNAME_RE.is_match(username) {
            errors.insert(
                "username".into(),
                vec!["Username must be 4-20 chars, latin letters/digits, first char is a letter".into()],
            );
        }

        if form.full_name.trim().is_empty() {
            errors.insert("full_name".into(), vec!["Full name is required".into()]);
        }

        let email = form.email.trim();
        if email.is_empty() {
            errors.insert("email".into(), vec!["Email is required".into()]);
        } else if !EMAIL_RE.is_match(email) {
            errors.insert("email".into(), vec!["Invalid email format".into()]);
        }

        let password_errors = Self::password_errors(&form.password);
        if !password_errors.is_empty() {
            errors.insert("password".into(), password_errors);
        }

        errors
    }

    fn password_errors(password: &str) -> Vec<String> {
        if password.is_empty() {
            return vec!["Password is required".into()];
        }

        let mut problems = Vec::new();
        if password.chars().count() < PASSWORD_MIN_LEN {
            problems.push(format!("Password must be at least {} characters", PASSWORD_MIN_LEN));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            problems.push("Password must contain at least one uppercase letter".into());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Password must contain at least one digit".into());
        }
        if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
            problems.push("Password must contain at least one special character".into());
        }
        problems
    }
}
