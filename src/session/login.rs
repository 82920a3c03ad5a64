//! Two-step phone login / registration form.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStep {
    #[default]
    Phone,
    Password,
    Register,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter a valid phone number")]
    InvalidPhone,
    #[error("Please enter your password.")]
    MissingPassword,
    #[error("Please enter and confirm your password.")]
    MissingConfirmation,
    #[error("Passwords do not match!")]
    PasswordMismatch,
    #[error("Submit the phone number first.")]
    WrongStep,
}

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const REGISTERED: &str = "Registration successful, proceed to login!";

/// Digits with an optional leading `+`, and a number the phone metadata
/// accepts as valid.
pub fn is_valid_phone(full_phone: &str) -> bool {
    let digits = full_phone.strip_prefix('+').unwrap_or(full_phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match phonenumber::parse(None, full_phone) {
        Ok(number) => phonenumber::is_valid(&number),
        Err(_) => false,
    }
}

/// Server-side username of the account registered for `full_phone`.
pub fn username_for(full_phone: &str) -> String {
    format!("user_{full_phone}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub full_phone: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    step: LoginStep,
    country_code: String,
    number: String,
}

impl LoginForm {
    pub fn new(country_code: &str) -> Self {
        Self { country_code: country_code.trim().to_string(), ..Self::default() }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn button_label(&self) -> &'static str {
        match self.step {
            LoginStep::Phone => "Next",
            LoginStep::Password => "Sign In",
            LoginStep::Register => "Create Account",
        }
    }

    pub fn set_country_code(&mut self, code: &str) {
        self.country_code = code.trim().to_string();
    }

    pub fn set_number(&mut self, number: &str) {
        self.number = number.trim().to_string();
    }

    pub fn full_phone(&self) -> String {
        format!("{}{}", self.country_code, self.number)
    }

    /// Phone to look up with `check-phone`, or why it may not be sent.
    pub fn submit_phone(&self) -> Result<String, LoginError> {
        let full = self.full_phone();
        if is_valid_phone(&full) { Ok(full) } else { Err(LoginError::InvalidPhone) }
    }

    pub fn on_phone_checked(&mut self, exists: bool) {
        self.step = if exists { LoginStep::Password } else { LoginStep::Register };
    }

    pub fn prepare_login(&self, password: &str) -> Result<Credentials, LoginError> {
        if self.step != LoginStep::Password {
            return Err(LoginError::WrongStep);
        }
        let full_phone = self.submit_phone()?;
        let password = password.trim();
        if password.is_empty() {
            return Err(LoginError::MissingPassword);
        }
        Ok(Credentials { full_phone, password: password.to_string() })
    }

    pub fn prepare_register(&self, password: &str, confirm: &str) -> Result<Credentials, LoginError> {
        if self.step != LoginStep::Register {
            return Err(LoginError::WrongStep);
        }
        let full_phone = self.submit_phone()?;
        if password.is_empty() || confirm.is_empty() {
            return Err(LoginError::MissingConfirmation);
        }
        if password != confirm {
            return Err(LoginError::PasswordMismatch);
        }
        Ok(Credentials { full_phone, password: password.to_string() })
    }

    /// Toast text for a failed sign-in or registration at the current step.
    /// Server error bodies are only logged.
    pub fn failure_text(&self) -> String {
        let reason = match self.step {
            LoginStep::Register => REGISTRATION_FAILED,
            _ => LOGIN_FAILED,
        };
        format!("Error: {reason}")
    }

    /// Registration succeeded; the user signs in from the phone step.
    pub fn on_registered(&mut self) {
        self.step = LoginStep::Phone;
    }

    pub fn reset(&mut self) {
        self.step = LoginStep::Phone;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_validation() {
        assert!(is_valid_phone("+14155552671"));
        assert!(is_valid_phone("+447911123456"));
        assert!(!is_valid_phone("+1415"));
        assert!(!is_valid_phone("+1 415 555 2671"));
        assert!(!is_valid_phone("+"));
        assert!(!is_valid_phone("abc"));
    }

    #[test]
    fn invalid_number_never_leaves_phone_step() {
        let mut form = LoginForm::new("+1");
        form.set_number("12");
        assert_eq!(form.submit_phone(), Err(LoginError::InvalidPhone));
        assert_eq!(form.step(), LoginStep::Phone);
        assert_eq!(form.button_label(), "Next");
    }

    #[test]
    fn known_number_goes_to_password() {
        let mut form = LoginForm::new("+1");
        form.set_number(" 4155552671 ");
        assert_eq!(form.submit_phone().unwrap(), "+14155552671");
        form.on_phone_checked(true);
        assert_eq!(form.button_label(), "Sign In");
        assert_eq!(form.prepare_login(""), Err(LoginError::MissingPassword));
        let creds = form.prepare_login(" secret ").unwrap();
        assert_eq!(creds, Credentials { full_phone: "+14155552671".into(), password: "secret".into() });
    }

    #[test]
    fn unknown_number_goes_to_register() {
        let mut form = LoginForm::new("+44");
        form.set_number("7911123456");
        form.on_phone_checked(false);
        assert_eq!(form.button_label(), "Create Account");
        assert_eq!(form.prepare_register("a", ""), Err(LoginError::MissingConfirmation));
        assert_eq!(form.prepare_register("a", "b"), Err(LoginError::PasswordMismatch));
        assert!(form.prepare_register("pw", "pw").is_ok());
        assert_eq!(form.prepare_login("pw"), Err(LoginError::WrongStep));

        form.on_registered();
        assert_eq!(form.step(), LoginStep::Phone);
    }

    #[test]
    fn failures_use_fixed_wording_per_step() {
        let mut form = LoginForm::new("+1");
        form.set_number("4155552671");
        form.on_phone_checked(true);
        assert_eq!(form.failure_text(), "Error: Login failed");
        form.on_phone_checked(false);
        assert_eq!(form.failure_text(), "Error: Registration failed");
    }

    #[test]
    fn usernames_follow_server_convention() {
        assert_eq!(username_for("+14155552671"), "user_+14155552671");
    }
}
