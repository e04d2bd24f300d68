use std::fmt;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 16;
pub const SPECIAL_CHARACTERS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// A single broken password rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    Length,
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    MissingSpecial,
    MatchesUsername,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            PolicyViolation::Length => "Password must be between 8 and 16 characters long",
            PolicyViolation::MissingLowercase => {
                "Password must contain at least one lowercase letter"
            }
            PolicyViolation::MissingUppercase => {
                "Password must contain at least one uppercase letter"
            }
            PolicyViolation::MissingDigit => "Password must contain at least one number",
            PolicyViolation::MissingSpecial => {
                "Password must contain at least one special character (@$!%*?&)"
            }
            PolicyViolation::MatchesUsername => "Password cannot be the same as your username",
        };
        f.write_str(message)
    }
}

/// The full rule evaluation for a candidate password. Every broken rule is
/// reported, not just the first.
#[derive(Debug, Clone)]
pub struct PolicyReport {
    pub violations: Vec<PolicyViolation>,
}

impl PolicyReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

pub struct PasswordPolicy;

impl PasswordPolicy {
    /// Evaluates every rule against the candidate. The username comparison is
    /// case-insensitive.
    pub fn validate(password: &str, username: Option<&str>) -> PolicyReport {
        let mut violations = Vec::new();

        let length = password.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            violations.push(PolicyViolation::Length);
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PolicyViolation::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PolicyViolation::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PolicyViolation::MissingDigit);
        }
        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(&c)) {
            violations.push(PolicyViolation::MissingSpecial);
        }
        if let Some(username) = username {
            if !username.is_empty() && password.eq_ignore_ascii_case(username) {
                violations.push(PolicyViolation::MatchesUsername);
            }
        }

        PolicyReport { violations }
    }
}
