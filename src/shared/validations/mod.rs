use crate::shared::{DomainError, DomainResult};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Work-factor range accepted by bcrypt.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Counts characters, not bytes.
pub fn validate_username(username: &str) -> DomainResult<()> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(DomainError::Validation(format!(
            "username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    Ok(())
}

/// Minimum counts characters, maximum counts UTF-8 bytes.
pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(DomainError::Validation(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_length_is_enforced() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("bob").is_ok());
    }

    #[test]
    fn password_length_counts_chars() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("пароль").is_ok());
    }

    #[test]
    fn password_longer_than_72_bytes_is_rejected() {
        assert!(validate_password(&"a".repeat(72)).is_ok());
        assert!(matches!(
            validate_password(&"a".repeat(73)),
            Err(DomainError::Validation(ref m)) if m == "password must be at most 72 bytes"
        ));
        // 37 two-byte characters: 74 bytes.
        assert!(validate_password(&"я".repeat(37)).is_err());
    }
}
