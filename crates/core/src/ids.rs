#![forbid(unsafe_code)]

/// Owning identity for every tag and relation row. All index operations are
/// scoped to exactly one owner; nothing crosses scopes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
        let value = value.into();
        validate_owner_id(&value)?;
        Ok(Self(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    InvalidChar { ch: char, index: usize },
}

impl OwnerIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "owner id must not be empty",
            Self::TooLong => "owner id is too long",
            Self::InvalidFirstChar => "owner id must start with an ASCII letter or digit",
            Self::InvalidChar { .. } => "owner id contains an invalid character",
        }
    }
}

fn validate_owner_id(value: &str) -> Result<(), OwnerIdError> {
    if value.is_empty() {
        return Err(OwnerIdError::Empty);
    }
    if value.len() > 128 {
        return Err(OwnerIdError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if index == 0 {
            if !ch.is_ascii_alphanumeric() {
                return Err(OwnerIdError::InvalidFirstChar);
            }
            continue;
        }
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-' | '@' | '/') {
            continue;
        }
        return Err(OwnerIdError::InvalidChar { ch, index });
    }
    Ok(())
}
