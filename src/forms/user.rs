//! User forms.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{User, truncate_to_millis};

/// Input for creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 3, max = 255))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 500))]
    pub bio: Option<String>,
}

impl UserCreate {
    /// Copy the form onto a fresh entity.
    pub fn fill(&self, user: &mut User) {
        user.name = self.name.clone();
        user.bio = self.bio.clone().unwrap_or_default();
    }
}

/// Filter for looking users up by their bio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UsersGetByBio {
    #[validate(length(min = 3, max = 255))]
    pub bio: String,
}

/// Partial update of a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 255))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 3, max = 500))]
    pub bio: Option<String>,
}

impl UserUpdate {
    /// Apply the deltas to `user` and stamp the update time.
    pub fn fill(&self, user: &mut User, now: Timestamp) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }

        if let Some(bio) = &self.bio {
            user.bio = bio.clone();
        }

        user.updated_at = truncate_to_millis(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_create_validation() {
        let form = UserCreate {
            name: "John".to_string(),
            bio: Some("Programmer".to_string()),
        };
        assert!(form.validate().is_ok());

        let no_bio = UserCreate {
            name: "John".to_string(),
            bio: None,
        };
        assert!(no_bio.validate().is_ok());

        let short_name = UserCreate {
            name: "Jo".to_string(),
            bio: None,
        };
        assert!(short_name.validate().is_err());

        let long_bio = UserCreate {
            name: "John".to_string(),
            bio: Some("x".repeat(501)),
        };
        assert!(long_bio.validate().is_err());
    }

    #[test]
    fn test_users_get_by_bio_requires_bio() {
        assert!(UsersGetByBio::default().validate().is_err());
        assert!(
            UsersGetByBio {
                bio: "Programmer".to_string()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_user_update_requires_id() {
        let form = UserUpdate {
            bio: Some("Senior Programmer".to_string()),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
    }

    #[test]
    fn test_user_update_fill_is_partial() {
        let created = Timestamp::from_second(1_700_000_000).unwrap();
        let updated = Timestamp::from_second(1_700_000_600).unwrap();
        let mut user = User::new(created);
        user.name = "John".to_string();
        user.bio = "Programmer".to_string();

        let form = UserUpdate {
            id: "abc".to_string(),
            name: None,
            bio: Some("Senior Programmer".to_string()),
        };
        form.fill(&mut user, updated);

        assert_eq!(user.name, "John");
        assert_eq!(user.bio, "Senior Programmer");
        assert_eq!(user.created_at, created);
        assert_eq!(user.updated_at, updated);
    }

    #[test]
    fn test_user_update_fill_stamps_millisecond_precision() {
        let mut user = User::new(Timestamp::from_second(1_700_000_000).unwrap());
        let precise = Timestamp::new(1_700_000_600, 250_000_999).unwrap();

        UserUpdate::default().fill(&mut user, precise);
        assert_eq!(user.updated_at.as_millisecond(), precise.as_millisecond());
        assert_eq!(user.updated_at.subsec_nanosecond(), 250_000_000);
    }

    #[test]
    fn test_user_update_deserializes_missing_fields_as_none() {
        let form: UserUpdate = serde_json::from_str(r#"{"id": "abc", "name": "Johnny"}"#)
            .unwrap();
        assert_eq!(form.name.as_deref(), Some("Johnny"));
        assert!(form.bio.is_none());
    }
}
