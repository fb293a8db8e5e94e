use std::sync::Arc;

use crate::{
    error::AppError,
    models::{Identity, Profile},
    store::TableStore,
};

/// Profile screen reads. Editing flows are menu stubs and stay
/// unimplemented.
pub struct Profiles<S> {
    store: Arc<S>,
}

impl<S: TableStore> Profiles<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Profile row for the current identity. Anonymous users and rows the
    /// registration trigger has not created yet both come back as `None`.
    pub async fn current(&self, identity: Option<&Identity>) -> Result<Option<Profile>, AppError> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        self.store.profile_by_id(identity.id).await
    }
}

pub fn display_name(profile: Option<&Profile>) -> &str {
    profile
        .and_then(|p| p.full_name.as_deref())
        .unwrap_or("Guest")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_display_name_falls_back() {
        assert_eq!(display_name(None), "Guest");

        let profile = Profile {
            id: Uuid::new_v4(),
            email: "jean@example.com".to_string(),
            full_name: None,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(display_name(Some(&profile)), "Guest");

        let named = Profile {
            full_name: Some("Jean Dupont".to_string()),
            ..profile
        };
        assert_eq!(display_name(Some(&named)), "Jean Dupont");
    }
}
