use super::dto::SafeUser;
use crate::users::User;

/// Projects a stored user into the shape that may leave the server.
pub fn create_safe_user(user: &User) -> SafeUser {
    SafeUser {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: user.role,
    }
}

impl From<&User> for SafeUser {
    fn from(user: &User) -> Self {
        create_safe_user(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::Role;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn stored_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            role: Role::User,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn keeps_public_fields() {
        let user = stored_user();
        let safe = create_safe_user(&user);
        assert_eq!(safe.id, user.id);
        assert_eq!(safe.email, "test@example.com");
        assert_eq!(safe.first_name, "John");
        assert_eq!(safe.last_name, "Doe");
        assert_eq!(safe.role, Role::User);
    }

    #[test]
    fn serialized_form_has_no_password() {
        let user = stored_user();
        let json = serde_json::to_value(create_safe_user(&user)).unwrap();
        let obj = json.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["email", "firstName", "id", "lastName", "role"]);
        assert!(!json.to_string().contains(&user.password_hash));
    }
}
