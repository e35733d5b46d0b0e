use crate::types::DbId;

/// Domain errors raised outside the session rotation engine.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "User",
            id: 7,
        };
        assert_eq!(err.to_string(), "Entity not found: User with id 7");
    }

    #[test]
    fn unauthorized_display() {
        let err = CoreError::Unauthorized("authorization token is empty".into());
        assert_eq!(err.to_string(), "Unauthorized: authorization token is empty");
    }
}
