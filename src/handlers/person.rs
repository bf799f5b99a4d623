//! Person handlers: read by id, save (upsert).

use crate::error::AppError;
use crate::model::Person;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

/// GET /person/:id. 200 with the record, 404 with an empty body when absent.
pub async fn get_person(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let id = parse_id(&id_str)?;
    let person = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("person {}", id)))?;
    Ok((StatusCode::OK, Json(person)))
}

/// POST /person. Saves the body (upsert when it carries an id) and returns the persisted record.
pub async fn create_person(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let person = Person::from_body(body)?;
    let upsert = !person.is_transient();
    let saved = state.store.save(person).await?;
    tracing::debug!(id = ?saved.id, upsert, "person saved");
    Ok((StatusCode::OK, Json(saved)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-1").unwrap(), -1);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id("1.0"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id("99999999999999999999"), Err(AppError::BadRequest(_))));
    }
}
