//! `/api/contact` - contact form submissions.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::ApiError;
use crate::routes::timestamp;
use crate::store::next_id;
use crate::AppState;

/// Stored messages are kept as loose objects; only new ones are typed.
pub type StoredContact = Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct ContactRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ContactCreated {
    message: &'static str,
    contact: Contact,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_contacts).post(create_contact))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn list_contacts(State(state): State<Arc<AppState>>) -> Json<Vec<StoredContact>> {
    Json(state.contacts.load_or_empty().await)
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(email), Some(message)) = (
        required(req.name),
        required(req.email),
        required(req.message),
    ) else {
        return Err(ApiError::bad_request(
            "Name, email, and message are required",
        ));
    };

    let mut contacts: Vec<StoredContact> = state.contacts.load().await?;
    let contact = Contact {
        id: next_id(contacts.iter().filter_map(|c| c.get("id")?.as_i64())),
        name,
        email,
        message,
        created_at: timestamp(),
    };
    let stored: StoredContact = serde_json::to_value(&contact)
        .and_then(serde_json::from_value)
        .context("Failed to serialize contact")?;
    contacts.push(stored);
    state.contacts.save(&contacts).await?;

    info!(
        "New contact message #{} from {} <{}>",
        contact.id, contact.name, contact.email
    );

    Ok((
        StatusCode::CREATED,
        Json(ContactCreated {
            message: "Contact message saved successfully",
            contact,
        }),
    ))
}
