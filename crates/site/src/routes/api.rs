//! JSON endpoints for the booking form's service picker.
//!
//! `GET /api/masters/{id}/services` is what the current front end calls.
//! `POST /api/masters/services` is the older form-encoded variant kept
//! for cached pages; it predates prices in the payload, so its entries
//! carry only `id` and `name`.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use clipjoint_core::{MasterId, ServiceId};

use crate::db::masters::MasterRepository;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ServiceEntry {
    id: ServiceId,
    name: String,
    price: Decimal,
}

#[derive(Debug, Serialize)]
struct ServicesResponse {
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Serialize)]
struct LegacyServiceEntry {
    id: ServiceId,
    name: String,
}

#[derive(Debug, Serialize)]
struct LegacyServicesResponse {
    services: Vec<LegacyServiceEntry>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

/// List the services a master offers, with prices.
#[instrument(skip(state))]
pub async fn master_services(
    State(state): State<AppState>,
    Path(id): Path<MasterId>,
) -> Result<Response> {
    if MasterRepository::new(state.pool()).get(id).await?.is_none() {
        return Ok(not_found("master not found"));
    }

    let services = state.master_services(id).await?;
    let body = ServicesResponse {
        services: services
            .iter()
            .map(|s| ServiceEntry {
                id: s.id,
                name: s.name.clone(),
                price: s.price,
            })
            .collect(),
    };

    Ok(Json(body).into_response())
}

/// Form body of the legacy endpoint.
#[derive(Debug, Deserialize)]
pub struct LegacyServicesForm {
    #[serde(default)]
    master_id: String,
}

/// Form-encoded variant of [`master_services`] without prices.
#[instrument(skip(state))]
pub async fn master_services_legacy(
    State(state): State<AppState>,
    Form(form): Form<LegacyServicesForm>,
) -> Result<Response> {
    let Ok(raw) = form.master_id.trim().parse::<i32>() else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "master_id is required".to_owned(),
            }),
        )
            .into_response());
    };
    let id = MasterId::from(raw);

    if MasterRepository::new(state.pool()).get(id).await?.is_none() {
        return Ok(not_found("master not found"));
    }

    let services = state.master_services(id).await?;
    let body = LegacyServicesResponse {
        services: services
            .iter()
            .map(|s| LegacyServiceEntry {
                id: s.id,
                name: s.name.clone(),
            })
            .collect(),
    };

    Ok(Json(body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_response_shape() {
        let body = ServicesResponse {
            services: vec![ServiceEntry {
                id: ServiceId::new(3),
                name: "Fade".to_owned(),
                price: Decimal::new(90000, 2),
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"services": [{"id": 3, "name": "Fade", "price": "900.00"}]})
        );
    }

    #[test]
    fn test_legacy_response_has_no_price() {
        let body = LegacyServicesResponse {
            services: vec![LegacyServiceEntry {
                id: ServiceId::new(1),
                name: "Haircut".to_owned(),
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"services": [{"id": 1, "name": "Haircut"}]})
        );
    }
}
