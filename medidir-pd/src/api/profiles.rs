//! Profile directory endpoints
//!
//! Composes the ingestion validator, asset store, and document store into
//! the create/update, fetch, list, and delete operations, and owns the
//! consistency ordering between a document and its photo asset.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::db::profiles::{self, ProfileRecord};
use crate::validate;
use crate::{ApiError, ApiResult, AppState};

/// Response for a successful create-or-update
#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub success: bool,
    pub message: String,
    pub record: ProfileRecord,
}

/// Response for a successful fetch
#[derive(Debug, Serialize)]
pub struct FetchProfileResponse {
    pub success: bool,
    pub record: ProfileRecord,
}

/// Response for the full listing
#[derive(Debug, Serialize)]
pub struct ListProfilesResponse {
    pub success: bool,
    pub records: Vec<ProfileRecord>,
}

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteProfileResponse {
    pub success: bool,
    pub message: String,
}

/// An uploaded photo part, as received from the multipart form
struct PhotoUpload {
    declared_type: String,
    file_name: Option<String>,
    bytes: Bytes,
}

/// POST /profile
///
/// Multipart form: required text fields `name, age, gender, bloodGroup,
/// dateOfBirth`, optional `medicalConditions, healthInsurance`, optional
/// file field `photo`.
///
/// Ordering: validation first (failure means zero writes); then the photo
/// goes to the asset store (failure means the record is never touched);
/// then the document upsert; and only after the upsert commits is a
/// replaced photo removed. A submission without a photo preserves the
/// stored one.
pub async fn save_profile(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<SaveProfileResponse>> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "photo" {
            let declared_type = field.content_type().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            photo = Some(PhotoUpload {
                declared_type,
                file_name,
                bytes,
            });
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let submission = validate::validate(&fields).map_err(|missing| {
        ApiError::Validation(format!("missing required fields: {}", missing.join(", ")))
    })?;

    let new_photo_path = match &photo {
        Some(upload) => Some(
            state
                .assets
                .put(
                    &upload.bytes,
                    &upload.declared_type,
                    upload.file_name.as_deref(),
                )
                .await?,
        ),
        None => None,
    };

    // Prior photo reference, captured for cleanup once the upsert commits
    let previous_photo = profiles::find_by_name(&state.db, &submission.name)
        .await?
        .and_then(|record| record.photo_path);

    let record =
        profiles::upsert_by_name(&state.db, &submission, new_photo_path.as_deref()).await?;

    // The replaced photo is removed only after the document points at the
    // new one; a cleanup failure leaves an orphaned file, never a record
    // with a dangling reference.
    if let (Some(new_path), Some(old_path)) = (&new_photo_path, &previous_photo) {
        if old_path != new_path {
            if let Err(e) = state.assets.delete(old_path).await {
                warn!("Failed to remove replaced photo {}: {}", old_path, e);
            }
        }
    }

    info!("Profile saved: {}", record.name);

    Ok(Json(SaveProfileResponse {
        success: true,
        message: "Profile saved successfully!".to_string(),
        record,
    }))
}

/// GET /profile/name/:name
///
/// Exact-match lookup; no partial or fuzzy search.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<FetchProfileResponse>> {
    let record = profiles::find_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile not found: {}", name)))?;

    Ok(Json(FetchProfileResponse {
        success: true,
        record,
    }))
}

/// GET /profiles
///
/// Full listing, possibly empty. No pagination: the domain is a single
/// small personal directory.
pub async fn list_profiles(
    State(state): State<AppState>,
) -> ApiResult<Json<ListProfilesResponse>> {
    let records = profiles::list_all(&state.db).await?;

    Ok(Json(ListProfilesResponse {
        success: true,
        records,
    }))
}

/// DELETE /profile/name/:name
///
/// Deleting an absent name is 404, not a silent success. The document
/// delete is authoritative; asset cleanup afterwards is best-effort, with
/// failures logged and swallowed.
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DeleteProfileResponse>> {
    let record = profiles::delete_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile not found: {}", name)))?;

    if let Some(photo_path) = &record.photo_path {
        if let Err(e) = state.assets.delete(photo_path).await {
            warn!("Failed to remove photo for deleted profile {}: {}", name, e);
        }
    }

    info!("Profile deleted: {}", name);

    Ok(Json(DeleteProfileResponse {
        success: true,
        message: "Profile deleted successfully!".to_string(),
    }))
}

/// Build profile directory routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", post(save_profile))
        .route("/profile/name/:name", get(get_profile).delete(delete_profile))
        .route("/profiles", get(list_profiles))
}
