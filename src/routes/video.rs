use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::helpers;
use crate::helpers::pagination::{PageParams, PageRequest};
use crate::middleware::auth::Principal;
use crate::models::{ApiResponse, MetaItemPayload, NewVideo};
use crate::AppState;

const MISSING_FIELDS: &str = "Title and videoUrl are required";

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoInfo {
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(required, length(min = 1))]
    pub video_url: Option<String>,
    pub meta_items: Option<Vec<MetaItemPayload>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreateVideoInfo {
    /// Validates the body and splits it into the rows to insert. Nothing is
    /// written unless this succeeds.
    pub fn into_parts(self, user_id: i32) -> Result<(NewVideo, Vec<MetaItemPayload>)> {
        let info = CreateVideoInfo {
            title: non_blank(self.title),
            video_url: non_blank(self.video_url),
            ..self
        };

        info.validate()
            .map_err(|_| AppError::Validation(MISSING_FIELDS.into()))?;

        let meta_items = info.meta_items.unwrap_or_default();
        if let Some(index) = meta_items.iter().position(MetaItemPayload::is_empty) {
            return Err(AppError::Validation(format!(
                "Meta item {} has no recognised fields",
                index
            )));
        }

        match (info.title, info.video_url) {
            (Some(title), Some(video_url)) => Ok((
                NewVideo {
                    title,
                    description: info.description,
                    video_url,
                    user_id,
                },
                meta_items,
            )),
            _ => Err(AppError::Validation(MISSING_FIELDS.into())),
        }
    }
}

#[post("")]
pub async fn create_video(
    principal: Principal,
    data: web::Json<CreateVideoInfo>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (video, meta_items) = data.into_inner().into_parts(principal.user_id).map_err(|e| {
        tracing::warn!(user_id = principal.user_id, "Rejected video: {}", e);
        e
    })?;

    let store = state.store.clone();
    let created = web::block(move || helpers::videos::create_video(store.as_ref(), video, meta_items)).await??;

    Ok(HttpResponse::Created().json(ApiResponse::ok(created)))
}

#[get("")]
pub async fn get_videos(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    // Junk query strings fall back to the defaults rather than failing.
    let params = web::Query::<PageParams>::from_query(req.query_string())
        .map(|q| q.into_inner())
        .unwrap_or_default();
    let request = PageRequest::from_params(&params);

    let store = state.store.clone();
    let (videos, pagination) =
        web::block(move || helpers::videos::list_videos(store.as_ref(), request)).await??;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(videos, pagination)))
}
