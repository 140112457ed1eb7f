use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::helpers;
use crate::middleware::auth::Principal;
use crate::models::{ApiResponse, InteractionKind};
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct RecordInteractionInfo {
    #[serde(rename = "type")]
    pub interaction_type: String,
    #[validate(length(max = 2000))]
    pub content: Option<String>,
}

impl RecordInteractionInfo {
    pub fn parse(self) -> Result<(InteractionKind, Option<String>)> {
        self.validate()
            .map_err(|e| AppError::Validation(format!("Invalid interaction: {}", e)))?;

        let kind: InteractionKind = self.interaction_type.parse().map_err(AppError::Validation)?;
        let content = self.content.filter(|c| !c.trim().is_empty());

        match kind {
            InteractionKind::Comment if content.is_none() => {
                Err(AppError::Validation("Comments need content".into()))
            }
            InteractionKind::Comment => Ok((kind, content)),
            // only comments carry text
            _ => Ok((kind, None)),
        }
    }
}

#[post("/{video_id}/interactions")]
pub async fn record_interaction(
    principal: Principal,
    video_id: web::Path<i32>,
    data: web::Json<RecordInteractionInfo>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (kind, content) = data.into_inner().parse()?;
    let video_id = video_id.into_inner();

    let store = state.store.clone();
    let interaction = web::block(move || {
        helpers::videos::record_interaction(store.as_ref(), principal.user_id, video_id, kind, content)
    })
    .await??;

    Ok(HttpResponse::Created().json(ApiResponse::ok(interaction)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: &str, content: Option<&str>) -> RecordInteractionInfo {
        RecordInteractionInfo {
            interaction_type: kind.into(),
            content: content.map(String::from),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(info("share", None).parse(), Err(AppError::Validation(_))));
    }

    #[test]
    fn comment_needs_content() {
        assert!(info("comment", Some("  ")).parse().is_err());
        assert_eq!(
            info("comment", Some("nice")).parse().unwrap(),
            (InteractionKind::Comment, Some("nice".to_string()))
        );
    }

    #[test]
    fn likes_drop_content() {
        assert_eq!(info("like", Some("x")).parse().unwrap(), (InteractionKind::Like, None));
    }
}
