//! Axum route handlers for `/api/share`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mail::OutgoingEmail;
use crate::models::profile::find_profile;
use crate::models::results::find_result;
use crate::share::cloudinary::validate_data_url;
use crate::state::AppState;
use crate::validation::{validate_email, validate_slug};

const SHARE_FOLDER: &str = "zelia/results";

#[derive(Debug, Deserialize)]
pub struct ShareResultsRequest {
    pub questionnaire_type: String,
    /// `data:image/png;base64,...` rendered by the client.
    pub image: String,
    pub recipient_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShareResultsResponse {
    pub url: String,
    pub emailed: bool,
}

fn share_email(to: String, sender: &str, url: &str) -> OutgoingEmail {
    OutgoingEmail {
        to,
        reply_to: None,
        subject: format!("{sender} partage ses résultats Zélia avec toi"),
        body: format!(
            "Bonjour,\n\n{sender} a terminé son parcours d'orientation sur Zélia \
            et souhaite te montrer ses résultats :\n\n{url}\n\nÀ bientôt sur Zélia !"
        ),
    }
}

/// POST /api/share/results
pub async fn handle_share_results(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ShareResultsRequest>,
) -> Result<Json<ShareResultsResponse>, AppError> {
    let questionnaire_type = validate_slug("questionnaire_type", &req.questionnaire_type)?;
    validate_data_url(&req.image)?;
    let recipient = req
        .recipient_email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(validate_email)
        .transpose()?;

    if find_result(&state.db, user.id, &questionnaire_type).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "No {questionnaire_type} result to share"
        )));
    }

    let public_id = format!("{}_{questionnaire_type}", user.id);
    let uploaded = state
        .cloudinary
        .upload_image(&req.image, SHARE_FOLDER, &public_id)
        .await?;

    sqlx::query(
        "UPDATE user_results SET share_image_url = $1, updated_at = NOW() \
         WHERE user_id = $2 AND questionnaire_type = $3",
    )
    .bind(&uploaded.secure_url)
    .bind(user.id)
    .bind(&questionnaire_type)
    .execute(&state.db)
    .await?;

    let emailed = match recipient {
        Some(to) => {
            let sender = find_profile(&state.db, user.id)
                .await?
                .and_then(|p| p.display_name())
                .unwrap_or_else(|| "Un ami".to_string());
            state
                .mailer
                .send(share_email(to, &sender, &uploaded.secure_url))
                .await?;
            true
        }
        None => false,
    };

    info!("Shared {questionnaire_type} results of {} (emailed: {emailed})", user.id);
    Ok(Json(ShareResultsResponse {
        url: uploaded.secure_url,
        emailed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_email_mentions_sender_and_link() {
        let email = share_email(
            "ami@example.fr".to_string(),
            "Léa Martin",
            "https://res.cloudinary.com/x.png",
        );
        assert!(email.subject.contains("Léa Martin"));
        assert!(email.body.contains("https://res.cloudinary.com/x.png"));
        assert_eq!(email.to, "ami@example.fr");
    }
}
