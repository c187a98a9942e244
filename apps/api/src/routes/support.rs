//! Bug reports, relayed to the support mailbox.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mail::OutgoingEmail;
use crate::state::AppState;
use crate::validation::{optional_text, require_text, validate_email};

const MAX_SUBJECT_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct BugReportRequest {
    pub subject: String,
    pub description: String,
    pub page: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BugReportResponse {
    pub sent: bool,
}

/// Builds the message sent to `support_email`. Replies go to the reporter
/// when an address is known.
fn bug_report_email(
    support_email: &str,
    subject: &str,
    description: &str,
    page: Option<&str>,
    contact: Option<&str>,
    user: Option<&AuthUser>,
) -> OutgoingEmail {
    let mut body = format!("{description}\n\n---\n");
    body.push_str(&format!("Page : {}\n", page.unwrap_or("non précisée")));
    match user {
        Some(u) => body.push_str(&format!("Utilisateur : {}\n", u.id)),
        None => body.push_str("Utilisateur : anonyme\n"),
    }
    if let Some(contact) = contact {
        body.push_str(&format!("Contact : {contact}\n"));
    }

    OutgoingEmail {
        to: support_email.to_string(),
        reply_to: contact.map(str::to_string),
        subject: format!("[Bug] {subject}"),
        body,
    }
}

/// POST /api/support/bug
pub async fn handle_bug_report(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Json(req): Json<BugReportRequest>,
) -> Result<(StatusCode, Json<BugReportResponse>), AppError> {
    let subject = require_text("subject", &req.subject, MAX_SUBJECT_CHARS)?;
    let description = require_text("description", &req.description, MAX_DESCRIPTION_CHARS)?;
    let page = optional_text(req.page.as_deref());
    let contact = match optional_text(req.email.as_deref()) {
        Some(email) => Some(validate_email(&email)?),
        None => user.as_ref().and_then(|u| u.email.clone()),
    };

    let email = bug_report_email(
        &state.config.support_email,
        &subject,
        &description,
        page.as_deref(),
        contact.as_deref(),
        user.as_ref(),
    );
    state.mailer.send(email).await?;

    info!("Bug report relayed: {subject}");
    Ok((StatusCode::ACCEPTED, Json(BugReportResponse { sent: true })))
}
