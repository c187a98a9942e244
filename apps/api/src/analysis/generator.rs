//! Analysis pipeline: responses → prompt → Gemini → section parsing → upsert.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::fallback::simple_analysis;
use crate::analysis::parser::{find_section, parse_numbered_items, parse_sections, section_text, NumberedItem};
use crate::analysis::prompts::{
    analysis_system, build_analysis_prompt, HEADING_ADVICE, HEADING_JOBS,
    HEADING_PERSONALITY_ANALYSIS, HEADING_PERSONALITY_TYPE, HEADING_SKILLS, HEADING_STUDIES,
};
use crate::errors::AppError;
use crate::llm_client::prompts::format_responses;
use crate::llm_client::TextGenerator;
use crate::models::questionnaire::{responses_for_type, UserResponseRow};
use crate::models::results::UserResultRow;

/// Structured fields extracted from an analysis text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAnalysis {
    pub personality_type: String,
    pub personality_analysis: String,
    pub skills_assessment: String,
    pub recommended_jobs: Vec<NumberedItem>,
    pub recommended_studies: Vec<NumberedItem>,
    pub advice: String,
}

impl ParsedAnalysis {
    /// Maps the fixed headings onto fields; absent headings stay empty.
    pub fn from_text(text: &str) -> Self {
        let sections = parse_sections(text);
        let items = |heading: &str| {
            find_section(&sections, heading)
                .map(parse_numbered_items)
                .unwrap_or_default()
        };

        Self {
            personality_type: section_text(&sections, HEADING_PERSONALITY_TYPE),
            personality_analysis: section_text(&sections, HEADING_PERSONALITY_ANALYSIS),
            skills_assessment: section_text(&sections, HEADING_SKILLS),
            recommended_jobs: items(HEADING_JOBS),
            recommended_studies: items(HEADING_STUDIES),
            advice: section_text(&sections, HEADING_ADVICE),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Ai,
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct AnalysisOutcome {
    pub source: AnalysisSource,
    pub analysis: ParsedAnalysis,
    /// Stored row; `None` for a fallback analysis, which is never persisted.
    pub result: Option<UserResultRow>,
}

pub async fn generate_analysis(
    pool: &PgPool,
    llm: &dyn TextGenerator,
    user_id: Uuid,
    questionnaire_type: &str,
) -> Result<AnalysisOutcome, AppError> {
    let responses = responses_for_type(pool, user_id, questionnaire_type).await?;
    if responses.is_empty() {
        return Err(AppError::NotFound(format!(
            "No responses for questionnaire '{questionnaire_type}'"
        )));
    }

    let prompt = build_analysis_prompt(questionnaire_type, &render_responses(&responses));

    let text = match llm.generate(&prompt, &analysis_system()).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Analysis generation failed for {user_id}, serving fallback: {e}");
            return Ok(AnalysisOutcome {
                source: AnalysisSource::Fallback,
                analysis: simple_analysis(responses.iter().map(|r| r.response.as_str())),
                result: None,
            });
        }
    };

    let analysis = ParsedAnalysis::from_text(&text);
    if analysis.is_empty() {
        warn!("Analysis for {user_id} contained no recognised section");
    }

    let row = upsert_result(pool, user_id, questionnaire_type, &analysis, &text).await?;
    info!("Stored {questionnaire_type} analysis for {user_id}");

    Ok(AnalysisOutcome {
        source: AnalysisSource::Ai,
        analysis,
        result: Some(row),
    })
}

fn render_responses(responses: &[UserResponseRow]) -> String {
    format_responses(
        responses
            .iter()
            .map(|r| (r.question_id.as_str(), r.response.as_str())),
    )
}

async fn upsert_result(
    pool: &PgPool,
    user_id: Uuid,
    questionnaire_type: &str,
    analysis: &ParsedAnalysis,
    raw: &str,
) -> Result<UserResultRow, sqlx::Error> {
    sqlx::query_as::<_, UserResultRow>(
        r#"
        INSERT INTO user_results
            (user_id, questionnaire_type, personality_type, personality_analysis,
             skills_assessment, recommended_jobs, recommended_studies, advice, raw_analysis)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id, questionnaire_type) DO UPDATE SET
            personality_type = EXCLUDED.personality_type,
            personality_analysis = EXCLUDED.personality_analysis,
            skills_assessment = EXCLUDED.skills_assessment,
            recommended_jobs = EXCLUDED.recommended_jobs,
            recommended_studies = EXCLUDED.recommended_studies,
            advice = EXCLUDED.advice,
            raw_analysis = EXCLUDED.raw_analysis,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(questionnaire_type)
    .bind(&analysis.personality_type)
    .bind(&analysis.personality_analysis)
    .bind(&analysis.skills_assessment)
    .bind(Json(&analysis.recommended_jobs))
    .bind(Json(&analysis.recommended_studies))
    .bind(&analysis.advice)
    .bind(raw)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const AI_OUTPUT: &str = "\
###Type de personnalité###
**ENFJ** - Le protagoniste

###Analyse de personnalité###
Tu aimes fédérer.

###Compétences###
Communication, empathie.

###Métiers recommandés###
1. Professeur des écoles
- Transmettre
2. Psychologue
- Écouter

###Études recommandées###
1. Licence de psychologie
- 3 ans

###Conseils###
Fais un stage d'observation.";

    #[test]
    fn test_from_text_maps_all_fields() {
        let analysis = ParsedAnalysis::from_text(AI_OUTPUT);
        assert_eq!(analysis.personality_type, "ENFJ - Le protagoniste");
        assert_eq!(analysis.personality_analysis, "Tu aimes fédérer.");
        assert_eq!(analysis.skills_assessment, "Communication, empathie.");
        assert_eq!(analysis.recommended_jobs.len(), 2);
        assert_eq!(analysis.recommended_jobs[1].title, "Psychologue");
        assert_eq!(analysis.recommended_studies[0].points, vec!["3 ans".to_string()]);
        assert_eq!(analysis.advice, "Fais un stage d'observation.");
    }

    #[test]
    fn test_from_text_with_missing_heading() {
        let text = AI_OUTPUT.replace("###Compétences###", "Compétences :");
        let analysis = ParsedAnalysis::from_text(&text);
        assert_eq!(analysis.skills_assessment, "");
        // The orphaned text now belongs to the previous section.
        assert!(analysis.personality_analysis.contains("Communication"));
        assert_eq!(analysis.recommended_jobs.len(), 2);
    }

    #[test]
    fn test_from_unstructured_text_is_empty() {
        assert!(ParsedAnalysis::from_text("Désolé, je ne peux pas répondre.").is_empty());
    }
}
