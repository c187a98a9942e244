// Prompt constants for personality/career analysis.

use crate::llm_client::prompts::{SECTION_FORMAT_INSTRUCTION, ZELIA_VOICE};

pub const HEADING_PERSONALITY_TYPE: &str = "Type de personnalité";
pub const HEADING_PERSONALITY_ANALYSIS: &str = "Analyse de personnalité";
pub const HEADING_SKILLS: &str = "Compétences";
pub const HEADING_JOBS: &str = "Métiers recommandés";
pub const HEADING_STUDIES: &str = "Études recommandées";
pub const HEADING_ADVICE: &str = "Conseils";

/// System prompt for the analysis call.
pub fn analysis_system() -> String {
    format!(
        "Tu es Zélia, conseillère d'orientation experte en psychologie (MBTI, RIASEC). \
        {ZELIA_VOICE} {SECTION_FORMAT_INSTRUCTION}"
    )
}

/// Analysis prompt template. Replace `{questionnaire_type}` and `{responses}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "\
Voici les réponses d'un utilisateur au questionnaire « {questionnaire_type} » :

{responses}

Rédige son analyse d'orientation en respectant EXACTEMENT ce format :

###Type de personnalité###
Le type en quatre lettres (ex. INFP) suivi d'un surnom court.

###Analyse de personnalité###
Deux ou trois paragraphes sur sa façon de penser, d'agir et de travailler.

###Compétences###
Ses forces et ses axes de progression, en quelques phrases.

###Métiers recommandés###
1. Nom du métier
- Pourquoi il lui correspond
- Une mission typique
(cinq métiers, numérotés de 1 à 5)

###Études recommandées###
1. Nom de la formation
- Durée et niveau
- Un exemple d'établissement
(trois formations, numérotées de 1 à 3)

###Conseils###
Trois conseils concrets pour avancer cette année.";

pub fn build_analysis_prompt(questionnaire_type: &str, responses: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{questionnaire_type}", questionnaire_type)
        .replace("{responses}", responses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lists_every_heading() {
        for heading in [
            HEADING_PERSONALITY_TYPE,
            HEADING_PERSONALITY_ANALYSIS,
            HEADING_SKILLS,
            HEADING_JOBS,
            HEADING_STUDIES,
            HEADING_ADVICE,
        ] {
            assert!(
                ANALYSIS_PROMPT_TEMPLATE.contains(&format!("###{heading}###")),
                "missing {heading}"
            );
        }
    }

    #[test]
    fn test_build_prompt_fills_placeholders() {
        let prompt = build_analysis_prompt("mbti", "- q1 : E");
        assert!(prompt.contains("« mbti »"));
        assert!(prompt.contains("- q1 : E"));
        assert!(!prompt.contains("{responses}"));
    }
}
