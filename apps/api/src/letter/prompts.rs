// Prompts for cover-letter generation.

use std::str::FromStr;

use crate::errors::AppError;
use crate::llm_client::prompts::ZELIA_VOICE;
use crate::models::profile::ProfileRow;
use crate::models::results::UserResultRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Formel,
    Dynamique,
    Creatif,
}

impl Tone {
    fn guidance(self) -> &'static str {
        match self {
            Tone::Formel => "Ton formel et soigné, formules de politesse classiques.",
            Tone::Dynamique => "Ton dynamique et enthousiaste, phrases courtes et percutantes.",
            Tone::Creatif => "Ton créatif et personnel, avec une accroche originale, sans excès.",
        }
    }
}

impl FromStr for Tone {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formel" => Ok(Tone::Formel),
            "dynamique" => Ok(Tone::Dynamique),
            "creatif" | "créatif" => Ok(Tone::Creatif),
            other => Err(AppError::Validation(format!(
                "unknown tone '{other}', expected formel, dynamique or creatif"
            ))),
        }
    }
}

pub fn letter_system() -> String {
    format!(
        "Tu es un expert en rédaction de lettres de motivation pour des lycéens et \
         des étudiants. {ZELIA_VOICE}\n\
         Rédige uniquement la lettre, prête à être copiée, sans commentaire autour. \
         N'invente ni diplôme ni expérience que le candidat n'a pas."
    )
}

pub struct LetterInput<'a> {
    pub job_title: &'a str,
    pub company: &'a str,
    pub job_offer: Option<&'a str>,
    pub tone: Tone,
    pub profile: Option<&'a ProfileRow>,
    pub results: &'a [UserResultRow],
}

pub fn build_letter_prompt(input: &LetterInput<'_>) -> String {
    let mut prompt = format!(
        "Écris une lettre de motivation pour le poste « {} » chez {}.\n{}\n",
        input.job_title,
        input.company,
        input.tone.guidance()
    );

    if let Some(profile) = input.profile {
        prompt.push_str("\nCandidat :\n");
        if let Some(name) = profile.display_name() {
            prompt.push_str(&format!("- Nom : {name}\n"));
        }
        if let Some(school) = profile.school.as_deref() {
            prompt.push_str(&format!("- Établissement : {school}\n"));
        }
        if let Some(class_level) = profile.class_level.as_deref() {
            prompt.push_str(&format!("- Niveau : {class_level}\n"));
        }
    }

    for result in input.results {
        prompt.push_str(&format!("\nBilan d'orientation ({}) :\n", result.questionnaire_type));
        if !result.personality_type.is_empty() {
            prompt.push_str(&format!("- Personnalité : {}\n", result.personality_type));
        }
        if !result.skills_assessment.is_empty() {
            prompt.push_str(&format!("- Compétences : {}\n", result.skills_assessment));
        }
    }

    if let Some(offer) = input.job_offer {
        prompt.push_str(&format!("\nOffre :\n{offer}\n"));
    }
    prompt
}
