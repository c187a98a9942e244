//! The AI characters a student can talk to, each with its own system prompt.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::prompts::ZELIA_VOICE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// The in-game guide.
    Zelia,
    Conseiller,
    Recruteur,
    Etudiant,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Zelia,
        Persona::Conseiller,
        Persona::Recruteur,
        Persona::Etudiant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Persona::Zelia => "zelia",
            Persona::Conseiller => "conseiller",
            Persona::Recruteur => "recruteur",
            Persona::Etudiant => "etudiant",
        }
    }

    fn role(self) -> &'static str {
        match self {
            Persona::Zelia => "\
                Tu es Zélia, la guide du jeu d'orientation. Tu accompagnes l'élève niveau \
                après niveau, tu l'encourages et tu l'aides à réfléchir à ses envies, \
                ses points forts et ses prochaines étapes.",
            Persona::Conseiller => "\
                Tu es un conseiller d'orientation expérimenté. Tu expliques les filières \
                (bac général, technologique, professionnel, BTS, BUT, licence, écoles), \
                Parcoursup et les débouchés, en posant des questions pour affiner le projet.",
            Persona::Recruteur => "\
                Tu es un recruteur bienveillant. Tu fais passer un entretien d'embauche ou \
                de stage réaliste, une question à la fois, puis tu donnes un retour honnête \
                et des conseils pour progresser.",
            Persona::Etudiant => "\
                Tu es un étudiant de quelques années plus âgé qui partage son vécu : \
                choix d'études, vie étudiante, stages, doutes. Tu parles simplement, \
                comme à un ami plus jeune.",
        }
    }

    /// Full system instruction sent with every turn.
    pub fn system_prompt(self) -> String {
        format!(
            "{}\n\n{ZELIA_VOICE}\nRéponds en quelques paragraphes courts au maximum.",
            self.role()
        )
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Persona::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Persona::ALL.iter().map(|p| p.as_str()).collect();
                AppError::Validation(format!(
                    "unknown persona '{}', expected one of: {}",
                    s.trim(),
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_personas() {
        assert_eq!("zelia".parse::<Persona>().unwrap(), Persona::Zelia);
        assert_eq!(" Recruteur ".parse::<Persona>().unwrap(), Persona::Recruteur);
    }

    #[test]
    fn test_unknown_persona_lists_choices() {
        let err = "pirate".parse::<Persona>().unwrap_err();
        assert!(err.to_string().contains("conseiller"));
    }

    #[test]
    fn test_prompts_are_distinct() {
        let prompts: Vec<String> = Persona::ALL.iter().map(|p| p.system_prompt()).collect();
        for (i, a) in prompts.iter().enumerate() {
            assert!(a.contains(ZELIA_VOICE));
            for b in &prompts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
