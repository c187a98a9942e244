//! Hand-written analysis returned when the model is unavailable.

use crate::analysis::generator::ParsedAnalysis;
use crate::analysis::parser::NumberedItem;

const AXES: [(char, char); 4] = [('E', 'I'), ('S', 'N'), ('T', 'F'), ('J', 'P')];

/// Majority vote per MBTI axis over single-letter answers. Returns `None`
/// when no answer is an MBTI letter. Ties pick the first letter of the pair.
pub fn mbti_type<'a>(answers: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut counts = [[0usize; 2]; 4];
    let mut seen = false;

    for answer in answers {
        let answer = answer.trim();
        let mut chars = answer.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            continue;
        };
        let letter = letter.to_ascii_uppercase();
        for (axis, (first, second)) in AXES.iter().enumerate() {
            if letter == *first {
                counts[axis][0] += 1;
                seen = true;
            } else if letter == *second {
                counts[axis][1] += 1;
                seen = true;
            }
        }
    }

    seen.then(|| {
        AXES.iter()
            .zip(counts.iter())
            .map(|((first, second), [a, b])| if a >= b { *first } else { *second })
            .collect()
    })
}

fn item(title: &str, points: &[&str]) -> NumberedItem {
    NumberedItem {
        title: title.to_string(),
        points: points.iter().map(|p| p.to_string()).collect(),
    }
}

/// Builds a generic analysis from the raw answers.
pub fn simple_analysis<'a>(answers: impl IntoIterator<Item = &'a str>) -> ParsedAnalysis {
    let answers: Vec<&str> = answers.into_iter().collect();
    let personality_type = mbti_type(answers.iter().copied()).unwrap_or_default();

    let (jobs, studies) = if personality_type.starts_with('E') {
        (
            vec![
                item("Chargé de communication", &["Travail au contact des autres"]),
                item("Commercial", &["Relation client et négociation"]),
                item("Animateur socioculturel", &["Encadrement de groupes"]),
            ],
            vec![
                item("BUT Information-Communication", &["3 ans, niveau licence"]),
                item("BTS Négociation et digitalisation de la relation client", &["2 ans"]),
            ],
        )
    } else {
        (
            vec![
                item("Développeur informatique", &["Résolution de problèmes en autonomie"]),
                item("Graphiste", &["Création et sens du détail"]),
                item("Technicien de laboratoire", &["Rigueur et méthode"]),
            ],
            vec![
                item("BUT Informatique", &["3 ans, niveau licence"]),
                item("DN MADE", &["3 ans, design et métiers d'art"]),
            ],
        )
    };

    ParsedAnalysis {
        personality_analysis: format!(
            "Ton analyse détaillée n'est pas disponible pour le moment. \
            D'après tes {} réponses, voici une première piste que tu pourras affiner plus tard.",
            answers.len()
        ),
        personality_type,
        skills_assessment: "Curiosité, envie d'apprendre et capacité à te poser les bonnes questions."
            .to_string(),
        recommended_jobs: jobs,
        recommended_studies: studies,
        advice: "Va aux journées portes ouvertes, discute avec des professionnels et \
            reviens plus tard pour obtenir ton analyse complète."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mbti_majority_per_axis() {
        let answers = ["E", "I", "E", "N", "N", "S", "f", "T", "F", "P"];
        assert_eq!(mbti_type(answers).as_deref(), Some("ENFP"));
    }

    #[test]
    fn test_mbti_ties_pick_first_letter() {
        assert_eq!(mbti_type(["I", "E"]).as_deref(), Some("ESTJ"));
    }

    #[test]
    fn test_mbti_ignores_free_text() {
        assert_eq!(mbti_type(["J'aime le dessin", "Oui", ""]), None);
    }

    #[test]
    fn test_simple_analysis_is_fully_populated() {
        let analysis = simple_analysis(["I", "N", "F", "P"]);
        assert_eq!(analysis.personality_type, "INFP");
        assert!(analysis.personality_analysis.contains("4 réponses"));
        assert!(!analysis.recommended_jobs.is_empty());
        assert!(!analysis.recommended_studies.is_empty());
        assert!(!analysis.advice.is_empty());
    }

    #[test]
    fn test_simple_analysis_without_mbti_answers() {
        let analysis = simple_analysis(["Lycée Victor Hugo"]);
        assert_eq!(analysis.personality_type, "");
        assert_eq!(analysis.recommended_jobs[0].title, "Développeur informatique");
    }
}
