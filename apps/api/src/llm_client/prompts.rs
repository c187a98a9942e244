// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs next to it; this file only holds cross-cutting pieces.

/// Voice shared by every Zélia persona and generator.
pub const ZELIA_VOICE: &str = "\
    Tu t'adresses à un lycéen ou à un étudiant français qui cherche son orientation. \
    Réponds en français, avec bienveillance, en tutoyant, sans jargon. \
    Reste concret : cite des métiers, des formations et des démarches réelles en France.";

/// Reminds the model to keep the `###Heading###` markers intact.
pub const SECTION_FORMAT_INSTRUCTION: &str = "\
    IMPORTANT : respecte EXACTEMENT les marqueurs de section de la forme ###Titre###, \
    un par ligne, sans les traduire ni les modifier, et dans l'ordre demandé. \
    N'ajoute aucun texte avant le premier marqueur.";

/// Renders `(question_id, response)` pairs as a bullet list for prompts.
pub fn format_responses<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(question, answer)| format!("- {question} : {}", answer.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_responses() {
        let text = format_responses([("q1", " oui "), ("q2", "non")]);
        assert_eq!(text, "- q1 : oui\n- q2 : non");
    }
}
