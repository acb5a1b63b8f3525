//! Deterministic local rewriter used when the text-generation service
//! cannot produce a usable refinement.

/// Appended when cleaning alone would leave the text unchanged.
pub const SPECIFICITY_NUDGE: &str = "Next, name who this is for and what the first concrete result looks like.";

/// Multi-word vague phrases, matched before single words.
const VAGUE_PHRASES: &[(&[&str], &str)] = &[(&["a", "lot", "of"], "many"), (&["lots", "of"], "many")];

const VAGUE_WORDS: &[(&str, &str)] = &[
    ("thing", "element"),
    ("things", "elements"),
    ("stuff", "materials"),
    ("good", "effective"),
    ("bad", "ineffective"),
    ("nice", "valuable"),
    ("some", "specific"),
];

/// Rewrite `text` without any external call.
///
/// Collapses whitespace, swaps vague terms for more specific ones,
/// capitalizes the first letter and ensures terminal punctuation. Blank
/// input comes back as is; any other input yields a non-empty string that
/// differs from it.
pub fn local_rewrite(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut out = replace_vague(&tokens).join(" ");
    capitalize_first(&mut out);
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }

    if out == text {
        out.push(' ');
        out.push_str(SPECIFICITY_NUDGE);
    }
    out
}

fn replace_vague(tokens: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    'tokens: while i < tokens.len() {
        for (phrase, replacement) in VAGUE_PHRASES {
            if let Some(rewritten) = match_phrase(&tokens[i..], phrase, replacement) {
                out.push(rewritten);
                i += phrase.len();
                continue 'tokens;
            }
        }

        let (lead, core, trail) = split_token(tokens[i]);
        let lower = core.to_lowercase();
        match VAGUE_WORDS.iter().find(|(word, _)| *word == lower) {
            Some((_, replacement)) => out.push(format!("{lead}{}{trail}", cased_like(core, replacement))),
            None => out.push(tokens[i].to_string()),
        }
        i += 1;
    }

    out
}

/// Match `phrase` at the start of `tokens`. Only the first token may carry
/// leading punctuation and only the last may carry trailing punctuation.
fn match_phrase(tokens: &[&str], phrase: &[&str], replacement: &str) -> Option<String> {
    if tokens.len() < phrase.len() {
        return None;
    }
    let last = phrase.len() - 1;
    let mut lead = "";
    let mut trail = "";
    let mut first_core = "";

    for (k, word) in phrase.iter().enumerate() {
        let (l, core, t) = split_token(tokens[k]);
        if !core.eq_ignore_ascii_case(word) || (k > 0 && !l.is_empty()) || (k < last && !t.is_empty()) {
            return None;
        }
        if k == 0 {
            lead = l;
            first_core = core;
        }
        if k == last {
            trail = t;
        }
    }

    Some(format!("{lead}{}{trail}", cased_like(first_core, replacement)))
}

/// Split a token into leading punctuation, word core, trailing punctuation.
fn split_token(token: &str) -> (&str, &str, &str) {
    let start = token.find(|c: char| c.is_alphanumeric()).unwrap_or(token.len());
    let end = token
        .rfind(|c: char| c.is_alphanumeric())
        .map_or(start, |i| i + token[i..].chars().next().map_or(1, char::len_utf8));
    (&token[..start], &token[start..end], &token[end..])
}

fn cased_like(original: &str, replacement: &str) -> String {
    let mut out = replacement.to_string();
    if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize_first(&mut out);
    }
    out
}

fn capitalize_first(s: &mut String) {
    if let Some(first) = s.chars().next() {
        if first.is_lowercase() {
            let upper: String = first.to_uppercase().collect();
            s.replace_range(..first.len_utf8(), &upper);
        }
    }
}
