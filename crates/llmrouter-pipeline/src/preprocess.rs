//! Compression, extractive summarisation, and truncation, applied in that
//! order and only when the prompt is estimated to exceed the configured
//! token threshold.

const CHARS_PER_TOKEN: usize = 4;

/// Rough token estimate used to decide whether preprocessing runs at all
/// and where truncation has to cut.
pub fn estimate_tokens(text: &str) -> usize {
    ((text.len() + CHARS_PER_TOKEN - 1) / CHARS_PER_TOKEN).max(1)
}

/// Runs the full preprocessing chain if `prompt` is estimated to exceed
/// `threshold_tokens`. Returns the (possibly unchanged) prompt and, when
/// preprocessing ran, the ratio of the new size to the original size.
pub fn preprocess(prompt: &str, threshold_tokens: usize) -> (String, Option<f64>) {
    if estimate_tokens(prompt) <= threshold_tokens {
        return (prompt.to_string(), None);
    }

    let original_len = prompt.len().max(1);
    let compressed = compress(prompt);
    let summarised = summarize(&compressed, threshold_tokens);
    let truncated = truncate(&summarised, threshold_tokens);

    let ratio = truncated.len() as f64 / original_len as f64;
    (truncated, Some(ratio))
}

/// Collapses redundant whitespace and duplicate blank lines.
fn compress(prompt: &str) -> String {
    prompt
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keeps the highest-scoring sentences by word frequency, in their
/// original order, until the running token estimate would exceed the
/// threshold. Falls back to returning the input unchanged if it only has
/// one sentence.
fn summarize(text: &str, threshold_tokens: usize) -> String {
    let sentences: Vec<&str> = text
        .split_terminator(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() <= 1 {
        return text.to_string();
    }

    let frequencies = word_frequencies(text);
    let mut scored: Vec<(usize, &str, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| (index, *sentence, score_sentence(sentence, &frequencies)))
        .collect();
    scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<(usize, &str)> = Vec::new();
    let mut running_tokens = 0;
    for (index, sentence, _) in scored {
        let sentence_tokens = estimate_tokens(sentence);
        if running_tokens + sentence_tokens > threshold_tokens && !kept.is_empty() {
            continue;
        }
        running_tokens += sentence_tokens;
        kept.push((index, sentence));
    }

    kept.sort_by_key(|(index, _)| *index);
    kept.into_iter()
        .map(|(_, sentence)| sentence)
        .collect::<Vec<_>>()
        .join(". ")
}

fn word_frequencies(text: &str) -> std::collections::HashMap<String, usize> {
    let mut frequencies = std::collections::HashMap::new();
    for word in text.split_whitespace() {
        let normalised: String = word.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
        if normalised.is_empty() {
            continue;
        }
        *frequencies.entry(normalised).or_insert(0) += 1;
    }
    frequencies
}

fn score_sentence(sentence: &str, frequencies: &std::collections::HashMap<String, usize>) -> f64 {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let total: usize = words
        .iter()
        .map(|w| {
            let normalised: String = w.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
            frequencies.get(&normalised).copied().unwrap_or(0)
        })
        .sum();
    total as f64 / words.len() as f64
}

/// Hard cut to the character budget implied by `threshold_tokens`, the
/// last resort when summarisation alone doesn't fit.
fn truncate(text: &str, threshold_tokens: usize) -> String {
    let char_budget = threshold_tokens * CHARS_PER_TOKEN;
    if text.len() <= char_budget {
        return text.to_string();
    }
    let mut cut = char_budget;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text[..cut].to_string()
}
