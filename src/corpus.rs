use regex::Regex;
use std::{collections::HashSet, fs::OpenOptions, io::Read, path::Path, sync::OnceLock};

use crate::error::Result;

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[[:punct:]]").expect("static pattern"))
}

pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = OpenOptions::new().read(true).open(path.as_ref())?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    tracing::info!(path = %path.as_ref().display(), bytes = text.len(), "Read corpus");
    Ok(text)
}

/// Reads a whole text file and splits it on whitespace, keeping the tokens as
/// they appear.
pub fn read_words<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    Ok(split_words(&read_text(path)?))
}

pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Lowercases the text, strips punctuation and optionally drops English stop
/// words before splitting.
pub fn clean_words(text: &str, drop_stop_words: bool) -> Vec<String> {
    let lowered = text.to_lowercase();
    let clean = punctuation().replace_all(&lowered, "");

    let stop_words = if drop_stop_words {
        stop_words::get(stop_words::LANGUAGE::English)
    } else {
        Vec::new()
    };
    let sw: HashSet<&str> = HashSet::from_iter(stop_words.iter().map(|s| s.as_str()));

    clean
        .split_whitespace()
        .filter(|word| !sw.contains(word))
        .map(str::to_string)
        .collect()
}
