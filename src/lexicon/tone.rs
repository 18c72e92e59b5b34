use serde::{Deserialize, Serialize};

/// Lexical tone of a Toaq word, as marked on its first vowel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    T1,
    T2,
    T3,
    T4,
}

// base vowel, then its T2 (acute), T3 (diaeresis), T4 (circumflex) and
// underdot forms
const VOWELS: [(char, [char; 4]); 5] = [
    ('a', ['á', 'ä', 'â', 'ạ']),
    ('e', ['é', 'ë', 'ê', 'ẹ']),
    ('ı', ['í', 'ï', 'î', 'ị']),
    ('o', ['ó', 'ö', 'ô', 'ọ']),
    ('u', ['ú', 'ü', 'û', 'ụ']),
];

const COMBINING_ACUTE: char = '\u{0301}';
const COMBINING_DIAERESIS: char = '\u{0308}';
const COMBINING_CIRCUMFLEX: char = '\u{0302}';

/// Split a precomposed vowel into its base and the tone it carries.
fn decompose(c: char) -> Option<(char, Tone)> {
    if c == 'i' {
        return Some(('ı', Tone::T1));
    }
    VOWELS.iter().find_map(|(base, marked)| {
        if c == *base {
            return Some((*base, Tone::T1));
        }
        match marked.iter().position(|m| *m == c)? {
            0 => Some((*base, Tone::T2)),
            1 => Some((*base, Tone::T3)),
            2 => Some((*base, Tone::T4)),
            // the underdot marks a prefix, not a tone
            _ => Some((*base, Tone::T1)),
        }
    })
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase a word and normalize its spelling variants (`i` → `ı`, `v`/`w`/`y` → `ꝡ`).
pub fn clean(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut chars = lower.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            'v' | 'w' => {
                if chars.peek() == Some(&'y') {
                    chars.next();
                }
                out.push('ꝡ');
            }
            'y' => out.push('ꝡ'),
            'i' => out.push('ı'),
            '‘' | '’' => out.push('\''),
            c => out.push(c),
        }
    }
    out
}

/// Clean a word and strip every tone mark, e.g. `Vyé` → `ꝡe`.
pub fn bare(word: &str) -> String {
    clean(word)
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| decompose(c).map(|(base, _)| base).unwrap_or(c))
        .collect()
}

/// Detect the tone of a word from the first tone mark it carries.
pub fn tone_of(word: &str) -> Tone {
    for c in word.to_lowercase().chars() {
        match c {
            COMBINING_ACUTE => return Tone::T2,
            COMBINING_DIAERESIS => return Tone::T3,
            COMBINING_CIRCUMFLEX => return Tone::T4,
            c => {
                if let Some((_, tone)) = decompose(c) {
                    if tone != Tone::T1 {
                        return tone;
                    }
                }
            }
        }
    }
    Tone::T1
}

/// Rewrite a word so that it carries the given tone, e.g. `in_tone("suao", T2)` is `súao`.
pub fn in_tone(word: &str, tone: Tone) -> String {
    let mut placed = false;
    bare(word)
        .chars()
        .map(|c| {
            if placed || tone == Tone::T1 {
                return c;
            }
            match VOWELS.iter().find(|(base, _)| *base == c) {
                Some((_, marked)) => {
                    placed = true;
                    match tone {
                        Tone::T2 => marked[0],
                        Tone::T3 => marked[1],
                        Tone::T4 => marked[2],
                        Tone::T1 => c,
                    }
                }
                None => c,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare() {
        assert_eq!(bare("Vyé"), "ꝡe");
        assert_eq!(bare("kịde"), "kıde");
        assert_eq!(bare("tú"), "tu");
        assert_eq!(bare("shê"), "she");
    }

    #[test]
    fn test_tone_detection() {
        assert_eq!(tone_of("poq"), Tone::T1);
        assert_eq!(tone_of("tú"), Tone::T2);
        assert_eq!(tone_of("mä"), Tone::T3);
        assert_eq!(tone_of("âo"), Tone::T4);
        assert_eq!(tone_of("kịde"), Tone::T1);
        assert_eq!(tone_of("ji\u{0301}"), Tone::T2);
    }

    #[test]
    fn test_in_tone() {
        assert_eq!(in_tone("suao", Tone::T2), "súao");
        assert_eq!(in_tone("jı", Tone::T2), "jí");
        assert_eq!(in_tone("rôı", Tone::T2), "róı");
        assert_eq!(in_tone("she", Tone::T4), "shê");
        assert_eq!(in_tone("tú", Tone::T1), "tu");
    }
}
