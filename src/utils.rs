//! Various utility functions

const UNICODE_KANA_TABLE_DISTANCE: u32 = 96;

pub fn is_hiragana(c: char) -> bool {
    (0x3041..=0x3096).contains(&(c as u32))
}

pub fn is_katakana(c: char) -> bool {
    (0x30A1..=0x30FA).contains(&(c as u32))
}

// includes the half-width voiced and semi-voiced sound marks
pub fn is_halfwidth_katakana(c: char) -> bool {
    (0xFF66..=0xFF9F).contains(&(c as u32))
}

pub fn is_long_vowel_mark(c: char) -> bool {
    c == 'ー'
}

pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c) || is_halfwidth_katakana(c) || is_long_vowel_mark(c)
}

pub fn is_kanji(c: char) -> bool {
    (0x3400..=0x9FAF).contains(&(c as u32))
}

/// Maps a katakana letter to the corresponding hiragana, leaving everything else as is.
pub fn fold_kana(c: char) -> char {
    // ヷ-ヺ have no hiragana counterpart
    if (0x30A1..=0x30F6).contains(&(c as u32)) {
        char::from_u32(c as u32 - UNICODE_KANA_TABLE_DISTANCE).unwrap_or(c)
    } else {
        c
    }
}

// checks whether the characters are equivalent if ignoring the difference between hiragana and katakana
pub fn kana_equivalent(left: char, right: char) -> bool {
    fold_kana(left) == fold_kana(right)
}
