//! Carrier-name pattern matcher
//!
//! Case-insensitive substring matching against an ordered list of
//! (pattern, carrier) pairs, built on Aho-Corasick. Priority is the list
//! order, not the position in the label: the first pattern in the list that
//! occurs anywhere in the label wins. More specific patterns therefore come
//! first ("at&t" before "att"). Short abbreviations such as "att" only match
//! as whole words.

use aho_corasick::{AhoCorasick, MatchKind};
use carrierscope_core::{Carrier, Error, Result};
use std::sync::OnceLock;

/// Brand names, in priority order
pub const PRIMARY_PATTERNS: &[(&str, Carrier)] = &[
    ("verizon", Carrier::Verizon),
    ("t-mobile", Carrier::TMobile),
    ("t mobile", Carrier::TMobile),
    ("tmobile", Carrier::TMobile),
    ("at&t", Carrier::Att),
    ("at & t", Carrier::Att),
    ("att", Carrier::Att),
    ("u.s. cellular", Carrier::UsCellular),
    ("us cellular", Carrier::UsCellular),
    ("uscellular", Carrier::UsCellular),
];

/// Legacy, merged and MVNO brands, appended after the primary list
pub const LEGACY_PATTERNS: &[(&str, Carrier)] = &[
    ("cellco", Carrier::Verizon),
    ("alltel", Carrier::Verizon),
    ("visible", Carrier::Verizon),
    ("tracfone", Carrier::Verizon),
    ("straight talk", Carrier::Verizon),
    ("xfinity mobile", Carrier::Verizon),
    ("spectrum mobile", Carrier::Verizon),
    ("cingular", Carrier::Att),
    ("cricket", Carrier::Att),
    ("sprint", Carrier::TMobile),
    ("nextel", Carrier::TMobile),
    ("metropcs", Carrier::TMobile),
    ("metro pcs", Carrier::TMobile),
    ("mint mobile", Carrier::TMobile),
    ("uscc", Carrier::UsCellular),
];

/// Abbreviations that only count as whole words ("ATT-NET" matches,
/// "Seattle" does not)
const WHOLE_WORD_PATTERNS: &[&str] = &["att"];

/// Words that turn a bare brand match into a qualified one
const QUALIFIERS: &[&str] = &["wireless", "mobile", "mobility"];

/// How strongly a label matched a pattern (`Partial < BrandWithQualifier < ExactBrand`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrength {
    /// Pattern occurs somewhere in the label
    Partial,
    /// Pattern is immediately followed by "wireless", "mobile" or "mobility"
    BrandWithQualifier,
    /// Label is exactly the pattern
    ExactBrand,
}

/// A successful pattern match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub carrier: Carrier,
    pub strength: MatchStrength,
    /// The pattern that matched
    pub pattern: String,
    /// Byte span of the strongest occurrence in the label
    pub span: (usize, usize),
}

/// Priority-ordered carrier-name matcher
pub struct PatternMatcher {
    automaton: AhoCorasick,
    patterns: Vec<String>,
    carriers: Vec<Carrier>,
    whole_word: Vec<bool>,
}

impl PatternMatcher {
    /// Create a matcher from (pattern, carrier) pairs in priority order
    pub fn new<S: AsRef<str>>(entries: &[(S, Carrier)]) -> Result<Self> {
        let patterns: Vec<String> = entries
            .iter()
            .map(|(p, _)| p.as_ref().to_ascii_lowercase())
            .collect();
        let carriers = entries.iter().map(|(_, c)| *c).collect();
        let whole_word = patterns
            .iter()
            .map(|p| WHOLE_WORD_PATTERNS.contains(&p.as_str()))
            .collect();

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| Error::config(format!("Failed to build carrier pattern matcher: {}", e)))?;

        Ok(Self {
            automaton,
            patterns,
            carriers,
            whole_word,
        })
    }

    /// Shared matcher over the primary brand list
    pub fn primary() -> &'static PatternMatcher {
        static PRIMARY: OnceLock<PatternMatcher> = OnceLock::new();
        PRIMARY.get_or_init(|| {
            Self::new(PRIMARY_PATTERNS).expect("built-in primary patterns are valid")
        })
    }

    /// Shared matcher over the primary list followed by legacy and MVNO brands
    pub fn expanded() -> &'static PatternMatcher {
        static EXPANDED: OnceLock<PatternMatcher> = OnceLock::new();
        EXPANDED.get_or_init(|| {
            let entries: Vec<(&str, Carrier)> = PRIMARY_PATTERNS
                .iter()
                .chain(LEGACY_PATTERNS)
                .copied()
                .collect();
            Self::new(&entries).expect("built-in expanded patterns are valid")
        })
    }

    /// Classify a label, returning the highest-priority matching pattern
    pub fn match_name(&self, label: &str) -> Option<PatternMatch> {
        let mut best: Option<(usize, MatchStrength, (usize, usize))> = None;

        for m in self.automaton.find_overlapping_iter(label) {
            let index = m.pattern().as_usize();
            if self.whole_word[index] && !is_whole_word(label, m.start(), m.end()) {
                continue;
            }
            let strength = self.strength(label, index, m.end());
            let span = (m.start(), m.end());

            best = match best {
                None => Some((index, strength, span)),
                Some((best_index, _, _)) if index < best_index => Some((index, strength, span)),
                Some((best_index, best_strength, _)) if index == best_index && strength > best_strength => {
                    Some((index, strength, span))
                }
                keep => keep,
            };
        }

        best.map(|(index, strength, span)| PatternMatch {
            carrier: self.carriers[index],
            strength,
            pattern: self.patterns[index].clone(),
            span,
        })
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the matcher has no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn strength(&self, label: &str, index: usize, end: usize) -> MatchStrength {
        if label.trim().eq_ignore_ascii_case(&self.patterns[index]) {
            return MatchStrength::ExactBrand;
        }

        let rest = label[end..].trim_start_matches(|c: char| c == ' ' || c == '-');
        let qualified = QUALIFIERS.iter().any(|q| {
            rest.get(..q.len())
                .map(|head| head.eq_ignore_ascii_case(q))
                .unwrap_or(false)
        });

        if qualified {
            MatchStrength::BrandWithQualifier
        } else {
            MatchStrength::Partial
        }
    }
}

fn is_whole_word(label: &str, start: usize, end: usize) -> bool {
    let before = label[..start].chars().next_back();
    let after = label[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric()) && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}
