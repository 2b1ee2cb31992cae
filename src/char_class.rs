//! Single-character matchers: any rune, rune sets, rune ranges and
//! Unicode class membership.

use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_script::{Script, UnicodeScript};

use crate::context::Context;
use crate::error::Error;
use crate::pattern::{Node, Pattern};

/// Rune sets beyond this size are sorted and binary-searched.
const RUNE_SET_BINARY_THRESHOLD: usize = 16;

/// Matches any single character.
pub fn dot() -> Pattern {
    Pattern::new(Node::AnyRune)
}

/// Matches one character contained in `set`.
pub fn s(set: &str) -> Pattern {
    Pattern::new(Node::RuneSet {
        negated: false,
        runes: make_rune_set(set),
    })
}

/// Matches one character *not* contained in `exclude`.
pub fn ns(exclude: &str) -> Pattern {
    Pattern::new(Node::RuneSet {
        negated: true,
        runes: make_rune_set(exclude),
    })
}

/// Matches one character in the inclusive range `[low, high]`.
pub fn r(low: char, high: char) -> Pattern {
    ranges([(low, high)])
}

/// Matches one character outside the inclusive range `[low, high]`.
pub fn nr(low: char, high: char) -> Pattern {
    not_ranges([(low, high)])
}

/// Matches one character in any of the inclusive range pairs.
pub fn ranges<I>(pairs: I) -> Pattern
where
    I: IntoIterator<Item = (char, char)>,
{
    Pattern::new(Node::RuneRanges {
        negated: false,
        ranges: pairs.into_iter().collect(),
    })
}

/// Matches one character outside all of the inclusive range pairs.
pub fn not_ranges<I>(pairs: I) -> Pattern
where
    I: IntoIterator<Item = (char, char)>,
{
    Pattern::new(Node::RuneRanges {
        negated: true,
        ranges: pairs.into_iter().collect(),
    })
}

/// Matches one character by Unicode class membership.
///
/// A name is one of the built-in aliases (`Upper`, `Lower`, `Title`,
/// `Letter`, `Mark`, `Number`, `Digit`, `Punct`, `Symbol`, `Separator`,
/// `Other`, `Control`, `Graphic`, `Print`), a supported property
/// (`White_Space`, `Alphabetic`, `Uppercase`, `Lowercase`), a script name
/// (`Latin`, `Han`, ...) or a general category (`Lu`, `Nd`, `L`, ...).
/// A leading `-` excludes the class; mixed names match when the character
/// is in some included class and in none of the excluded ones.
///
/// Dismatches everything when given no names.
///
/// # Panics
///
/// Panics if any class name is undefined (see [`is_unicode_class_name`]).
pub fn u<I, S>(names: I) -> Pattern
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for name in names {
        let name = name.as_ref();
        match name.strip_prefix('-') {
            Some(stripped) => exclude.push(stripped.to_string()),
            None => include.push(name.to_string()),
        }
    }
    include.sort();
    include.dedup();
    exclude.sort();
    exclude.dedup();

    match (include.is_empty(), exclude.is_empty()) {
        (true, true) => crate::predicate::never(),
        (false, true) => Pattern::new(Node::UnicodeClasses(UnicodeClasses::resolve(
            include, false,
        ))),
        (true, false) => Pattern::new(Node::UnicodeClasses(UnicodeClasses::resolve(
            exclude, true,
        ))),
        (false, false) => Pattern::new(Node::UnicodeIncludeExclude {
            include: UnicodeClasses::resolve(include, false),
            exclude: UnicodeClasses::resolve(exclude, true),
        }),
    }
}

/// Whether `name` is accepted by [`u`].
pub fn is_unicode_class_name(name: &str) -> bool {
    lookup_class(name).is_some()
}

/// A union of resolved Unicode classes, optionally negated.
#[derive(Debug, Clone)]
pub(crate) struct UnicodeClasses {
    pub(crate) negated: bool,
    pub(crate) names: Vec<String>,
    classes: Vec<CharClass>,
}

#[derive(Debug, Clone, Copy)]
enum CharClass {
    Category(GeneralCategory),
    /// A whole general category group: one of `L M N P S Z C`.
    Group(u8),
    Script(Script),
    Whitespace,
    Alphabetic,
    Uppercase,
    Lowercase,
    /// Everything visible: letters, marks, numbers, punctuation, symbols
    /// and spaces.
    Graphic,
}

impl UnicodeClasses {
    /// Resolve class names, panicking on any undefined name.
    pub(crate) fn resolve(names: Vec<String>, negated: bool) -> Self {
        let classes = names
            .iter()
            .map(|name| match lookup_class(name) {
                Some(class) => class,
                None => panic!("unicode class name {name:?} undefined"),
            })
            .collect();
        Self {
            negated,
            names,
            classes,
        }
    }

    pub(crate) fn has(&self, c: char) -> bool {
        let member = self.classes.iter().any(|class| class.has(c));
        member != self.negated
    }
}

impl CharClass {
    fn has(self, c: char) -> bool {
        match self {
            CharClass::Category(gc) => get_general_category(c) == gc,
            CharClass::Group(g) => group_of(get_general_category(c)) == g,
            CharClass::Script(script) => c.script() == script,
            CharClass::Whitespace => c.is_whitespace(),
            CharClass::Alphabetic => c.is_alphabetic(),
            CharClass::Uppercase => c.is_uppercase(),
            CharClass::Lowercase => c.is_lowercase(),
            CharClass::Graphic => {
                matches!(group_of(get_general_category(c)), b'L' | b'M' | b'N' | b'P' | b'S')
                    || get_general_category(c) == GeneralCategory::SpaceSeparator
            }
        }
    }
}

fn lookup_class(name: &str) -> Option<CharClass> {
    lookup_alias(name)
        .or_else(|| lookup_property(name))
        .or_else(|| Script::from_full_name(name).map(CharClass::Script))
        .or_else(|| lookup_category(name))
}

fn lookup_alias(name: &str) -> Option<CharClass> {
    Some(match name {
        "Upper" => CharClass::Category(GeneralCategory::UppercaseLetter),
        "Lower" => CharClass::Category(GeneralCategory::LowercaseLetter),
        "Title" => CharClass::Category(GeneralCategory::TitlecaseLetter),
        "Letter" => CharClass::Group(b'L'),
        "Mark" => CharClass::Group(b'M'),
        "Number" => CharClass::Group(b'N'),
        "Digit" => CharClass::Category(GeneralCategory::DecimalNumber),
        "Punct" => CharClass::Group(b'P'),
        "Symbol" => CharClass::Group(b'S'),
        "Separator" => CharClass::Group(b'Z'),
        "Other" => CharClass::Group(b'C'),
        "Control" => CharClass::Category(GeneralCategory::Control),
        "Graphic" | "Print" => CharClass::Graphic,
        _ => return None,
    })
}

fn lookup_property(name: &str) -> Option<CharClass> {
    Some(match name {
        "White_Space" => CharClass::Whitespace,
        "Alphabetic" => CharClass::Alphabetic,
        "Uppercase" => CharClass::Uppercase,
        "Lowercase" => CharClass::Lowercase,
        _ => return None,
    })
}

fn lookup_category(name: &str) -> Option<CharClass> {
    let bytes = name.as_bytes();
    if bytes.len() == 1 && matches!(bytes[0], b'L' | b'M' | b'N' | b'P' | b'S' | b'Z' | b'C') {
        return Some(CharClass::Group(bytes[0]));
    }
    category_from_abbr(name).map(CharClass::Category)
}

fn category_from_abbr(name: &str) -> Option<GeneralCategory> {
    Some(match name {
        "Lu" => GeneralCategory::UppercaseLetter,
        "Ll" => GeneralCategory::LowercaseLetter,
        "Lt" => GeneralCategory::TitlecaseLetter,
        "Lm" => GeneralCategory::ModifierLetter,
        "Lo" => GeneralCategory::OtherLetter,
        "Mn" => GeneralCategory::NonspacingMark,
        "Mc" => GeneralCategory::SpacingMark,
        "Me" => GeneralCategory::EnclosingMark,
        "Nd" => GeneralCategory::DecimalNumber,
        "Nl" => GeneralCategory::LetterNumber,
        "No" => GeneralCategory::OtherNumber,
        "Pc" => GeneralCategory::ConnectorPunctuation,
        "Pd" => GeneralCategory::DashPunctuation,
        "Ps" => GeneralCategory::OpenPunctuation,
        "Pe" => GeneralCategory::ClosePunctuation,
        "Pi" => GeneralCategory::InitialPunctuation,
        "Pf" => GeneralCategory::FinalPunctuation,
        "Po" => GeneralCategory::OtherPunctuation,
        "Sm" => GeneralCategory::MathSymbol,
        "Sc" => GeneralCategory::CurrencySymbol,
        "Sk" => GeneralCategory::ModifierSymbol,
        "So" => GeneralCategory::OtherSymbol,
        "Zs" => GeneralCategory::SpaceSeparator,
        "Zl" => GeneralCategory::LineSeparator,
        "Zp" => GeneralCategory::ParagraphSeparator,
        "Cc" => GeneralCategory::Control,
        "Cf" => GeneralCategory::Format,
        "Co" => GeneralCategory::PrivateUse,
        "Cs" => GeneralCategory::Surrogate,
        "Cn" => GeneralCategory::Unassigned,
        _ => return None,
    })
}

fn group_of(gc: GeneralCategory) -> u8 {
    use GeneralCategory::*;
    match gc {
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter => b'L',
        NonspacingMark | SpacingMark | EnclosingMark => b'M',
        DecimalNumber | LetterNumber | OtherNumber => b'N',
        ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
        | InitialPunctuation | FinalPunctuation | OtherPunctuation => b'P',
        MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => b'S',
        SpaceSeparator | LineSeparator | ParagraphSeparator => b'Z',
        Control | Format | PrivateUse | Surrogate | Unassigned => b'C',
    }
}

fn make_rune_set(set: &str) -> Vec<char> {
    let mut runes: Vec<char> = set.chars().collect();
    if runes.len() > RUNE_SET_BINARY_THRESHOLD {
        runes.sort_unstable();
        runes.dedup();
    }
    runes
}

pub(crate) fn rune_set_has(runes: &[char], negated: bool, c: char) -> bool {
    let found = if runes.len() > RUNE_SET_BINARY_THRESHOLD {
        runes.binary_search(&c).is_ok()
    } else {
        runes.contains(&c)
    };
    found != negated
}

pub(crate) fn rune_ranges_have(ranges: &[(char, char)], negated: bool, c: char) -> bool {
    let found = ranges.iter().any(|&(low, high)| low <= c && c <= high);
    found != negated
}

/// Step helper shared by every single-rune matcher.
pub(crate) fn step_rune_class(
    ctx: &mut Context<'_>,
    pred: impl FnOnce(char) -> bool,
) -> Result<(), Error> {
    match ctx.read_rune() {
        Some(c) if pred(c) => {
            ctx.consume(c.len_utf8());
            ctx.commit()
        }
        _ => ctx.predicates(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_set_is_kept_verbatim() {
        assert!(rune_set_has(&['a', 'b', 'c'], false, 'a'));
        assert!(!rune_set_has(&['a', 'b', 'c'], false, 'x'));
        assert!(rune_set_has(&['a', 'b', 'c'], true, 'x'));
    }

    #[test]
    fn large_set_is_sorted_for_binary_search() {
        let runes = make_rune_set("zyxwvutsrqponmlkjihgfedcba");
        assert!(runes.len() > RUNE_SET_BINARY_THRESHOLD);
        assert!(runes.is_sorted());
        assert!(rune_set_has(&runes, false, 'm'));
        assert!(!rune_set_has(&runes, false, '0'));
    }

    #[test]
    fn ranges_are_inclusive() {
        let ranges = [('a', 'z'), ('0', '9')];
        assert!(rune_ranges_have(&ranges, false, 'a'));
        assert!(rune_ranges_have(&ranges, false, 'z'));
        assert!(rune_ranges_have(&ranges, false, '5'));
        assert!(!rune_ranges_have(&ranges, false, 'H'));
        assert!(rune_ranges_have(&ranges, true, 'H'));
    }

    #[test]
    fn alias_and_category_names_resolve() {
        for name in [
            "Upper", "Lower", "Letter", "Digit", "Punct", "Graphic", "Print", "Lu", "Nd", "L",
            "White_Space", "Latin", "Han",
        ] {
            assert!(is_unicode_class_name(name), "{name} should resolve");
        }
        assert!(!is_unicode_class_name("NoSuchClass"));
    }

    #[test]
    fn class_membership() {
        let letter = UnicodeClasses::resolve(vec!["Letter".into()], false);
        assert!(letter.has('a'));
        assert!(letter.has('你'));
        assert!(!letter.has('3'));

        let not_punct = UnicodeClasses::resolve(vec!["Punct".into()], true);
        assert!(not_punct.has('你'));
        assert!(!not_punct.has('、'));

        let han = UnicodeClasses::resolve(vec!["Han".into()], false);
        assert!(han.has('中'));
        assert!(!han.has('a'));

        let space = UnicodeClasses::resolve(vec!["White_Space".into()], false);
        assert!(space.has(' '));
        assert!(space.has('\t'));
        assert!(!space.has('x'));
    }

    #[test]
    #[should_panic(expected = "undefined")]
    fn unknown_class_panics_at_construction() {
        u(["Nonsense"]);
    }
}
