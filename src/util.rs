//! Ready-made grammar building blocks, written entirely in terms of the
//! public algebra: digit classes, integers with range validation, number
//! literals, identifiers, quoted strings and a few network literals.

use crate::{
    Pattern, alt, check, inject, jnn, ns, not, q0, q01, q1, qmn, qnn, r, ranges, s, seq, t, ti,
    trunc, u, when,
};

// ─── Rune classes ───────────────────────────────────────────────────────

/// One octal digit.
pub fn oct_digit() -> Pattern {
    r('0', '7')
}

/// One decimal digit.
pub fn dec_digit() -> Pattern {
    r('0', '9')
}

/// One hexadecimal digit.
pub fn hex_digit() -> Pattern {
    ranges([('0', '9'), ('a', 'f'), ('A', 'F')])
}

/// One Unicode whitespace character.
pub fn whitespace() -> Pattern {
    u(["White_Space"])
}

/// One Unicode letter.
pub fn letter() -> Pattern {
    u(["Letter"])
}

/// One Unicode letter or decimal digit.
pub fn letter_digit() -> Pattern {
    u(["Letter", "Nd"])
}

/// One line break: `\r\n`, `\r` or `\n`.
pub fn newline() -> Pattern {
    alt([t("\r\n"), s("\r\n")])
}

/// Any amount of whitespace, possibly none.
pub fn any_spaces() -> Pattern {
    q0(whitespace())
}

/// At least one whitespace character.
pub fn spaces() -> Pattern {
    q1(whitespace())
}

// ─── Integers ───────────────────────────────────────────────────────────

/// A bare run of decimal digits.
pub fn dec_integer() -> Pattern {
    q1(dec_digit())
}

/// A bare run of hexadecimal digits.
pub fn hex_integer() -> Pattern {
    q1(hex_digit())
}

/// A bare run of octal digits.
pub fn oct_integer() -> Pattern {
    q1(oct_digit())
}

/// An integer literal: `0x` hex, decimal, or `0`-prefixed octal.
pub fn integer() -> Pattern {
    alt([
        seq([ti("0x"), hex_integer()]),
        dec_integer(),
        seq([t("0"), oct_integer()]),
    ])
}

/// A bare decimal integer whose value lies in `[m, n]`, taking as many
/// digits as the bound allows.
pub fn dec_integer_between(m: u64, n: u64) -> Pattern {
    inject(bare_integer_injector(m, n, 10), dec_integer())
}

/// A bare hexadecimal integer whose value lies in `[m, n]`.
pub fn hex_integer_between(m: u64, n: u64) -> Pattern {
    inject(bare_integer_injector(m, n, 16), hex_integer())
}

/// A bare octal integer whose value lies in `[m, n]`.
pub fn oct_integer_between(m: u64, n: u64) -> Pattern {
    inject(bare_integer_injector(m, n, 8), oct_integer())
}

/// An [`integer`] literal whose value lies in `[m, n]`, whatever its
/// base.
pub fn integer_between(m: u64, n: u64) -> Pattern {
    inject(
        move |s: &str| {
            if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                let (accepted, ok) = run_bare_integer(hex, m, n, 16);
                if ok {
                    return (accepted + 2, true);
                }
                return (0, false);
            }
            if s.starts_with('0') && s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
                return run_bare_integer(s, m, n, 8);
            }
            run_bare_integer(s, m, n, 10)
        },
        integer(),
    )
}

/// Matches `"0"`, or the bare integer without leading zeroes.
pub fn no_redundant_zeroes(bare_integer: Pattern) -> Pattern {
    alt([when(not(t("0")), bare_integer), t("0")])
}

fn bare_integer_injector(m: u64, n: u64, base: u32) -> impl Fn(&str) -> (usize, bool) {
    move |s: &str| run_bare_integer(s, m, n, base)
}

/// Decide how many bytes of a digit run to accept so the value fits in
/// `[m, n]`: strip redundant leading zeroes, then take the longest
/// suffix-trimmed digit string that parses into range.
fn run_bare_integer(s: &str, m: u64, n: u64, base: u32) -> (usize, bool) {
    let (m, n) = if m > n { (n, m) } else { (m, n) };
    if s.is_empty() {
        return (0, false);
    }

    let mut zeroes = s.bytes().take_while(|&b| b == b'0').count();
    if zeroes == s.len() {
        zeroes -= 1;
    }
    let digits = &s[zeroes..];

    let dm = count_digits(m, base);
    let dn = count_digits(n, base);
    let mut digits = &digits[..digits.len().min(dn)];
    while digits.len() >= dm {
        if let Ok(x) = u64::from_str_radix(digits, base) {
            if x >= m && x <= n {
                return (zeroes + digits.len(), true);
            }
        }
        digits = &digits[..digits.len() - 1];
    }
    (0, false)
}

fn count_digits(mut x: u64, base: u32) -> usize {
    let base = u64::from(base);
    let mut n = 1;
    while x >= base {
        x /= base;
        n += 1;
    }
    n
}

// ─── Literals ───────────────────────────────────────────────────────────

/// A decimal number with an optional fraction part; a bare `.` is
/// rejected.
pub fn decimal() -> Pattern {
    check(
        |s: &str| s != ".",
        alt([
            seq([q0(dec_digit()), t("."), q0(dec_digit())]),
            dec_integer(),
        ]),
    )
}

/// A [`decimal`] with an optional exponent.
pub fn float() -> Pattern {
    seq([
        decimal(),
        q01(seq([ti("e"), q01(s("+-")), dec_integer()])),
    ])
}

/// Any numeric literal: hex, float or octal.
pub fn number() -> Pattern {
    alt([
        seq([ti("0x"), hex_integer()]),
        float(),
        seq([t("0"), oct_integer()]),
    ])
}

/// A letter-or-underscore-led identifier.
pub fn identifier() -> Pattern {
    seq([
        alt([letter(), t("_")]),
        q0(alt([letter_digit(), t("_")])),
    ])
}

/// A double-quoted string with the usual escape sequences.
pub fn quoted_string() -> Pattern {
    seq([
        t("\""),
        q0(alt([
            seq([t("\\U"), qnn(8, hex_digit())]),
            seq([t("\\u"), qnn(4, hex_digit())]),
            seq([t("\\x"), qnn(2, hex_digit())]),
            seq([t("\\"), qnn(3, oct_digit())]),
            seq([t("\\"), s("abfnrtv\\'\"")]),
            ns("\"\n\r"),
        ])),
        t("\""),
    ])
}

// ─── Network literals ───────────────────────────────────────────────────

/// A dotted-quad IPv4 address.
pub fn ipv4() -> Pattern {
    jnn(4, dec_integer_between(0, 255), t("."))
}

/// An IPv4 address in CIDR notation.
pub fn cidr_v4() -> Pattern {
    seq([ipv4(), t("/"), dec_integer_between(0, 32)])
}

/// A 48-bit hardware address: colon- or dash-separated hex pairs, or
/// dot-separated four-digit groups.
pub fn mac() -> Pattern {
    alt([
        jnn(6, qnn(2, hex_digit()), t(":")),
        jnn(6, qnn(2, hex_digit()), t("-")),
        jnn(3, qnn(4, hex_digit()), t(".")),
    ])
}

/// A 64-bit hardware address, in the same three shapes as [`mac`].
pub fn eui64() -> Pattern {
    alt([
        jnn(8, qnn(2, hex_digit()), t(":")),
        jnn(8, qnn(2, hex_digit()), t("-")),
        jnn(4, qnn(4, hex_digit()), t(".")),
    ])
}

fn letter_hyphen() -> Pattern {
    ranges([('a', 'z'), ('A', 'Z'), ('-', '-')])
}

/// A URL slug: a run of letters and hyphens.
pub fn slug() -> Pattern {
    q1(letter_hyphen())
}

/// A DNS domain name: dot-separated labels of up to 63 letters or
/// hyphens, an optional trailing dot, truncated to 253 characters.
pub fn domain() -> Pattern {
    trunc(
        253,
        seq([
            qmn(1, 63, letter_hyphen()),
            qmn(0, 126, seq([t("."), qmn(1, 63, letter_hyphen())])),
            q01(t(".")),
        ]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_full_matched, matched_prefix};

    fn accepts(pat: &Pattern, texts: &[&str]) {
        for text in texts {
            assert!(is_full_matched(pat, text), "{pat} should match {text:?}");
        }
    }

    fn rejects(pat: &Pattern, texts: &[&str]) {
        for text in texts {
            assert!(!is_full_matched(pat, text), "{pat} should reject {text:?}");
        }
    }

    #[test]
    fn integers() {
        accepts(&integer(), &["0", "42", "0x2a", "0X2A", "0755"]);
        rejects(&integer(), &["", "x42", "42x"]);
    }

    #[test]
    fn bounded_integers() {
        accepts(&dec_integer_between(0, 255), &["0", "9", "255", "007"]);
        rejects(&dec_integer_between(0, 255), &["256", "999"]);
        assert_eq!(matched_prefix(&dec_integer_between(0, 255), "256"), Some("25"));
        assert_eq!(matched_prefix(&dec_integer_between(0, 255), "00256"), Some("0025"));
    }

    #[test]
    fn integer_between_handles_bases() {
        accepts(&integer_between(0, 255), &["0xff", "255", "0377"]);
        rejects(&integer_between(0, 255), &["0x100"]);
    }

    #[test]
    fn no_redundant_zeroes_rejects_leading_zero() {
        let pat = no_redundant_zeroes(dec_integer());
        accepts(&pat, &["0", "42", "100"]);
        rejects(&pat, &["007"]);
    }

    #[test]
    fn decimals_and_floats() {
        accepts(&decimal(), &["1", "1.", ".5", "3.14"]);
        rejects(&decimal(), &[".", ""]);
        accepts(&float(), &["1", "3.14", "1e9", "1.5E-3", ".5e+2"]);
        rejects(&float(), &["e9", "."]);
    }

    #[test]
    fn identifiers() {
        accepts(&identifier(), &["x", "_tmp", "átomo", "x42", "名前"]);
        rejects(&identifier(), &["42x", "", "-x"]);
    }

    #[test]
    fn quoted_strings() {
        accepts(
            &quoted_string(),
            &[
                r#""""#,
                r#""hello""#,
                r#""a\nb""#,
                r#""\x41A\U00000041""#,
                r#""\101""#,
            ],
        );
        rejects(&quoted_string(), &[r#"""#, "\"a\nb\""]);
    }

    #[test]
    fn ipv4_addresses() {
        accepts(&ipv4(), &["0.0.0.0", "127.0.0.1", "255.255.255.255"]);
        rejects(&ipv4(), &["256.0.0.1", "1.2.3", "a.b.c.d"]);
        accepts(&cidr_v4(), &["10.0.0.0/8", "192.168.0.0/16"]);
        rejects(&cidr_v4(), &["10.0.0.0/33"]);
    }

    #[test]
    fn mac_addresses() {
        accepts(
            &mac(),
            &["00:11:22:aa:bb:cc", "00-11-22-AA-BB-CC", "0011.22aa.bbcc"],
        );
        rejects(&mac(), &["00:11:22:aa:bb", "0:11:22:aa:bb:cc", "0011.22aa"]);
    }

    #[test]
    fn eui64_addresses() {
        accepts(
            &eui64(),
            &[
                "00:11:22:33:44:55:66:77",
                "00-11-22-33-44-55-66-77",
                "0011.2233.4455.6677",
            ],
        );
        rejects(&eui64(), &["00:11:22:33:44:55", "0011.2233.4455"]);
    }

    #[test]
    fn domains_and_slugs() {
        accepts(
            &domain(),
            &[
                "example.com",
                "a-b.example.co.uk",
                "localhost",
                "-leading.com",
                "xn--abc.com",
                "trailing-.com",
                "example.com.",
            ],
        );
        rejects(&domain(), &[".com", "example2.com", ""]);

        accepts(&slug(), &["some-page-title", "abc"]);
        rejects(&slug(), &["", "two words"]);
    }

    #[test]
    fn whitespace_and_newlines() {
        accepts(&newline(), &["\n", "\r", "\r\n"]);
        accepts(&spaces(), &[" ", " \t\n"]);
        rejects(&spaces(), &[""]);
        accepts(&any_spaces(), &[""]);
    }
}
