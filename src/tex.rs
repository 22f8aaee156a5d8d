//! TeX markup to visible Unicode.
//!
//! Only the subset that shows up in names, titles and venues is handled: accent commands, the
//! handful of letter commands BibTeX files use for non-ASCII letters, escaped specials, ties,
//! dashes and quotes. Grouping braces are dropped. A command applied to a braced argument is
//! dropped while the argument is kept, so `\emph{Foo}` becomes `Foo`; an unknown command with no
//! argument keeps its name as text.
//!
//! Inline math (`$...$`) gets Greek letters, common operators and digit sub/superscripts, so
//! `{CO$_2$}` reads `CO₂`. Anything fancier comes out as its plain text.

use std::{iter::Peekable, str::Chars};

use unicode_normalization::UnicodeNormalization;

pub fn to_unicode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => command(&mut chars, &mut out),
            '$' => math(&mut chars, &mut out),
            '{' | '}' => {}
            '~' => out.push('\u{a0}'),
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                if chars.peek() == Some(&'-') {
                    chars.next();
                    out.push('\u{2014}');
                } else {
                    out.push('\u{2013}');
                }
            }
            '`' if chars.peek() == Some(&'`') => {
                chars.next();
                out.push('\u{201c}');
            }
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\u{201d}');
            }
            c => out.push(c),
        }
    }
    out.nfc().collect()
}

/// Handle whatever follows a backslash.
fn command(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let Some(&next) = chars.peek() else {
        out.push('\\');
        return;
    };

    if !next.is_ascii_alphabetic() {
        chars.next();
        match next {
            '\'' | '`' | '^' | '"' | '~' | '=' | '.' => accent(chars, combining_mark(next), out),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => out.push(next),
            ' ' | '\\' | '\n' => out.push(' '),
            // discretionary hyphen, italic correction
            '-' | '/' => {}
            other => out.push(other),
        }
        return;
    }

    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_alphabetic() {
            break;
        }
        name.push(c);
        chars.next();
    }
    // control words swallow the spaces after them
    let mut spaced = false;
    while chars.peek().is_some_and(|c| *c == ' ') {
        chars.next();
        spaced = true;
    }

    match name.as_str() {
        "u" | "v" | "H" | "c" | "k" | "r" | "d" | "b" => {
            let mark = name.chars().next().map_or('\u{301}', combining_mark);
            accent(chars, mark, out);
        }
        _ => {
            if let Some(text) = letter(&name).or_else(|| symbol(&name)) {
                out.push_str(text);
            } else if chars.peek() != Some(&'{') {
                out.push_str(&name);
                if spaced {
                    out.push(' ');
                }
            }
        }
    }
}

/// Inline math after an opening `$`. A `$` that is never closed is kept literally.
fn math(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let mut ahead = chars.clone();
    let mut body = String::new();
    loop {
        match ahead.next() {
            Some('$') => break,
            Some('\\') => {
                body.push('\\');
                if let Some(c) = ahead.next() {
                    body.push(c);
                }
            }
            Some(c) => body.push(c),
            None => {
                out.push('$');
                return;
            }
        }
    }
    *chars = ahead;
    out.push_str(&typeset(&body));
}

fn typeset(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => math_command(&mut chars, &mut out),
            '_' | '^' => {
                let argument = match chars.next() {
                    Some('{') => typeset(&braced(&mut chars)),
                    Some('\\') => {
                        let mut command = String::new();
                        math_command(&mut chars, &mut command);
                        command
                    }
                    Some(c) => c.to_string(),
                    None => String::new(),
                };
                let shifted = if c == '_' {
                    argument.chars().map(subscript).collect::<Option<String>>()
                } else {
                    argument.chars().map(superscript).collect::<Option<String>>()
                };
                match shifted {
                    Some(text) => out.push_str(&text),
                    None => {
                        out.push(c);
                        out.push_str(&argument);
                    }
                }
            }
            '{' | '}' => {}
            '~' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

fn math_command(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_alphabetic() {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        match chars.next() {
            // thin, medium and thick spaces
            Some(',' | ':' | ';' | ' ') => out.push(' '),
            Some('!') | None => {}
            Some(other) => out.push(other),
        }
        return;
    }
    if let Some(text) = symbol(&name).or_else(|| letter(&name)) {
        out.push_str(text);
    } else if chars.peek() != Some(&'{') {
        out.push_str(&name);
    }
}

/// Raw text of a braced group whose `{` was already consumed.
fn braced(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut depth = 1;
    let mut raw = String::new();
    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        raw.push(c);
    }
    raw
}

/// Apply `mark` to the next argument: either a braced group or a single (possibly escaped) char.
fn accent(chars: &mut Peekable<Chars<'_>>, mark: char, out: &mut String) {
    while chars.peek().is_some_and(|c| *c == ' ') {
        chars.next();
    }
    let argument = match chars.next() {
        Some('{') => to_unicode(&braced(chars)),
        Some('\\') => {
            let mut escaped = String::new();
            command(chars, &mut escaped);
            escaped
        }
        Some(c) => c.to_string(),
        None => String::new(),
    };

    let mut rest = argument.chars();
    if let Some(base) = rest.next() {
        // accents on \i and \j sit where the dot would be
        out.push(match base {
            'ı' => 'i',
            'ȷ' => 'j',
            other => other,
        });
        out.push(mark);
        out.extend(rest);
    }
}

fn combining_mark(accent: char) -> char {
    match accent {
        '`' => '\u{300}',
        '^' => '\u{302}',
        '~' => '\u{303}',
        '=' => '\u{304}',
        'u' => '\u{306}',
        '.' => '\u{307}',
        '"' => '\u{308}',
        'r' => '\u{30a}',
        'H' => '\u{30b}',
        'v' => '\u{30c}',
        'd' => '\u{323}',
        'c' => '\u{327}',
        'k' => '\u{328}',
        'b' => '\u{331}',
        _ => '\u{301}',
    }
}

fn letter(name: &str) -> Option<&'static str> {
    Some(match name {
        "ss" => "ß",
        "o" => "ø",
        "O" => "Ø",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "OE" => "Œ",
        "aa" => "å",
        "AA" => "Å",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "j" => "ȷ",
        "TeX" => "TeX",
        "LaTeX" => "LaTeX",
        "textendash" => "\u{2013}",
        "textemdash" => "\u{2014}",
        "textquoteright" => "\u{2019}",
        "textquoteleft" => "\u{2018}",
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "vartheta" => "ϑ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Upsilon" => "Υ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "ell" => "ℓ",
        "hbar" => "ℏ",
        "infty" => "∞",
        "pm" => "±",
        "mp" => "∓",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "sim" => "∼",
        "simeq" => "≃",
        "equiv" => "≡",
        "propto" => "∝",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" => "⇒",
        "leftrightarrow" => "↔",
        "partial" => "∂",
        "nabla" => "∇",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "sqrt" => "√",
        "in" => "∈",
        "subset" => "⊂",
        "cup" => "∪",
        "cap" => "∩",
        "emptyset" => "∅",
        "forall" => "∀",
        "exists" => "∃",
        "circ" => "∘",
        "prime" => "′",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "langle" => "⟨",
        "rangle" => "⟩",
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0'..='9' => char::from_u32(0x2080 + (c as u32 - '0' as u32))?,
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4'..='9' => char::from_u32(0x2074 + (c as u32 - '4' as u32))?,
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'i' => 'ⁱ',
        'n' => 'ⁿ',
        '∘' => '°',
        '′' => '′',
        _ => return None,
    })
}
