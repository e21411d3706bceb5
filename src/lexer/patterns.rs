//! Raw character patterns.
//!
//! Each pattern looks at `src` from index `at` and returns the end index of
//! its match, or `None`. Patterns record nothing and never partially match;
//! the scanners in [`super::scanners`] wrap them into labelled parsers.

fn many_of(src: &[char], at: usize, pred: impl Fn(char) -> bool) -> usize {
    src[at.min(src.len())..]
        .iter()
        .position(|c| !pred(*c))
        .map_or(src.len(), |len| at + len)
}

fn some_of(src: &[char], at: usize, pred: impl Fn(char) -> bool) -> Option<usize> {
    let end = many_of(src, at, pred);
    (end > at).then_some(end)
}

fn is(src: &[char], at: usize, pred: impl Fn(char) -> bool) -> bool {
    src.get(at).is_some_and(|c| pred(*c))
}

pub fn literal(src: &[char], at: usize, text: &[char]) -> Option<usize> {
    let end = at + text.len();
    (src.get(at..end)? == text).then_some(end)
}

pub fn literal_ignore_case(src: &[char], at: usize, text: &[char]) -> Option<usize> {
    let end = at + text.len();
    let window = src.get(at..end)?;
    window
        .iter()
        .zip(text)
        .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
        .then_some(end)
}

pub fn whitespaces(src: &[char], at: usize) -> Option<usize> {
    some_of(src, at, char::is_whitespace)
}

/// `digits`
pub fn integer(src: &[char], at: usize) -> Option<usize> {
    some_of(src, at, |c| c.is_ascii_digit())
}

fn fraction(src: &[char], at: usize) -> Option<usize> {
    if is(src, at, |c| c == '.') {
        integer(src, at + 1)
    } else {
        None
    }
}

/// `digits ['.' digits] | '.' digits`
pub fn decimal(src: &[char], at: usize) -> Option<usize> {
    match integer(src, at) {
        Some(end) => Some(fraction(src, end).unwrap_or(end)),
        None => fraction(src, at),
    }
}

/// `decimal ('e'|'E') ['+'|'-'] digits`
pub fn scientific(src: &[char], at: usize) -> Option<usize> {
    let mantissa = decimal(src, at)?;
    if !is(src, mantissa, |c| c == 'e' || c == 'E') {
        return None;
    }
    let sign = mantissa + 1;
    let digits = if is(src, sign, |c| c == '+' || c == '-') {
        sign + 1
    } else {
        sign
    };
    integer(src, digits)
}

/// `('0x'|'0X') hex-digits`
pub fn hex_integer(src: &[char], at: usize) -> Option<usize> {
    if is(src, at, |c| c == '0') && is(src, at + 1, |c| c == 'x' || c == 'X') {
        some_of(src, at + 2, |c| c.is_ascii_hexdigit())
    } else {
        None
    }
}

/// `'0' [0-7]*`
pub fn oct_integer(src: &[char], at: usize) -> Option<usize> {
    if is(src, at, |c| c == '0') {
        Some(many_of(src, at + 1, |c| ('0'..='7').contains(&c)))
    } else {
        None
    }
}

/// `[1-9][0-9]*`
pub fn dec_integer(src: &[char], at: usize) -> Option<usize> {
    if is(src, at, |c| ('1'..='9').contains(&c)) {
        Some(many_of(src, at + 1, |c| c.is_ascii_digit()))
    } else {
        None
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, ASCII only
pub fn identifier(src: &[char], at: usize) -> Option<usize> {
    if is(src, at, |c| c.is_ascii_alphabetic() || c == '_') {
        Some(many_of(src, at + 1, |c| c.is_ascii_alphanumeric() || c == '_'))
    } else {
        None
    }
}

/// `prefix` up to, not including, the next line break
pub fn line_comment(src: &[char], at: usize, prefix: &[char]) -> Option<usize> {
    let body = literal(src, at, prefix)?;
    Some(many_of(src, body, |c| c != '\n'))
}

/// `open ... close`, not nested; unterminated comments do not match
pub fn block_comment(src: &[char], at: usize, open: &[char], close: &[char]) -> Option<usize> {
    let mut index = literal(src, at, open)?;
    while index < src.len() {
        if let Some(end) = literal(src, index, close) {
            return Some(end);
        }
        index += 1;
    }
    None
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        other => other,
    }
}

/// A literal delimited by `quote`, returning the end index and the unescaped
/// content. The quote is escaped by doubling it or with a backslash.
pub fn quoted(src: &[char], at: usize, quote: char) -> Option<(usize, String)> {
    if !is(src, at, |c| c == quote) {
        return None;
    }
    let mut index = at + 1;
    let mut content = String::new();
    loop {
        match *src.get(index)? {
            c if c == quote => {
                if is(src, index + 1, |c| c == quote) {
                    content.push(quote);
                    index += 2;
                } else {
                    return Some((index + 1, content));
                }
            }
            '\\' => {
                content.push(unescape(*src.get(index + 1)?));
                index += 2;
            }
            c => {
                content.push(c);
                index += 1;
            }
        }
    }
}
