/// Returns `input` with all backslash-escaped characters replaced, i.e. \n, \t, \r, \\ are
/// replaced by "newline", "tab", "carriage return" and "\" characters, and all other
/// backslashes are simply removed.
pub fn replace_escapes(input: &str) -> String {
    let mut res = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => res.push('\n'),
            Some('t') => res.push('\t'),
            Some('r') => res.push('\r'),
            Some(escaped) => res.push(escaped),
            None => {}
        }
    }

    res
}

/// Inverse of `replace_escapes` for a single character, used when a value is
/// rendered as a quoted character literal.
pub fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        _ => c.to_string(),
    }
}

/// Parses a single quoted character literal such as `'a'` or `'\n'`.
pub fn parse_char_literal(input: &str) -> Option<char> {
    if input.len() < 3 || !input.starts_with('\'') || !input.ends_with('\'') {
        return None;
    }

    let inner = replace_escapes(&input[1..input.len() - 1]);
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

pub fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_escapes_empty() {
        //setup
        let input = "";

        //exercise
        let res = replace_escapes(input);

        //verify
        assert_eq!(res, "");
    }

    #[test]
    fn replace_escapes_single() {
        //setup
        let input = "\\n";

        //exercise
        let res = replace_escapes(input);

        //verify
        assert_eq!(res, "\n");
    }

    #[test]
    fn replace_escapes_chained() {
        //setup
        let input = "\\\\n\\n\\\\\\t";

        //exercise
        let res = replace_escapes(input);

        //verify
        assert_eq!(res, "\\n\n\\\t");
    }

    #[test]
    fn escape_round_trip() {
        //setup
        let chars = ['a', '\n', '\t', '\'', '\\', ' '];

        //exercise/verify
        for c in chars.iter() {
            assert_eq!(replace_escapes(&escape_char(*c)), c.to_string());
        }
    }

    #[test]
    fn char_literals() {
        //exercise/verify
        assert_eq!(parse_char_literal("'a'"), Some('a'));
        assert_eq!(parse_char_literal("'\\n'"), Some('\n'));
        assert_eq!(parse_char_literal("'\\''"), Some('\''));
        assert_eq!(parse_char_literal("'ab'"), None);
        assert_eq!(parse_char_literal("a"), None);
        assert_eq!(parse_char_literal("''"), None);
    }

    #[test]
    fn indent_depth() {
        //exercise/verify
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }
}
