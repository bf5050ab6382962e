//! Shell-glob compilation
//!
//! Globs are compiled once into anchored regular expressions. The dialect is
//! the classic shell one used by ignore files:
//!
//! - `*` matches any run of characters except `/`
//! - `?` matches a single character except `/`
//! - `[...]` matches a character class, `[^...]` its complement, `a-z` ranges
//! - `\c` matches `c` literally
//!
//! A malformed glob (unterminated class, trailing backslash, empty class)
//! compiles to a glob that never matches.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct Glob {
    regex: Option<Regex>,
}

impl Glob {
    pub fn new(source: &str) -> Self {
        let regex = translate(source).and_then(|expr| Regex::new(&expr).ok());

        if regex.is_none() {
            tracing::debug!(glob = source, "malformed glob never matches");
        }

        Glob { regex }
    }

    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(candidate))
    }
}

fn class_member(c: char) -> String {
    format!("\\x{{{:x}}}", c as u32)
}

fn translate(glob: &str) -> Option<String> {
    let mut expr = String::with_capacity(glob.len() * 2 + 2);
    expr.push('^');

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => expr.push_str("[^/]*"),
            '?' => expr.push_str("[^/]"),
            '\\' => {
                let escaped = chars.next()?;
                expr.push_str(&regex::escape(&escaped.to_string()));
            }
            '[' => {
                expr.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    expr.push('^');
                }

                let mut members = 0;
                loop {
                    let lo = match chars.next()? {
                        ']' if members > 0 => break,
                        ']' | '-' => return None,
                        '\\' => chars.next()?,
                        other => other,
                    };
                    expr.push_str(&class_member(lo));

                    if chars.peek() == Some(&'-') {
                        chars.next();
                        let hi = match chars.next()? {
                            '\\' => chars.next()?,
                            ']' => return None,
                            other => other,
                        };
                        expr.push('-');
                        expr.push_str(&class_member(hi));
                    }
                    members += 1;
                }
                expr.push(']');
            }
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }

    expr.push('$');
    Some(expr)
}
