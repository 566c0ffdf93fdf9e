//! Identifier quoting capability.
//!
//! Quoting is the one dialect-specific concern the expression builder
//! needs, so it is injected as a narrow trait rather than owned here.
//! Empty-string validation happens at the call sites that accept user
//! input (builder, connection); the platform only escapes.

/// Dialect-specific identifier escaping.
pub trait Platform: Send + Sync {
    /// Quote a possibly-dotted identifier, one piece at a time.
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|piece| self.quote_single_identifier(piece))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote one identifier piece verbatim (dots are not separators).
    fn quote_single_identifier(&self, name: &str) -> String;
}

/// SQLite identifier quoting: double quotes, embedded quotes doubled.
#[derive(Clone, Copy, Debug, Default)]
pub struct SqlitePlatform;

impl Platform for SqlitePlatform {
    fn quote_single_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        out.push('"');
        for ch in name.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_simple_identifier() {
        assert_eq!(SqlitePlatform.quote_identifier("users"), "\"users\"");
    }

    #[test]
    fn quotes_each_dotted_piece() {
        assert_eq!(
            SqlitePlatform.quote_identifier("main.users.id"),
            "\"main\".\"users\".\"id\""
        );
    }

    #[test]
    fn doubles_embedded_quotes() {
        assert_eq!(
            SqlitePlatform.quote_single_identifier("has\"quote"),
            "\"has\"\"quote\""
        );
    }

    #[test]
    fn single_identifier_keeps_dots_literal() {
        assert_eq!(
            SqlitePlatform.quote_single_identifier("a.b"),
            "\"a.b\""
        );
    }
}
