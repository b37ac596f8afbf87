use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r";[^\n]*")]
    Comment,

    // Strict text (must end with ")
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Text,

    #[regex(r"-?[0-9]+(\.[0-9]+)?", priority = 4)]
    Number,

    #[regex(r#"[^ \t\r\n\f\[\]\(\)";]+:"#, priority = 3)]
    SetWord,

    // :x ^x @x /x 'x ~x~
    #[regex(r#"[:^@/'~][^ \t\r\n\f\[\]\(\)";]*"#, priority = 2)]
    Decorated,

    #[regex(r#"[^ \t\r\n\f\[\]\(\)";]+"#, priority = 1)]
    Other,
}

/// Open brackets left at the end of `buffer`, or `None` when a text
/// literal is left open.
pub fn calculate_depth(buffer: &str) -> Option<usize> {
    let mut depth: isize = 0;

    for token_res in Token::lexer(buffer) {
        match token_res {
            Ok(Token::LBracket) | Ok(Token::LParen) => depth += 1,
            Ok(Token::RBracket) | Ok(Token::RParen) => depth -= 1,

            // Valid tokens that don't affect depth
            Ok(_) => {}

            // An unclosed text literal (or any unknown char).
            Err(_) => {
                return None;
            }
        }
    }

    Some(depth.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_depth() {
        assert_eq!(calculate_depth("1 + 2"), Some(0));
        assert_eq!(calculate_depth("f: func [x] ["), Some(1));
        assert_eq!(calculate_depth("(a [b"), Some(2));
        assert_eq!(calculate_depth("\"[\" ; ["), Some(0));
        assert_eq!(calculate_depth("\"open"), None);
        assert_eq!(calculate_depth("]]"), Some(0));
    }

    #[test]
    fn test_tokens() {
        let tokens: Vec<_> = Token::lexer("x: :y -2 - \"t\" [z]")
            .map(|token| token.unwrap())
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::SetWord,
                Token::Decorated,
                Token::Number,
                Token::Other,
                Token::Text,
                Token::LBracket,
                Token::Other,
                Token::RBracket,
            ]
        );
    }
}
