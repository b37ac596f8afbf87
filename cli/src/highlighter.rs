use logos::Logos;
use nu_ansi_term::{Color, Style};
use reedline::StyledText;

use crate::lexer::Token;

fn color(token: Option<Token>) -> Color {
    match token {
        Some(Token::Comment) => Color::DarkGray,
        Some(Token::Text) => Color::Green,
        Some(Token::Number) => Color::Cyan,
        Some(Token::SetWord) => Color::Red,
        Some(Token::Decorated) => Color::Yellow,
        Some(Token::LBracket | Token::RBracket | Token::LParen | Token::RParen) => Color::Magenta,
        Some(Token::Other) | None => Color::White,
    }
}

pub struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let mut curr_end = 0;

        for (token, span) in Token::lexer(line).spanned() {
            if span.start > curr_end {
                output.push((Style::new(), line[curr_end..span.start].to_string()));
            }
            let style = Style::new().fg(color(token.ok()));
            output.push((style, line[span.clone()].to_string()));
            curr_end = span.end;
        }
        if curr_end < line.len() {
            output.push((Style::new(), line[curr_end..].to_string()));
        }

        output
    }
}
