//! Line-level G-code grammar.
//!
//! Splits one program line into address words (`G1`, `X12.50`, `F300`).
//! A `;` starts a comment that runs to the end of the line, which also
//! covers controllers that terminate every block with a bare `;`.
//! Parenthesised comments are skipped. No modal state is tracked here:
//! callers decide what a block means.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single address word such as `X12.5`. The letter is always uppercase.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

/// All words of one line, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Block {
    pub words: Vec<Word>,
}

impl Block {
    /// Value of the first word with this letter.
    pub fn get(&self, letter: char) -> Option<f64> {
        let letter = letter.to_ascii_uppercase();
        self.words
            .iter()
            .find(|w| w.letter == letter)
            .map(|w| w.value)
    }

    /// True when the block carries the command word `letter`+`number`,
    /// e.g. `('G', 1)` matches both `G1` and `G01`.
    pub fn has_command(&self, letter: char, number: u32) -> bool {
        let letter = letter.to_ascii_uppercase();
        self.words
            .iter()
            .any(|w| w.letter == letter && w.value == f64::from(number))
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub type ParseError = peg::error::ParseError<peg::str::LineCol>;

peg::parser! {
    grammar gcode() for str {
        rule ws() = quiet!{[' ' | '\t' | '\r']*}

        rule digits() = ['0'..='9']+

        rule number() -> f64
            = n:$(['+' | '-']? (digits() ("." ['0'..='9']*)? / "." digits()))
            {? n.parse().or(Err("number")) }

        rule word() -> Word
            = l:['a'..='z' | 'A'..='Z'] ws() v:number() {
                Word { letter: l.to_ascii_uppercase(), value: v }
            }

        rule comment()
            = ";" [_]*
            / "(" [^')']* ")"

        pub rule block() -> Block
            = ws() words:(word() ** ws()) ws() (comment() ws())* { Block { words } }
    }
}

/// Parse one line (without its newline).
pub fn parse_line(line: &str) -> Result<Block, ParseError> {
    gcode::block(line)
}
