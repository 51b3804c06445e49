//! Maya ASCII statement parser.
//!
//! A `.ma` file is a flat stream of MEL commands terminated by `;`. The
//! parser splits the stream into tokens (bare words and double-quoted
//! strings), groups them per statement, and decodes the handful of commands
//! the loader cares about.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Errors that can occur during `.ma` parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unterminated string starting at line {0}")]
    UnterminatedString(usize),

    #[error("Unexpected end of file in statement starting at line {0}")]
    UnexpectedEof(usize),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// One decoded command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaStatement {
    /// `requires maya "2024";`
    Requires { plugin: String, version: String },

    /// `currentUnit -l centimeter -a degree -t film;`
    CurrentUnit {
        linear: Option<String>,
        angle: Option<String>,
        time: Option<String>,
    },

    /// `fileInfo "application" "maya";`
    FileInfo { key: String, value: String },

    /// `createNode transform -s -n "persp" -p "grp";`
    CreateNode {
        node_type: String,
        name: String,
        parent: Option<String>,
        shared: bool,
    },

    /// `setAttr -s 4 ".pt[0:3]" -type "float3" ...;`
    ///
    /// Only `-type` is kept; `-s` and the lock/keyable flags are consumed.
    SetAttr {
        attr: String,
        type_hint: Option<String>,
        values: Vec<String>,
    },

    /// `connectAttr "a.out" "b.in";`
    ConnectAttr { src: String, dst: String },

    /// `select -ne :time1;`
    Select { name: String },

    /// Any other command, by name
    Other(String),
}

// Flags that consume the following token
const CREATE_NODE_VALUE_FLAGS: &[&str] = &["-n", "-name", "-p", "-parent"];
const CURRENT_UNIT_VALUE_FLAGS: &[&str] = &["-l", "-linear", "-a", "-angle", "-t", "-time"];
const REQUIRES_VALUE_FLAGS: &[&str] = &["-nodeType", "-dataType"];
const CONNECT_ATTR_VALUE_FLAGS: &[&str] = &["-l", "-lock"];
const SET_ATTR_VALUE_FLAGS: &[&str] = &[
    "-type",
    "-typ",
    "-s",
    "-size",
    "-k",
    "-keyable",
    "-l",
    "-lock",
    "-cb",
    "-channelBox",
    "-c",
    "-clamp",
    "-ch",
    "-caching",
];
const SET_ATTR_SWITCH_FLAGS: &[&str] = &["-av", "-alteredValue"];

#[derive(Clone, Debug, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    fn word(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// `-name` style flag. `-1.5` and quoted strings are values.
    fn is_flag(&self) -> bool {
        !self.quoted
            && self
                .text
                .strip_prefix('-')
                .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()))
    }
}

/// Statement-level `.ma` parser.
pub struct MaParser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> MaParser<'a> {
    /// Create a new parser from file contents.
    pub fn new(content: &'a str) -> Self {
        Self {
            chars: content.chars().peekable(),
            line: 1,
        }
    }

    /// Parse every remaining statement.
    pub fn parse(&mut self) -> ParseResult<Vec<MaStatement>> {
        let mut statements = Vec::new();
        while let Some(statement) = self.next_statement()? {
            statements.push(statement);
        }
        Ok(statements)
    }

    /// Parse the next statement, or `None` at end of input.
    pub fn next_statement(&mut self) -> ParseResult<Option<MaStatement>> {
        loop {
            let Some((line, tokens)) = self.read_tokens()? else {
                return Ok(None);
            };
            // Stray `;`
            if tokens.is_empty() {
                continue;
            }
            return parse_statement(line, tokens).map(Some);
        }
    }

    /// Current line (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '/' && self.peek_second() == Some('/') {
                while self.chars.peek().is_some_and(|&c| c != '\n') {
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    /// Read the tokens of one statement, consuming its `;`.
    fn read_tokens(&mut self) -> ParseResult<Option<(usize, Vec<Token>)>> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut start_line = self.line;

        loop {
            self.skip_whitespace_and_comments();
            let Some(&c) = self.chars.peek() else {
                if tokens.is_empty() {
                    return Ok(None);
                }
                return Err(ParseError::UnexpectedEof(start_line));
            };
            if tokens.is_empty() {
                start_line = self.line;
            }

            match c {
                ';' => {
                    self.bump();
                    return Ok(Some((start_line, tokens)));
                }
                '"' => {
                    self.bump();
                    tokens.push(self.read_string()?);
                }
                // Long strings are split as `"abc" + "def"`
                '+' if tokens.last().is_some_and(|t| t.quoted)
                    && self.peek_second().is_some_and(char::is_whitespace) =>
                {
                    self.bump();
                    self.skip_whitespace_and_comments();
                    if self.chars.peek() == Some(&'"') {
                        self.bump();
                        let tail = self.read_string()?;
                        if let Some(last) = tokens.last_mut() {
                            last.text.push_str(&tail.text);
                        }
                    } else {
                        tokens.push(Token::word("+"));
                    }
                }
                _ => tokens.push(self.read_word()),
            }
        }
    }

    fn read_word(&mut self) -> Token {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == ';' || c == '"' {
                break;
            }
            text.push(c);
            self.bump();
        }
        Token::word(text)
    }

    /// Read a string body; the opening quote is already consumed.
    fn read_string(&mut self) -> ParseResult<Token> {
        let start_line = self.line;
        let mut text = String::new();

        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString(start_line)),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedString(start_line)),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(c) => text.push(c),
            }
        }

        Ok(Token { text, quoted: true })
    }
}

/// Parse `.ma` content into statements.
pub fn parse_ma(content: &str) -> ParseResult<Vec<MaStatement>> {
    MaParser::new(content).parse()
}

/// Flags and positional arguments of one command.
struct Args<'t> {
    flags: Vec<(&'t str, Option<&'t str>)>,
    positional: Vec<&'t str>,
}

impl<'t> Args<'t> {
    fn split(
        command: &str,
        line: usize,
        tokens: &'t [Token],
        value_flags: &[&str],
    ) -> ParseResult<Self> {
        let mut flags = Vec::new();
        let mut positional = Vec::new();
        let mut iter = tokens.iter();

        while let Some(token) = iter.next() {
            if !token.is_flag() {
                positional.push(token.text.as_str());
                continue;
            }
            let flag = token.text.as_str();
            if value_flags.contains(&flag) {
                let value = iter.next().ok_or_else(|| missing_value(line, command, flag))?;
                flags.push((flag, Some(value.text.as_str())));
            } else {
                flags.push((flag, None));
            }
        }

        Ok(Self { flags, positional })
    }

    fn has(&self, names: &[&str]) -> bool {
        self.flags.iter().any(|(flag, _)| names.contains(flag))
    }

    fn value(&self, names: &[&str]) -> Option<String> {
        self.flags
            .iter()
            .rev()
            .find(|(flag, _)| names.contains(flag))
            .and_then(|(_, value)| value.map(str::to_string))
    }
}

fn missing_value(line: usize, command: &str, flag: &str) -> ParseError {
    ParseError::Parse {
        line,
        message: format!("{} flag {} expects a value", command, flag),
    }
}

fn missing_operand(line: usize, command: &str, what: &str) -> ParseError {
    ParseError::Parse {
        line,
        message: format!("{} is missing its {}", command, what),
    }
}

fn parse_statement(line: usize, tokens: Vec<Token>) -> ParseResult<MaStatement> {
    let (command, args) = match tokens.split_first() {
        Some((command, args)) if !command.quoted => (command.text.as_str(), args),
        Some((command, _)) => return Ok(MaStatement::Other(command.text.clone())),
        None => return Ok(MaStatement::Other(String::new())),
    };

    match command {
        "requires" => {
            let args = Args::split(command, line, args, REQUIRES_VALUE_FLAGS)?;
            match args.positional.as_slice() {
                [plugin, version, ..] => Ok(MaStatement::Requires {
                    plugin: plugin.to_string(),
                    version: version.to_string(),
                }),
                _ => Err(missing_operand(line, command, "plugin and version")),
            }
        }
        "currentUnit" => {
            let args = Args::split(command, line, args, CURRENT_UNIT_VALUE_FLAGS)?;
            Ok(MaStatement::CurrentUnit {
                linear: args.value(&["-l", "-linear"]),
                angle: args.value(&["-a", "-angle"]),
                time: args.value(&["-t", "-time"]),
            })
        }
        "fileInfo" => {
            let args = Args::split(command, line, args, &[])?;
            match args.positional.as_slice() {
                [key, value, ..] => Ok(MaStatement::FileInfo {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                _ => Err(missing_operand(line, command, "key and value")),
            }
        }
        "createNode" => {
            let args = Args::split(command, line, args, CREATE_NODE_VALUE_FLAGS)?;
            let node_type = args
                .positional
                .first()
                .ok_or_else(|| missing_operand(line, command, "node type"))?;
            Ok(MaStatement::CreateNode {
                node_type: node_type.to_string(),
                name: args.value(&["-n", "-name"]).unwrap_or_default(),
                parent: args.value(&["-p", "-parent"]),
                shared: args.has(&["-s", "-shared"]),
            })
        }
        "setAttr" => parse_set_attr(line, args),
        "connectAttr" => {
            let args = Args::split(command, line, args, CONNECT_ATTR_VALUE_FLAGS)?;
            match args.positional.as_slice() {
                [src, dst, ..] => Ok(MaStatement::ConnectAttr {
                    src: src.to_string(),
                    dst: dst.to_string(),
                }),
                _ => Err(missing_operand(line, command, "source and destination plugs")),
            }
        }
        "select" => {
            let args = Args::split(command, line, args, &[])?;
            match args.positional.first() {
                Some(name) => Ok(MaStatement::Select {
                    name: name.to_string(),
                }),
                None => Ok(MaStatement::Other(command.to_string())),
            }
        }
        _ => Ok(MaStatement::Other(command.to_string())),
    }
}

/// `setAttr` takes flags before the attribute and `-type` anywhere.
/// Unknown flag-like tokens after the attribute are values.
fn parse_set_attr(line: usize, args: &[Token]) -> ParseResult<MaStatement> {
    let mut attr: Option<String> = None;
    let mut type_hint = None;
    let mut values = Vec::new();
    let mut iter = args.iter();

    while let Some(token) = iter.next() {
        if token.is_flag() {
            let flag = token.text.as_str();
            if SET_ATTR_VALUE_FLAGS.contains(&flag) {
                let value = iter
                    .next()
                    .ok_or_else(|| missing_value(line, "setAttr", flag))?;
                if flag == "-type" || flag == "-typ" {
                    type_hint = Some(value.text.clone());
                }
                continue;
            }
            if SET_ATTR_SWITCH_FLAGS.contains(&flag) || attr.is_none() {
                continue;
            }
        }

        if attr.is_none() {
            attr = Some(token.text.clone());
        } else {
            values.push(token.text.clone());
        }
    }

    let attr = attr.ok_or_else(|| missing_operand(line, "setAttr", "attribute name"))?;
    Ok(MaStatement::SetAttr {
        attr,
        type_hint,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_statements() {
        let ma = r#"//Maya ASCII 2024 scene
//Name: cube.ma
requires maya "2024";
requires -nodeType "aiOptions" "mtoa" "5.3.0";
currentUnit -l centimeter -a degree -t film;
fileInfo "application" "maya";
createNode transform -n "pCube1";
	setAttr ".t" -type "double3" 0 1.5 -2 ;
createNode mesh -n "pCubeShape1" -p "pCube1";
connectAttr "pCube1.tx" "pCubeShape1.v";
"#;

        let statements = parse_ma(ma).unwrap();
        assert_eq!(statements.len(), 8);
        assert_eq!(
            statements[1],
            MaStatement::Requires {
                plugin: "mtoa".into(),
                version: "5.3.0".into()
            }
        );
        assert_eq!(
            statements[2],
            MaStatement::CurrentUnit {
                linear: Some("centimeter".into()),
                angle: Some("degree".into()),
                time: Some("film".into()),
            }
        );
        assert_eq!(
            statements[5],
            MaStatement::SetAttr {
                attr: ".t".into(),
                type_hint: Some("double3".into()),
                values: vec!["0".into(), "1.5".into(), "-2".into()],
            }
        );
        assert_eq!(
            statements[6],
            MaStatement::CreateNode {
                node_type: "mesh".into(),
                name: "pCubeShape1".into(),
                parent: Some("pCube1".into()),
                shared: false,
            }
        );
        assert_eq!(
            statements[7],
            MaStatement::ConnectAttr {
                src: "pCube1.tx".into(),
                dst: "pCubeShape1.v".into()
            }
        );
    }

    #[test]
    fn test_set_attr_flags() {
        let statements = parse_ma(
            r#"setAttr -s 4 ".pt[0:3]" -1 -.5 2e-3 -inf;
setAttr -av -k off ".v" no;
setAttr -l on -cb on ".tx";"#,
        )
        .unwrap();

        match &statements[0] {
            MaStatement::SetAttr {
                attr,
                type_hint,
                values,
            } => {
                assert_eq!(attr, ".pt[0:3]");
                assert!(type_hint.is_none());
                assert_eq!(values, &["-1", "-.5", "2e-3", "-inf"]);
            }
            other => panic!("Expected setAttr, got {:?}", other),
        }
        match &statements[1] {
            MaStatement::SetAttr { attr, values, .. } => {
                assert_eq!(attr, ".v");
                assert_eq!(values, &["no"]);
            }
            other => panic!("Expected setAttr, got {:?}", other),
        }
        match &statements[2] {
            MaStatement::SetAttr { attr, values, .. } => {
                assert_eq!(attr, ".tx");
                assert!(values.is_empty());
            }
            other => panic!("Expected setAttr, got {:?}", other),
        }
    }

    #[test]
    fn test_strings_and_comments() {
        let ma = r#"createNode script -n "uiConfigurationScriptNode";
	setAttr ".b" -type "string" "// not a comment; still \"inside\"\n"
		+ "second part";
// createNode transform -n "commented";
select -ne :time1;"#;

        let statements = parse_ma(ma).unwrap();
        assert_eq!(statements.len(), 3);
        match &statements[1] {
            MaStatement::SetAttr { values, .. } => {
                assert_eq!(
                    values,
                    &["// not a comment; still \"inside\"\nsecond part"]
                );
            }
            other => panic!("Expected setAttr, got {:?}", other),
        }
        assert_eq!(
            statements[2],
            MaStatement::Select {
                name: ":time1".into()
            }
        );
    }

    #[test]
    fn test_shared_and_other_commands() {
        let statements = parse_ma(
            r#"createNode camera -s -n "perspShape" -p "persp";
rename -uid "C2F1B8A0-0000-0000-0000-000000000000";
lockNode -l 1 ;;"#,
        )
        .unwrap();

        assert_eq!(statements.len(), 3);
        assert!(matches!(
            &statements[0],
            MaStatement::CreateNode { shared: true, .. }
        ));
        assert_eq!(statements[1], MaStatement::Other("rename".into()));
        assert_eq!(statements[2], MaStatement::Other("lockNode".into()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_ma("createNode transform -n \"pCube1;\n\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString(1)));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_ma("requires maya \"2024\";\n\ncreateNode transform -n \"a\"").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof(3)));
    }

    #[test]
    fn test_flag_without_value() {
        let err = parse_ma("createNode transform -n;").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 1, .. }));

        let err = parse_ma("connectAttr \"a.x\";").unwrap_err();
        assert!(matches!(err, ParseError::Parse { .. }));
    }

    #[test]
    fn test_line_tracking() {
        let mut parser = MaParser::new("requires maya \"2024\";\n\nfileInfo \"a\" \"b\";\n");
        assert!(parser.next_statement().unwrap().is_some());
        assert!(parser.next_statement().unwrap().is_some());
        assert!(parser.next_statement().unwrap().is_none());
        assert_eq!(parser.line(), 4);
    }
}
