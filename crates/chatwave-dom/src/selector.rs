//! # Selectors
//!
//! Parser and matcher for the CSS selector subset used to reach into the
//! hosted page: type, `#id`, `.class`, attribute selectors (`[a]`, `[a=v]`,
//! `[a*=v]`, `[a^=v]`, `[a$=v]`, `[a~=v]`, `[a|=v]`), the structural
//! pseudo-classes `:first-child`, `:last-child` and `:nth-child(An+B)`,
//! descendant and child combinators, and comma-separated lists.

use std::rc::Rc;

use thiserror::Error;

use crate::Node;

/// Errors produced while parsing a selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unexpected end of selector")]
    UnexpectedEnd,

    #[error("Unsupported pseudo-class ':{0}'")]
    UnsupportedPseudo(String),

    #[error("Invalid nth-child argument '{0}'")]
    InvalidNth(String),
}

/// How two compound selectors relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
    Includes(String),
    DashMatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
    /// `:nth-child(An+B)`
    NthChild { a: i32, b: i32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
    }
}

/// A chain of compounds, e.g. `ul > li.item a`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
    /// `combinators[i]` joins `parts[i]` and `parts[i + 1]`.
    combinators: Vec<Combinator>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    /// Parse a selector string.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Parser::new(source).parse_list()
    }

    /// Whether `element` matches any selector in the list.
    pub fn matches(&self, element: &Rc<Node>) -> bool {
        if !element.is_element() {
            return false;
        }
        self.selectors
            .iter()
            .any(|complex| matches_complex(complex, complex.parts.len() - 1, element))
    }
}

fn matches_complex(complex: &Complex, index: usize, element: &Rc<Node>) -> bool {
    if !matches_compound(&complex.parts[index], element) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match complex.combinators[index - 1] {
        Combinator::Child => element
            .parent_element()
            .is_some_and(|parent| matches_complex(complex, index - 1, &parent)),
        Combinator::Descendant => {
            let mut ancestor = element.parent_element();
            while let Some(node) = ancestor {
                if matches_complex(complex, index - 1, &node) {
                    return true;
                }
                ancestor = node.parent_element();
            }
            false
        }
    }
}

fn matches_compound(compound: &Compound, element: &Rc<Node>) -> bool {
    if let Some(tag) = &compound.tag {
        let matches_tag = element
            .tag_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(tag));
        if !matches_tag {
            return false;
        }
    }

    if !compound
        .ids
        .iter()
        .all(|id| element.get_attribute("id").as_deref() == Some(id.as_str()))
    {
        return false;
    }

    if !compound.classes.iter().all(|class| element.has_class(class)) {
        return false;
    }

    if !compound.attrs.iter().all(|attr| matches_attr(attr, element)) {
        return false;
    }

    compound
        .pseudos
        .iter()
        .all(|pseudo| matches_pseudo(*pseudo, element))
}

fn matches_attr(attr: &AttrSelector, element: &Rc<Node>) -> bool {
    let Some(actual) = element.get_attribute(&attr.name) else {
        return false;
    };

    match &attr.op {
        AttrOp::Exists => true,
        AttrOp::Equals(v) => actual == *v,
        // An empty needle never matches for substring operators.
        AttrOp::Contains(v) => !v.is_empty() && actual.contains(v.as_str()),
        AttrOp::Prefix(v) => !v.is_empty() && actual.starts_with(v.as_str()),
        AttrOp::Suffix(v) => !v.is_empty() && actual.ends_with(v.as_str()),
        AttrOp::Includes(v) => actual.split_whitespace().any(|word| word == v),
        AttrOp::DashMatch(v) => actual == *v || actual.starts_with(&format!("{}-", v)),
    }
}

fn matches_pseudo(pseudo: Pseudo, element: &Rc<Node>) -> bool {
    let Some(parent) = element.parent() else {
        return false;
    };
    let siblings = parent.element_children();
    let Some(position) = siblings.iter().position(|n| Rc::ptr_eq(n, element)) else {
        return false;
    };
    let index = position as i32 + 1;

    match pseudo {
        Pseudo::FirstChild => index == 1,
        Pseudo::LastChild => position + 1 == siblings.len(),
        Pseudo::NthChild { a, b } => {
            if a == 0 {
                index == b
            } else {
                let diff = index - b;
                diff % a == 0 && diff / a >= 0
            }
        }
    }
}

/// Hand-rolled recursive descent over the selector text.
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(ch) => Err(SelectorError::UnexpectedChar {
                ch,
                pos: self.pos - 1,
            }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn parse_list(mut self) -> Result<SelectorList, SelectorError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.unexpected()),
            }
        }

        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.unexpected()),
            }
            parts.push(self.parse_compound()?);
        }

        Ok(Complex { parts, combinators })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;

        match self.peek() {
            Some('*') => {
                self.bump();
                universal = true;
            }
            Some(c) if is_ident_char(c) => compound.tag = Some(self.parse_ident()?),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('#') => {
                    self.bump();
                    compound.ids.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.bump();
                    compound.pseudos.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                ident.push(self.bump().ok_or(SelectorError::UnexpectedEnd)?);
            } else if is_ident_char(c) {
                self.bump();
                ident.push(c);
            } else {
                break;
            }
        }

        if ident.is_empty() {
            return Err(self.unexpected());
        }
        Ok(ident)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op_char = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrSelector {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some('=') => None,
            Some(c @ ('*' | '^' | '$' | '~' | '|')) => {
                self.bump();
                Some(c)
            }
            _ => return Err(self.unexpected()),
        };
        self.expect('=')?;
        self.skip_whitespace();
        let value = self.parse_attr_value()?;
        self.skip_whitespace();
        self.expect(']')?;

        let op = match op_char {
            None => AttrOp::Equals(value),
            Some('*') => AttrOp::Contains(value),
            Some('^') => AttrOp::Prefix(value),
            Some('$') => AttrOp::Suffix(value),
            Some('~') => AttrOp::Includes(value),
            Some(_) => AttrOp::DashMatch(value),
        };
        Ok(AttrSelector { name, op })
    }

    fn parse_attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        None => return Err(SelectorError::UnexpectedEnd),
                        Some('\\') => {
                            value.push(self.bump().ok_or(SelectorError::UnexpectedEnd)?);
                        }
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                    }
                }
                Ok(value)
            }
            _ => self.parse_ident(),
        }
    }

    fn parse_pseudo(&mut self) -> Result<Pseudo, SelectorError> {
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(Pseudo::FirstChild),
            "last-child" => Ok(Pseudo::LastChild),
            "nth-child" => {
                self.expect('(')?;
                let mut arg = String::new();
                loop {
                    match self.bump() {
                        None => return Err(SelectorError::UnexpectedEnd),
                        Some(')') => break,
                        Some(c) => arg.push(c),
                    }
                }
                let (a, b) = parse_nth(&arg)?;
                Ok(Pseudo::NthChild { a, b })
            }
            _ => Err(SelectorError::UnsupportedPseudo(name)),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Parse the `An+B` micro-syntax.
fn parse_nth(arg: &str) -> Result<(i32, i32), SelectorError> {
    let compact: String = arg
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let invalid = || SelectorError::InvalidNth(arg.trim().to_string());

    match compact.as_str() {
        "odd" => return Ok((2, 1)),
        "even" => return Ok((2, 0)),
        "" => return Err(invalid()),
        _ => {}
    }

    let Some(n_pos) = compact.find('n') else {
        return compact.parse::<i32>().map(|b| (0, b)).map_err(|_| invalid());
    };

    let a = match &compact[..n_pos] {
        "" | "+" => 1,
        "-" => -1,
        coefficient => coefficient.parse::<i32>().map_err(|_| invalid())?,
    };
    let rest = &compact[n_pos + 1..];
    let b = if rest.is_empty() {
        0
    } else {
        let digits = rest.strip_prefix('+').unwrap_or(rest);
        digits.parse::<i32>().map_err(|_| invalid())?
    };

    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn doc() -> Document {
        Document::parse_html(
            r##"<html><body>
            <div id="app" class="shell main">
                <ul role="list">
                    <li class="row _1ht2"><a class="_1ht5" href="#1">One</a></li>
                    <li class="row"><a class="_1ht5" href="#2">Two</a></li>
                    <li class="row"><img src="https://cdn/x/photo.jpg?oh=1"></li>
                </ul>
            </div>
            </body></html>"##,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SelectorList::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            SelectorList::parse("div >"),
            Err(SelectorError::UnexpectedEnd)
        ));
        assert!(matches!(
            SelectorList::parse(":hover"),
            Err(SelectorError::UnsupportedPseudo(_))
        ));
        assert!(matches!(
            SelectorList::parse("li:nth-child(x)"),
            Err(SelectorError::InvalidNth(_))
        ));
        assert!(SelectorList::parse("a[href=\"unterminated").is_err());
    }

    #[test]
    fn test_compound_classes() {
        let doc = doc();
        let hits = doc.query_selector_all(".shell.main").unwrap();
        assert_eq!(hits.len(), 1);
        assert!(doc.query_selector(".shell.missing").unwrap().is_none());
    }

    #[test]
    fn test_combinators() {
        let doc = doc();
        assert_eq!(doc.query_selector_all("#app a._1ht5").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("ul > li > a").unwrap().len(), 2);
        assert!(doc.query_selector("div > a").unwrap().is_none());

        let selected = doc.query_selector("._1ht2 a._1ht5").unwrap().unwrap();
        assert_eq!(selected.text_content(), "One");
    }

    #[test]
    fn test_fragment_hrefs() {
        let doc = doc();
        assert_eq!(doc.query_selector_all("a[href^=\"#\"]").unwrap().len(), 2);
        let two = doc.query_selector("a[href='#2']").unwrap().unwrap();
        assert_eq!(two.text_content(), "Two");
    }

    #[test]
    fn test_structural_pseudos() {
        let doc = doc();
        let second = doc.query_selector("li.row:nth-child(2) a").unwrap().unwrap();
        assert_eq!(second.text_content(), "Two");

        let first = doc.query_selector("li:first-child a").unwrap().unwrap();
        assert_eq!(first.text_content(), "One");

        assert_eq!(doc.query_selector_all("li:nth-child(odd)").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("li:nth-child(2n)").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("li:last-child img").unwrap().len(), 1);
    }

    #[test]
    fn test_attribute_operators() {
        let doc = doc();
        assert_eq!(doc.query_selector_all("[id='app'] a").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("ul[role=\"list\"]").unwrap().len(), 1);
        assert!(doc
            .query_selector("img[src*=\"photo.jpg\"]")
            .unwrap()
            .is_some());
        assert!(doc.query_selector("img[src^='https://']").unwrap().is_some());
        assert!(doc.query_selector("[class~='main']").unwrap().is_some());
        assert!(doc.query_selector("img[src*='']").unwrap().is_none());
    }

    #[test]
    fn test_selector_list() {
        let doc = doc();
        assert_eq!(doc.query_selector_all("ul, #app").unwrap().len(), 2);
    }

    #[test]
    fn test_nth_syntax() {
        assert_eq!(parse_nth("3"), Ok((0, 3)));
        assert_eq!(parse_nth("2n+1"), Ok((2, 1)));
        assert_eq!(parse_nth(" -n + 3 "), Ok((-1, 3)));
        assert_eq!(parse_nth("even"), Ok((2, 0)));
    }
}
