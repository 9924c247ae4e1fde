//! AS-path pattern expressions.
//!
//! A pattern is a whitespace separated list of clauses, each one a qualifier
//! symbol followed by an AS number:
//!
//! | Symbol | Clause is satisfied by |
//! |--------|------------------------|
//! | `S`    | the next resolved AS after the cursor; only gaps may be skipped |
//! | `L`    | any later AS traversal; gaps and other networks may be skipped |
//! | `E`    | like `L`, and it must also be the last resolved AS of the path |
//!
//! Patterns run against [`AsPath::traversals`](atlasmon_protocol::measurement::AsPath::traversals),
//! so a network spanning several hops counts once. Unresolved hops never make
//! a clause fail on their own. New qualifiers are added to [`Qualifier`].

use std::fmt;
use std::str::FromStr;

use atlasmon_protocol::measurement::Asn;

use crate::error::PatternError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Strict,
    Loose,
    End,
}

impl Qualifier {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "S" => Some(Qualifier::Strict),
            "L" => Some(Qualifier::Loose),
            "E" => Some(Qualifier::End),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Qualifier::Strict => "S",
            Qualifier::Loose => "L",
            Qualifier::End => "E",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub qualifier: Qualifier,
    pub asn: Asn,
}

/// Parsed AS-path pattern, validated when the configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsPathPattern {
    clauses: Vec<Clause>,
}

impl AsPathPattern {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether every clause is satisfied, in order, by the given traversals.
    pub fn matches(&self, traversals: &[Option<Asn>]) -> bool {
        match_from(&self.clauses, traversals, 0)
    }
}

fn match_from(clauses: &[Clause], path: &[Option<Asn>], cursor: usize) -> bool {
    let Some((clause, rest)) = clauses.split_first() else {
        return true;
    };
    if cursor >= path.len() {
        return false;
    }

    let wanted = Some(clause.asn);
    match clause.qualifier {
        Qualifier::Strict => path[cursor..]
            .iter()
            .position(Option::is_some)
            .map(|offset| cursor + offset)
            .is_some_and(|at| path[at] == wanted && match_from(rest, path, at + 1)),
        // A network can show up more than once (loops), so every occurrence
        // is a candidate for the remaining clauses.
        Qualifier::Loose => (cursor..path.len())
            .filter(|&at| path[at] == wanted)
            .any(|at| match_from(rest, path, at + 1)),
        Qualifier::End => path
            .iter()
            .rposition(Option::is_some)
            .filter(|&last| last >= cursor && path[last] == wanted)
            .is_some_and(|last| match_from(rest, path, last + 1)),
    }
}

impl FromStr for AsPathPattern {
    type Err = PatternError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut tokens = raw.split_whitespace();
        let mut clauses = Vec::new();

        while let Some(symbol) = tokens.next() {
            let qualifier =
                Qualifier::from_symbol(symbol).ok_or_else(|| PatternError::UnknownQualifier {
                    token: symbol.to_string(),
                    clause: clauses.len(),
                })?;
            let token = tokens.next().ok_or_else(|| PatternError::MissingAsn {
                qualifier: symbol.to_string(),
            })?;
            let digits = token.strip_prefix("AS").unwrap_or(token);
            let asn = digits
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| digits.parse::<Asn>().ok())
                .flatten()
                .ok_or_else(|| PatternError::InvalidAsn {
                    token: token.to_string(),
                })?;
            clauses.push(Clause { qualifier, asn });
        }

        if clauses.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self { clauses })
    }
}

impl fmt::Display for AsPathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, clause) in self.clauses.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{} {}", clause.qualifier.symbol(), clause.asn)?;
        }
        Ok(())
    }
}
