//! Selector grammar: `tag`, `tag:N`, `tag:-N`, `tag:A-B`, `all`, and comma-separated unions.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn term_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_.-]*?)(?::(-?\d+)(?:-(\d+))?)?$").expect("valid regex")
    })
}

/// The fixed tag sets that the `all` sentinel expands to.
///
/// Membership differs per operation family; the lists are kept exactly as the utilities have
/// always used them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSet {
    /// delete, edit, clone
    Editable,
    /// apply-transform
    Transformable,
    /// add-animation
    Animatable,
    /// add-group
    Groupable,
    /// layering neighbour search (paint order)
    Paintable,
}

impl ShapeSet {
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Editable => &[
                "path", "line", "circle", "rect", "ellipse", "polygon", "polyline", "text", "g",
            ],
            Self::Transformable => &["path", "line", "circle", "rect", "ellipse", "polygon", "g"],
            Self::Animatable => &[
                "path", "line", "circle", "rect", "ellipse", "polygon", "g", "text",
            ],
            Self::Groupable => &[
                "path", "line", "circle", "rect", "ellipse", "polygon", "polyline", "text",
            ],
            Self::Paintable => &[
                "path", "line", "circle", "rect", "ellipse", "polygon", "text", "g",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Tag(String),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Every,
    /// Negative values count from the end.
    At(i64),
    /// Inclusive ordinal range.
    Range(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorTerm {
    pub target: Target,
    pub index: Index,
}

impl SelectorTerm {
    pub fn label(&self) -> &str {
        match &self.target {
            Target::Tag(t) => t,
            Target::All => "all",
        }
    }

    /// Resolves this term's ordinals against `count` candidates.
    ///
    /// Out-of-range ordinals are dropped; callers that need exactly one element check for that.
    pub fn ordinals(&self, count: usize) -> Vec<usize> {
        match self.index {
            Index::Every => (0..count).collect(),
            Index::At(i) => normalize_index(i, count).into_iter().collect(),
            Index::Range(a, b) if a < count => (a..=b.min(count - 1)).collect(),
            Index::Range(..) => Vec::new(),
        }
    }
}

/// Maps a possibly negative index onto `[0, count)`.
pub fn normalize_index(index: i64, count: usize) -> Option<usize> {
    let count = i64::try_from(count).ok()?;
    let i = if index < 0 { count + index } else { index };
    (0..count).contains(&i).then_some(i as usize)
}

impl fmt::Display for SelectorTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())?;
        match self.index {
            Index::Every => Ok(()),
            Index::At(i) => write!(f, ":{i}"),
            Index::Range(a, b) => write!(f, ":{a}-{b}"),
        }
    }
}

impl FromStr for SelectorTerm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidSelector {
            selector: s.to_string(),
        };
        let caps = term_regex().captures(s).ok_or_else(invalid)?;
        let name = &caps[1];
        let target = if name.eq_ignore_ascii_case("all") {
            Target::All
        } else {
            Target::Tag(name.to_string())
        };
        let index = match (caps.get(2), caps.get(3)) {
            (None, _) => Index::Every,
            (Some(a), None) => Index::At(a.as_str().parse().map_err(|_| invalid())?),
            (Some(a), Some(b)) => {
                let a: usize = a.as_str().parse().map_err(|_| invalid())?;
                let b: usize = b.as_str().parse().map_err(|_| invalid())?;
                if a > b {
                    return Err(invalid());
                }
                Index::Range(a, b)
            }
        };
        Ok(Self { target, index })
    }
}

/// A parsed, possibly comma-separated selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub terms: Vec<SelectorTerm>,
}

impl Selection {
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Single-target operations need exactly one `tag:N` term.
    pub fn require_single(&self) -> Result<&SelectorTerm> {
        match self.terms.as_slice() {
            [term] if matches!(term.index, Index::At(_)) => Ok(term),
            _ => Err(Error::usage(
                "Selector must include index (e.g., path:0, circle:1)",
            )),
        }
    }

    /// `true` when the whole selection is one explicit `tag:N` term.
    pub fn is_single_index(&self) -> bool {
        matches!(self.terms.as_slice(), [t] if matches!(t.index, Index::At(_)))
    }

    /// The user-facing name of what was selected (`circle`, `all`, `path,circle`).
    pub fn label(&self) -> String {
        self.terms
            .iter()
            .map(SelectorTerm::label)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let terms = s
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<SelectorTerm>>>()?;
        if terms.is_empty() {
            return Err(Error::InvalidSelector {
                selector: s.to_string(),
            });
        }
        Ok(Self { terms })
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_term_form() {
        let sel = Selection::parse("path, circle:2,rect:-1,line:1-3,all").unwrap();
        assert_eq!(
            sel.terms,
            vec![
                SelectorTerm {
                    target: Target::Tag("path".into()),
                    index: Index::Every
                },
                SelectorTerm {
                    target: Target::Tag("circle".into()),
                    index: Index::At(2)
                },
                SelectorTerm {
                    target: Target::Tag("rect".into()),
                    index: Index::At(-1)
                },
                SelectorTerm {
                    target: Target::Tag("line".into()),
                    index: Index::Range(1, 3)
                },
                SelectorTerm {
                    target: Target::All,
                    index: Index::Every
                },
            ]
        );
        assert_eq!(sel.to_string(), "path,circle:2,rect:-1,line:1-3,all");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Selection::parse("").is_err());
        assert!(Selection::parse("circle:x").is_err());
        assert!(Selection::parse("circle:3-1").is_err());
        assert!(Selection::parse("<circle>").is_err());
    }

    #[test]
    fn hyphenated_tag_names_are_not_ranges() {
        let term: SelectorTerm = "font-face".parse().unwrap();
        assert_eq!(term.target, Target::Tag("font-face".into()));
        assert_eq!(term.index, Index::Every);
    }

    #[test]
    fn negative_index_counts_from_end() {
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(-3, 3), Some(0));
        assert_eq!(normalize_index(-4, 3), None);
        assert_eq!(normalize_index(3, 3), None);
    }

    #[test]
    fn range_ordinals_skip_out_of_range() {
        let term: SelectorTerm = "path:1-5".parse().unwrap();
        assert_eq!(term.ordinals(3), vec![1, 2]);
    }

    #[test]
    fn huge_range_bounds_are_clamped_to_the_candidates() {
        let term: SelectorTerm = "circle:0-18446744073709551615".parse().unwrap();
        assert_eq!(term.ordinals(3), vec![0, 1, 2]);
        let past_end: SelectorTerm = "circle:5-18446744073709551615".parse().unwrap();
        assert!(past_end.ordinals(3).is_empty());
        assert!(term.ordinals(0).is_empty());
    }

    #[test]
    fn require_single_needs_an_index() {
        assert!(Selection::parse("circle").unwrap().require_single().is_err());
        assert!(Selection::parse("circle:0,rect:1")
            .unwrap()
            .require_single()
            .is_err());
        assert!(Selection::parse("circle:-1").unwrap().require_single().is_ok());
    }
}
