//! `key=value` option handling and the typed option records built from it.
//!
//! Records that pass attributes straight through to the generated markup (shape adders, clone,
//! group, use, text) keep every key they do not recognise in an [`AttributeSet`]. All other
//! records reject unknown keys.

use crate::attr::AttributeSet;
use crate::error::{Error, Result};
use crate::mutate::CloneOptions;
use crate::num::{parse_count, parse_number};
use regex::Regex;
use std::sync::OnceLock;

fn option_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_:.-]*)=(.*)$").expect("valid regex"))
}

/// `key=value` arguments in the order they were given. Later duplicates win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionPairs {
    pairs: Vec<(String, String)>,
}

impl OptionPairs {
    /// Splits trailing arguments into plain positionals and `key=value` pairs.
    pub fn split<S: AsRef<str>>(args: &[S]) -> (Vec<String>, Self) {
        let mut positional = Vec::new();
        let mut pairs = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            match option_regex().captures(arg) {
                Some(caps) => pairs.push((caps[1].to_string(), caps[2].to_string())),
                None => positional.push(arg.to_string()),
            }
        }
        (positional, Self { pairs })
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Removes every occurrence of `key`, returning the last value.
    pub fn take(&mut self, key: &str) -> Option<String> {
        let mut found = None;
        self.pairs.retain(|(k, v)| {
            if k == key {
                found = Some(v.clone());
                false
            } else {
                true
            }
        });
        found
    }

    pub fn take_number(&mut self, key: &str) -> Result<Option<f64>> {
        self.take(key)
            .map(|v| parse_number(key, &v))
            .transpose()
    }

    /// Fails with [`Error::UnknownOption`] if any pair was left unconsumed.
    pub fn finish(self) -> Result<()> {
        match self.pairs.into_iter().next() {
            Some((key, _)) => Err(Error::UnknownOption { key }),
            None => Ok(()),
        }
    }

    /// The remaining pairs as attributes to write.
    pub fn into_attributes(self) -> AttributeSet {
        self.pairs
            .into_iter()
            .map(|(k, v)| (k, Some(v)))
            .collect()
    }
}

impl CloneOptions {
    /// `dx`, `dy` and `count` are consumed; everything else overrides attributes on the copies.
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let dx = pairs.take_number("dx")?.unwrap_or(0.0);
        let dy = pairs.take_number("dy")?.unwrap_or(0.0);
        let count = match pairs.take("count") {
            Some(v) => parse_count("count", &v)?,
            None => 1,
        };
        if count == 0 {
            return Err(Error::invalid_option("count", "0"));
        }
        Ok(Self {
            dx,
            dy,
            count,
            overrides: pairs.into_attributes(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Ease {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "linear" => Ok(Self::Linear),
            "ease-in" => Ok(Self::EaseIn),
            "ease-out" => Ok(Self::EaseOut),
            "ease-in-out" => Ok(Self::EaseInOut),
            other => Err(Error::invalid_option("ease", other)),
        }
    }

    pub fn calc_mode(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            _ => "spline",
        }
    }

    pub fn key_splines(self) -> Option<&'static str> {
        match self {
            Self::Linear => None,
            Self::EaseIn => Some("0.42 0 1 1"),
            Self::EaseOut => Some("0 0 0.58 1"),
            Self::EaseInOut => Some("0.42 0 0.58 1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimateOptions {
    pub repeat: String,
    pub ease: Option<Ease>,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            repeat: "indefinite".to_string(),
            ease: None,
        }
    }
}

impl AnimateOptions {
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let repeat = pairs
            .take("repeat")
            .unwrap_or_else(|| "indefinite".to_string());
        let ease = pairs.take("ease").map(|v| Ease::parse(&v)).transpose()?;
        pairs.finish()?;
        Ok(Self { repeat, ease })
    }
}

/// Placement of a linear gradient, in percent of the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradientOptions {
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
}

impl Default for LinearGradientOptions {
    fn default() -> Self {
        Self {
            x1: "0".to_string(),
            y1: "0".to_string(),
            x2: "100".to_string(),
            y2: "0".to_string(),
        }
    }
}

impl LinearGradientOptions {
    /// Explicit `x1`..`y2` keys, or an `angle` in degrees which takes precedence.
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let defaults = Self::default();
        let mut out = Self {
            x1: pairs.take("x1").unwrap_or(defaults.x1),
            y1: pairs.take("y1").unwrap_or(defaults.y1),
            x2: pairs.take("x2").unwrap_or(defaults.x2),
            y2: pairs.take("y2").unwrap_or(defaults.y2),
        };
        if let Some(angle) = pairs.take_number("angle")? {
            out = Self::from_angle(angle);
        }
        pairs.finish()?;
        Ok(out)
    }

    pub fn from_angle(degrees: f64) -> Self {
        let rad = degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        let pct = |v: f64| crate::num::fmt_number(v.round());
        Self {
            x1: pct(50.0 - cos * 50.0),
            y1: pct(50.0 - sin * 50.0),
            x2: pct(50.0 + cos * 50.0),
            y2: pct(50.0 + sin * 50.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadialGradientOptions {
    pub cx: String,
    pub cy: String,
    pub r: String,
    pub fx: Option<String>,
    pub fy: Option<String>,
}

impl Default for RadialGradientOptions {
    fn default() -> Self {
        Self {
            cx: "50".to_string(),
            cy: "50".to_string(),
            r: "50".to_string(),
            fx: None,
            fy: None,
        }
    }
}

impl RadialGradientOptions {
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let defaults = Self::default();
        let out = Self {
            cx: pairs.take("cx").unwrap_or(defaults.cx),
            cy: pairs.take("cy").unwrap_or(defaults.cy),
            r: pairs.take("r").unwrap_or(defaults.r),
            fx: pairs.take("fx"),
            fy: pairs.take("fy"),
        };
        pairs.finish()?;
        Ok(out)
    }
}

/// Options for `add-text`: everything except `rotate` becomes an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub rotate: Option<f64>,
    pub attributes: AttributeSet,
}

impl TextOptions {
    pub fn from_pairs(mut pairs: OptionPairs) -> Result<Self> {
        let rotate = pairs.take_number("rotate")?;
        let mut attributes = AttributeSet::new();
        attributes.insert("font-size".to_string(), Some("16".to_string()));
        attributes.insert("font-family".to_string(), Some("sans-serif".to_string()));
        attributes.insert("fill".to_string(), Some("#000".to_string()));
        attributes.extend(pairs.into_attributes());
        Ok(Self { rotate, attributes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_positionals_and_order() {
        let (pos, pairs) = OptionPairs::split(&["#fff", "stroke=red", "x", "data-a=1=2"]);
        assert_eq!(pos, vec!["#fff", "x"]);
        assert_eq!(pairs.get("stroke"), Some("red"));
        assert_eq!(pairs.get("data-a"), Some("1=2"));
    }

    #[test]
    fn values_that_look_like_options_need_a_name() {
        let (pos, pairs) = OptionPairs::split(&["=x", "M0 0 L10 10"]);
        assert_eq!(pos, vec!["=x", "M0 0 L10 10"]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected_by_closed_records() {
        let pairs = OptionPairs::from_pairs([("repeat", "2"), ("speed", "fast")]);
        let err = AnimateOptions::from_pairs(pairs).unwrap_err();
        assert_eq!(err.to_string(), "Unknown option: speed");
    }

    #[test]
    fn clone_options_pass_through_overrides() {
        let pairs = OptionPairs::from_pairs([("dx", "20"), ("fill", "red"), ("count", "3")]);
        let opts = CloneOptions::from_pairs(pairs).unwrap();
        assert_eq!(opts.dx, 20.0);
        assert_eq!(opts.count, 3);
        assert_eq!(opts.overrides.get("fill"), Some(&Some("red".to_string())));
        assert!(!opts.overrides.contains_key("dx"));
    }

    #[test]
    fn clone_count_must_be_positive() {
        let pairs = OptionPairs::from_pairs([("count", "0")]);
        assert!(CloneOptions::from_pairs(pairs).is_err());
    }

    #[test]
    fn ease_maps_to_splines() {
        let opts =
            AnimateOptions::from_pairs(OptionPairs::from_pairs([("ease", "ease-in-out")])).unwrap();
        let ease = opts.ease.unwrap();
        assert_eq!(ease.calc_mode(), "spline");
        assert_eq!(ease.key_splines(), Some("0.42 0 0.58 1"));
        assert_eq!(opts.repeat, "indefinite");
    }

    #[test]
    fn gradient_angle_overrides_coordinates() {
        let opts = LinearGradientOptions::from_pairs(OptionPairs::from_pairs([("angle", "90")]))
            .unwrap();
        assert_eq!(
            (opts.x1.as_str(), opts.y1.as_str(), opts.x2.as_str(), opts.y2.as_str()),
            ("50", "0", "50", "100")
        );
    }

    #[test]
    fn text_defaults_can_be_overridden() {
        let opts = TextOptions::from_pairs(OptionPairs::from_pairs([
            ("fill", "#333"),
            ("rotate", "45"),
        ]))
        .unwrap();
        assert_eq!(opts.rotate, Some(45.0));
        let keys: Vec<_> = opts.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["font-size", "font-family", "fill"]);
        assert_eq!(opts.attributes["fill"].as_deref(), Some("#333"));
    }
}
