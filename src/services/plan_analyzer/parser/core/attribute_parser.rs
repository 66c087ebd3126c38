//! Element and attribute scanning for showplan XML
//!
//! The plan is treated as text: opening tags of a given element are located
//! by pattern and their attributes read into a map. Nesting and closing tags
//! are irrelevant for cost extraction, so no XML tree is built.

use crate::services::plan_analyzer::parser::error::{ParseError, ParseResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][\w.\-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Attributes of one opening tag, values already unescaped
pub type Attributes = HashMap<String, String>;

/// Parser for element attributes and their values
pub struct AttributeParser;

impl AttributeParser {
    /// Build the pattern matching opening tags of `element`
    ///
    /// Matches `<Element ...>` and `<Element .../>`, capturing the attribute text.
    pub fn element_regex(element: &str) -> Regex {
        Regex::new(&format!(r"<{}\b([^>]*)>", regex::escape(element))).unwrap()
    }

    /// Collect the attribute maps of every opening tag matched by `element_regex`
    pub fn scan_elements(text: &str, element_regex: &Regex) -> Vec<Attributes> {
        element_regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|attrs| Self::parse_attributes(attrs.as_str()))
            .collect()
    }

    /// Parse `Name="value"` pairs; the first occurrence of a name wins
    pub fn parse_attributes(input: &str) -> Attributes {
        let mut attributes = Attributes::new();
        for cap in ATTRIBUTE_REGEX.captures_iter(input) {
            let Some(name) = cap.get(1) else { continue };
            let raw = cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str()).unwrap_or_default();
            attributes
                .entry(name.as_str().to_string())
                .or_insert_with(|| Self::unescape(raw));
        }
        attributes
    }

    /// Look up the first present attribute among `names`
    pub fn text<'a>(
        attributes: &'a Attributes,
        element: &'static str,
        names: &[&'static str],
    ) -> ParseResult<&'a str> {
        names
            .iter()
            .find_map(|name| attributes.get(*name))
            .map(String::as_str)
            .ok_or(ParseError::MissingAttribute { element, attribute: names[0] })
    }

    /// Look up a cost metric; it must be a finite, non-negative number
    pub fn metric(
        attributes: &Attributes,
        element: &'static str,
        names: &[&'static str],
    ) -> ParseResult<f64> {
        let raw = Self::text(attributes, element, names)?;
        Self::parse_metric(raw).ok_or_else(|| ParseError::InvalidNumber {
            attribute: names[0],
            value: raw.to_string(),
        })
    }

    /// Parse a showplan number such as "1", "0.003125" or "1.5E-05"
    pub fn parse_metric(raw: &str) -> Option<f64> {
        let value: f64 = raw.trim().parse().ok()?;
        (value.is_finite() && value >= 0.0).then_some(value)
    }

    /// Replace the predefined XML entities and numeric character references
    pub fn unescape(raw: &str) -> String {
        if !raw.contains('&') {
            return raw.to_string();
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('&') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let decoded = tail.find(';').and_then(|end| {
                let entity = &tail[1..end];
                let ch = match entity {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                        .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                        .and_then(char::from_u32),
                };
                ch.map(|c| (c, end + 1))
            });

            match decoded {
                Some((c, consumed)) => {
                    out.push(c);
                    rest = &tail[consumed..];
                },
                None => {
                    out.push('&');
                    rest = &tail[1..];
                },
            }
        }
        out.push_str(rest);
        out
    }
}
