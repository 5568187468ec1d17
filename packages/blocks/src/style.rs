//! # Block Styles
//!
//! Styles are a closed set of properties with typed values, layered per
//! breakpoint: base < tablet < mobile.
//!
//! Values are parsed from their CSS text when a style is set or loaded, so a
//! malformed style is rejected at construction instead of at render time.
//! On the wire a style map is a plain object of camelCase property names to
//! CSS strings, with optional nested `tablet` and `mobile` objects:
//!
//! ```json
//! { "fontSize": "32px", "color": "#111", "mobile": { "fontSize": "20px" } }
//! ```

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::style_lexer::{tokenize, Spanned, StyleToken};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Empty style value")]
    Empty,

    #[error("Unknown style property: {0}")]
    UnknownProperty(String),

    #[error("Invalid style value: {0}")]
    InvalidValue(String),

    #[error("Unknown length unit in {0}")]
    UnknownUnit(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Property {property} does not accept {value}")]
    NotAccepted { property: &'static str, value: String },

    #[error("Property {property} accepts at most {max} values")]
    TooManyValues { property: &'static str, max: usize },
}

/// Responsive viewport class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }
}

/// Kind of a single style value, used to check what a property accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Length,
    Number,
    Color,
    Keyword,
    Function,
    FontStack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Rem,
    Em,
    Percent,
    Vh,
    Vw,
    Fr,
}

impl LengthUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Rem => "rem",
            LengthUnit::Em => "em",
            LengthUnit::Percent => "%",
            LengthUnit::Vh => "vh",
            LengthUnit::Vw => "vw",
            LengthUnit::Fr => "fr",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "px" => LengthUnit::Px,
            "rem" => LengthUnit::Rem,
            "em" => LengthUnit::Em,
            "%" => LengthUnit::Percent,
            "vh" => LengthUnit::Vh,
            "vw" => LengthUnit::Vw,
            "fr" => LengthUnit::Fr,
            _ => return None,
        })
    }
}

/// A parsed style value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Length { value: f64, unit: LengthUnit },
    Number(f64),
    /// Lowercased hex or functional (`rgb()`, `hsla()`, ...) notation
    Color(String),
    Keyword(String),
    /// Any other CSS function, e.g. `repeat(3, 1fr)` or `url(/hero.jpg)`
    Function { name: String, args: String },
    FontStack(Vec<String>),
    /// Space separated values, e.g. `8px 16px`
    List(Vec<StyleValue>),
}

impl StyleValue {
    pub fn px(value: f64) -> Self {
        StyleValue::Length { value, unit: LengthUnit::Px }
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        StyleValue::Keyword(keyword.into())
    }

    /// Parse CSS text into a typed value
    pub fn parse(input: &str) -> Result<Self, StyleError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(StyleError::Empty);
        }

        let tokens = tokenize(input).ok_or_else(|| StyleError::InvalidValue(input.to_string()))?;
        let parser = ValueParser { input, tokens: &tokens };
        if parser.is_font_stack() {
            return parser.font_stack();
        }

        let mut values = parser
            .items()?
            .into_iter()
            .map(|item| parser.single(item))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Ok(StyleValue::List(values))
        }
    }

    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            StyleValue::Length { .. } => Some(ValueKind::Length),
            StyleValue::Number(_) => Some(ValueKind::Number),
            StyleValue::Color(_) => Some(ValueKind::Color),
            StyleValue::Keyword(_) => Some(ValueKind::Keyword),
            StyleValue::Function { .. } => Some(ValueKind::Function),
            StyleValue::FontStack(_) => Some(ValueKind::FontStack),
            StyleValue::List(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Length { value, unit } => write!(f, "{}{}", value, unit.suffix()),
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Color(c) => f.write_str(c),
            StyleValue::Keyword(k) => f.write_str(k),
            StyleValue::Function { name, args } => write!(f, "{}({})", name, args),
            StyleValue::FontStack(families) => {
                for (i, family) in families.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    // A lone bare family would read back as a keyword
                    if families.len() == 1 || !is_bare_family(family) {
                        write!(f, "\"{}\"", family)?;
                    } else {
                        f.write_str(family)?;
                    }
                }
                Ok(())
            }
            StyleValue::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

fn is_bare_family(family: &str) -> bool {
    matches!(tokenize(family).as_deref(), Some([(StyleToken::Ident(_), _)]))
}

/// Builds a [`StyleValue`] from the tokens of one CSS value
struct ValueParser<'a, 'src> {
    input: &'src str,
    tokens: &'a [Spanned<'src>],
}

impl<'a, 'src> ValueParser<'a, 'src> {
    fn invalid(&self, tokens: &[Spanned<'src>]) -> StyleError {
        StyleError::InvalidValue(self.source(tokens).to_string())
    }

    fn source(&self, tokens: &[Spanned<'src>]) -> &'src str {
        match (tokens.first(), tokens.last()) {
            (Some((_, first)), Some((_, last))) => &self.input[first.start..last.end],
            _ => self.input,
        }
    }

    /// Quoted strings or commas outside any function make a font stack
    fn is_font_stack(&self) -> bool {
        let mut depth = 0usize;
        self.tokens.iter().any(|(token, _)| match token {
            StyleToken::LParen => {
                depth += 1;
                false
            }
            StyleToken::RParen => {
                depth = depth.saturating_sub(1);
                false
            }
            StyleToken::Comma | StyleToken::String(_) => depth == 0,
            _ => false,
        })
    }

    fn font_stack(&self) -> Result<StyleValue, StyleError> {
        let families = self
            .tokens
            .split(|(token, _)| *token == StyleToken::Comma)
            .map(|family| self.family(family))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StyleValue::FontStack(families))
    }

    /// One quoted family, or bare identifiers joined by single spaces
    fn family(&self, tokens: &[Spanned<'src>]) -> Result<String, StyleError> {
        let words: Vec<_> = tokens
            .iter()
            .filter(|(token, _)| *token != StyleToken::Space)
            .collect();

        let family = match words.as_slice() {
            [(StyleToken::String(quoted), _)] => quoted.to_string(),
            [] => return Err(StyleError::InvalidValue(self.input.to_string())),
            _ => {
                let idents = words
                    .iter()
                    .map(|(token, _)| match token {
                        StyleToken::Ident(word) => Some(*word),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| self.invalid(tokens))?;
                idents.join(" ")
            }
        };

        if family.trim().is_empty() || family.contains(['"', '\'', '\\', ';', '{', '}']) {
            return Err(StyleError::InvalidValue(self.input.to_string()));
        }
        Ok(family)
    }

    /// Split into space separated items, keeping function arguments whole
    fn items(&self) -> Result<Vec<&'a [Spanned<'src>]>, StyleError> {
        let tokens = self.tokens;
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;

        for (i, (token, _)) in tokens.iter().enumerate() {
            match token {
                StyleToken::LParen => depth += 1,
                StyleToken::RParen => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| StyleError::InvalidValue(self.input.to_string()))?;
                }
                StyleToken::Space if depth == 0 => {
                    if start < i {
                        items.push(&tokens[start..i]);
                    }
                    start = i + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(StyleError::InvalidValue(self.input.to_string()));
        }
        if start < tokens.len() {
            items.push(&tokens[start..]);
        }
        Ok(items)
    }

    fn single(&self, item: &[Spanned<'src>]) -> Result<StyleValue, StyleError> {
        match item {
            [(StyleToken::Hash(hash), _)] => {
                let hex = &hash[1..];
                let valid = matches!(hex.len(), 3 | 4 | 6 | 8)
                    && hex.chars().all(|c| c.is_ascii_hexdigit());
                if !valid {
                    return Err(StyleError::InvalidColor(hash.to_string()));
                }
                Ok(StyleValue::Color(hash.to_ascii_lowercase()))
            }
            [(StyleToken::Number(number), _)] => number
                .parse::<f64>()
                .map(StyleValue::Number)
                .map_err(|_| self.invalid(item)),
            [(StyleToken::Dimension(dimension), _)] => {
                let split = dimension
                    .find(|c: char| c.is_ascii_alphabetic() || c == '%')
                    .unwrap_or(dimension.len());
                let (number, suffix) = dimension.split_at(split);
                let value = number.parse::<f64>().map_err(|_| self.invalid(item))?;
                LengthUnit::from_suffix(&suffix.to_ascii_lowercase())
                    .map(|unit| StyleValue::Length { value, unit })
                    .ok_or_else(|| StyleError::UnknownUnit(dimension.to_string()))
            }
            [(StyleToken::Ident(ident), _)] => Ok(StyleValue::Keyword(ident.to_string())),
            [(StyleToken::Ident(name), _), (StyleToken::LParen, open), .., (StyleToken::RParen, close)]
                if self.closes_at_end(item) =>
            {
                let args = self.input[open.end..close.start].trim().to_string();
                let name = name.to_ascii_lowercase();
                if matches!(name.as_str(), "rgb" | "rgba" | "hsl" | "hsla") {
                    return Ok(StyleValue::Color(format!("{}({})", name, args)));
                }
                Ok(StyleValue::Function { name, args })
            }
            _ => Err(self.invalid(item)),
        }
    }

    /// The parenthesis opened after the function name closes on the last token
    fn closes_at_end(&self, item: &[Spanned<'src>]) -> bool {
        let mut depth = 0usize;
        for (i, (token, _)) in item.iter().enumerate().skip(1) {
            match token {
                StyleToken::LParen => depth += 1,
                StyleToken::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i == item.len() - 1;
                    }
                }
                _ => {}
            }
        }
        false
    }
}

/// Closed set of style properties a block may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    Color,
    BackgroundColor,
    BackgroundImage,
    BorderColor,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    LineHeight,
    LetterSpacing,
    TextAlign,
    TextTransform,
    TextDecoration,
    Display,
    FlexDirection,
    FlexWrap,
    JustifyContent,
    AlignItems,
    Gap,
    GridTemplateColumns,
    Width,
    Height,
    MinHeight,
    MaxWidth,
    Padding,
    Margin,
    BorderWidth,
    BorderRadius,
    Opacity,
    ZIndex,
    ObjectFit,
}

use ValueKind as K;

impl StyleProperty {
    pub const ALL: [StyleProperty; 31] = [
        StyleProperty::Color,
        StyleProperty::BackgroundColor,
        StyleProperty::BackgroundImage,
        StyleProperty::BorderColor,
        StyleProperty::FontFamily,
        StyleProperty::FontSize,
        StyleProperty::FontWeight,
        StyleProperty::FontStyle,
        StyleProperty::LineHeight,
        StyleProperty::LetterSpacing,
        StyleProperty::TextAlign,
        StyleProperty::TextTransform,
        StyleProperty::TextDecoration,
        StyleProperty::Display,
        StyleProperty::FlexDirection,
        StyleProperty::FlexWrap,
        StyleProperty::JustifyContent,
        StyleProperty::AlignItems,
        StyleProperty::Gap,
        StyleProperty::GridTemplateColumns,
        StyleProperty::Width,
        StyleProperty::Height,
        StyleProperty::MinHeight,
        StyleProperty::MaxWidth,
        StyleProperty::Padding,
        StyleProperty::Margin,
        StyleProperty::BorderWidth,
        StyleProperty::BorderRadius,
        StyleProperty::Opacity,
        StyleProperty::ZIndex,
        StyleProperty::ObjectFit,
    ];

    /// camelCase name used in persisted content
    pub fn name(&self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "backgroundColor",
            StyleProperty::BackgroundImage => "backgroundImage",
            StyleProperty::BorderColor => "borderColor",
            StyleProperty::FontFamily => "fontFamily",
            StyleProperty::FontSize => "fontSize",
            StyleProperty::FontWeight => "fontWeight",
            StyleProperty::FontStyle => "fontStyle",
            StyleProperty::LineHeight => "lineHeight",
            StyleProperty::LetterSpacing => "letterSpacing",
            StyleProperty::TextAlign => "textAlign",
            StyleProperty::TextTransform => "textTransform",
            StyleProperty::TextDecoration => "textDecoration",
            StyleProperty::Display => "display",
            StyleProperty::FlexDirection => "flexDirection",
            StyleProperty::FlexWrap => "flexWrap",
            StyleProperty::JustifyContent => "justifyContent",
            StyleProperty::AlignItems => "alignItems",
            StyleProperty::Gap => "gap",
            StyleProperty::GridTemplateColumns => "gridTemplateColumns",
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
            StyleProperty::MinHeight => "minHeight",
            StyleProperty::MaxWidth => "maxWidth",
            StyleProperty::Padding => "padding",
            StyleProperty::Margin => "margin",
            StyleProperty::BorderWidth => "borderWidth",
            StyleProperty::BorderRadius => "borderRadius",
            StyleProperty::Opacity => "opacity",
            StyleProperty::ZIndex => "zIndex",
            StyleProperty::ObjectFit => "objectFit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// kebab-case CSS property name
    pub fn css_name(&self) -> String {
        let mut out = String::new();
        for c in self.name().chars() {
            if c.is_ascii_uppercase() {
                out.push('-');
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Value kinds this property accepts
    pub fn accepts(&self) -> &'static [ValueKind] {
        match self {
            StyleProperty::Color | StyleProperty::BackgroundColor | StyleProperty::BorderColor => {
                &[K::Color, K::Keyword]
            }
            StyleProperty::BackgroundImage => &[K::Function, K::Keyword],
            StyleProperty::FontFamily => &[K::FontStack, K::Keyword],
            StyleProperty::FontWeight | StyleProperty::LineHeight => {
                &[K::Number, K::Length, K::Keyword]
            }
            StyleProperty::Opacity | StyleProperty::ZIndex => &[K::Number],
            StyleProperty::FontStyle
            | StyleProperty::TextAlign
            | StyleProperty::TextTransform
            | StyleProperty::TextDecoration
            | StyleProperty::Display
            | StyleProperty::FlexDirection
            | StyleProperty::FlexWrap
            | StyleProperty::JustifyContent
            | StyleProperty::AlignItems
            | StyleProperty::ObjectFit => &[K::Keyword],
            StyleProperty::GridTemplateColumns => &[K::Length, K::Function, K::Keyword],
            StyleProperty::FontSize
            | StyleProperty::LetterSpacing
            | StyleProperty::Gap
            | StyleProperty::Width
            | StyleProperty::Height
            | StyleProperty::MinHeight
            | StyleProperty::MaxWidth
            | StyleProperty::Padding
            | StyleProperty::Margin
            | StyleProperty::BorderWidth
            | StyleProperty::BorderRadius => &[K::Length, K::Number, K::Keyword, K::Function],
        }
    }

    /// Maximum number of space separated values
    pub fn max_values(&self) -> usize {
        match self {
            StyleProperty::Padding | StyleProperty::Margin | StyleProperty::BorderRadius => 4,
            StyleProperty::Gap => 2,
            StyleProperty::GridTemplateColumns => 12,
            _ => 1,
        }
    }

    /// Check that `value` is well-typed for this property
    pub fn validate(&self, value: &StyleValue) -> Result<(), StyleError> {
        let singles: &[StyleValue] = match value {
            StyleValue::List(values) => {
                if values.len() > self.max_values() {
                    return Err(StyleError::TooManyValues {
                        property: self.name(),
                        max: self.max_values(),
                    });
                }
                values
            }
            single => std::slice::from_ref(single),
        };

        for single in singles {
            let accepted = single.kind().is_some_and(|kind| self.accepts().contains(&kind));
            if !accepted {
                return Err(StyleError::NotAccepted {
                    property: self.name(),
                    value: single.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated property → value mapping for one breakpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap(BTreeMap<StyleProperty, StyleValue>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: StyleProperty, value: StyleValue) -> Result<(), StyleError> {
        property.validate(&value)?;
        self.0.insert(property, value);
        Ok(())
    }

    /// Parse `css` and set it
    pub fn set_css(&mut self, property: StyleProperty, css: &str) -> Result<(), StyleError> {
        self.set(property, StyleValue::parse(css)?)
    }

    /// Builder form of [`StyleMap::set_css`]
    pub fn with(mut self, property: StyleProperty, css: &str) -> Result<Self, StyleError> {
        self.set_css(property, css)?;
        Ok(self)
    }

    pub fn get(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.0.get(&property)
    }

    pub fn remove(&mut self, property: StyleProperty) -> Option<StyleValue> {
        self.0.remove(&property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleProperty, &StyleValue)> {
        self.0.iter()
    }

    /// Overlay `other` on top of this map
    pub fn merge(&mut self, other: &StyleMap) {
        for (property, value) in other.iter() {
            self.0.insert(*property, value.clone());
        }
    }

    /// Render as a CSS declaration list
    pub fn to_css(&self) -> String {
        self.iter()
            .map(|(p, v)| format!("{}: {};", p.css_name(), v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (property, value) in self.iter() {
            map.serialize_entry(property.name(), &value.to_string())?;
        }
        map.end()
    }
}

fn parse_entry<E: de::Error>(key: &str, css: &str) -> Result<(StyleProperty, StyleValue), E> {
    let property = StyleProperty::from_name(key)
        .ok_or_else(|| E::custom(StyleError::UnknownProperty(key.to_string())))?;
    let value = StyleValue::parse(css).map_err(E::custom)?;
    property.validate(&value).map_err(E::custom)?;
    Ok((property, value))
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut map = StyleMap::new();
        for (key, css) in raw {
            let (property, value) = parse_entry::<D::Error>(&key, &css)?;
            map.0.insert(property, value);
        }
        Ok(map)
    }
}

/// Base styles plus per-breakpoint overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    pub base: StyleMap,
    pub tablet: Option<StyleMap>,
    pub mobile: Option<StyleMap>,
}

impl Styles {
    pub fn new(base: StyleMap) -> Self {
        Self { base, tablet: None, mobile: None }
    }

    /// No base styles and no override maps at all
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.tablet.is_none() && self.mobile.is_none()
    }

    /// Raw map for a breakpoint (desktop is the base map)
    pub fn for_breakpoint(&self, breakpoint: Breakpoint) -> Option<&StyleMap> {
        match breakpoint {
            Breakpoint::Desktop => Some(&self.base),
            Breakpoint::Tablet => self.tablet.as_ref(),
            Breakpoint::Mobile => self.mobile.as_ref(),
        }
    }

    pub fn for_breakpoint_mut(&mut self, breakpoint: Breakpoint) -> &mut StyleMap {
        match breakpoint {
            Breakpoint::Desktop => &mut self.base,
            Breakpoint::Tablet => self.tablet.get_or_insert_with(StyleMap::new),
            Breakpoint::Mobile => self.mobile.get_or_insert_with(StyleMap::new),
        }
    }

    pub fn set(
        &mut self,
        breakpoint: Breakpoint,
        property: StyleProperty,
        value: StyleValue,
    ) -> Result<(), StyleError> {
        self.for_breakpoint_mut(breakpoint).set(property, value)
    }

    pub fn set_css(
        &mut self,
        breakpoint: Breakpoint,
        property: StyleProperty,
        css: &str,
    ) -> Result<(), StyleError> {
        self.for_breakpoint_mut(breakpoint).set_css(property, css)
    }

    /// Effective styles at `breakpoint`, layering base < tablet < mobile
    pub fn resolve(&self, breakpoint: Breakpoint) -> StyleMap {
        let mut resolved = self.base.clone();
        if matches!(breakpoint, Breakpoint::Tablet | Breakpoint::Mobile) {
            if let Some(tablet) = &self.tablet {
                resolved.merge(tablet);
            }
        }
        if breakpoint == Breakpoint::Mobile {
            if let Some(mobile) = &self.mobile {
                resolved.merge(mobile);
            }
        }
        resolved
    }
}

impl From<StyleMap> for Styles {
    fn from(base: StyleMap) -> Self {
        Self::new(base)
    }
}

impl Serialize for Styles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let overrides = [("tablet", &self.tablet), ("mobile", &self.mobile)];
        let len = self.base.len() + overrides.iter().filter(|(_, m)| m.is_some()).count();
        let mut map = serializer.serialize_map(Some(len))?;
        for (property, value) in self.base.iter() {
            map.serialize_entry(property.name(), &value.to_string())?;
        }
        for (key, styles) in overrides {
            if let Some(styles) = styles {
                map.serialize_entry(key, styles)?;
            }
        }
        map.end()
    }
}

struct StylesVisitor;

impl<'de> Visitor<'de> for StylesVisitor {
    type Value = Styles;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a style object with optional tablet/mobile overrides")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Styles, A::Error> {
        let mut styles = Styles::default();
        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "tablet" => styles.tablet = Some(access.next_value()?),
                "mobile" => styles.mobile = Some(access.next_value()?),
                _ => {
                    let css = access.next_value::<String>()?;
                    let (property, value) = parse_entry::<A::Error>(&key, &css)?;
                    styles.base.0.insert(property, value);
                }
            }
        }
        Ok(styles)
    }
}

impl<'de> Deserialize<'de> for Styles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StylesVisitor)
    }
}
