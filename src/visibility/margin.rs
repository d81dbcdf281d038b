use crate::config::ScrollDirection;
use leptos::logging::warn;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl MarginLength {
    /// Adds `px` pixels. A non-zero percentage cannot carry a pixel offset
    /// (no `calc()` in rootMargin), so it comes back as `None`.
    fn extend(self, px: f64) -> Option<Self> {
        match self {
            MarginLength::Px(v) => Some(MarginLength::Px(v + px)),
            MarginLength::Percent(p) if p == 0.0 => Some(MarginLength::Px(px)),
            MarginLength::Percent(_) => None,
        }
    }
}

impl Default for MarginLength {
    fn default() -> Self {
        MarginLength::Px(0.0)
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(v) => write!(f, "{v}px"),
            MarginLength::Percent(v) => write!(f, "{v}%"),
        }
    }
}

impl FromStr for MarginLength {
    type Err = RootMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RootMarginError::InvalidLength(s.to_string());

        if let Some(num) = s.strip_suffix("px") {
            return num.parse::<f64>().map(MarginLength::Px).map_err(|_| invalid());
        }
        if let Some(num) = s.strip_suffix('%') {
            return num
                .parse::<f64>()
                .map(MarginLength::Percent)
                .map_err(|_| invalid());
        }
        // CSS only accepts a unitless length when it is zero.
        match s.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(MarginLength::Px(0.0)),
            _ => Err(invalid()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootMarginError {
    Empty,
    TooManyValues(usize),
    InvalidLength(String),
}

impl fmt::Display for RootMarginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootMarginError::Empty => write!(f, "root margin is empty"),
            RootMarginError::TooManyValues(n) => {
                write!(f, "root margin takes at most 4 values, got {n}")
            }
            RootMarginError::InvalidLength(s) => {
                write!(f, "invalid root margin length `{s}` (expected px or %)")
            }
        }
    }
}

impl std::error::Error for RootMarginError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Margin grown (or shrunk) around the observation root, per edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub fn edge(&self, edge: Edge) -> MarginLength {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    fn edge_mut(&mut self, edge: Edge) -> &mut MarginLength {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Right => &mut self.right,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
        }
    }

    pub fn expanded(mut self, edge: Edge, px: f64) -> Self {
        let slot = self.edge_mut(edge);
        match slot.extend(px) {
            Some(next) => *slot = next,
            None => warn!("scroll-list: cannot add {px}px to a percentage margin ({slot}); left as is"),
        }
        self
    }
}

impl FromStr for RootMargin {
    type Err = RootMarginError;

    /// Parses CSS margin shorthand: 1 to 4 lengths in top/right/bottom/left order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(MarginLength::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [] => return Err(RootMarginError::Empty),
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            more => return Err(RootMarginError::TooManyValues(more.len())),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Edge that the prefetch sentinel extends so it becomes visible `offset`
/// pixels before the primary sentinel in the direction of travel.
pub fn prefetch_edge(reverse: bool, direction: ScrollDirection) -> Edge {
    match (reverse, direction) {
        (false, ScrollDirection::Down | ScrollDirection::Both) => Edge::Bottom,
        (false, ScrollDirection::Up) => Edge::Top,
        (true, ScrollDirection::Up | ScrollDirection::Both) => Edge::Bottom,
        (true, ScrollDirection::Down) => Edge::Top,
    }
}

pub fn prefetch_root_margin(
    base: &RootMargin,
    offset: f64,
    reverse: bool,
    direction: ScrollDirection,
) -> RootMargin {
    base.expanded(prefetch_edge(reverse, direction), offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand_forms() {
        let one: RootMargin = "10px".parse().expect("one value");
        assert_eq!(one.to_string(), "10px 10px 10px 10px");

        let two: RootMargin = "5px 10%".parse().expect("two values");
        assert_eq!(two.to_string(), "5px 10% 5px 10%");

        let three: RootMargin = "1px 2px 3px".parse().expect("three values");
        assert_eq!(three.to_string(), "1px 2px 3px 2px");

        let four: RootMargin = " 0 -4px 8px 2% ".parse().expect("four values");
        assert_eq!(four.to_string(), "0px -4px 8px 2%");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<RootMargin>(), Err(RootMarginError::Empty));
        assert_eq!(
            "1px 2px 3px 4px 5px".parse::<RootMargin>(),
            Err(RootMarginError::TooManyValues(5))
        );
        assert_eq!(
            "10em".parse::<RootMargin>(),
            Err(RootMarginError::InvalidLength("10em".to_string()))
        );
        // Unitless is only valid for zero.
        assert!("12".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_prefetch_edge_table() {
        use ScrollDirection::*;
        assert_eq!(prefetch_edge(false, Down), Edge::Bottom);
        assert_eq!(prefetch_edge(false, Both), Edge::Bottom);
        assert_eq!(prefetch_edge(false, Up), Edge::Top);
        assert_eq!(prefetch_edge(true, Up), Edge::Bottom);
        assert_eq!(prefetch_edge(true, Both), Edge::Bottom);
        assert_eq!(prefetch_edge(true, Down), Edge::Top);
    }

    #[test]
    fn test_prefetch_margin_adds_to_configured_edge() {
        let base: RootMargin = "20px 0px".parse().expect("margin");
        let m = prefetch_root_margin(&base, 300.0, false, ScrollDirection::Up);
        assert_eq!(m.top, MarginLength::Px(320.0));
        assert_eq!(m.bottom, MarginLength::Px(20.0));
        assert_eq!(m.left, MarginLength::Px(0.0));
    }

    #[test]
    fn test_prefetch_margin_with_percent_edges() {
        let zero: RootMargin = "0%".parse().expect("margin");
        let m = prefetch_root_margin(&zero, 150.0, false, ScrollDirection::Down);
        assert_eq!(m.bottom, MarginLength::Px(150.0));

        let ten: RootMargin = "10%".parse().expect("margin");
        let m = prefetch_root_margin(&ten, 150.0, false, ScrollDirection::Down);
        assert_eq!(m.bottom, MarginLength::Percent(10.0));
    }
}
