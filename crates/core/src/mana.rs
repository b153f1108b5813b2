//! Mana cost parsing and payability.
//!
//! Costs come in as curly-brace symbol strings (`"{1}{U}{U}"`); pools are
//! built from the colors a board's lands can produce. Payability follows
//! the client's simple model: colored requirements first, then check that
//! whatever is left covers the generic part.

use serde::{Deserialize, Serialize};

/// Parsed mana cost: per-color pips plus the generic portion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaCost {
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
    pub generic: u32,
}

impl ManaCost {
    /// Parse a symbol string like `"{2}{W/U}{G}"`.
    ///
    /// `X` costs contribute nothing; a hybrid with a phyrexian half counts
    /// the colored half, a numeric hybrid counts as generic, and a
    /// two-color hybrid counts its first color.
    pub fn parse(mana_cost: &str) -> Self {
        let mut cost = Self::default();
        let mut rest = mana_cost;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            cost.apply_symbol(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        cost
    }

    fn apply_symbol(&mut self, symbol: &str) {
        if let Ok(n) = symbol.parse::<u32>() {
            self.generic += n;
            return;
        }
        match symbol {
            "W" => self.white += 1,
            "U" => self.blue += 1,
            "B" => self.black += 1,
            "R" => self.red += 1,
            "G" => self.green += 1,
            "C" => self.colorless += 1,
            "X" => {}
            hybrid if hybrid.contains('/') => {
                let halves: Vec<&str> = hybrid.split('/').collect();
                if halves.contains(&"P") {
                    if let Some(color) = halves.iter().find(|h| **h != "P") {
                        self.apply_symbol(color);
                    }
                } else if let Some(first) = halves.first() {
                    if let Ok(n) = first.parse::<u32>() {
                        self.generic += n;
                    } else {
                        self.apply_symbol(first);
                    }
                }
            }
            _ => {}
        }
    }

    /// Total pip count (colored + colorless + generic).
    pub fn value(&self) -> u32 {
        self.white + self.blue + self.black + self.red + self.green + self.colorless + self.generic
    }
}

/// Mana available to a player, one entry per producible color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ManaPool {
    /// Build a pool from produced-mana color symbols.
    ///
    /// Each producible color contributes exactly one mana: the pool
    /// answers "can this color be paid at all", not "how much".
    pub fn from_produced<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::default();
        for color in colors {
            match color.as_ref() {
                "W" => pool.white = 1,
                "U" => pool.blue = 1,
                "B" => pool.black = 1,
                "R" => pool.red = 1,
                "G" => pool.green = 1,
                "C" => pool.colorless = 1,
                _ => {}
            }
        }
        pool
    }

    pub fn total(&self) -> u32 {
        self.white + self.blue + self.black + self.red + self.green + self.colorless
    }

    /// Whether this pool can pay a cost: every colored requirement must be
    /// covered by its color, colorless by colorless, and the remainder by
    /// anything left over.
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        let mut remaining = self.total();
        for (available, required) in [
            (self.white, cost.white),
            (self.blue, cost.blue),
            (self.black, cost.black),
            (self.red, cost.red),
            (self.green, cost.green),
        ] {
            if available < required {
                return false;
            }
            remaining -= required;
        }
        if self.colorless < cost.colorless {
            return false;
        }
        remaining -= cost.colorless;
        remaining >= cost.generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_costs() {
        let cost = ManaCost::parse("{1}{U}{U}");
        assert_eq!(cost.generic, 1);
        assert_eq!(cost.blue, 2);
        assert_eq!(cost.value(), 3);
    }

    #[test]
    fn parses_multi_digit_generic() {
        assert_eq!(ManaCost::parse("{10}").generic, 10);
    }

    #[test]
    fn x_contributes_nothing() {
        let cost = ManaCost::parse("{X}{R}");
        assert_eq!(cost.generic, 0);
        assert_eq!(cost.red, 1);
    }

    #[test]
    fn phyrexian_hybrid_counts_colored_half() {
        let cost = ManaCost::parse("{W/P}");
        assert_eq!(cost.white, 1);
        assert_eq!(cost.generic, 0);
    }

    #[test]
    fn numeric_hybrid_counts_as_generic() {
        let cost = ManaCost::parse("{2/W}");
        assert_eq!(cost.generic, 2);
        assert_eq!(cost.white, 0);
    }

    #[test]
    fn color_hybrid_counts_first_color() {
        let cost = ManaCost::parse("{W/U}");
        assert_eq!(cost.white, 1);
        assert_eq!(cost.blue, 0);
    }

    #[test]
    fn empty_cost_parses_to_zero() {
        assert_eq!(ManaCost::parse(""), ManaCost::default());
    }

    #[test]
    fn pool_pays_colored_then_generic() {
        let pool = ManaPool {
            white: 1,
            blue: 1,
            green: 1,
            ..Default::default()
        };
        assert!(pool.can_pay(&ManaCost::parse("{W}{U}")));
        assert!(pool.can_pay(&ManaCost::parse("{2}{W}")));
        assert!(!pool.can_pay(&ManaCost::parse("{W}{W}")));
        assert!(!pool.can_pay(&ManaCost::parse("{3}{W}")));
    }

    #[test]
    fn colorless_requirement_needs_true_colorless() {
        let pool = ManaPool {
            white: 2,
            ..Default::default()
        };
        assert!(!pool.can_pay(&ManaCost::parse("{C}")));

        let pool = ManaPool {
            colorless: 1,
            white: 1,
            ..Default::default()
        };
        assert!(pool.can_pay(&ManaCost::parse("{C}{1}")));
    }

    #[test]
    fn pool_from_produced_colors_is_one_each() {
        let pool = ManaPool::from_produced(["W", "U", "U", "G"]);
        assert_eq!(pool.white, 1);
        assert_eq!(pool.blue, 1);
        assert_eq!(pool.green, 1);
        assert_eq!(pool.total(), 3);
    }
}
