//! TeX dimensions, normalized to `em` for output.
//!
//! The conversion factors assume a 10pt font, so that `1em = 10pt` and `1em = 18mu`.

use std::fmt::{self, Display, Formatter};

#[cfg(feature = "serde")]
use serde::Serialize;

use strum_macros::IntoStaticStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[strum(serialize_all = "lowercase")]
pub enum LengthUnit {
    Em,
    Ex,
    Pt,
    Pc,
    Px,
    In,
    Cm,
    Mm,
    Mu,
}

impl LengthUnit {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "em" => LengthUnit::Em,
            "ex" => LengthUnit::Ex,
            "pt" => LengthUnit::Pt,
            "pc" => LengthUnit::Pc,
            "px" => LengthUnit::Px,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "mu" => LengthUnit::Mu,
            _ => return None,
        })
    }

    /// How many `em` one unit is.
    const fn em_factor(self) -> f64 {
        match self {
            LengthUnit::Em => 1.0,
            LengthUnit::Ex => 0.43,
            LengthUnit::Pt => 0.1,
            LengthUnit::Pc => 1.2,
            LengthUnit::Px => 0.1,
            LengthUnit::In => 7.2,
            LengthUnit::Cm => 7.2 / 2.54,
            LengthUnit::Mm => 7.2 / 25.4,
            LengthUnit::Mu => 1.0 / 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Length {
    value: f32,
    unit: LengthUnit,
}

impl Length {
    #[inline]
    pub const fn new(value: f32, unit: LengthUnit) -> Self {
        Length { value, unit }
    }

    /// A length of `mu` (math units), the unit of `\,`, `\;` and friends.
    #[inline]
    pub const fn mu(value: f32) -> Self {
        Length::new(value, LengthUnit::Mu)
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// The length in `em`, rounded to three decimals.
    pub fn to_em(&self) -> f64 {
        let em = f64::from(self.value) * self.unit.em_factor();
        (em * 1000.0).round() / 1000.0
    }

    pub fn is_zero(&self) -> bool {
        self.to_em() == 0.0
    }
}

impl Display for Length {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let em = self.to_em();
        if em == 0.0 {
            return f.write_str("0em");
        }
        let mut buffer = dtoa::Buffer::new();
        let formatted = buffer.format(em);
        // `dtoa` always prints a fractional part, which we drop for whole numbers.
        f.write_str(formatted.strip_suffix(".0").unwrap_or(formatted))?;
        f.write_str("em")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_in_em() {
        assert_eq!(Length::mu(3.0).to_string(), "0.167em");
        assert_eq!(Length::mu(-3.0).to_string(), "-0.167em");
        assert_eq!(Length::mu(18.0).to_string(), "1em");
        assert_eq!(Length::new(2.5, LengthUnit::Em).to_string(), "2.5em");
        assert_eq!(Length::new(5.0, LengthUnit::Pt).to_string(), "0.5em");
        assert_eq!(Length::new(0.0001, LengthUnit::Em).to_string(), "0em");
    }

    #[test]
    fn unit_names() {
        assert_eq!(LengthUnit::from_name("mu"), Some(LengthUnit::Mu));
        assert_eq!(LengthUnit::from_name("ly"), None);
        assert_eq!(<&str>::from(LengthUnit::Cm), "cm");
    }
}
