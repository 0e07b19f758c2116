//! Splitting documentation names such as `"Honda Civic 2016-18"` into make,
//! model and model years.

use std::{fmt, str::FromStr, sync::LazyLock};

use nonempty::NonEmpty;
use regex::Regex;

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<make>\S+)\s+(?P<model>.+?)(?:\s+(?P<years>\d{4}(?:-\d{2,4})?(?:\s*,\s*\d{4}(?:-\d{2,4})?)*))?\s*$",
    )
    .expect("name regex is valid")
});

/// A name could not be split.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The name does not have at least a make and a model.
    #[error("'{0}' is not of the form 'Make Model [years]'")]
    Format(String),
    /// A year range ends before it starts.
    #[error("year range '{0}' ends before it starts")]
    Range(String),
}

/// The model years of a documentation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelYears {
    text: String,
    years: NonEmpty<u16>,
}

impl ModelYears {
    /// The years as written, e.g. `"2016-18"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Every year covered, ascending and without duplicates.
    #[must_use]
    pub const fn years(&self) -> &NonEmpty<u16> {
        &self.years
    }

    /// The years as a plain list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u16> {
        self.years.iter().copied().collect()
    }
}

impl fmt::Display for ModelYears {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for ModelYears {
    type Err = NameError;

    /// Parse comma-separated years and ranges. Years have four digits; a
    /// two-digit range end takes the century of its start (`2016-18` is 2016
    /// to 2018).
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut years = Vec::new();
        for group in text.split(',').map(str::trim) {
            let (start, end) = match group.split_once('-') {
                Some((start, end)) => (start.trim(), end.trim()),
                None => (group, group),
            };
            let format = || NameError::Format(text.to_string());
            let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
            if start.len() != 4 || !matches!(end.len(), 2 | 4) || !digits(start) || !digits(end) {
                return Err(format());
            }
            let start: u16 = start.parse().map_err(|_| format())?;
            let end: u16 = if end.len() == 2 {
                let short: u16 = end.parse().map_err(|_| format())?;
                (start - start % 100).checked_add(short).ok_or_else(format)?
            } else {
                end.parse().map_err(|_| format())?
            };
            if end < start {
                return Err(NameError::Range(group.to_string()));
            }
            years.extend(start..=end);
        }
        years.sort_unstable();
        years.dedup();

        let years = NonEmpty::from_vec(years).ok_or_else(|| NameError::Format(text.to_string()))?;
        Ok(Self {
            text: text.trim().to_string(),
            years,
        })
    }
}

/// A documentation name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName {
    /// The make, the first word of the name.
    pub make: String,
    /// Everything between the make and the years.
    pub model: String,
    /// Trailing model years, if the name has any.
    pub years: Option<ModelYears>,
}

impl FromStr for ModelName {
    type Err = NameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let captures = NAME
            .captures(name)
            .ok_or_else(|| NameError::Format(name.to_string()))?;
        let years = captures
            .name("years")
            .map(|m| m.as_str().parse())
            .transpose()?;

        Ok(Self {
            make: captures["make"].to_string(),
            model: captures["model"].to_string(),
            years,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Honda Civic 2016-18", "Honda", "Civic", &[2016, 2017, 2018]; "short range end")]
    #[test_case("Toyota RAV4 Hybrid 2019-2021", "Toyota", "RAV4 Hybrid", &[2019, 2020, 2021]; "long range end")]
    #[test_case("Kia Niro EV 2019, 2021", "Kia", "Niro EV", &[2019, 2021]; "comma separated")]
    #[test_case("Hyundai Ioniq 5 (Southeast Asia only) 2022-24", "Hyundai", "Ioniq 5 (Southeast Asia only)", &[2022, 2023, 2024]; "model with digits")]
    #[test_case("Subaru Outback 2023", "Subaru", "Outback", &[2023]; "single year")]
    #[test_case("Acme Roadster 1998-99, 1999, 2001", "Acme", "Roadster", &[1998, 1999, 2001]; "overlapping groups")]
    fn splits_names(name: &str, make: &str, model: &str, years: &[u16]) {
        let parsed: ModelName = name.parse().unwrap();

        assert_eq!(parsed.make, make);
        assert_eq!(parsed.model, model);
        assert_eq!(parsed.years.unwrap().to_vec(), years);
    }

    #[test]
    fn name_without_years() {
        let parsed: ModelName = "comma body".parse().unwrap();

        assert_eq!(parsed.make, "comma");
        assert_eq!(parsed.model, "body");
        assert!(parsed.years.is_none());
    }

    #[test]
    fn years_keep_their_written_form() {
        let parsed: ModelName = "Honda Civic 2016-18".parse().unwrap();
        assert_eq!(parsed.years.unwrap().as_str(), "2016-18");
    }

    #[test_case(""; "empty")]
    #[test_case("Honda"; "make only")]
    fn rejects_malformed_names(name: &str) {
        assert_eq!(
            name.parse::<ModelName>(),
            Err(NameError::Format(name.to_string()))
        );
    }

    #[test_case("65535-99"; "start overflows")]
    #[test_case("99999"; "five digit year")]
    #[test_case("16-18"; "short start")]
    #[test_case("2016-8"; "one digit end")]
    #[test_case("+201-18"; "signed start")]
    #[test_case("2016-"; "open range")]
    fn rejects_malformed_years(years: &str) {
        assert_eq!(
            years.parse::<ModelYears>(),
            Err(NameError::Format(years.to_string()))
        );
    }

    #[test]
    fn short_range_end_stays_in_the_start_century() {
        assert_eq!(
            "1998-02".parse::<ModelYears>(),
            Err(NameError::Range("1998-02".to_string()))
        );
    }

    #[test]
    fn rejects_backwards_range() {
        assert_eq!(
            "Honda Civic 2018-16".parse::<ModelName>(),
            Err(NameError::Range("2018-16".to_string()))
        );
    }
}
