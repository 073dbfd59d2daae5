//! Reverse-geocoded place descriptions

use std::fmt;

/// Placeholder text shown when no address could be resolved
pub const UNAVAILABLE_DESCRIPTION: &str = "Address unavailable";

/// One ranked reverse-geocoding result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    /// Most specific name (building, street address, point of interest)
    pub feature_name: Option<String>,
    pub locality: Option<String>,
    pub admin_area: Option<String>,
    pub country_name: Option<String>,
}

impl AddressComponents {
    /// Join the present components, most specific first, with ", "
    pub fn joined(&self) -> String {
        [
            &self.feature_name,
            &self.locality,
            &self.admin_area,
            &self.country_name,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Human-readable place description attached to a location snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlaceDescription {
    Resolved(String),
    #[default]
    Unavailable,
}

impl PlaceDescription {
    /// Build a description from ranked geocoder results.
    /// Only the top-ranked result is used; empty input yields `Unavailable`.
    pub fn from_components(results: &[AddressComponents]) -> Self {
        results
            .first()
            .map(AddressComponents::joined)
            .map(Self::from_text)
            .unwrap_or_default()
    }

    /// Wrap free text, mapping blank text and the placeholder to `Unavailable`
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == UNAVAILABLE_DESCRIPTION {
            Self::Unavailable
        } else {
            Self::Resolved(trimmed.to_string())
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The resolved text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Resolved(text) => Some(text),
            Self::Unavailable => None,
        }
    }

    /// First comma-delimited segment of the resolved text
    pub fn first_segment(&self) -> Option<&str> {
        self.text()
            .and_then(|text| text.split(',').next())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for PlaceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(text) => write!(f, "{}", text),
            Self::Unavailable => write!(f, "{}", UNAVAILABLE_DESCRIPTION),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(parts: [Option<&str>; 4]) -> AddressComponents {
        AddressComponents {
            feature_name: parts[0].map(String::from),
            locality: parts[1].map(String::from),
            admin_area: parts[2].map(String::from),
            country_name: parts[3].map(String::from),
        }
    }

    #[test]
    fn joins_present_components_in_order() {
        let c = components([
            Some("Sydney Opera House"),
            Some("Sydney"),
            Some("NSW"),
            Some("Australia"),
        ]);
        assert_eq!(c.joined(), "Sydney Opera House, Sydney, NSW, Australia");
    }

    #[test]
    fn skips_missing_and_blank_components() {
        let c = components([None, Some("Paris"), Some("  "), Some("France")]);
        assert_eq!(c.joined(), "Paris, France");
    }

    #[test]
    fn uses_top_ranked_result_only() {
        let results = vec![
            components([None, Some("Oslo"), None, Some("Norway")]),
            components([None, Some("Bergen"), None, Some("Norway")]),
        ];
        assert_eq!(
            PlaceDescription::from_components(&results),
            PlaceDescription::Resolved("Oslo, Norway".to_string())
        );
    }

    #[test]
    fn empty_results_are_unavailable() {
        assert_eq!(
            PlaceDescription::from_components(&[]),
            PlaceDescription::Unavailable
        );
        assert_eq!(
            PlaceDescription::from_components(&[AddressComponents::default()]),
            PlaceDescription::Unavailable
        );
    }

    #[test]
    fn placeholder_text_is_unavailable() {
        assert!(!PlaceDescription::from_text(UNAVAILABLE_DESCRIPTION).is_available());
        assert!(!PlaceDescription::from_text("   ").is_available());
        assert!(PlaceDescription::from_text("Somewhere").is_available());
    }

    #[test]
    fn first_segment() {
        let d = PlaceDescription::Resolved("Main St, Springfield, USA".to_string());
        assert_eq!(d.first_segment(), Some("Main St"));
        assert_eq!(PlaceDescription::Unavailable.first_segment(), None);
    }

    #[test]
    fn display_unavailable_uses_placeholder() {
        assert_eq!(
            PlaceDescription::Unavailable.to_string(),
            UNAVAILABLE_DESCRIPTION
        );
    }
}
