use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Marker drawn at one end of a link, describing the cardinality on that side.
///
/// On the wire each marker is serialized as its full [`RelationshipDescriptor`]
/// (name plus rendering glyph), which is what renderers consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RelationshipDescriptor", try_from = "RelationshipDescriptor")]
pub enum RelationshipType {
    One,
    Many,
    OneAndOnlyOne,
    OneOrMany,
    ZeroOrOne,
    ZeroOrMany,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 6] = [
        RelationshipType::One,
        RelationshipType::Many,
        RelationshipType::OneAndOnlyOne,
        RelationshipType::OneOrMany,
        RelationshipType::ZeroOrOne,
        RelationshipType::ZeroOrMany,
    ];

    /// Symbolic name used for comparisons and on the wire.
    pub fn name(self) -> &'static str {
        match self {
            RelationshipType::One => "ONE",
            RelationshipType::Many => "MANY",
            RelationshipType::OneAndOnlyOne => "ONE_AND_ONLY_ONE",
            RelationshipType::OneOrMany => "ONE_OR_MANY",
            RelationshipType::ZeroOrOne => "ZERO_OR_ONE",
            RelationshipType::ZeroOrMany => "ZERO_OR_MANY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn is_many(self) -> bool {
        self == RelationshipType::Many
    }

    /// SVG path of the marker glyph.
    pub fn path(self) -> String {
        match self {
            RelationshipType::Many => "M 0 0 L 20 10 L 0 20 M 20 10 L 0 10".to_string(),
            RelationshipType::One => "M 10 0 L 10 20 M 10 10 L 0 10".to_string(),
            RelationshipType::OneAndOnlyOne => {
                "M 10 0 L 10 20 M 20 0 L 20 20 M 20 10 L 0 10".to_string()
            }
            RelationshipType::OneOrMany => {
                "M 0 0 L 20 10 L 0 20 M 0 10 L 20 10 L 20 0 L 20 20".to_string()
            }
            RelationshipType::ZeroOrOne => {
                format!("M 10 0 L 10 20 M 15 10 L 0 10 {}", circle_path(25, 10, 10))
            }
            RelationshipType::ZeroOrMany => format!(
                "M 0 0 L 20 10 L 0 20 M 25 10 L 0 10 {}",
                circle_path(35, 10, 10)
            ),
        }
    }

    pub fn descriptor(self) -> RelationshipDescriptor {
        RelationshipDescriptor {
            name: self.name().to_string(),
            stroke: "black".to_string(),
            fill: "transparent".to_string(),
            d: self.path(),
        }
    }
}

impl JsonSchema for RelationshipType {
    fn schema_name() -> String {
        "RelationshipType".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        generator.subschema_for::<RelationshipDescriptor>()
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn circle_path(cx: u32, cy: u32, r: u32) -> String {
    format!(
        "M {cx} {cy} m -{r}, 0 a {r},{r} 0 1,0 {},0 a {r},{r} 0 1,0 -{},0",
        r * 2,
        r * 2
    )
}

/// Wire form of a [`RelationshipType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipDescriptor {
    pub name: String,
    pub stroke: String,
    pub fill: String,
    pub d: String,
}

impl From<RelationshipType> for RelationshipDescriptor {
    fn from(value: RelationshipType) -> Self {
        value.descriptor()
    }
}

impl TryFrom<RelationshipDescriptor> for RelationshipType {
    type Error = String;

    fn try_from(value: RelationshipDescriptor) -> Result<Self, Self::Error> {
        RelationshipType::from_name(&value.name)
            .ok_or_else(|| format!("unknown relationship type: {}", value.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_back_to_types() {
        for kind in RelationshipType::ALL {
            assert_eq!(RelationshipType::from_name(kind.name()), Some(kind));
        }
        assert_eq!(RelationshipType::from_name("many"), None);
    }

    #[test]
    fn zero_glyphs_carry_a_circle() {
        assert_eq!(
            RelationshipType::ZeroOrOne.path(),
            "M 10 0 L 10 20 M 15 10 L 0 10 M 25 10 m -10, 0 a 10,10 0 1,0 20,0 a 10,10 0 1,0 -20,0"
        );
        assert!(!RelationshipType::One.path().contains('a'));
    }

    #[test]
    fn serializes_as_full_descriptor() {
        let json = serde_json::to_value(RelationshipType::Many).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "MANY",
                "stroke": "black",
                "fill": "transparent",
                "d": "M 0 0 L 20 10 L 0 20 M 20 10 L 0 10"
            })
        );

        let unknown = serde_json::json!({"name": "SOME", "stroke": "", "fill": "", "d": ""});
        assert!(serde_json::from_value::<RelationshipType>(unknown).is_err());
    }
}
