use std::collections::BTreeMap;

use crate::error::{DatecheckError, Result};

// ---------------------------------------------------------------------------
// Canonical fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Identifier,
    StartDate,
    EndDate,
    Label,
    ControlDate,
}

const ALL_FIELDS: &[Field] = &[
    Field::Identifier,
    Field::StartDate,
    Field::EndDate,
    Field::Label,
    Field::ControlDate,
];

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Label => "label",
            Self::ControlDate => "control_date",
        }
    }

    /// Normalised header spellings recognised for this field.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Identifier => &["identifier", "id", "matricule"],
            Self::StartDate => &[
                "start_date",
                "start date",
                "start",
                "début",
                "debut",
                "date de début",
                "date de debut",
            ],
            Self::EndDate => &["end_date", "end date", "end", "fin", "date de fin"],
            Self::Label => &["label", "libellé", "libelle"],
            Self::ControlDate => &[
                "control_date",
                "date to verify",
                "date à contrôler",
                "date a controler",
            ],
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        let key = normalize_header(key);
        ALL_FIELDS.iter().find(|f| f.key() == key).copied()
    }
}

// ---------------------------------------------------------------------------
// Table roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    Reference,
    ControlPoints,
    ControlPeriods,
}

impl TableRole {
    pub fn required_fields(&self) -> &'static [Field] {
        match self {
            Self::Reference => &[Field::Identifier, Field::StartDate, Field::EndDate, Field::Label],
            Self::ControlPoints => &[Field::Identifier, Field::ControlDate],
            Self::ControlPeriods => &[Field::Identifier, Field::StartDate, Field::EndDate],
        }
    }
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Field map
// ---------------------------------------------------------------------------

/// Resolved canonical field → source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    columns: BTreeMap<Field, (usize, String)>,
}

impl FieldMap {
    /// Column index of a field. Only fields required by the mapped role are
    /// guaranteed to be present.
    pub fn index(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).map(|(i, _)| *i)
    }

    /// Source header text the field was mapped from.
    pub fn source_name(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(|(_, name)| name.as_str())
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Maps human-authored headers onto canonical fields using the built-in
/// synonym table plus any configured aliases.
#[derive(Debug, Clone, Default)]
pub struct SchemaNormalizer {
    aliases: Vec<(String, Field)>,
}

impl SchemaNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from settings-style `header → canonical field` pairs.
    pub fn with_aliases(aliases: &BTreeMap<String, String>) -> Result<Self> {
        let mut normalizer = Self::new();
        for (header, field) in aliases {
            let field = Field::from_key(field).ok_or_else(|| {
                DatecheckError::Settings(format!(
                    "Alias '{header}' points at unknown field '{field}'"
                ))
            })?;
            normalizer.add_alias(header, field);
        }
        Ok(normalizer)
    }

    pub fn add_alias(&mut self, header: &str, field: Field) {
        self.aliases.push((normalize_header(header), field));
    }

    /// Canonical field for one header, if any.
    pub fn resolve(&self, header: &str) -> Option<Field> {
        let norm = normalize_header(header);
        if let Some((_, field)) = self.aliases.iter().find(|(alias, _)| *alias == norm) {
            return Some(*field);
        }
        ALL_FIELDS
            .iter()
            .find(|f| f.synonyms().contains(&norm.as_str()))
            .copied()
    }

    /// Map a header row for `role`. The leftmost column wins when several map
    /// to the same field.
    pub fn map_headers(&self, headers: &[String], role: TableRole, sheet: &str) -> Result<FieldMap> {
        let mut columns = BTreeMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(field) = self.resolve(header) {
                columns
                    .entry(field)
                    .or_insert_with(|| (i, header.trim().to_string()));
            }
        }
        for field in role.required_fields() {
            if !columns.contains_key(field) {
                return Err(DatecheckError::Schema {
                    sheet: sheet.to_string(),
                    missing_field: field.key().to_string(),
                });
            }
        }
        Ok(FieldMap { columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(h: &[&str]) -> Vec<String> {
        h.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reference_headers_in_french() {
        let n = SchemaNormalizer::new();
        let map = n
            .map_headers(&headers(&[" Matricule", "Début ", "FIN", "Libellé"]), TableRole::Reference, "ref")
            .unwrap();
        assert_eq!(map.index(Field::Identifier), Some(0));
        assert_eq!(map.index(Field::StartDate), Some(1));
        assert_eq!(map.index(Field::EndDate), Some(2));
        assert_eq!(map.index(Field::Label), Some(3));
        assert_eq!(map.source_name(Field::StartDate), Some("Début"));
    }

    #[test]
    fn test_control_header_date_to_verify() {
        let n = SchemaNormalizer::new();
        let map = n
            .map_headers(&headers(&["Date à contrôler", "matricule"]), TableRole::ControlPoints, "Feuil1")
            .unwrap();
        assert_eq!(map.index(Field::ControlDate), Some(0));
        assert_eq!(map.index(Field::Identifier), Some(1));

        let map = n
            .map_headers(&headers(&["ID", "Date to verify"]), TableRole::ControlPoints, "Sheet1")
            .unwrap();
        assert_eq!(map.index(Field::ControlDate), Some(1));
    }

    #[test]
    fn test_missing_end_date_is_schema_error() {
        let n = SchemaNormalizer::new();
        let err = n
            .map_headers(&headers(&["matricule", "début", "libellé"]), TableRole::Reference, "reference")
            .unwrap_err();
        match err {
            DatecheckError::Schema { sheet, missing_field } => {
                assert_eq!(sheet, "reference");
                assert_eq!(missing_field, "end_date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_control_periods_headers() {
        let n = SchemaNormalizer::new();
        let map = n
            .map_headers(
                &headers(&["Matricule", "Date de début", "Date de fin"]),
                TableRole::ControlPeriods,
                "periods",
            )
            .unwrap();
        assert_eq!(map.index(Field::StartDate), Some(1));
        assert_eq!(map.index(Field::EndDate), Some(2));
    }

    #[test]
    fn test_leftmost_duplicate_wins() {
        let n = SchemaNormalizer::new();
        let map = n
            .map_headers(&headers(&["id", "matricule", "date to verify"]), TableRole::ControlPoints, "S")
            .unwrap();
        assert_eq!(map.index(Field::Identifier), Some(0));
    }

    #[test]
    fn test_configured_alias() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Employee No".to_string(), "identifier".to_string());
        let n = SchemaNormalizer::with_aliases(&aliases).unwrap();
        assert_eq!(n.resolve("  employee no "), Some(Field::Identifier));
        assert_eq!(n.resolve("fin"), Some(Field::EndDate));
    }

    #[test]
    fn test_alias_to_unknown_field_rejected() {
        let mut aliases = BTreeMap::new();
        aliases.insert("x".to_string(), "nope".to_string());
        assert!(matches!(
            SchemaNormalizer::with_aliases(&aliases),
            Err(DatecheckError::Settings(_))
        ));
    }

    #[test]
    fn test_unknown_headers_ignored() {
        let n = SchemaNormalizer::new();
        assert_eq!(n.resolve("comments"), None);
        let map = n
            .map_headers(&headers(&["comments", "id", "control_date"]), TableRole::ControlPoints, "S")
            .unwrap();
        assert_eq!(map.len(), 2);
    }
}
