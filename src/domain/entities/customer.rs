use serde::Serialize;

use crate::domain::entities::table::RowRecord;

/// The field shape both freshly parsed rows and existing directory rows are
/// viewed through for comparison. Every field may be absent; an absent field
/// simply fails the matching branch that needs it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub id: Option<String>,
    pub navn: Option<String>,
    pub adresse: Option<String>,
    pub postnummer: Option<String>,
    pub poststed: Option<String>,
    pub telefon: Option<String>,
    pub epost: Option<String>,
}

/// Header-name assignment used to lift a parsed row into a `CustomerRecord`.
/// Callers typically fill this from the column-mapping cache keyed by the
/// table's column fingerprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    pub navn: Option<String>,
    pub adresse: Option<String>,
    pub postnummer: Option<String>,
    pub poststed: Option<String>,
    pub telefon: Option<String>,
    pub epost: Option<String>,
}

impl CustomerRecord {
    pub fn from_row(row: &RowRecord, mapping: &FieldMapping) -> Self {
        Self {
            id: None,
            navn: lift(row, mapping.navn.as_deref()),
            adresse: lift(row, mapping.adresse.as_deref()),
            postnummer: lift(row, mapping.postnummer.as_deref()),
            poststed: lift(row, mapping.poststed.as_deref()),
            telefon: lift(row, mapping.telefon.as_deref()),
            epost: lift(row, mapping.epost.as_deref()),
        }
    }
}

fn lift(row: &RowRecord, header: Option<&str>) -> Option<String> {
    let value = row.get(header?)?.as_ref()?;
    Some(value.render())
}
