pub mod csv;
pub mod xlsx;

use anyhow::Result;

use crate::domain::entities::table::Workbook;

const ZIP_MAGIC: &[u8] = b"PK";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Sniff the container format and decode the upload into an in-memory
/// workbook. Zip containers are xlsx/xlsm/ods, the OLE magic is legacy xls,
/// anything else is treated as CSV text.
pub fn decode_workbook(bytes: &[u8]) -> Result<Workbook> {
    if bytes.starts_with(ZIP_MAGIC) {
        xlsx::decode_zip_container(bytes)
    } else if bytes.starts_with(OLE_MAGIC) {
        xlsx::decode_legacy(bytes)
    } else {
        csv::decode_csv(bytes)
    }
}
