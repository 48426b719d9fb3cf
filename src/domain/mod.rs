pub mod entities;
pub mod fieldtype;
pub mod fingerprint;
pub mod header;
pub mod normalize;
pub mod similarity;
