pub mod certificate;
pub mod csv;
pub mod submission;
pub mod upload;
