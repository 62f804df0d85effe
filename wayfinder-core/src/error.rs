use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Polyline must contain at least one point")]
    EmptyPolyline,
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
