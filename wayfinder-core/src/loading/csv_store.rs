use std::fs::File;
use std::path::{Path, PathBuf};

use geo::Coord;
use hashbrown::{HashMap, HashSet};
use log::debug;

use super::store::FacilityStore;
use crate::{Edge, Error, Location, NodeId};

const EDGES_FILE: &str = "edges.csv";
const LOCATIONS_FILE: &str = "locations.csv";

/// Store backed by a directory holding `edges.csv` and `locations.csv`
///
/// Tables are re-read on every call, so edits to the files are picked up
/// by the next route query.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Opens a store directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or one of the table files is missing
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::InvalidData(format!(
                "Data directory not found: {}",
                dir.display()
            )));
        }

        for file in [EDGES_FILE, LOCATIONS_FILE] {
            let path = dir.join(file);
            if !path.exists() {
                return Err(Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Table file not found: {}", path.display()),
                )));
            }
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FacilityStore for CsvStore {
    fn edges(&self) -> Result<Vec<Edge>, Error> {
        let edges: Vec<Edge> = read_table(&self.dir.join(EDGES_FILE))?;
        debug!("Read {} edges from {}", edges.len(), self.dir.display());
        Ok(edges)
    }

    fn locations(&self, ids: &[NodeId]) -> Result<HashMap<NodeId, Coord<f64>>, Error> {
        let wanted: HashSet<NodeId> = ids.iter().copied().collect();
        let locations: Vec<Location> = read_table(&self.dir.join(LOCATIONS_FILE))?;

        Ok(locations
            .iter()
            .filter(|location| wanted.contains(&location.id))
            .map(|location| (location.id, location.coord()))
            .collect())
    }
}

/// Deserializes every row of a CSV table, failing on the first bad row
fn read_table<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_tables(dir: &Path, edges: &str, locations: &str) {
        fs::write(dir.join(EDGES_FILE), edges).unwrap();
        fs::write(dir.join(LOCATIONS_FILE), locations).unwrap();
    }

    #[test]
    fn reads_both_tables() {
        let dir = tempdir().unwrap();
        write_tables(
            dir.path(),
            "from_id,to_id,distance\n1,2,3\n2,3,4.5\n",
            "id,x,y\n1,0,0\n2,3,0\n3, 3, 4\n",
        );

        let store = CsvStore::open(dir.path()).unwrap();
        let edges = store.edges().unwrap();
        assert_eq!(edges, vec![Edge::new(1, 2, 3.0), Edge::new(2, 3, 4.5)]);

        let locations = store.locations(&[1, 3, 9]).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[&3], Coord { x: 3.0, y: 4.0 });
        assert!(!locations.contains_key(&9));
    }

    #[test]
    fn missing_table_is_rejected_on_open() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(EDGES_FILE), "from_id,to_id,distance\n").unwrap();

        assert!(matches!(
            CsvStore::open(dir.path()),
            Err(Error::IoError(_))
        ));
        assert!(CsvStore::open(dir.path().join("nope")).is_err());
    }

    #[test]
    fn malformed_row_fails_the_read() {
        let dir = tempdir().unwrap();
        write_tables(
            dir.path(),
            "from_id,to_id,distance\n1,2,far\n",
            "id,x,y\n",
        );

        let store = CsvStore::open(dir.path()).unwrap();
        assert!(matches!(store.edges(), Err(Error::CsvError(_))));
    }

    #[test]
    fn table_removed_after_open_surfaces_io_error() {
        let dir = tempdir().unwrap();
        write_tables(dir.path(), "from_id,to_id,distance\n", "id,x,y\n");
        let store = CsvStore::open(dir.path()).unwrap();

        fs::remove_file(dir.path().join(EDGES_FILE)).unwrap();
        assert!(matches!(store.edges(), Err(Error::IoError(_))));
    }
}
