use std::fs::{self, File};
use std::io::Write;

use crate::returns::*;

/// Reads the canonical dataset. A missing file is an empty dataset.
pub fn load_dataset(path: &str, title: &str) -> BReturnsResult<Dataset> {
    if !Path::new(path).exists() {
        warn!("load_dataset: {:?} does not exist, starting from an empty dataset", path);
        return Ok(Dataset::new(title));
    }
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let dataset: Dataset =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!(
        "load_dataset: {:?}: years {:?}, contests {:?}",
        path, dataset.metadata.years, dataset.metadata.contests
    );
    Ok(dataset)
}

/// Writes the dataset with a 2-space indentation.
///
/// The content goes to a temporary file in the same directory first, which is
/// then renamed over the dataset: readers never see a partial file.
pub fn save_dataset(path: &str, dataset: &Dataset) -> BReturnsResult<()> {
    let mut js = serde_json::to_string_pretty(dataset).context(SerializingJsonSnafu {})?;
    js.push('\n');

    let p = Path::new(path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu { path })?;
        }
    }
    let tmp_path = format!("{}.tmp", path);
    let mut file = File::create(&tmp_path).context(WritingFileSnafu {
        path: tmp_path.clone(),
    })?;
    file.write_all(js.as_bytes())
        .and_then(|_| file.sync_all())
        .context(WritingFileSnafu {
            path: tmp_path.clone(),
        })?;
    drop(file);
    fs::rename(&tmp_path, path).context(WritingFileSnafu { path })?;
    info!("save_dataset: {:?} written", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn missing_file_is_empty() {
        let d = load_dataset("/does/not/exist.json", "Title").unwrap();
        assert!(d.is_empty());
        assert_eq!(d.metadata.title, "Title");
    }

    #[test]
    fn save_and_load() {
        let dir = env::temp_dir().join(format!("countyret-io-dataset-{}", std::process::id()));
        let path = dir.join("nested").join("results.json").display().to_string();
        let n = Normalizer::default();
        let c = n.contest(2022, "Governor");
        let rows = vec![
            RawVoteRow::new("Erie", "Governor", "DEM", "Josh Shapiro", 60000),
            RawVoteRow::new("Erie", "Governor", "REP", "Doug Mastriano", 40000),
        ];
        let mut d = Dataset::new("Test");
        d.merge_contest(&c, aggregate_contest(&rows, &c, &n)).unwrap();

        save_dataset(&path, &d).unwrap();
        assert!(!Path::new(&format!("{}.tmp", path)).exists());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"metadata\": {"));
        assert_eq!(load_dataset(&path, "").unwrap(), d);

        // A second save replaces the file in place.
        let mut d2 = Dataset::new("Second");
        d2.merge_contest(&c, aggregate_contest(&rows[..1], &c, &n)).unwrap();
        save_dataset(&path, &d2).unwrap();
        assert!(!Path::new(&format!("{}.tmp", path)).exists());
        assert_eq!(load_dataset(&path, "").unwrap(), d2);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_dataset(&path, "").map_err(|e| *e),
            Err(ReturnsError::ParsingJson { .. })
        ));
    }
}
