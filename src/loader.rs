//! CSV ingestion of job records.
//!
//! Each record is `title, longitude, latitude`. A leading title line is
//! detected and dropped; malformed rows are skipped with a warning rather than
//! failing the whole load.

use crate::compute::validation::validate_geographic_point;
use crate::error::Result;
use nearjobs_types::{GeoPoint, Job};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Jobs read from a CSV source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedJobs {
    pub jobs: Vec<Job>,
    /// Rows dropped for a wrong column count or bad coordinates.
    pub skipped: usize,
}

/// Read jobs from the CSV file at `path`.
pub fn load_jobs<P: AsRef<Path>>(path: P) -> Result<LoadedJobs> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let loaded = load_jobs_from_reader(file)?;
    log::info!(
        "Loaded {} jobs from {} ({} rows skipped)",
        loaded.jobs.len(),
        path.display(),
        loaded.skipped
    );
    Ok(loaded)
}

/// Read jobs from any CSV byte source.
pub fn load_jobs_from_reader<R: Read>(reader: R) -> Result<LoadedJobs> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut loaded = LoadedJobs::default();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record.position().map_or(index as u64 + 1, |p| p.line());

        if index == 0 && is_title_line(&record) {
            log::debug!("Skipping title line {:?}", record);
            continue;
        }

        if record.len() != 3 {
            log::warn!(
                "Skipping line {}: expected 3 columns, found {}",
                line,
                record.len()
            );
            loaded.skipped += 1;
            continue;
        }

        let Ok(longitude) = record[1].parse::<f64>() else {
            log::warn!("Skipping line {}: error parsing longitude {:?}", line, &record[1]);
            loaded.skipped += 1;
            continue;
        };
        let Ok(latitude) = record[2].parse::<f64>() else {
            log::warn!("Skipping line {}: error parsing latitude {:?}", line, &record[2]);
            loaded.skipped += 1;
            continue;
        };

        let location = GeoPoint::new(longitude, latitude);
        if let Err(e) = validate_geographic_point(&location) {
            log::warn!("Skipping line {}: {}", line, e);
            loaded.skipped += 1;
            continue;
        }

        loaded.jobs.push(Job::new(&record[0], location));
    }

    Ok(loaded)
}

/// A first row is a title line when its coordinate columns are not numbers.
fn is_title_line(record: &csv::StringRecord) -> bool {
    let not_number = |i: usize| record.get(i).is_some_and(|v| v.parse::<f64>().is_err());
    not_number(1) || not_number(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_title_line_is_dropped() {
        let data = "Title,Longitude,Latitude\nChef,3.38,6.52\nDriver,3.40,6.50\n";
        let loaded = load_jobs_from_reader(data.as_bytes()).unwrap();
        assert_eq!(loaded.jobs.len(), 2);
        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.jobs[0], Job::new("Chef", GeoPoint::new(3.38, 6.52)));
    }

    #[test]
    fn test_data_without_title_line() {
        let data = "Chef,3.38,6.52\n";
        let loaded = load_jobs_from_reader(data.as_bytes()).unwrap();
        assert_eq!(loaded.jobs.len(), 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let data = "\
Chef,3.38,6.52
Incomplete,3.38
Too,many,1.0,2.0
Cook,abc,6.5
Baker,3.3,north
Pilot,3.3,NaN
Diver,500,6.5
\"Engineer, Senior\",3.39,6.51
";
        let loaded = load_jobs_from_reader(data.as_bytes()).unwrap();
        let titles: Vec<_> = loaded.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Chef", "Engineer, Senior"]);
        assert_eq!(loaded.skipped, 6);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let data = "  Chef , 3.38 , 6.52 \n";
        let loaded = load_jobs_from_reader(data.as_bytes()).unwrap();
        assert_eq!(loaded.jobs, vec![Job::new("Chef", GeoPoint::new(3.38, 6.52))]);
    }

    #[test]
    fn test_empty_input() {
        let loaded = load_jobs_from_reader("".as_bytes()).unwrap();
        assert!(loaded.jobs.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title,lon,lat").unwrap();
        writeln!(file, "Chef,3.38,6.52").unwrap();
        file.flush().unwrap();

        let loaded = load_jobs(file.path()).unwrap();
        assert_eq!(loaded.jobs.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_jobs("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, crate::error::NearJobsError::Io(_)));
    }
}
