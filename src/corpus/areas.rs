//! Assembly area corpus.
//!
//! Each district is one JSON file:
//!
//! ```json
//! { "district": "Kadıköy", "areas": [ { "name": "...", ... } ] }
//! ```
//!
//! Field names are also accepted in their Turkish spelling (`ilce`,
//! `toplanma_alanlari`, `ad`, `mahalle`, ...) and the generic
//! `{ "group_key": ..., "items": [...] }` form is understood as well. Missing
//! fields default to empty or zero, and numbers written as strings are
//! tolerated.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use walkdir::WalkDir;

use crate::config::AreasConfig;
use crate::corpus::{RecordGroup, SearchableRecord};
use crate::error::{CorpusError, CorpusResult};
use crate::semantic::{FULL_DATA_KEY, Metadata, SemanticField};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyArea {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(alias = "ad")]
    pub name: String,
    #[serde(alias = "mahalle")]
    pub neighborhood: String,
    #[serde(alias = "koordinat")]
    pub coordinates: Coordinates,
    #[serde(alias = "alan_bilgileri")]
    pub capacity: Capacity,
    #[serde(alias = "altyapi")]
    pub infrastructure: Infrastructure,
    #[serde(alias = "ulasim")]
    pub access: Access,
    #[serde(alias = "ozellikler")]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    #[serde(deserialize_with = "lenient_number")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub lng: f64,
}

impl Coordinates {
    /// Only coordinates with both components set are meaningful.
    pub fn is_known(&self) -> bool {
        self.lat != 0.0 && self.lng != 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacity {
    #[serde(alias = "toplam_alan", deserialize_with = "lenient_number")]
    pub total_area: f64,
    #[serde(alias = "kullanilabilir_alan", deserialize_with = "lenient_number")]
    pub usable_area: f64,
    #[serde(alias = "kapasite", deserialize_with = "lenient_number")]
    pub capacity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Infrastructure {
    #[serde(alias = "elektrik", deserialize_with = "lenient_bool")]
    pub electricity: bool,
    #[serde(alias = "su", deserialize_with = "lenient_bool")]
    pub water: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub wc: bool,
    #[serde(alias = "kanalizasyon", deserialize_with = "lenient_bool")]
    pub sewage: bool,
}

impl Infrastructure {
    /// Available facilities in fixed order.
    pub fn available(&self) -> Vec<&'static str> {
        [
            (self.electricity, "electricity"),
            (self.water, "water"),
            (self.wc, "WC"),
            (self.sewage, "sewage"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Access {
    #[serde(alias = "yol_durumu", deserialize_with = "lenient_string")]
    pub road_condition: String,
    #[serde(alias = "ulasim_tipi")]
    pub transport: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(alias = "tur", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(alias = "durum", deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(alias = "tabela_kodu", deserialize_with = "lenient_string")]
    pub sign_code: String,
    #[serde(alias = "aciklama", deserialize_with = "lenient_string")]
    pub description: String,
}

/// On-disk shape of one district file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DistrictFile {
    #[serde(alias = "ilce", alias = "group_key")]
    district: String,
    #[serde(alias = "toplanma_alanlari", alias = "items")]
    areas: Vec<AssemblyArea>,
}

impl SearchableRecord for AssemblyArea {
    fn semantic_fields(&self, district: &str) -> Vec<SemanticField> {
        let infrastructure = self.infrastructure.available();
        vec![
            SemanticField::new("District", district),
            SemanticField::new("Name", self.name.as_str()),
            SemanticField::new("Neighborhood", self.neighborhood.as_str()),
            SemanticField::when("Coordinates", self.coordinates.is_known(), || {
                format!("{}, {}", self.coordinates.lat, self.coordinates.lng)
            }),
            SemanticField::when("Total area", self.capacity.total_area > 0.0, || {
                format!("{} m²", self.capacity.total_area)
            }),
            SemanticField::new("Infrastructure", infrastructure.join(", ")),
            SemanticField::new("Road condition", self.access.road_condition.as_str()),
            SemanticField::new("Type", self.attributes.kind.as_str()),
            SemanticField::new("Status", self.attributes.status.as_str()),
            SemanticField::new("Description", self.attributes.description.as_str()),
        ]
    }

    fn metadata(&self, district: &str, _position: usize) -> Metadata {
        let mut metadata = Metadata::new();
        metadata
            .insert("district", district)
            .insert("area_id", self.id.as_str())
            .insert("area_name", self.name.as_str())
            .insert("neighborhood", self.neighborhood.as_str())
            .insert_serialized("coordinates", &self.coordinates)
            .insert_serialized("capacity", &self.capacity)
            .insert_serialized("infrastructure", &self.infrastructure)
            .insert_serialized("access", &self.access)
            .insert_serialized("attributes", &self.attributes)
            .insert_serialized(FULL_DATA_KEY, self);
        metadata
    }

    fn literal_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.neighborhood.as_str()]
    }
}

/// Parses one district document.
pub fn parse_district(json: &str) -> Result<RecordGroup<AssemblyArea>, serde_json::Error> {
    let file: DistrictFile = serde_json::from_str(json)?;
    Ok(RecordGroup::new(file.district, file.areas))
}

/// Loads every district file of the configured data directory.
///
/// Files are visited in file-name order so rebuilds are reproducible.
/// Configured summary files are skipped. A file that cannot be read or
/// parsed, including a dangling link, is logged and skipped; only an
/// unreadable data directory is an error.
pub fn load_area_groups(config: &AreasConfig) -> CorpusResult<Vec<RecordGroup<AssemblyArea>>> {
    load_area_dir(&config.data_dir, &config.skip_files)
}

pub fn load_area_dir(
    dir: &Path,
    skip_files: &[String],
) -> CorpusResult<Vec<RecordGroup<AssemblyArea>>> {
    let mut groups = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Depth 0 is the data directory itself
            Err(source) if source.depth() == 0 => {
                return Err(CorpusError::DirectoryRead {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        let path = entry.path();

        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if skip_files.iter().any(|skip| *skip == file_name) {
            tracing::debug!("Skipping summary file {}", path.display());
            continue;
        }

        match read_district_file(path) {
            Ok(group) => {
                tracing::debug!("Loaded {} areas for {}", group.items.len(), group.key);
                groups.push(group);
            }
            Err(e) => tracing::warn!("Skipping district file: {e}"),
        }
    }

    tracing::info!(
        "Loaded {} districts with {} areas from {}",
        groups.len(),
        groups.iter().map(|g| g.items.len()).sum::<usize>(),
        dir.display()
    );
    Ok(groups)
}

fn read_district_file(path: &Path) -> CorpusResult<RecordGroup<AssemblyArea>> {
    let json = std::fs::read_to_string(path).map_err(|source| CorpusError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_district(&json).map_err(|source| CorpusError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "evet" | "var" | "1"
        ),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::render_document;
    use tempfile::TempDir;

    const KADIKOY: &str = r#"{
        "ilce": "Kadıköy",
        "toplanma_alanlari": [
            {
                "id": "KADIKOY_12",
                "ad": "Yoğurtçu Parkı",
                "mahalle": "Caferağa",
                "koordinat": {"lat": 40.9849, "lng": 29.0322},
                "alan_bilgileri": {"toplam_alan": 1500, "kullanilabilir_alan": "1200", "kapasite": 300},
                "altyapi": {"elektrik": true, "su": false, "wc": 1, "kanalizasyon": "evet"},
                "ulasim": {"yol_durumu": "Asfalt", "ulasim_tipi": ["otobüs"]},
                "ozellikler": {"tur": "Park", "durum": "Aktif", "tabela_kodu": "", "aciklama": ""}
            },
            { "ad": "Boş Alan", "koordinat": {"lat": 40.9, "lng": 0} }
        ]
    }"#;

    #[test]
    fn test_parse_turkish_keys() {
        let group = parse_district(KADIKOY).unwrap();
        assert_eq!(group.key, "Kadıköy");
        assert_eq!(group.items.len(), 2);

        let park = &group.items[0];
        assert_eq!(park.name, "Yoğurtçu Parkı");
        assert_eq!(park.capacity.usable_area, 1200.0);
        assert!(park.infrastructure.wc);
        assert!(park.infrastructure.sewage);
        assert_eq!(park.access.transport, vec!["otobüs"]);
    }

    #[test]
    fn test_parse_english_and_generic_keys() {
        let english = r#"{"district": "Üsküdar", "areas": [{"name": "Meydan", "id": 7}]}"#;
        let group = parse_district(english).unwrap();
        assert_eq!(group.key, "Üsküdar");
        assert_eq!(group.items[0].id, "7");

        let generic = r#"{"group_key": "Beşiktaş", "items": [{"name": "Sahil"}]}"#;
        let group = parse_district(generic).unwrap();
        assert_eq!(group.key, "Beşiktaş");
        assert_eq!(group.items[0].name, "Sahil");
    }

    #[test]
    fn test_document_field_order() {
        let group = parse_district(KADIKOY).unwrap();
        let document = render_document(&group.items[0].semantic_fields(&group.key));

        assert_eq!(
            document,
            "District: Kadıköy | Name: Yoğurtçu Parkı | Neighborhood: Caferağa | \
             Coordinates: 40.9849, 29.0322 | Total area: 1500 m² | \
             Infrastructure: electricity, WC, sewage | Road condition: Asfalt | \
             Type: Park | Status: Aktif"
        );
    }

    #[test]
    fn test_document_omits_partial_coordinates_and_zero_area() {
        let group = parse_district(KADIKOY).unwrap();
        let document = render_document(&group.items[1].semantic_fields(&group.key));
        assert_eq!(document, "District: Kadıköy | Name: Boş Alan");
    }

    #[test]
    fn test_metadata_keys() {
        let group = parse_district(KADIKOY).unwrap();
        let metadata = group.items[0].metadata(&group.key, 0);

        assert_eq!(
            metadata.keys().collect::<Vec<_>>(),
            vec![
                "district",
                "area_id",
                "area_name",
                "neighborhood",
                "coordinates",
                "capacity",
                "infrastructure",
                "access",
                "attributes",
                "full_data"
            ]
        );
        assert_eq!(metadata.get_str("district"), Some("Kadıköy"));
        assert_eq!(
            metadata.full_data().and_then(|d| d.get("name")),
            Some(&Value::from("Yoğurtçu Parkı"))
        );
    }

    #[test]
    fn test_load_dir_sorted_skips_summary_and_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::fs::write(dir.join("b_uskudar.json"), r#"{"ilce": "Üsküdar", "toplanma_alanlari": [{"ad": "Meydan"}]}"#).unwrap();
        std::fs::write(dir.join("a_kadikoy.json"), KADIKOY).unwrap();
        std::fs::write(dir.join("00_ozet.json"), r#"{"toplam": 2}"#).unwrap();
        std::fs::write(dir.join("c_broken.json"), "{ not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let groups = load_area_dir(dir, &["00_ozet.json".to_string()]).unwrap();
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Kadıköy", "Üsküdar"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::os::unix::fs::symlink(dir.join("gone.json"), dir.join("a_dangling.json")).unwrap();
        std::fs::write(dir.join("b_kadikoy.json"), KADIKOY).unwrap();

        let groups = load_area_dir(dir, &[]).unwrap();
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Kadıköy"]);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_area_dir(&temp_dir.path().join("absent"), &[]);
        assert!(matches!(result, Err(CorpusError::DirectoryRead { .. })));
    }
}
