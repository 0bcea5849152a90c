use std::collections::HashSet;
use std::path::{Path, PathBuf};

use geotour_shared::models::{Poi, QuizSet};
use geotour_shared::quiz::QuizError;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("duplicate POI id {0}")]
    DuplicatePoi(String),
    #[error("POI {id} has a non-positive geofence radius {radius}")]
    BadRadius { id: String, radius: f64 },
    #[error("POI {id} has coordinates out of range")]
    BadCoordinates { id: String },
    #[error("quiz references unknown POI {0}")]
    UnknownQuizPoi(String),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Static tour content: the POI list and the quiz sets keyed by POI id.
pub struct Assets {
    pub pois: Vec<Poi>,
    pub quizzes: Vec<QuizSet>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let data = std::fs::read_to_string(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| AssetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Assets {
    pub fn load(assets_dir: &Path) -> Result<Self, AssetError> {
        let pois: Vec<Poi> = read_json(&assets_dir.join("pois.json"))?;
        let quizzes: Vec<QuizSet> = read_json(&assets_dir.join("quizzes.json"))?;

        let assets = Assets::new(pois, quizzes)?;
        tracing::info!(
            pois = assets.pois.len(),
            quizzes = assets.quizzes.len(),
            "Loaded tour content"
        );
        Ok(assets)
    }

    /// Validate and wrap already-parsed content.
    pub fn new(pois: Vec<Poi>, quizzes: Vec<QuizSet>) -> Result<Self, AssetError> {
        let mut seen = HashSet::new();
        for poi in &pois {
            if !seen.insert(poi.id.as_str()) {
                return Err(AssetError::DuplicatePoi(poi.id.clone()));
            }
            if poi.geofence_radius.is_nan() || poi.geofence_radius <= 0.0 {
                return Err(AssetError::BadRadius {
                    id: poi.id.clone(),
                    radius: poi.geofence_radius,
                });
            }
            let c = poi.coordinates;
            if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) {
                return Err(AssetError::BadCoordinates { id: poi.id.clone() });
            }
        }
        for quiz in &quizzes {
            if !seen.contains(quiz.poi_id.as_str()) {
                return Err(AssetError::UnknownQuizPoi(quiz.poi_id.clone()));
            }
            quiz.validate()?;
        }
        Ok(Assets { pois, quizzes })
    }

    pub fn find_poi(&self, id: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.id == id)
    }

    pub fn find_quiz(&self, poi_id: &str) -> Option<&QuizSet> {
        self.quizzes.iter().find(|q| q.poi_id == poi_id)
    }
}
