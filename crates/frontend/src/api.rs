use geotour_shared::models::{GeoCoordinate, LocalizedText, Poi, Question, QuizSet};
use serde::{Deserialize, Serialize};

/// Build the variables JSON for a quiz query.
pub fn build_quiz_variables(poi_id: &str) -> serde_json::Value {
    serde_json::json!({ "poiId": poi_id })
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

impl<T> GraphQLResponse<T> {
    /// Errors win over partial data.
    fn into_result(self) -> Result<T, String> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(messages.join("; "));
        }
        self.data.ok_or_else(|| "Empty response from tour server".to_string())
    }
}

fn graphql_endpoint() -> Result<String, String> {
    let origin = web_sys::window()
        .ok_or("No window")?
        .location()
        .origin()
        .map_err(|_| "No origin".to_string())?;
    Ok(format!("{origin}/graphql"))
}

async fn query<T: for<'de> Deserialize<'de>>(
    document: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let body = GraphQLRequest {
        query: document.to_string(),
        variables,
    };

    let http = reqwest::Client::new()
        .post(graphql_endpoint()?)
        .json(&body)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|err| {
            tracing::warn!(%err, "tour server unreachable");
            err.to_string()
        })?;

    let parsed: GraphQLResponse<T> = http.json().await.map_err(|e| e.to_string())?;
    parsed.into_result().inspect_err(|message| {
        tracing::warn!(%message, "GraphQL query failed");
    })
}

// Types mirroring the GraphQL schema. Text fields come back in one locale
// each; both locales are fetched with aliases and merged.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateData {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiData {
    pub id: String,
    pub coordinates: CoordinateData,
    pub geofence_radius: f64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionData {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizData {
    pub poi_id: String,
    pub questions: Vec<QuestionData>,
}

#[derive(Debug, Deserialize)]
pub struct PoisResponse {
    pub en: Vec<PoiData>,
    pub de: Vec<PoiData>,
}

#[derive(Debug, Deserialize)]
pub struct QuizResponse {
    pub en: Option<QuizData>,
    pub de: Option<QuizData>,
}

/// Zip the English and German POI lists into bilingual POIs.
pub fn merge_pois(en: Vec<PoiData>, de: Vec<PoiData>) -> Result<Vec<Poi>, String> {
    if en.len() != de.len() {
        return Err("POI lists differ between locales".to_string());
    }
    en.into_iter()
        .zip(de)
        .map(|(en, de)| {
            if en.id != de.id {
                return Err(format!("POI order differs: {} vs {}", en.id, de.id));
            }
            Ok(Poi {
                id: en.id,
                coordinates: GeoCoordinate::new(en.coordinates.latitude, en.coordinates.longitude),
                geofence_radius: en.geofence_radius,
                name: LocalizedText::new(en.name, de.name),
                description: LocalizedText::new(en.description, de.description),
            })
        })
        .collect()
}

/// Zip the English and German renderings of one quiz.
pub fn merge_quiz(en: QuizData, de: QuizData) -> Result<QuizSet, String> {
    if en.questions.len() != de.questions.len() {
        return Err(format!("Quiz {} differs between locales", en.poi_id));
    }
    let questions = en
        .questions
        .into_iter()
        .zip(de.questions)
        .map(|(en, de)| {
            let options: Vec<LocalizedText> = en
                .options
                .into_iter()
                .zip(de.options)
                .map(|(e, d)| LocalizedText::new(e, d))
                .collect();
            let options: [LocalizedText; 4] = options
                .try_into()
                .map_err(|_| "Every question needs exactly four options".to_string())?;
            Ok(Question {
                prompt: LocalizedText::new(en.prompt, de.prompt),
                options,
                correct_index: en.correct_index,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    Ok(QuizSet {
        poi_id: en.poi_id,
        questions,
    })
}

const POI_FIELDS: &str =
    "id coordinates { latitude longitude } geofenceRadius name description";

pub async fn fetch_pois() -> Result<Vec<Poi>, String> {
    let query_str = format!(
        "query {{ en: pois(locale: EN) {{ {POI_FIELDS} }} de: pois(locale: DE) {{ {POI_FIELDS} }} }}"
    );
    let resp: PoisResponse = query(&query_str, None).await?;
    merge_pois(resp.en, resp.de)
}

pub async fn fetch_quiz(poi_id: &str) -> Result<Option<QuizSet>, String> {
    let resp: QuizResponse = query(
        r#"query FetchQuiz($poiId: String!) {
            en: quiz(poiId: $poiId, locale: EN) { poiId questions { prompt options correctIndex } }
            de: quiz(poiId: $poiId, locale: DE) { poiId questions { prompt options correctIndex } }
        }"#,
        Some(build_quiz_variables(poi_id)),
    )
    .await?;
    match (resp.en, resp.de) {
        (Some(en), Some(de)) => merge_quiz(en, de).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotour_shared::models::Locale;

    fn poi_data(id: &str, name: &str) -> PoiData {
        PoiData {
            id: id.to_string(),
            coordinates: CoordinateData {
                latitude: 52.14,
                longitude: 12.593,
            },
            geofence_radius: 50.0,
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn quiz_data(options: &[&str]) -> QuizData {
        QuizData {
            poi_id: "church".to_string(),
            questions: vec![QuestionData {
                prompt: "?".to_string(),
                options: options.iter().map(|s| s.to_string()).collect(),
                correct_index: 1,
            }],
        }
    }

    // --- GraphQL request serialization ---

    #[test]
    fn test_graphql_request_serializes_with_variables() {
        let req = GraphQLRequest {
            query: "query { quiz(poiId: $poiId) { poiId } }".to_string(),
            variables: Some(build_quiz_variables("church")),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["variables"]["poiId"], "church");
    }

    #[test]
    fn test_graphql_request_omits_null_variables() {
        let req = GraphQLRequest {
            query: "query { pois { id } }".to_string(),
            variables: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("variables").is_none());
    }

    // --- Response deserialization ---

    #[test]
    fn test_pois_response_deserializes() {
        let json = r#"{"en":[{"id":"mill","coordinates":{"latitude":52.145,"longitude":12.6},"geofenceRadius":30.0,"name":"Windmill","description":""}],
                       "de":[{"id":"mill","coordinates":{"latitude":52.145,"longitude":12.6},"geofenceRadius":30.0,"name":"Windmühle","description":""}]}"#;
        let resp: PoisResponse = serde_json::from_str(json).unwrap();
        let pois = merge_pois(resp.en, resp.de).unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].name.get(Locale::De), "Windmühle");
        assert_eq!(pois[0].geofence_radius, 30.0);
    }

    #[test]
    fn test_quiz_response_null() {
        let resp: QuizResponse = serde_json::from_str(r#"{"en":null,"de":null}"#).unwrap();
        assert!(resp.en.is_none());
        assert!(resp.de.is_none());
    }

    #[test]
    fn test_graphql_error_response() {
        let json = r#"{"data":null,"errors":[{"message":"Coordinates out of range"}]}"#;
        let resp: GraphQLResponse<PoisResponse> = serde_json::from_str(json).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.into_result().unwrap_err(), "Coordinates out of range");
    }

    #[test]
    fn test_graphql_errors_joined_and_win_over_data() {
        let json = r#"{
            "data": {"en": [], "de": []},
            "errors": [{"message":"first"},{"message":"second"}]
        }"#;
        let resp: GraphQLResponse<PoisResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_result().unwrap_err(), "first; second");
    }

    #[test]
    fn test_graphql_missing_errors_field() {
        let resp: GraphQLResponse<PoisResponse> =
            serde_json::from_str(r#"{"data":{"en":[],"de":[]}}"#).unwrap();
        let data = resp.into_result().unwrap();
        assert!(data.en.is_empty());
    }

    // --- Locale merging ---

    #[test]
    fn test_merge_pois_rejects_mismatched_order() {
        let err = merge_pois(
            vec![poi_data("a", "A"), poi_data("b", "B")],
            vec![poi_data("b", "B"), poi_data("a", "A")],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_merge_pois_rejects_length_mismatch() {
        assert!(merge_pois(vec![poi_data("a", "A")], vec![]).is_err());
    }

    #[test]
    fn test_merge_quiz() {
        let set = merge_quiz(
            quiz_data(&["Stone", "Brick", "Wood", "Steel"]),
            quiz_data(&["Stein", "Backstein", "Holz", "Stahl"]),
        )
        .unwrap();
        assert_eq!(set.poi_id, "church");
        assert_eq!(set.questions[0].options[1].get(Locale::De), "Backstein");
        assert_eq!(set.questions[0].correct_index, 1);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_merge_quiz_requires_four_options() {
        assert!(merge_quiz(quiz_data(&["a", "b", "c"]), quiz_data(&["a", "b", "c"])).is_err());
    }
}
