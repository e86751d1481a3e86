use serde::{Deserialize, Serialize};
use serde_json::Value;

/* ---------- Request bodies ---------- */

/// Innertube client context attached to every request
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub client_name: String,
    pub client_version: String,
}

impl ClientContext {
    pub fn web(client_version: &str) -> Self {
        Self {
            client: ClientInfo {
                client_name: "WEB".to_string(),
                client_version: client_version.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub context: ClientContext,
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPlaylistRequest {
    pub context: ClientContext,
    pub actions: Vec<AddVideoAction>,
    pub playlist_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoAction {
    pub action: String,
    pub added_video_id: String,
}

impl AddVideoAction {
    pub fn add(video_id: &str) -> Self {
        Self {
            action: "ACTION_ADD_VIDEO".to_string(),
            added_video_id: video_id.to_string(),
        }
    }
}

/* ---------- Response bodies ---------- */

/// The only field of the edit_playlist response the classifier inspects
/// structurally; everything else is scanned as raw text.
#[derive(Debug, Clone, Deserialize)]
pub struct EditPlaylistResponse {
    #[serde(default)]
    pub status: Option<String>,
}

/// Pull the top-ranked video ID out of an innertube search response.
///
/// Walks the documented result path first; falls back to a depth-first
/// scan for any `videoRenderer`, since innertube reshuffles its envelope
/// between client versions.
pub fn first_video_id(response: &Value) -> Option<&str> {
    let sections = response
        .pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")
        .and_then(Value::as_array);

    if let Some(sections) = sections {
        for section in sections {
            let items = section
                .pointer("/itemSectionRenderer/contents")
                .and_then(Value::as_array);
            for item in items.into_iter().flatten() {
                if let Some(id) = item
                    .pointer("/videoRenderer/videoId")
                    .and_then(Value::as_str)
                {
                    return Some(id);
                }
            }
        }
    }

    scan_for_video_renderer(response)
}

fn scan_for_video_renderer(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => {
            if let Some(id) = map
                .get("videoRenderer")
                .and_then(|renderer| renderer.get("videoId"))
                .and_then(Value::as_str)
            {
                return Some(id);
            }
            map.values().find_map(scan_for_video_renderer)
        }
        Value::Array(items) => items.iter().find_map(scan_for_video_renderer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_first_video_on_documented_path() {
        let response = json!({
            "contents": {
                "twoColumnSearchResultsRenderer": {
                    "primaryContents": {
                        "sectionListRenderer": {
                            "contents": [
                                {
                                    "itemSectionRenderer": {
                                        "contents": [
                                            { "adSlotRenderer": {} },
                                            { "videoRenderer": { "videoId": "abc123" } },
                                            { "videoRenderer": { "videoId": "second" } }
                                        ]
                                    }
                                }
                            ]
                        }
                    }
                }
            }
        });

        assert_eq!(first_video_id(&response), Some("abc123"));
    }

    #[test]
    fn falls_back_to_scanning_unknown_envelopes() {
        let response = json!({
            "onResponseReceivedCommands": [
                { "appendContinuationItemsAction": {
                    "continuationItems": [
                        { "videoRenderer": { "videoId": "xyz789" } }
                    ]
                }}
            ]
        });

        assert_eq!(first_video_id(&response), Some("xyz789"));
    }

    #[test]
    fn empty_result_set_yields_none() {
        let response = json!({
            "contents": {
                "twoColumnSearchResultsRenderer": {
                    "primaryContents": {
                        "sectionListRenderer": { "contents": [] }
                    }
                }
            }
        });

        assert_eq!(first_video_id(&response), None);
    }

    #[test]
    fn edit_playlist_request_serializes_like_the_web_client() {
        let request = EditPlaylistRequest {
            context: ClientContext::web("2.20240101.00.00"),
            actions: vec![AddVideoAction::add("abc123")],
            playlist_id: "PLdef".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["context"]["client"]["clientName"], "WEB");
        assert_eq!(value["actions"][0]["action"], "ACTION_ADD_VIDEO");
        assert_eq!(value["actions"][0]["addedVideoId"], "abc123");
        assert_eq!(value["playlistId"], "PLdef");
    }
}
