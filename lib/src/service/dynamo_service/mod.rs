
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{operation::scan::ScanOutput, types::{AttributeValue, ReturnValue}};
use aws_smithy_types::error::display::DisplayErrorContext;
use serde_dynamo::{from_items, to_item};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use super::common_structs::{NewPlaylist, Playlist};
use super::playlist_store::{build_playlist, playlist_not_found, PlaylistStore};


fn storage_error<E: std::error::Error>(error: E) -> ServiceError {
    ServiceError::Storage(format!("{}", DisplayErrorContext(&error)))
}


/// Playlist store backed by a DynamoDB table keyed on `id`.
#[derive(Debug, Clone)]
pub struct DynamoPlaylistStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoPlaylistStore {
    pub fn new(client: &aws_sdk_dynamodb::Client, table_name: &str) -> Self {
        Self {
            client: client.to_owned(),
            table_name: table_name.to_owned(),
        }
    }
}

fn output_to_playlists(output: &ScanOutput) -> ServiceResult<Vec<Playlist>> {
    let items = output.items.clone().unwrap_or_default();
    let playlists: Vec<Playlist> = from_items(items).map_err(storage_error)?;
    Ok(playlists)
}

#[async_trait]
impl PlaylistStore for DynamoPlaylistStore {
    fn kind(&self) -> &'static str {
        "dynamodb"
    }

    async fn create(&self, new_playlist: NewPlaylist) -> ServiceResult<Playlist> {
        let playlist = build_playlist(new_playlist)?;
        let item: HashMap<String, AttributeValue> = to_item(&playlist).map_err(storage_error)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(storage_error)?;
        info!(id = %playlist.id, "playlist registered to Dynamo");
        Ok(playlist)
    }

    async fn list(&self) -> ServiceResult<Vec<Playlist>> {
        let builder = self.client
            .scan()
            .table_name(&self.table_name);

        let output = builder.clone().send().await.map_err(storage_error)?;
        let mut playlists = output_to_playlists(&output)?;
        let mut last_evaluated_key = output.last_evaluated_key;

        while last_evaluated_key.is_some() {
            let output = builder.clone()
                .set_exclusive_start_key(last_evaluated_key.clone())
                .send()
                .await
                .map_err(storage_error)?;
            playlists.append(&mut output_to_playlists(&output)?);
            last_evaluated_key = output.last_evaluated_key;
        }

        debug!(count = playlists.len(), "playlists scanned");
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(playlists)
    }

    async fn like(&self, id: &str) -> ServiceResult<u64> {
        let result = self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_owned()))
            .update_expression("ADD likes :one")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_values(":one", AttributeValue::N("1".to_owned()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(error) => {
                let missing = error
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception());
                if missing {
                    return Err(playlist_not_found(id));
                }
                return Err(storage_error(error));
            }
        };

        let likes = output.attributes
            .as_ref()
            .and_then(|attributes| attributes.get("likes"))
            .and_then(|value| value.as_n().ok())
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| ServiceError::Storage("like count missing from update output".to_owned()))?;
        Ok(likes)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::common_structs::{Song, SongId};
    use chrono::{TimeZone, Utc};

    fn song(id: SongId, title: &str) -> Song {
        Song {
            id,
            title: title.to_owned(),
            artist: "Coldplay".to_owned(),
            genre: "Alternative".to_owned(),
            duration: "5:07".to_owned(),
            cover: "🎵".to_owned(),
            preview_url: None,
            spotify_url: Some("https://open.spotify.com/track/abc".to_owned()),
        }
    }

    #[test]
    fn scanned_items_decode_to_playlists() {
        let playlist = Playlist {
            id: "3f2b7f0e-5c1a-4d5e-9a51-0c8e2f6b1d2a".to_owned(),
            name: "Rainy Day".to_owned(),
            songs: vec![song(SongId::Index(16), "Clocks"), song(SongId::Catalog("abc".to_owned()), "Yellow")],
            mood: "neutral".to_owned(),
            owner_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            likes: 3,
            shares: 0,
        };

        let item: HashMap<String, AttributeValue> = to_item(&playlist).unwrap();
        assert_eq!(item.get("id"), Some(&AttributeValue::S(playlist.id.clone())));
        assert_eq!(item.get("likes"), Some(&AttributeValue::N("3".to_owned())));

        let output = ScanOutput::builder().set_items(Some(vec![item])).build();
        assert_eq!(output_to_playlists(&output).unwrap(), vec![playlist]);
    }

    #[test]
    fn empty_scan_has_no_playlists() {
        let output = ScanOutput::builder().build();
        assert!(output_to_playlists(&output).unwrap().is_empty());
    }
}
