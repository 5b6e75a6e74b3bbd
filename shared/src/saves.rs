use serde::{Deserialize, Serialize};

use crate::{clamp_channel, Color, Coord};

/// One entry in the remote save listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SaveSummary {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub saved_at: Option<String>,
}

/// `GET /api/saves` response body.
#[derive(Deserialize, Debug)]
pub struct SaveListing {
    pub saves: Vec<SaveSummary>,
}

/// `POST /api/saves` request body.
#[derive(Serialize, Debug)]
pub struct SaveRequest {
    pub name: String,
    pub pixels: Vec<Vec<[u8; 3]>>,
}

/// `POST /api/saves` response body.
#[derive(Deserialize, Debug)]
pub struct SaveCreated {
    pub save: SaveSummary,
}

/// `GET /api/saves/{slug}` response body. The strict `pixels` type is the
/// well-formedness check: anything that is not a sequence-of-sequences of
/// color triples fails deserialization before a single cell is applied.
/// Null positions are sparse holes and are skipped.
#[derive(Deserialize, Debug)]
pub struct SnapshotBody {
    pub name: String,
    pub pixels: Vec<Vec<Option<[i64; 3]>>>,
}

impl SnapshotBody {
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Color)> + '_ {
        self.pixels.iter().enumerate().flat_map(|(x, column)| {
            column.iter().enumerate().filter_map(move |(y, triple)| {
                let [r, g, b] = (*triple)?;
                Some((
                    Coord::new(x as u32, y as u32),
                    Color::new(clamp_channel(r), clamp_channel(g), clamp_channel(b)),
                ))
            })
        })
    }
}

/// Best-effort extraction of the `{error}` field from a failure body.
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_decodes() {
        let body = r#"{"saves":[{"slug":"demo","name":"Demo","saved_at":"2024-01-01T00:00:00+00:00","width":10,"height":20}]}"#;
        let listing: SaveListing = serde_json::from_str(body).unwrap();
        assert_eq!(listing.saves.len(), 1);
        assert_eq!(listing.saves[0].slug, "demo");
        assert_eq!(listing.saves[0].name, "Demo");
        assert!(listing.saves[0].saved_at.is_some());
    }

    #[test]
    fn empty_listing_decodes() {
        let listing: SaveListing = serde_json::from_str(r#"{"saves":[]}"#).unwrap();
        assert!(listing.saves.is_empty());
    }

    #[test]
    fn single_cell_snapshot_yields_one_update() {
        let body: SnapshotBody =
            serde_json::from_str(r#"{"name":"tiny","pixels":[[[1,2,3]]]}"#).unwrap();
        let cells: Vec<_> = body.cells().collect();
        assert_eq!(cells, vec![(Coord::new(0, 0), Color::new(1, 2, 3))]);
    }

    #[test]
    fn null_positions_are_skipped_and_channels_clamped() {
        let body: SnapshotBody =
            serde_json::from_str(r#"{"name":"s","pixels":[[null,[300,-1,7]],[[0,0,0],null]]}"#)
                .unwrap();
        let cells: Vec<_> = body.cells().collect();
        assert_eq!(
            cells,
            vec![
                (Coord::new(0, 1), Color::new(255, 0, 7)),
                (Coord::new(1, 0), Color::new(0, 0, 0)),
            ]
        );
    }

    #[test]
    fn malformed_snapshots_fail_before_applying() {
        assert!(serde_json::from_str::<SnapshotBody>(r#"{"name":"x","pixels":[[[1,2]]]}"#).is_err());
        assert!(serde_json::from_str::<SnapshotBody>(r#"{"name":"x","pixels":[["red"]]}"#).is_err());
        assert!(serde_json::from_str::<SnapshotBody>(r#"{"name":"x","pixels":"nope"}"#).is_err());
        assert!(serde_json::from_str::<SnapshotBody>(r#"{"pixels":[]}"#).is_err());
    }

    #[test]
    fn error_body_extraction_falls_back() {
        assert_eq!(
            error_message(r#"{"error":"Save not found."}"#, "generic"),
            "Save not found."
        );
        assert_eq!(error_message("<html>502</html>", "generic"), "generic");
        assert_eq!(error_message(r#"{"detail":"x"}"#, "generic"), "generic");
    }

    #[test]
    fn save_then_load_reproduces_the_grid() {
        use crate::grid::BoardGrid;

        let mut grid = BoardGrid::new(3, 2);
        grid.set(Coord::new(0, 1), Color::new(10, 20, 30));
        grid.set(Coord::new(2, 0), Color::new(255, 0, 0));
        let request = SaveRequest {
            name: "A".to_string(),
            pixels: grid.snapshot_pixels(),
        };
        let stored = serde_json::to_string(&request).unwrap();

        // What the server hands back for GET /api/saves/{slug}.
        let body: SnapshotBody = serde_json::from_str(&stored).unwrap();
        for (coord, color) in body.cells() {
            let expected = grid.get(coord).unwrap_or(Color::new(0, 0, 0));
            assert_eq!(color, expected, "mismatch at {coord:?}");
        }
        assert_eq!(body.cells().count(), 6);
    }

    #[test]
    fn save_request_serializes_name_and_grid() {
        let body = serde_json::to_string(&SaveRequest {
            name: "A".to_string(),
            pixels: vec![vec![[1, 2, 3]]],
        })
        .unwrap();
        assert_eq!(body, r#"{"name":"A","pixels":[[[1,2,3]]]}"#);
    }
}
