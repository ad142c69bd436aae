//! Record types of a collection and nearest-neighbour ranking over them.

use serde::Serialize;
use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::error::{StoreError, StoreResult};

/// One embedded document as stored in the `records` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
}

/// A query hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub similarity: f32,
}

/// Up to `k` records most similar to `embedding`, best first.
///
/// `records` must be in insertion order; ties keep that order.
pub fn nearest(records: &[Record], embedding: &[f32], k: usize) -> StoreResult<Vec<QueryMatch>> {
    if let Some(first) = records.first() {
        if first.embedding.len() != embedding.len() {
            return Err(StoreError::DimensionMismatch {
                expected: first.embedding.len(),
                actual: embedding.len(),
            });
        }
    }

    let mut scored: Vec<(usize, f32)> = records
        .iter()
        .enumerate()
        .map(|(pos, r)| (pos, cosine_similarity(&r.embedding, embedding)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(k)
        .map(|(pos, similarity)| {
            let record = &records[pos];
            QueryMatch {
                id: record.id.clone(),
                document: record.document.clone(),
                similarity,
            }
        })
        .collect())
}

pub(crate) fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(std::mem::size_of_val(vector));
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

pub(crate) fn decode_embedding(blob: &[u8], dimension: usize) -> StoreResult<Vec<f32>> {
    let expected = dimension * std::mem::size_of::<f32>();
    if blob.len() != expected {
        return Err(StoreError::InvalidDbValue(format!(
            "embedding blob is {} bytes, expected {}",
            blob.len(),
            expected
        )));
    }

    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> Record {
        Record {
            id: id.to_string(),
            document: format!("doc {}", id),
            embedding,
        }
    }

    #[test]
    fn test_nearest_orders_by_similarity() {
        let records = vec![
            record("1", vec![1.0, 0.0]),
            record("2", vec![0.0, 1.0]),
            record("3", vec![0.7, 0.7]),
        ];

        let hits = nearest(&records, &[1.0, 0.1], 2).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(hits[0].similarity >= hits[1].similarity);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let records = vec![record("1", vec![1.0, 0.0]), record("2", vec![1.0, 0.0])];
        let hits = nearest(&records, &[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].id, "1");
        assert_eq!(hits[1].id, "2");
    }

    #[test]
    fn test_nearest_rejects_dimension_mismatch() {
        let records = vec![record("1", vec![1.0, 0.0])];
        let err = nearest(&records, &[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_nearest_on_empty_collection() {
        assert!(nearest(&[], &[1.0], 2).unwrap().is_empty());
    }

    #[test]
    fn test_embedding_blob_layout() {
        let blob = encode_embedding(&[1.0, -0.5]);
        assert_eq!(blob.len(), 8);
        assert_eq!(&blob[..4], &1.0f32.to_le_bytes());
        assert_eq!(decode_embedding(&blob, 2).unwrap(), vec![1.0, -0.5]);
        assert!(decode_embedding(&blob, 3).is_err());
    }
}
