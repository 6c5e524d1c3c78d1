//! In-memory store contract tests: ordering, dimensionality, emptiness.

use std::collections::HashMap;

use proptest::prelude::*;
use ragserve_core::document::Chunk;
use ragserve_core::error::RagError;
use ragserve_core::inmemory::InMemoryStore;
use ragserve_core::store::DocumentStore;

fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: format!("text for {id}"),
        embedding,
        metadata: HashMap::new(),
        document_id: "doc".to_string(),
    }
}

#[tokio::test]
async fn insert_rejects_mismatched_dimensions() {
    let store = InMemoryStore::new();
    store.insert(&[chunk("a", vec![1.0, 0.0, 0.0])]).await.unwrap();

    let err = store.insert(&[chunk("b", vec![1.0, 0.0])]).await.unwrap_err();
    match err {
        RagError::DimensionMismatch { expected, actual } => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
    // The rejected batch wrote nothing.
    assert_eq!(store.count().await, 1);
}

#[tokio::test]
async fn fixed_dimensions_enforced_from_construction() {
    let store = InMemoryStore::with_dimensions(4);
    let err = store.insert(&[chunk("a", vec![1.0, 0.0])]).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 2 }));
}

#[tokio::test]
async fn insert_rejects_chunk_without_embedding() {
    let store = InMemoryStore::new();
    let err = store.insert(&[chunk("a", Vec::new())]).await.unwrap_err();
    assert!(matches!(err, RagError::Validation(_)));
}

#[tokio::test]
async fn nearest_on_empty_store_is_an_error() {
    let store = InMemoryStore::new();
    let err = store.nearest(&[1.0, 0.0], 3).await.unwrap_err();
    assert!(matches!(err, RagError::EmptyStore));
}

#[tokio::test]
async fn nearest_rejects_mismatched_query_dimensions() {
    let store = InMemoryStore::new();
    store.insert(&[chunk("a", vec![1.0, 0.0, 0.0])]).await.unwrap();
    let err = store.nearest(&[1.0, 0.0], 3).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
}

#[tokio::test]
async fn reinserting_an_id_overwrites_instead_of_duplicating() {
    let store = InMemoryStore::new();
    store.insert(&[chunk("a", vec![1.0, 0.0])]).await.unwrap();
    store.insert(&[chunk("a", vec![0.0, 1.0])]).await.unwrap();
    assert_eq!(store.count().await, 1);

    let results = store.nearest(&[0.0, 1.0], 1).await.unwrap();
    assert_eq!(results[0].chunk.embedding, vec![0.0, 1.0]);
}

#[tokio::test]
async fn nearest_is_deterministic_for_fixed_contents() {
    let store = InMemoryStore::new();
    // Two records equidistant from the query; id breaks the tie.
    store
        .insert(&[
            chunk("b", vec![1.0, 0.0]),
            chunk("a", vec![1.0, 0.0]),
            chunk("c", vec![0.0, 1.0]),
        ])
        .await
        .unwrap();

    let first = store.nearest(&[1.0, 0.0], 3).await.unwrap();
    let second = store.nearest(&[1.0, 0.0], 3).await.unwrap();
    let ids: Vec<&str> = first.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(
        ids,
        second.iter().map(|r| r.chunk.id.as_str()).collect::<Vec<_>>(),
    );
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", arb_normalized_embedding(dim)).prop_map(|(id, embedding)| Chunk {
        id,
        text: "text".to_string(),
        embedding,
        metadata: HashMap::new(),
        document_id: "doc".to_string(),
    })
}

mod prop_nearest_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any stored set, nearest() returns at most top_k results in
        /// descending-score order.
        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let store = InMemoryStore::with_dimensions(DIM);

                // Deduplicate by id so the expected count is exact.
                let mut deduped: HashMap<String, Chunk> = HashMap::new();
                for chunk in &chunks {
                    deduped.entry(chunk.id.clone()).or_insert_with(|| chunk.clone());
                }
                let unique: Vec<Chunk> = deduped.into_values().collect();
                let count = unique.len();

                store.insert(&unique).await.unwrap();
                (store.nearest(&query, top_k).await.unwrap(), count)
            });

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= unique_count);

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}
