//! Integration tests for the pipeline.
//!
//! These tests run the generator against a real DataIndex and a model built
//! from the same ratings.

use data_loader::{Business, BusinessCatalog, DataIndex, Rating, RatingStore, User};
use pipeline::filters::AlreadyRatedFilter;
use pipeline::{FilterPipeline, RecommendationGenerator, RecommendationSource};
use similarity::{SimilarityModel, build_similarity_model};
use std::sync::Arc;

fn business(id: &str, average_rating: f32) -> Business {
    Business {
        id: id.to_string(),
        name: format!("Business {}", id),
        category: "Restaurantes".to_string(),
        description: String::new(),
        average_rating,
        image_url: None,
        coordinates: None,
        phone: None,
        email: None,
        opening_hours: Default::default(),
    }
}

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {}", id),
        email: None,
    }
}

/// Catalog A-E plus X, Y, Z; popularity order X > Y > Z > the rest
fn create_test_setup() -> (Arc<DataIndex>, SimilarityModel) {
    let mut index = DataIndex::new();

    index.insert_business(business("A", 3.0));
    index.insert_business(business("B", 3.5));
    index.insert_business(business("C", 2.5));
    index.insert_business(business("D", 2.0));
    index.insert_business(business("X", 4.9));
    index.insert_business(business("Y", 4.8));
    index.insert_business(business("Z", 4.7));

    for id in ["U1", "U2", "U3", "U4"] {
        index.insert_user(user(id));
    }

    // U1 and U2 overlap on B; D is rated by U4 only
    index.insert_rating(Rating::new("U1", "A", 5));
    index.insert_rating(Rating::new("U1", "B", 4));
    index.insert_rating(Rating::new("U2", "B", 5));
    index.insert_rating(Rating::new("U2", "C", 4));
    index.insert_rating(Rating::new("U4", "D", 3));

    let (model, _) = build_similarity_model(&index.fetch_all_ratings());
    (Arc::new(index), model)
}

fn generator(index: &Arc<DataIndex>) -> RecommendationGenerator {
    RecommendationGenerator::new(index.clone(), index.clone())
}

fn ids(recommendations: &[pipeline::Recommendation]) -> Vec<&str> {
    recommendations.iter().map(|r| r.item_id.as_str()).collect()
}

#[test]
fn test_user_without_ratings_gets_popular_businesses() {
    let (index, model) = create_test_setup();

    let recommendations = generator(&index).recommend("U3", &model, 2);

    assert_eq!(ids(&recommendations), ["X", "Y"]);
    assert!(recommendations.iter().all(|r| r.source == RecommendationSource::Popularity));
    assert!((recommendations[0].score - 4.9).abs() < 1e-6);
}

#[test]
fn test_unknown_user_matches_popularity() {
    let (index, model) = create_test_setup();

    let recommendations = generator(&index).recommend("nobody", &model, 3);
    assert_eq!(ids(&recommendations), index.top_by_popularity(3));
}

#[test]
fn test_empty_model_falls_back_even_for_raters() {
    let (index, _) = create_test_setup();

    let recommendations = generator(&index).recommend("U1", &SimilarityModel::Empty, 3);

    assert_eq!(ids(&recommendations), ["X", "Y", "Z"]);
}

#[test]
fn test_collaborative_ranking() {
    let (index, model) = create_test_setup();

    let recommendations = generator(&index).recommend("U1", &model, 5);

    // C shares a rater with B; D shares nobody
    assert_eq!(ids(&recommendations), ["C", "D"]);
    assert!(recommendations.iter().all(|r| r.source == RecommendationSource::Collaborative));
    assert!(recommendations[0].score > 0.0);
    assert_eq!(recommendations[1].score, 0.0);
}

#[test]
fn test_never_recommends_rated_businesses() {
    let (index, model) = create_test_setup();
    let generator = generator(&index);

    for user_id in ["U1", "U2", "U3", "U4"] {
        let rated: Vec<String> = index
            .fetch_ratings_for_user(user_id)
            .into_iter()
            .map(|r| r.item_id)
            .collect();
        for limit in 0..8 {
            let recommendations = generator.recommend(user_id, &model, limit);
            assert!(recommendations.len() <= limit);
            for recommendation in &recommendations {
                assert!(!rated.contains(&recommendation.item_id));
            }
        }
    }
}

#[test]
fn test_user_who_rated_everything_gets_popularity() {
    let mut index = DataIndex::new();
    index.insert_business(business("A", 4.0));
    index.insert_business(business("B", 4.5));
    index.insert_user(user("U1"));
    index.insert_user(user("U2"));
    index.insert_rating(Rating::new("U1", "A", 5));
    index.insert_rating(Rating::new("U1", "B", 4));
    index.insert_rating(Rating::new("U2", "A", 3));
    let index = Arc::new(index);

    let (model, _) = build_similarity_model(&index.fetch_all_ratings());
    let recommendations = generator(&index).recommend("U1", &model, 5);

    assert_eq!(ids(&recommendations), ["B", "A"]);
    assert!(recommendations.iter().all(|r| r.source == RecommendationSource::Popularity));
}

#[test]
fn test_candidates_missing_from_catalog_are_dropped() {
    let (index, _) = create_test_setup();

    // "Closed" only exists in the rating history the model was built from
    let (model, _) = build_similarity_model(&[
        Rating::new("U1", "A", 5),
        Rating::new("U2", "A", 4),
        Rating::new("U2", "Closed", 5),
    ]);

    let recommendations = generator(&index).recommend("U1", &model, 5);
    assert!(!ids(&recommendations).contains(&"Closed"));
    assert!(!recommendations.is_empty());
}

#[test]
fn test_custom_pipeline_keeps_unknown_businesses() {
    let (index, _) = create_test_setup();
    let (model, _) = build_similarity_model(&[
        Rating::new("U1", "A", 5),
        Rating::new("U2", "A", 4),
        Rating::new("U2", "Closed", 5),
    ]);

    let generator = generator(&index)
        .with_filter_pipeline(FilterPipeline::new().add_filter(AlreadyRatedFilter));
    let recommendations = generator.recommend("U1", &model, 5);

    assert_eq!(recommendations[0].item_id, "Closed");
}
