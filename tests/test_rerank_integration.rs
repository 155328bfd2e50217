//! Re-ranking integration tests
//!
//! Exercises every strategy through the public `rerank` entry point

use semrank::config::RerankConfig;
use semrank::retrieval::{
    rerank, Bm25Params, Candidate, CandidateSet, DiversityParams, PersonalizedParams,
    RecencyParams, RerankStrategy, SimilarityMetric, UserProfile,
};
use serde_json::json;

fn candidate_pool() -> CandidateSet {
    CandidateSet::new(
        vec![
            Candidate::new("doc_0", "The quick brown fox jumps over the lazy dog", 0.12)
                .with_metadata("date", 1_700_000_000),
            Candidate::new("doc_1", "Foxes are small omnivorous mammals", 0.18)
                .with_metadata("date", 1_710_000_000),
            Candidate::new("doc_2", "A lazy afternoon in the garden", 0.25)
                .with_metadata("date", 1_650_000_000),
            Candidate::new("doc_3", "The quick brown fox jumps over the lazy cat", 0.27)
                .with_metadata("timestamp", "1720000000"),
            Candidate::new("doc_4", "Rust ownership rules prevent data races", 0.4)
                .with_metadata("date", 1_600_000_000),
        ],
        SimilarityMetric::Cosine,
    )
}

fn all_strategies() -> Vec<RerankStrategy> {
    let profile = UserProfile::new()
        .with_keyword("fox", 1.0)
        .with_keyword("rust", 0.5);

    vec![
        RerankStrategy::None,
        RerankStrategy::Bm25(Bm25Params::default()),
        RerankStrategy::Diversity(DiversityParams::new(0.7).unwrap()),
        RerankStrategy::Recency(RecencyParams::new(0.5).unwrap()),
        RerankStrategy::Personalized(PersonalizedParams::new(profile)),
    ]
}

fn sorted_ids(candidates: &CandidateSet) -> Vec<String> {
    let mut ids: Vec<String> = candidates.ids().into_iter().map(String::from).collect();
    ids.sort();
    ids
}

#[test]
fn test_every_strategy_preserves_membership() {
    let original = candidate_pool();

    for strategy in all_strategies() {
        let reranked = rerank("quick fox", original.clone(), &strategy).unwrap();

        assert_eq!(reranked.len(), original.len(), "strategy {}", strategy);
        assert_eq!(sorted_ids(&reranked), sorted_ids(&original));
        assert_eq!(reranked.metric(), original.metric());

        for candidate in reranked.iter() {
            let source = original
                .iter()
                .find(|c| c.id == candidate.id)
                .unwrap_or_else(|| panic!("unknown id {}", candidate.id));
            assert_eq!(candidate.text, source.text);
            assert_eq!(candidate.metadata, source.metadata);
        }
    }
}

#[test]
fn test_every_strategy_is_deterministic() {
    for strategy in all_strategies() {
        let first = rerank("lazy fox", candidate_pool(), &strategy).unwrap();
        let second = rerank("lazy fox", candidate_pool(), &strategy).unwrap();
        assert_eq!(first, second, "strategy {}", strategy);
    }
}

#[test]
fn test_empty_set_is_returned_unchanged() {
    for name in RerankStrategy::NAMES {
        let strategy: RerankStrategy = name.parse().unwrap();
        let result = rerank("fox", CandidateSet::default(), &strategy).unwrap();
        assert!(result.is_empty());
    }
}

#[test]
fn test_bm25_fox_example() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("1", "the quick brown fox", 0.5),
            Candidate::new("2", "a lazy dog", 0.5),
            Candidate::new("3", "the fox is quick", 0.5),
        ],
        SimilarityMetric::Cosine,
    );

    let strategy: RerankStrategy = "bm25".parse().unwrap();
    let reranked = rerank("fox", candidates, &strategy).unwrap();

    assert_eq!(reranked.ids().last(), Some(&"2"));
    let top: Vec<&str> = reranked.ids()[..2].to_vec();
    assert!(top.contains(&"1") && top.contains(&"3"));
}

#[test]
fn test_bm25_rewrites_distances_from_composite() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("1", "no match here", 0.2),
            Candidate::new("2", "fox", 0.4),
        ],
        SimilarityMetric::Cosine,
    );

    let reranked = rerank(
        "fox",
        candidates,
        &RerankStrategy::Bm25(Bm25Params::default()),
    )
    .unwrap();

    // composite("2") = 0.5 * 0.6 + 0.5 * 1.0 = 0.8; composite("1") = 0.5 * 0.8 = 0.4
    assert_eq!(reranked.ids(), vec!["2", "1"]);
    assert!((reranked.candidates()[0].distance - 0.2).abs() < 1e-5);
    assert!((reranked.candidates()[1].distance - 0.6).abs() < 1e-5);
}

#[test]
fn test_diversity_example() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("dup_a", "vector search with approximate neighbors", 0.05),
            Candidate::new("dup_b", "vector search with approximate neighbors today", 0.07),
            Candidate::new("other", "baking sourdough bread at home", 0.35),
        ],
        SimilarityMetric::Cosine,
    );

    let strategy = RerankStrategy::Diversity(DiversityParams::new(0.8).unwrap());
    let reranked = rerank("vector search", candidates, &strategy).unwrap();

    assert_eq!(reranked.ids(), vec!["dup_a", "other", "dup_b"]);
}

#[test]
fn test_recency_example() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("old", "same relevance", 0.5).with_metadata("date", 100),
            Candidate::new("new", "same relevance", 0.5).with_metadata("date", 200),
        ],
        SimilarityMetric::Cosine,
    );

    let strategy = RerankStrategy::Recency(RecencyParams::new(1.0).unwrap());
    let reranked = rerank("anything", candidates, &strategy).unwrap();

    assert_eq!(reranked.ids(), vec!["new", "old"]);
}

#[test]
fn test_recency_without_dates_is_noop() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("a", "first", 0.4),
            Candidate::new("b", "second", 0.1),
            Candidate::new("c", "third", 0.3),
        ],
        SimilarityMetric::Cosine,
    );
    let expected = candidates.clone();

    let strategy = RerankStrategy::Recency(RecencyParams::default());
    assert_eq!(rerank("q", candidates, &strategy).unwrap(), expected);
}

#[test]
fn test_recency_unparseable_date_is_noop() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("a", "first", 0.4).with_metadata("date", "2024-03-01"),
            Candidate::new("b", "second", 0.1).with_metadata("date", 5),
        ],
        SimilarityMetric::Cosine,
    );
    let expected = candidates.clone();

    let strategy = RerankStrategy::Recency(RecencyParams::new(1.0).unwrap());
    assert_eq!(rerank("q", candidates, &strategy).unwrap(), expected);
}

#[test]
fn test_personalized_example() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("plain", "the dog sleeps", 0.3),
            Candidate::new("fox", "the fox jumps", 0.3),
        ],
        SimilarityMetric::Cosine,
    );

    let profile: UserProfile = [("fox".to_string(), 1.0)].into_iter().collect();
    let strategy = RerankStrategy::Personalized(PersonalizedParams::new(profile));
    let reranked = rerank("q", candidates, &strategy).unwrap();

    assert_eq!(reranked.ids(), vec!["fox", "plain"]);
}

#[test]
fn test_personalized_profile_from_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, json!({ "garden": 2.0 }).to_string()).unwrap();

    let mut config = RerankConfig::default();
    config.personalized.profile_path = Some(path);

    let strategy = RerankStrategy::from_name("personalized", &config, None).unwrap();
    let reranked = rerank("q", candidate_pool(), &strategy).unwrap();

    assert_eq!(reranked.ids()[0], "doc_2");
}

#[test]
fn test_euclidean_metric_round_trip() {
    let candidates = CandidateSet::new(
        vec![
            Candidate::new("near", "fox den", 0.5),
            Candidate::new("far", "fox fox fox", 3.0),
        ],
        SimilarityMetric::Euclidean,
    );

    let reranked = rerank(
        "fox",
        candidates,
        &RerankStrategy::Diversity(DiversityParams::new(0.0).unwrap()),
    )
    .unwrap();

    assert_eq!(reranked.ids(), vec!["near", "far"]);
    assert!((reranked.candidates()[0].distance - 0.5).abs() < 1e-4);
    assert!((reranked.candidates()[1].distance - 3.0).abs() < 1e-4);
}

#[test]
fn test_invalid_parameters_rejected() {
    let strategy = RerankStrategy::Bm25(Bm25Params {
        k1: -1.0,
        ..Bm25Params::default()
    });
    assert!(rerank("q", candidate_pool(), &strategy).is_err());

    let strategy = RerankStrategy::Personalized(PersonalizedParams {
        profile: UserProfile::new(),
        personal_weight: 1.5,
    });
    assert!(rerank("q", candidate_pool(), &strategy).is_err());
}
