//! Update check scenarios against an in-memory release source

mod helper;

use std::sync::Arc;

use helper::{
    StaticChecksumFetcher, StaticReleaseSource, asset_url, create_test_resolver, release,
};
use release_resolver::config::{ExclusionEntry, ExclusionsConfig};
use release_resolver::release::catalogue::CatalogueQuery;
use release_resolver::release::error::ResolveError;
use release_resolver::release::exclusion::ExclusionRules;
use release_resolver::release::resolver::{AppSpec, UpdateCheck};
use release_resolver::release::version::Version;

const DIGEST: &str = "a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3";

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn cronus_alphas() -> StaticReleaseSource {
    StaticReleaseSource::new("ashep", "cronus")
        .with_page(vec![
            release("v1.0.0", &["cronus-esp32-1.0.0.bin"]),
            release("v0.0.1", &["cronus-esp32-0.0.1.bin"]),
            release("v0.0.1-alpha5", &["cronus-esp32-0.0.1-alpha5.bin"]),
        ])
        .with_page(vec![
            release("v0.0.1-alpha4", &["cronus-esp32-0.0.1-alpha4.bin"]),
            release("v0.0.1-alpha3", &["cronus-esp32-0.0.1-alpha3.bin"]),
            release("v0.0.1-alpha2", &["cronus-esp32-0.0.1-alpha2.bin"]),
            release("v0.0.1-alpha1", &["cronus-esp32-0.0.1-alpha1.bin"]),
        ])
}

fn alpha_query() -> CatalogueQuery {
    CatalogueQuery::new("ashep", "cronus", "esp32").with_prerelease(true)
}

#[tokio::test]
async fn source_excluded_version_never_gets_an_update() {
    let resolver = create_test_resolver(
        Arc::new(cronus_alphas()),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::from_config(&ExclusionsConfig::default()).unwrap(),
    );

    let result = resolver
        .check(&alpha_query(), Some("0.0.1-alpha1"))
        .await
        .unwrap();

    assert_eq!(result, UpdateCheck::NoUpdate);
}

#[tokio::test]
async fn target_excluded_alphas_are_skipped() {
    let exclusions = ExclusionsConfig {
        source: vec![],
        target: ["0.0.1-alpha2", "0.0.1-alpha3", "0.0.1-alpha4", "0.0.1-alpha5"]
            .iter()
            .map(|version| ExclusionEntry::new("ashep", "cronus", version))
            .collect(),
    };
    let resolver = create_test_resolver(
        Arc::new(cronus_alphas()),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::from_config(&exclusions).unwrap(),
    );

    let set = resolver.build(&alpha_query()).await.unwrap();
    let next = resolver.next(&set, Some(&v("0.0.1-alpha1"))).unwrap();

    assert_eq!(next.version, v("0.0.1"));
}

#[tokio::test]
async fn next_is_the_minimal_upgrade_not_the_latest() {
    let source = StaticReleaseSource::new("ashep", "cronus").with_page(vec![
        release("v2.0.0", &["cronus-esp32-2.0.0.bin"]),
        release("v1.1.0", &["cronus-esp32-1.1.0.bin"]),
        release("v1.0.0", &["cronus-esp32-1.0.0.bin"]),
    ]);
    let resolver = create_test_resolver(
        Arc::new(source),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );

    let result = resolver
        .check(&CatalogueQuery::new("ashep", "cronus", "esp32"), Some("1.0.0"))
        .await
        .unwrap();

    assert!(matches!(result, UpdateCheck::Available { ref version, .. } if *version == v("1.1.0")));
}

#[tokio::test]
async fn built_catalogue_is_sorted_across_pages() {
    let resolver = create_test_resolver(
        Arc::new(cronus_alphas()),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );

    let set = resolver.build(&alpha_query()).await.unwrap();

    assert_eq!(set.len(), 7);
    assert!(
        set.releases()
            .windows(2)
            .all(|pair| pair[0].version <= pair[1].version)
    );
    assert_eq!(set.releases()[0].version, v("0.0.1-alpha1"));
    assert_eq!(set.releases()[6].version, v("1.0.0"));
}

#[tokio::test]
async fn stable_channel_hides_alpha_releases() {
    let resolver = create_test_resolver(
        Arc::new(cronus_alphas()),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );

    let set = resolver
        .build(&CatalogueQuery::new("ashep", "cronus", "esp32"))
        .await
        .unwrap();

    let versions: Vec<String> = set.iter().map(|r| r.version.to_string()).collect();
    assert_eq!(versions, vec!["0.0.1", "1.0.0"]);
}

#[tokio::test]
async fn checksum_document_asset_is_never_listed() {
    let source = StaticReleaseSource::new("ashep", "cronus").with_page(vec![release(
        "v1.0.0",
        &[
            "cronus-linux_arm64-1.0.0.tar.gz",
            "cronus-linux_arm64-1.0.0.tar.gz.sha256",
        ],
    )]);
    let resolver = create_test_resolver(
        Arc::new(source),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );

    let set = resolver
        .build(&CatalogueQuery::new("ashep", "cronus", "linux-arm64"))
        .await
        .unwrap();

    let names: Vec<&str> = set.releases()[0]
        .assets
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["cronus-linux_arm64-1.0.0.tar.gz"]);
}

#[tokio::test]
async fn asset_for_another_app_is_excluded_even_if_arch_matches() {
    let source = StaticReleaseSource::new("ashep", "cronus")
        .with_page(vec![release("v1.0.0", &["widget-arm64.bin"])]);
    let resolver = create_test_resolver(
        Arc::new(source),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );

    let result = resolver
        .check(&CatalogueQuery::new("ashep", "cronus", "arm64"), Some("0.9.0"))
        .await
        .unwrap();

    assert_eq!(result, UpdateCheck::NoAssets { version: v("1.0.0") });
}

#[tokio::test]
async fn failing_checksum_degrades_to_empty_and_is_retried() {
    let ok = "cronus-esp32-ok-1.0.0.bin";
    let broken = "cronus-esp32-broken-1.0.0.bin";
    let source = Arc::new(
        StaticReleaseSource::new("ashep", "cronus").with_page(vec![release("v1.0.0", &[ok, broken])]),
    );
    let fetcher = Arc::new(
        StaticChecksumFetcher::default()
            .with_document(&format!("{}.sha256", asset_url(ok)), DIGEST)
            .with_status(&format!("{}.sha256", asset_url(broken)), 500),
    );
    let resolver = create_test_resolver(source, fetcher.clone(), ExclusionRules::default());
    let query = CatalogueQuery::new("ashep", "cronus", "esp32");

    let set = resolver.build(&query).await.unwrap();
    let assets = &set.releases()[0].assets;
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0].sha256, DIGEST);
    assert_eq!(assets[1].sha256, "");

    resolver.build(&query).await.unwrap();

    // the good digest is memoized, the failing one is fetched again
    assert_eq!(fetcher.calls(), 3);
    assert_eq!(resolver.checksums().len(), 1);
}

#[tokio::test]
async fn unknown_repository_is_app_not_found() {
    let source = Arc::new(StaticReleaseSource::new("ashep", "cronus"));
    let resolver = create_test_resolver(
        source.clone(),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );

    let result = resolver
        .check(&CatalogueQuery::new("ashep", "unknown", "esp32"), Some("1.0.0"))
        .await;

    assert!(matches!(result, Err(ResolveError::AppNotFound { .. })));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn app_spec_drives_a_full_check() {
    let source = StaticReleaseSource::new("ashep", "cronus").with_page(vec![
        release("v1.1.0", &["cronus-linux_arm64-1.1.0.tar.gz"]),
        release("v1.0.0", &["cronus-linux_arm64-1.0.0.tar.gz"]),
    ]);
    let resolver = create_test_resolver(
        Arc::new(source),
        Arc::new(StaticChecksumFetcher::default()),
        ExclusionRules::default(),
    );
    let spec: AppSpec = "ashep:cronus:Linux-ARM64:v1.0.0".parse().unwrap();

    let result = resolver
        .check(&spec.query(), Some(spec.version.as_str()))
        .await
        .unwrap();

    match result {
        UpdateCheck::Available { version, asset } => {
            assert_eq!(version, v("1.1.0"));
            assert_eq!(asset.url, asset_url("cronus-linux_arm64-1.1.0.tar.gz"));
            assert_eq!(asset.size, 4096);
        }
        other => panic!("expected an update, got {:?}", other),
    }
}
