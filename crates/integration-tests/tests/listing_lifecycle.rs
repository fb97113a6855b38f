//! End-to-end listing lifecycle over SQLite and the HTML extractor
//!
//! Pages and maps lookups come from the in-process mocks; everything else is the
//! production wiring.

use std::sync::Arc;
use std::time::Duration;

use flatscout_core::application::{
    unit_channel, EnrichmentService, JobCoordinator, RecomputeEntry, RecomputeRequest,
    ScrapePipeline, SubmitOutcome, SubmitRequest, Supervisor, TransportService, UnitOutcome,
};
use flatscout_core::domain::{keys, Destination, JobStatus, TravelMode};
use flatscout_core::error::AppError;
use flatscout_core::port::maps::mocks::{MockAnswer, MockGeocoder, MockTravelPlanner};
use flatscout_core::port::page_fetcher::mocks::StaticPageFetcher;
use flatscout_core::port::time_provider::SystemTimeProvider;
use flatscout_core::port::{FetchError, ListingRepository};
use flatscout_infra_html::HtmlListingExtractor;
use flatscout_infra_sqlite::{create_pool, run_migrations, SqliteListingRepository};

const LISTING_URL: &str = "https://www.wgzimmer.ch/wglink/de/1001.html";

const LISTING_PAGE: &str = r#"<html><body>
<h3 class="label">Daten und Miete</h3>
<ul>
  <li><strong>Miete / Monat:</strong> CHF 1200</li>
  <li><strong>Zimmer:</strong> 1</li>
  <li><strong>Etage:</strong></li>
</ul>
<h3 class="label">Adresse</h3>
<ul>
  <li><strong>Adresse:</strong> Musterstrasse 5</li>
  <li><strong>Ort:</strong> 8001 Zürich</li>
  <li><strong>Region:</strong> <a href="/region/zh">Zürich Stadt</a></li>
</ul>
<h3 class="label">Beschreibung</h3>
<p>Helles Zimmer<br>mit Balkon</p>
</body></html>"#;

struct System {
    coordinator: Arc<JobCoordinator>,
    transport: TransportService,
    supervisor: Supervisor,
    repo: Arc<SqliteListingRepository>,
    fetcher: Arc<StaticPageFetcher>,
}

async fn system(fetcher: StaticPageFetcher, enrichment: Option<EnrichmentService>) -> System {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let repo = Arc::new(SqliteListingRepository::new(pool));
    let fetcher = Arc::new(fetcher);
    let enrichment = enrichment.map(Arc::new);
    let pipeline = Arc::new(ScrapePipeline::new(
        repo.clone(),
        fetcher.clone(),
        Arc::new(HtmlListingExtractor::new()),
        enrichment.clone(),
    ));
    let (spawner, supervisor) = unit_channel();
    let coordinator = Arc::new(JobCoordinator::new(
        repo.clone(),
        pipeline,
        spawner,
        Arc::new(SystemTimeProvider),
    ));
    let transport = TransportService::new(repo.clone(), enrichment);

    System {
        coordinator,
        transport,
        supervisor,
        repo,
        fetcher,
    }
}

fn google_like_enrichment() -> EnrichmentService {
    EnrichmentService::new(
        Arc::new(MockGeocoder::found(47.3769, 8.5417)),
        Arc::new(MockTravelPlanner::uniform("25 mins", "2.4 km")),
        Destination::default(),
    )
}

#[tokio::test]
async fn test_submit_scrape_enrich_persist() {
    let mut sys = system(
        StaticPageFetcher::new().with_page(LISTING_URL, LISTING_PAGE),
        Some(google_like_enrichment()),
    )
    .await;

    let outcome = sys
        .coordinator
        .submit(SubmitRequest::new(LISTING_URL))
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Pending);

    let report = sys.supervisor.next_report().await.unwrap();
    assert_eq!(report.url, LISTING_URL);
    assert_eq!(report.outcome, UnitOutcome::Finished(JobStatus::Complete));

    let job = sys.coordinator.query(LISTING_URL).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    let listing = job.listing.unwrap();
    assert_eq!(listing.get(keys::RENT_PER_MONTH), Some("CHF 1200"));
    assert_eq!(listing.get(keys::REGION), Some("Zürich Stadt"));
    assert_eq!(listing.get(keys::DESCRIPTION), Some("Helles Zimmer\nmit Balkon"));
    // Empty item is kept as an absent value
    assert!(listing.contains_key("etage"));
    assert_eq!(listing.get("etage"), None);

    assert_eq!(job.transport.duration(TravelMode::Transit), Some("25 mins"));
    assert_eq!(job.transport.latitude, Some(47.3769));
    // Distances are reported but never stored
    assert_eq!(job.transport.transit_distance, None);

    // Resubmitting returns the stored record without a second fetch
    match sys
        .coordinator
        .submit(SubmitRequest::new(LISTING_URL))
        .await
        .unwrap()
    {
        SubmitOutcome::Complete(stored) => assert_eq!(stored.get("zimmer"), Some("1")),
        other => panic!("expected complete, got {:?}", other),
    }
    assert_eq!(sys.fetcher.call_count(LISTING_URL), 1);
}

#[tokio::test]
async fn test_concurrent_submissions_create_one_row() {
    let mut sys = system(
        StaticPageFetcher::new()
            .with_page(LISTING_URL, LISTING_PAGE)
            .with_delay(Duration::from_millis(50)),
        None,
    )
    .await;

    let submits = (0..20).map(|_| {
        let coordinator = Arc::clone(&sys.coordinator);
        tokio::spawn(async move { coordinator.submit(SubmitRequest::new(LISTING_URL)).await })
    });
    for outcome in futures::future::join_all(submits).await {
        assert_eq!(outcome.unwrap().unwrap(), SubmitOutcome::Pending);
    }

    sys.supervisor.next_report().await.unwrap();
    assert_eq!(sys.repo.list_all().await.unwrap().len(), 1);
    assert_eq!(sys.fetcher.call_count(LISTING_URL), 1);
    assert_eq!(sys.coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_fetch_failure_and_empty_page_fail_the_job() {
    let broken = "https://www.wgzimmer.ch/wglink/de/404.html";
    let empty = "https://www.wgzimmer.ch/wglink/de/empty.html";
    let mut sys = system(
        StaticPageFetcher::new()
            .with_error(broken, FetchError::Transport("connection reset".to_string()))
            .with_page(empty, "<html><body><p>Inserat abgelaufen</p></body></html>"),
        None,
    )
    .await;

    sys.coordinator
        .submit(SubmitRequest::new(broken))
        .await
        .unwrap();
    sys.coordinator.submit(SubmitRequest::new(empty)).await.unwrap();
    for _ in 0..2 {
        let report = sys.supervisor.next_report().await.unwrap();
        assert_eq!(report.outcome, UnitOutcome::Finished(JobStatus::Failed));
    }

    for url in [broken, empty] {
        let job = sys.coordinator.query(url).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.listing.is_none());
    }
    let counts = sys.coordinator.counts().await.unwrap();
    assert_eq!(counts.failed, 2);
    assert_eq!(counts.total, 2);
}

#[tokio::test]
async fn test_partial_enrichment_failure_keeps_other_fields() {
    let enrichment = EnrichmentService::new(
        Arc::new(MockGeocoder::new(MockAnswer::NotFound)),
        Arc::new(
            MockTravelPlanner::uniform("30 mins", "2.0 km")
                .with_answer(TravelMode::Cycling, MockAnswer::Fail("OVER_QUERY_LIMIT".into())),
        ),
        Destination::default(),
    );
    let mut sys = system(
        StaticPageFetcher::new().with_page(LISTING_URL, LISTING_PAGE),
        Some(enrichment),
    )
    .await;

    sys.coordinator
        .submit(SubmitRequest::new(LISTING_URL))
        .await
        .unwrap();
    sys.supervisor.next_report().await.unwrap();

    let job = sys.coordinator.query(LISTING_URL).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.transport.walking_time.as_deref(), Some("30 mins"));
    assert_eq!(job.transport.cycling_time, None);
    assert_eq!(job.transport.coordinates(), None);
}

#[tokio::test]
async fn test_recompute_single_and_bulk() {
    let mut sys = system(
        StaticPageFetcher::new().with_page(LISTING_URL, LISTING_PAGE),
        None,
    )
    .await;
    sys.coordinator
        .submit(SubmitRequest::new(LISTING_URL))
        .await
        .unwrap();
    sys.supervisor.next_report().await.unwrap();
    let id = sys.coordinator.query(LISTING_URL).await.unwrap().unwrap().id;

    // Stored without enrichment: every duration is missing
    assert_eq!(sys.repo.list_missing_transport().await.unwrap().len(), 1);
    assert!(matches!(
        sys.transport.recompute_missing().await,
        Err(AppError::Config(_))
    ));

    let transport = TransportService::new(sys.repo.clone(), Some(Arc::new(google_like_enrichment())));
    let bulk = transport.recompute_missing().await.unwrap();
    assert_eq!(bulk.processed, 1);
    match &bulk.results[0] {
        RecomputeEntry::Done(done) => {
            assert_eq!(done.job_id, id);
            assert_eq!(done.address, "Musterstrasse 5, 8001 Zürich");
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert!(sys.repo.list_missing_transport().await.unwrap().is_empty());

    let req = RecomputeRequest {
        job_id: Some(id),
        address: "Bahnhofstrasse 1, 8001 Zürich".to_string(),
        locality: Some("8001 Zürich".to_string()),
    };
    let first = transport.recompute(req.clone()).await.unwrap();
    let stored_first = sys.repo.find_by_id(id).await.unwrap().unwrap().transport;
    let second = transport.recompute(req).await.unwrap();
    let stored_second = sys.repo.find_by_id(id).await.unwrap().unwrap().transport;

    // A locality already present in the address is not appended again
    assert_eq!(first.address, "Bahnhofstrasse 1, 8001 Zürich");
    assert_eq!(first, second);
    assert_eq!(stored_first, stored_second);
}

#[tokio::test]
async fn test_flags_order_and_delete() {
    let second_url = "https://www.wgzimmer.ch/wglink/de/1002.html";
    let mut sys = system(
        StaticPageFetcher::new()
            .with_page(LISTING_URL, LISTING_PAGE)
            .with_page(second_url, LISTING_PAGE),
        None,
    )
    .await;
    for url in [LISTING_URL, second_url] {
        sys.coordinator.submit(SubmitRequest::new(url)).await.unwrap();
        sys.supervisor.next_report().await.unwrap();
        // Distinct scraped_at values
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let first_id = sys.coordinator.query(LISTING_URL).await.unwrap().unwrap().id;

    // Newest first, liked before everything
    let order: Vec<String> = sys
        .coordinator
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.url)
        .collect();
    assert_eq!(order, vec![second_url, LISTING_URL]);

    sys.coordinator.set_liked(first_id, true).await.unwrap();
    let order: Vec<String> = sys
        .coordinator
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.url)
        .collect();
    assert_eq!(order, vec![LISTING_URL, second_url]);

    let job = sys.coordinator.set_done(first_id, true).await.unwrap();
    assert!(job.done && job.liked);

    sys.coordinator.delete(first_id).await.unwrap();
    assert!(sys.coordinator.query(LISTING_URL).await.unwrap().is_none());
    assert!(matches!(
        sys.coordinator.set_done(first_id, false).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_jobs_survive_restart() {
    let db_path = std::env::temp_dir().join(format!("flatscout_restart_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&db_path);
    let url = format!("sqlite://{}", db_path.display());

    {
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteListingRepository::new(pool.clone());
        assert!(repo.create_pending(LISTING_URL, 1).await.unwrap());
        pool.close().await;
    }

    let pool = create_pool(&url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let repo = SqliteListingRepository::new(pool.clone());

    // Orphaned units are not resumed: the job stays pending and is not recreated
    let job = repo.get_by_url(LISTING_URL).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert!(!repo.create_pending(LISTING_URL, 2).await.unwrap());

    pool.close().await;
    let _ = std::fs::remove_file(&db_path);
}
